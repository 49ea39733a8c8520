use std::fmt;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::formats::schema::DEFAULT_SHEET_NAME;

/// Cell value meaning a funnel stage has not been reached yet.
pub const NOT_REACHED_MARKER: &str = "-";

/// Cell value in the `Aceitou` column that credits a consultant with a sale.
pub const AFFIRMATIVE_MARKER: &str = "SIM";

/// Progress of a lead through one funnel stage.
///
/// `Blank` is kept apart from `NotReached` because the sheet only uses `-` to
/// mark an unreached stage; an empty cell is counted as reached.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "state", content = "value", rename_all = "snake_case")]
pub enum StageMarker {
    NotReached,
    #[default]
    Blank,
    Reached(String),
}

impl StageMarker {
    pub fn from_text(value: &str) -> Self {
        if value == NOT_REACHED_MARKER {
            StageMarker::NotReached
        } else if value.is_empty() {
            StageMarker::Blank
        } else {
            StageMarker::Reached(value.to_string())
        }
    }

    pub fn is_reached(&self) -> bool {
        !matches!(self, StageMarker::NotReached)
    }

    pub fn is_affirmative(&self) -> bool {
        matches!(self, StageMarker::Reached(value) if value == AFFIRMATIVE_MARKER)
    }

    pub fn value(&self) -> Option<&str> {
        match self {
            StageMarker::Reached(value) => Some(value),
            StageMarker::NotReached => Some(NOT_REACHED_MARKER),
            StageMarker::Blank => None,
        }
    }
}

impl fmt::Display for StageMarker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.value().unwrap_or(""))
    }
}

/// One row of the lead sheet.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeadRecord {
    pub lead_id: Option<String>,
    pub signup_date: Option<NaiveDateTime>,
    pub message_date: Option<NaiveDateTime>,
    pub meets_requirements: StageMarker,
    pub responded: StageMarker,
    pub accepted: StageMarker,
    pub consultant: Option<String>,
}

impl LeadRecord {
    pub fn has_lead_id(&self) -> bool {
        self.lead_id.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseOptions {
    pub sheet_name: String,
}

impl ParseOptions {
    pub fn new(sheet_name: impl Into<String>) -> Self {
        Self {
            sheet_name: sheet_name.into(),
        }
    }
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self::new(DEFAULT_SHEET_NAME)
    }
}

/// Records read from one workbook, plus what the parser had to discard.
#[derive(Debug, Clone)]
pub struct ParsedSheet {
    pub format: &'static str,
    pub sheet_name: Option<String>,
    pub records: Vec<LeadRecord>,
    /// Date cells that held a value which could not be read as a date.
    pub date_parse_failures: usize,
    pub skipped_empty_rows: usize,
}
