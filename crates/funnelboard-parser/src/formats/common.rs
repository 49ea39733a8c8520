use chrono::{Duration, NaiveDate, NaiveDateTime};

use crate::model::{LeadRecord, ParsedSheet, StageMarker};

use super::schema::{ColumnIndex, LeadColumn};

/// Format-neutral view of a single cell.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum RawCell {
    Empty,
    Text(String),
    Number(f64),
    DateTime(NaiveDateTime),
}

impl RawCell {
    pub fn is_empty(&self) -> bool {
        match self {
            RawCell::Empty => true,
            RawCell::Text(text) => text.trim().is_empty(),
            _ => false,
        }
    }
}

static EMPTY_CELL: RawCell = RawCell::Empty;

static DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%d/%m/%Y %H:%M:%S",
    "%d/%m/%Y %H:%M",
];

static DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%d/%m/%Y", "%Y/%m/%d"];

// Serial 2_958_465 is 9999-12-31, the last date a spreadsheet can hold.
const MAX_EXCEL_SERIAL: f64 = 2_958_466.0;
const SECONDS_PER_DAY: f64 = 86_400.0;

/// Converts a spreadsheet serial date (days since 1899-12-30) to a timestamp.
pub(crate) fn excel_serial_to_datetime(serial: f64) -> Option<NaiveDateTime> {
    if !serial.is_finite() || !(0.0..MAX_EXCEL_SERIAL).contains(&serial) {
        return None;
    }
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?.and_hms_opt(0, 0, 0)?;
    let days = serial.trunc();
    let seconds = ((serial - days) * SECONDS_PER_DAY).round() as i64;
    epoch.checked_add_signed(Duration::days(days as i64) + Duration::seconds(seconds))
}

/// Reads a date cell. `Ok(None)` is an empty cell, `Err` a value that is not a date.
pub(crate) fn parse_date_cell(cell: &RawCell) -> Result<Option<NaiveDateTime>, String> {
    match cell {
        RawCell::Empty => Ok(None),
        RawCell::DateTime(value) => Ok(Some(*value)),
        RawCell::Number(serial) => excel_serial_to_datetime(*serial)
            .map(Some)
            .ok_or_else(|| format!("serial date {serial} is out of range")),
        RawCell::Text(text) => {
            let trimmed = text.trim();
            if trimmed.is_empty() {
                return Ok(None);
            }
            for fmt in DATETIME_FORMATS {
                if let Ok(value) = NaiveDateTime::parse_from_str(trimmed, fmt) {
                    return Ok(Some(value));
                }
            }
            for fmt in DATE_FORMATS {
                if let Ok(date) = NaiveDate::parse_from_str(trimmed, fmt) {
                    return Ok(date.and_hms_opt(0, 0, 0));
                }
            }
            Err(format!("invalid date '{trimmed}'"))
        }
    }
}

pub(crate) fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        value.to_string()
    }
}

pub(crate) fn text_cell(cell: &RawCell) -> Option<String> {
    match cell {
        RawCell::Empty => None,
        RawCell::Text(text) => {
            let trimmed = text.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        }
        RawCell::Number(value) => Some(format_number(*value)),
        RawCell::DateTime(value) => Some(value.to_string()),
    }
}

/// Stage markers compare the raw cell text; only an exact `-` means "not reached".
pub(crate) fn marker_cell(cell: &RawCell) -> StageMarker {
    match cell {
        RawCell::Empty => StageMarker::Blank,
        RawCell::Text(text) => StageMarker::from_text(text),
        RawCell::Number(value) => StageMarker::Reached(format_number(*value)),
        RawCell::DateTime(value) => StageMarker::Reached(value.to_string()),
    }
}

#[derive(Debug, Default)]
pub(crate) struct SheetBuilder {
    records: Vec<LeadRecord>,
    date_parse_failures: usize,
    skipped_empty_rows: usize,
}

impl SheetBuilder {
    pub fn push_row(&mut self, columns: &ColumnIndex, row: &[RawCell]) {
        if row.iter().all(RawCell::is_empty) {
            self.skipped_empty_rows += 1;
            return;
        }

        let cell = |column: LeadColumn| row.get(columns.position(column)).unwrap_or(&EMPTY_CELL);

        let signup_date = self.lenient_date(cell(LeadColumn::SignupDate));
        let message_date = self.lenient_date(cell(LeadColumn::MessageDate));

        self.records.push(LeadRecord {
            lead_id: text_cell(cell(LeadColumn::LeadId)),
            signup_date,
            message_date,
            meets_requirements: marker_cell(cell(LeadColumn::MeetsRequirements)),
            responded: marker_cell(cell(LeadColumn::Responded)),
            accepted: marker_cell(cell(LeadColumn::Accepted)),
            consultant: text_cell(cell(LeadColumn::Consultant)),
        });
    }

    fn lenient_date(&mut self, cell: &RawCell) -> Option<NaiveDateTime> {
        match parse_date_cell(cell) {
            Ok(value) => value,
            Err(_) => {
                self.date_parse_failures += 1;
                None
            }
        }
    }

    pub fn finish(self, format: &'static str, sheet_name: Option<String>) -> ParsedSheet {
        ParsedSheet {
            format,
            sheet_name,
            records: self.records,
            date_parse_failures: self.date_parse_failures,
            skipped_empty_rows: self.skipped_empty_rows,
        }
    }
}
