use std::fmt;

use thiserror::Error;

#[derive(Debug, Clone)]
pub struct ParserAttempt {
    pub parser: &'static str,
    pub message: String,
}

impl ParserAttempt {
    pub fn new(parser: &'static str, message: impl Into<String>) -> Self {
        Self {
            parser,
            message: message.into(),
        }
    }
}

impl fmt::Display for ParserAttempt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.parser, self.message)
    }
}

#[derive(Debug, Error)]
pub enum ParserError {
    #[error("{parser} format mismatch: {reason}")]
    FormatMismatch {
        parser: &'static str,
        reason: String,
    },

    #[error("{parser} could not open workbook: {message}")]
    Workbook {
        parser: &'static str,
        message: String,
    },

    #[error("{parser} workbook has no sheet named '{sheet}' (available: {})", .available.join(", "))]
    MissingSheet {
        parser: &'static str,
        sheet: String,
        available: Vec<String>,
    },

    #[error("{parser} header row is missing required column '{column}'")]
    MissingColumn {
        parser: &'static str,
        column: &'static str,
    },

    #[error("{parser} CSV error: {source}")]
    Csv {
        parser: &'static str,
        #[source]
        source: csv::Error,
    },

    #[error("{parser} sheet did not contain a header row")]
    EmptySheet { parser: &'static str },

    #[error("no parser recognized this workbook; attempts: {}", .attempts.iter().map(ToString::to_string).collect::<Vec<_>>().join("; "))]
    NoMatchingParser { attempts: Vec<ParserAttempt> },
}
