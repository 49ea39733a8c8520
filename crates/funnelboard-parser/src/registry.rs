use once_cell::sync::Lazy;

use crate::errors::{ParserAttempt, ParserError};
use crate::formats::{CsvExportParser, XlsxParser};
use crate::model::{ParseOptions, ParsedSheet};

pub trait SheetParser: Send + Sync {
    fn name(&self) -> &'static str;
    fn parse(&self, content: &[u8], options: &ParseOptions) -> Result<ParsedSheet, ParserError>;
}

static PARSERS: Lazy<Vec<&'static dyn SheetParser>> =
    Lazy::new(|| vec![&XlsxParser as &dyn SheetParser, &CsvExportParser as &dyn SheetParser]);

pub fn all_parsers() -> &'static [&'static dyn SheetParser] {
    PARSERS.as_slice()
}

pub fn parse_lead_sheet(content: &[u8], options: &ParseOptions) -> Result<ParsedSheet, ParserError> {
    parse_with_parsers(content, options, all_parsers())
}

pub fn parse_with_parsers(
    content: &[u8],
    options: &ParseOptions,
    parsers: &[&dyn SheetParser],
) -> Result<ParsedSheet, ParserError> {
    let mut attempts = Vec::new();

    for parser in parsers {
        match parser.parse(content, options) {
            Ok(parsed) => return Ok(parsed),
            Err(ParserError::FormatMismatch { reason, .. }) => {
                attempts.push(ParserAttempt::new(parser.name(), reason));
            }
            Err(err) => return Err(err),
        }
    }

    Err(ParserError::NoMatchingParser { attempts })
}
