use csv::ReaderBuilder;

use crate::errors::ParserError;
use crate::model::{ParseOptions, ParsedSheet};
use crate::registry::SheetParser;

use super::{ColumnIndex, RawCell, SheetBuilder};

/// Reads the `pub?output=csv` export, which holds a single sheet with the
/// header on the first line.
pub struct CsvExportParser;

impl CsvExportParser {
    const NAME: &'static str = "CSV";
    const UTF8_BOM: &'static str = "\u{feff}";
}

impl SheetParser for CsvExportParser {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn parse(&self, content: &[u8], _options: &ParseOptions) -> Result<ParsedSheet, ParserError> {
        if content.starts_with(b"PK") {
            return Err(ParserError::FormatMismatch {
                parser: Self::NAME,
                reason: "content is a zip container".to_string(),
            });
        }
        let text = std::str::from_utf8(content).map_err(|err| ParserError::FormatMismatch {
            parser: Self::NAME,
            reason: format!("content is not UTF-8 text: {err}"),
        })?;
        let text = text.strip_prefix(Self::UTF8_BOM).unwrap_or(text);

        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(text.as_bytes());

        let headers = reader
            .headers()
            .map_err(|source| ParserError::Csv {
                parser: Self::NAME,
                source,
            })?
            .clone();
        if headers.is_empty() {
            return Err(ParserError::EmptySheet { parser: Self::NAME });
        }
        let columns = ColumnIndex::from_headers(Self::NAME, headers.iter())?;

        let mut builder = SheetBuilder::default();
        for result in reader.records() {
            let record = result.map_err(|source| ParserError::Csv {
                parser: Self::NAME,
                source,
            })?;
            let cells: Vec<RawCell> = record
                .iter()
                .map(|field| {
                    if field.is_empty() {
                        RawCell::Empty
                    } else {
                        RawCell::Text(field.to_string())
                    }
                })
                .collect();
            builder.push_row(&columns, &cells);
        }

        // The CSV export carries no sheet name.
        Ok(builder.finish(Self::NAME, None))
    }
}
