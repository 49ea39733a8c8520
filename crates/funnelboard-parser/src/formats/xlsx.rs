use std::io::Cursor;

use calamine::{Data, Reader, Xlsx};

use crate::errors::ParserError;
use crate::model::{ParseOptions, ParsedSheet};
use crate::registry::SheetParser;

use super::{ColumnIndex, RawCell, SheetBuilder};

/// Reads the `pub?output=xlsx` export of the published spreadsheet.
pub struct XlsxParser;

impl XlsxParser {
    const NAME: &'static str = "XLSX";
    const ZIP_MAGIC: &'static [u8] = b"PK\x03\x04";

    fn header_text(cell: &Data) -> String {
        match cell {
            Data::String(text) => text.clone(),
            Data::Empty => String::new(),
            other => other.to_string(),
        }
    }

    fn raw_cell(cell: &Data) -> RawCell {
        match cell {
            Data::Empty => RawCell::Empty,
            Data::String(text) => RawCell::Text(text.clone()),
            Data::Float(value) => RawCell::Number(*value),
            Data::Int(value) => RawCell::Number(*value as f64),
            Data::Bool(value) => RawCell::Text(value.to_string()),
            Data::DateTime(value) => value
                .as_datetime()
                .map(RawCell::DateTime)
                .unwrap_or_else(|| RawCell::Number(value.as_f64())),
            Data::DateTimeIso(text) => RawCell::Text(text.clone()),
            // Error cells (#N/A, #REF!, ...) and durations carry no usable value.
            _ => RawCell::Empty,
        }
    }
}

impl SheetParser for XlsxParser {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn parse(&self, content: &[u8], options: &ParseOptions) -> Result<ParsedSheet, ParserError> {
        if !content.starts_with(Self::ZIP_MAGIC) {
            return Err(ParserError::FormatMismatch {
                parser: Self::NAME,
                reason: "content is not a zip container".to_string(),
            });
        }

        let mut workbook: Xlsx<_> =
            Xlsx::new(Cursor::new(content)).map_err(|err| ParserError::Workbook {
                parser: Self::NAME,
                message: err.to_string(),
            })?;

        let available = workbook.sheet_names();
        if !available.iter().any(|name| *name == options.sheet_name) {
            return Err(ParserError::MissingSheet {
                parser: Self::NAME,
                sheet: options.sheet_name.clone(),
                available,
            });
        }

        let range = workbook
            .worksheet_range(&options.sheet_name)
            .map_err(|err| ParserError::Workbook {
                parser: Self::NAME,
                message: format!("failed to read sheet '{}': {err}", options.sheet_name),
            })?;

        let mut rows = range.rows();
        let header = rows.next().ok_or(ParserError::EmptySheet { parser: Self::NAME })?;
        let headers: Vec<String> = header.iter().map(Self::header_text).collect();
        let columns = ColumnIndex::from_headers(Self::NAME, headers.iter().map(String::as_str))?;

        let mut builder = SheetBuilder::default();
        for row in rows {
            let cells: Vec<RawCell> = row.iter().map(Self::raw_cell).collect();
            builder.push_row(&columns, &cells);
        }

        Ok(builder.finish(Self::NAME, Some(options.sheet_name.clone())))
    }
}
