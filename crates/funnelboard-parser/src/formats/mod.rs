pub(crate) mod common;
mod csv_export;
pub(crate) mod schema;
mod xlsx;

pub use csv_export::CsvExportParser;
pub use xlsx::XlsxParser;

pub(crate) use common::{RawCell, SheetBuilder};
pub(crate) use schema::ColumnIndex;
