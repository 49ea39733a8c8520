pub mod errors;
pub mod formats;
pub mod model;
mod registry;

pub use errors::{ParserAttempt, ParserError};
pub use formats::schema::{LeadColumn, DEFAULT_SHEET_NAME};
pub use model::{LeadRecord, ParseOptions, ParsedSheet, StageMarker, AFFIRMATIVE_MARKER, NOT_REACHED_MARKER};
pub use registry::{all_parsers, parse_lead_sheet, parse_with_parsers, SheetParser};
