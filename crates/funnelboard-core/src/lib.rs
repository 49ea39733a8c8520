pub mod config;
pub mod dashboard;
pub mod error;
pub mod fetch;
pub mod metrics;
pub mod periods;

pub use funnelboard_parser::{LeadRecord, ParseOptions, StageMarker};
