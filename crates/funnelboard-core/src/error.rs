// crates/funnelboard-core/src/error.rs

use funnelboard_parser::ParserError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DashboardError {
    #[error("failed to fetch spreadsheet: {0}")]
    Fetch(#[from] reqwest::Error),

    #[error("spreadsheet request to {url} returned HTTP {status}")]
    HttpStatus { url: String, status: u16 },

    #[error("failed to read spreadsheet: {0}")]
    Parse(#[from] ParserError),

    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config file error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl DashboardError {
    /// True for failures reaching the spreadsheet host, as opposed to reading its content.
    pub fn is_fetch(&self) -> bool {
        matches!(
            self,
            DashboardError::Fetch(_) | DashboardError::HttpStatus { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, DashboardError>;
