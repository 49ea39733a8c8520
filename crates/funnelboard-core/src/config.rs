use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

use funnelboard_parser::{ParseOptions, DEFAULT_SHEET_NAME};

use crate::error::{DashboardError, Result};

/// Published XLSX export of the commercial team's lead spreadsheet.
pub const DEFAULT_SOURCE_URL: &str = "https://docs.google.com/spreadsheets/d/e/2PACX-1vQt8EOEnxeGbcvhHIz_5ubSFJk9G8ids7B-xW8OpsViI3rQVhMdtKFuXl_Lmrnb8h0jWnaoL0cQK2rR/pub?output=xlsx";

pub const ENV_CONFIG_PATH: &str = "FUNNELBOARD_CONFIG";
pub const ENV_SOURCE_URL: &str = "FUNNELBOARD_SOURCE_URL";
pub const ENV_SHEET_NAME: &str = "FUNNELBOARD_SHEET_NAME";
pub const ENV_BIND_ADDR: &str = "FUNNELBOARD_BIND";
pub const ENV_REFRESH_SECS: &str = "FUNNELBOARD_REFRESH_SECS";
pub const ENV_FETCH_TIMEOUT_SECS: &str = "FUNNELBOARD_FETCH_TIMEOUT_SECS";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DashboardConfig {
    pub source_url: String,
    pub sheet_name: String,
    pub bind_addr: String,
    pub refresh_interval_secs: u64,
    pub fetch_timeout_secs: u64,
    pub histogram_bins: usize,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            source_url: DEFAULT_SOURCE_URL.to_string(),
            sheet_name: DEFAULT_SHEET_NAME.to_string(),
            bind_addr: "0.0.0.0:8501".to_string(),
            refresh_interval_secs: 5,
            fetch_timeout_secs: 30,
            histogram_bins: 20,
        }
    }
}

/// Settings one refresh cycle needs, detached from the server settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CycleOptions {
    pub parse: ParseOptions,
    pub histogram_bins: usize,
}

impl Default for CycleOptions {
    fn default() -> Self {
        DashboardConfig::default().cycle_options()
    }
}

impl DashboardConfig {
    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Defaults, then the TOML file (argument or `FUNNELBOARD_CONFIG`), then
    /// `FUNNELBOARD_*` environment variables.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let env_path = std::env::var(ENV_CONFIG_PATH).ok();
        let path = path.or(env_path.as_deref().map(Path::new));

        let mut config = match path {
            Some(path) => {
                debug!(path = %path.display(), "loading dashboard config file");
                Self::from_file(path)?
            }
            None => Self::default(),
        };
        config.apply_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(value) = lookup(ENV_SOURCE_URL) {
            self.source_url = value;
        }
        if let Some(value) = lookup(ENV_SHEET_NAME) {
            self.sheet_name = value;
        }
        if let Some(value) = lookup(ENV_BIND_ADDR) {
            self.bind_addr = value;
        }
        if let Some(value) = lookup(ENV_REFRESH_SECS) {
            self.refresh_interval_secs = parse_env_number(ENV_REFRESH_SECS, &value)?;
        }
        if let Some(value) = lookup(ENV_FETCH_TIMEOUT_SECS) {
            self.fetch_timeout_secs = parse_env_number(ENV_FETCH_TIMEOUT_SECS, &value)?;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.source_url.trim().is_empty() {
            return Err(DashboardError::Config("source_url must not be empty".into()));
        }
        if self.sheet_name.is_empty() {
            return Err(DashboardError::Config("sheet_name must not be empty".into()));
        }
        if self.refresh_interval_secs == 0 {
            return Err(DashboardError::Config(
                "refresh_interval_secs must be greater than zero".into(),
            ));
        }
        if self.fetch_timeout_secs == 0 {
            return Err(DashboardError::Config(
                "fetch_timeout_secs must be greater than zero".into(),
            ));
        }
        if self.histogram_bins == 0 {
            return Err(DashboardError::Config(
                "histogram_bins must be greater than zero".into(),
            ));
        }
        Ok(())
    }

    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_interval_secs)
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }

    pub fn cycle_options(&self) -> CycleOptions {
        CycleOptions {
            parse: ParseOptions::new(self.sheet_name.clone()),
            histogram_bins: self.histogram_bins,
        }
    }
}

fn parse_env_number<T: std::str::FromStr>(key: &str, value: &str) -> Result<T> {
    value
        .trim()
        .parse()
        .map_err(|_| DashboardError::Config(format!("{key} must be a number, got '{value}'")))
}
