use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

use crate::config::DashboardConfig;
use crate::error::{DashboardError, Result};

/// Where a refresh cycle reads the spreadsheet bytes from.
#[async_trait]
pub trait SheetSource: Send + Sync {
    fn describe(&self) -> String;
    async fn fetch(&self) -> Result<Vec<u8>>;
}

/// Downloads the published spreadsheet on every call. There is no caching and
/// no retry; the only timeout is the client's.
pub struct HttpSheetSource {
    client: reqwest::Client,
    url: String,
}

impl HttpSheetSource {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("funnelboard/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            client,
            url: url.into(),
        })
    }

    pub fn from_config(config: &DashboardConfig) -> Result<Self> {
        Self::new(config.source_url.clone(), config.fetch_timeout())
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl SheetSource for HttpSheetSource {
    fn describe(&self) -> String {
        self.url.clone()
    }

    async fn fetch(&self) -> Result<Vec<u8>> {
        let response = self.client.get(&self.url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(DashboardError::HttpStatus {
                url: self.url.clone(),
                status: status.as_u16(),
            });
        }
        let body = response.bytes().await?;
        debug!(url = %self.url, bytes = body.len(), "spreadsheet downloaded");
        Ok(body.to_vec())
    }
}

/// Serves fixed bytes, for one-shot reports over a local file.
#[derive(Debug, Clone)]
pub struct StaticSheetSource {
    label: String,
    content: Vec<u8>,
}

impl StaticSheetSource {
    pub fn new(label: impl Into<String>, content: Vec<u8>) -> Self {
        Self {
            label: label.into(),
            content,
        }
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read(path)?;
        Ok(Self::new(path.display().to_string(), content))
    }
}

#[async_trait]
impl SheetSource for StaticSheetSource {
    fn describe(&self) -> String {
        self.label.clone()
    }

    async fn fetch(&self) -> Result<Vec<u8>> {
        Ok(self.content.clone())
    }
}
