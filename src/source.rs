use std::path::PathBuf;
use std::time::Duration;

use serde_json::Value;
use tracing::{debug, info, instrument};

use crate::error::{CatalogError, Result};
use crate::types::Catalog;

/// Where a remote (Mode A) load reads its catalog from.
#[async_trait::async_trait]
pub trait CatalogSource: Send + Sync {
    /// Human readable location, used in logs.
    fn name(&self) -> &str;

    /// Fetch and parse the catalog resource.
    async fn fetch_catalog(&self) -> Result<Catalog>;
}

/// Parses a catalog body, checking that it is a JSON array of records.
pub fn parse_catalog(body: &[u8]) -> Result<Catalog> {
    let value: Value = serde_json::from_slice(body)?;
    match value {
        Value::Array(_) => Ok(serde_json::from_value(value)?),
        Value::Object(_) => Err(CatalogError::Shape("expected an array, found an object".into())),
        Value::Null => Err(CatalogError::Shape("expected an array, found null".into())),
        _ => Err(CatalogError::Shape("expected an array, found a scalar".into())),
    }
}

pub struct HttpCatalogSource {
    client: reqwest::Client,
    url: String,
}

impl HttpCatalogSource {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            url: url.into(),
        }
    }

    pub fn with_timeout(url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            url: url.into(),
        })
    }
}

#[async_trait::async_trait]
impl CatalogSource for HttpCatalogSource {
    fn name(&self) -> &str {
        &self.url
    }

    #[instrument(skip(self), fields(url = %self.url))]
    async fn fetch_catalog(&self) -> Result<Catalog> {
        let response = self.client.get(&self.url).send().await?;

        if !response.status().is_success() {
            return Err(CatalogError::Status {
                url: self.url.clone(),
                status: response.status().as_u16(),
            });
        }

        let body = response.bytes().await?;
        debug!("Received {} bytes", body.len());
        let catalog = parse_catalog(&body)?;
        info!("Fetched {} problem records", catalog.len());
        Ok(catalog)
    }
}

/// Reads the catalog from a JSON file on disk.
pub struct FileCatalogSource {
    path: PathBuf,
    name: String,
}

impl FileCatalogSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = path.display().to_string();
        Self { path, name }
    }
}

#[async_trait::async_trait]
impl CatalogSource for FileCatalogSource {
    fn name(&self) -> &str {
        &self.name
    }

    #[instrument(skip(self), fields(path = %self.name))]
    async fn fetch_catalog(&self) -> Result<Catalog> {
        let body = tokio::fs::read(&self.path).await?;
        let catalog = parse_catalog(&body)?;
        info!("Read {} problem records", catalog.len());
        Ok(catalog)
    }
}
