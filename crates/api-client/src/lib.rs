use crate::error::ApiError;
use async_trait::async_trait;
use configuration::SourceConfig;
use core_types::Sample;
use std::path::PathBuf;
use std::time::Duration;

pub mod error;
pub mod responses;
// --- Public API ---
pub use responses::MarketChartResponse;

/// The abstract interface for a historical market data source.
/// The pipeline only depends on this trait, allowing the underlying implementation
/// (live API, local file, or a test double) to be swapped out.
#[async_trait]
pub trait MarketDataSource: Send + Sync {
    /// Fetches the full price/volume history of `asset` quoted in `vs_currency`.
    async fn fetch_market_chart(
        &self,
        asset: &str,
        vs_currency: &str,
    ) -> Result<Vec<Sample>, ApiError>;

    /// A short description of where the data comes from, for logs.
    fn describe(&self) -> String;
}

/// A concrete implementation of the `MarketDataSource` for the public CoinGecko API.
#[derive(Debug, Clone)]
pub struct CoinGeckoClient {
    client: reqwest::Client,
    base_url: String,
}

impl CoinGeckoClient {
    pub fn new(config: &SourceConfig) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(concat!("driftwatch/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    /// `GET /coins/{id}/market_chart`, without the query string.
    pub fn market_chart_url(&self, asset: &str) -> String {
        format!("{}/coins/{}/market_chart", self.base_url, asset)
    }
}

#[async_trait]
impl MarketDataSource for CoinGeckoClient {
    async fn fetch_market_chart(
        &self,
        asset: &str,
        vs_currency: &str,
    ) -> Result<Vec<Sample>, ApiError> {
        let url = self.market_chart_url(asset);
        tracing::debug!(%url, vs_currency, "Requesting market chart.");

        let response = self
            .client
            .get(&url)
            .query(&[("vs_currency", vs_currency), ("days", "max")])
            .send()
            .await?;
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            return Err(ApiError::Status {
                status: status.as_u16(),
                body: text,
            });
        }

        MarketChartResponse::from_json(&text)?.into_samples()
    }

    fn describe(&self) -> String {
        format!("CoinGecko API at {}", self.base_url)
    }
}

/// Reads a previously saved `market_chart` response from disk.
///
/// The asset and currency arguments are ignored; the file already pins both.
#[derive(Debug, Clone)]
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl MarketDataSource for FileSource {
    async fn fetch_market_chart(
        &self,
        _asset: &str,
        _vs_currency: &str,
    ) -> Result<Vec<Sample>, ApiError> {
        let body = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|source| ApiError::Io {
                path: self.path.clone(),
                source,
            })?;
        MarketChartResponse::from_json(&body)?.into_samples()
    }

    fn describe(&self) -> String {
        format!("file {}", self.path.display())
    }
}
