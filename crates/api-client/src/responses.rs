use crate::error::ApiError;
use core_types::Sample;
use serde::Deserialize;

/// The subset of `GET /coins/{id}/market_chart` this crate consumes.
///
/// Each series is a list of `[timestamp_ms, value]` pairs; CoinGecko reports gaps as
/// `null` values. `market_caps` is ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct MarketChartResponse {
    pub prices: Vec<(f64, Option<f64>)>,
    #[serde(default)]
    pub total_volumes: Vec<(f64, Option<f64>)>,
}

impl MarketChartResponse {
    /// Parses a raw JSON body.
    pub fn from_json(body: &str) -> Result<Self, ApiError> {
        serde_json::from_str(body).map_err(|e| ApiError::Deserialization(e.to_string()))
    }

    /// Joins the two parallel series into samples.
    ///
    /// The series are matched by position and must agree on length and on the
    /// timestamp at every position.
    pub fn into_samples(self) -> Result<Vec<Sample>, ApiError> {
        if self.prices.is_empty() {
            return Err(ApiError::NoData);
        }
        if self.prices.len() != self.total_volumes.len() {
            return Err(ApiError::InvalidData(format!(
                "{} price points but {} volume points",
                self.prices.len(),
                self.total_volumes.len()
            )));
        }

        self.prices
            .into_iter()
            .zip(self.total_volumes)
            .enumerate()
            .map(|(i, ((price_ts, price), (volume_ts, volume)))| {
                if price_ts != volume_ts {
                    return Err(ApiError::InvalidData(format!(
                        "timestamp mismatch at position {}: price {} vs volume {}",
                        i, price_ts, volume_ts
                    )));
                }
                if !price_ts.is_finite() {
                    return Err(ApiError::InvalidData(format!(
                        "non-finite timestamp at position {}",
                        i
                    )));
                }
                Sample::from_millis(price_ts as i64, price, volume)
                    .map_err(|e| ApiError::InvalidData(e.to_string()))
            })
            .collect()
    }
}
