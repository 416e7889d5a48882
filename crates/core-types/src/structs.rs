use crate::error::CoreError;
use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::enums::Column;

/// A single market observation as delivered by a data source.
///
/// `None` marks a value the source reported as missing.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    pub timestamp: DateTime<Utc>,
    pub price: Option<f64>,
    pub volume: Option<f64>,
}

impl Sample {
    pub fn new(timestamp: DateTime<Utc>, price: Option<f64>, volume: Option<f64>) -> Self {
        Self { timestamp, price, volume }
    }

    /// Builds a sample from a Unix timestamp in milliseconds.
    pub fn from_millis(millis: i64, price: Option<f64>, volume: Option<f64>) -> Result<Self, CoreError> {
        let timestamp = Utc
            .timestamp_millis_opt(millis)
            .single()
            .ok_or(CoreError::InvalidTimestamp(millis))?;
        Ok(Self::new(timestamp, price, volume))
    }

    pub fn value(&self, column: Column) -> Option<f64> {
        match column {
            Column::Price => self.price,
            Column::Volume => self.volume,
        }
    }
}
