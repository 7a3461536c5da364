use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Previous-session reference data for one instrument.
///
/// Every field is optional: missing reference data degrades the
/// dependent filter rather than blocking the pipeline.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PreviousDay {
    pub high: Option<Decimal>,
    pub low: Option<Decimal>,
    pub close: Option<Decimal>,
    /// Historical average daily volume
    pub avg_daily_volume: Option<Decimal>,
    /// Sector the instrument belongs to (for relative strength)
    pub sector: Option<String>,
}

impl PreviousDay {
    pub fn with_range(high: Decimal, low: Decimal, close: Decimal) -> Self {
        Self {
            high: Some(high),
            low: Some(low),
            close: Some(close),
            ..Default::default()
        }
    }

    pub fn with_avg_daily_volume(mut self, volume: Decimal) -> Self {
        self.avg_daily_volume = Some(volume);
        self
    }

    pub fn with_sector(mut self, sector: impl Into<String>) -> Self {
        self.sector = Some(sector.into());
        self
    }
}
