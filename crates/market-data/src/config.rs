//! Normalizer configuration

use serde::{Deserialize, Serialize};

/// Limits applied by every instrument normalizer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MarketDataConfig {
    /// Maximum levels kept per side of the depth ladder
    pub max_depth_levels: usize,
    /// Levels per side published in the snapshot
    pub published_levels: usize,
    /// Sealed minute bars kept per instrument
    pub bar_history: usize,
}

impl Default for MarketDataConfig {
    fn default() -> Self {
        Self {
            max_depth_levels: 20,
            published_levels: 5,
            bar_history: 25,
        }
    }
}
