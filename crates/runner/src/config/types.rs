//! Engine configuration file layout
//!
//! Every section falls back to its defaults when missing, so a config file
//! only needs to carry the values it changes.

use sentinel_analytics::AnalyticsConfig;
use sentinel_market_data::MarketDataConfig;
use sentinel_risk_manager::RiskConfig;
use sentinel_strategy::{ExitPolicy, OrbConfig};
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Symbols registered at startup; handles are assigned in this order
    /// starting at 1
    pub instruments: Vec<String>,
    pub market_data: MarketDataConfig,
    pub analytics: AnalyticsConfig,
    pub orb: OrbConfig,
    pub exits: ExitPolicy,
    pub risk: RiskConfig,
    /// An instruction without a report inside this window counts as failed
    pub execution_timeout_ms: u64,
    /// Capacity of the engine input channel
    pub input_buffer: usize,
    /// Capacity of the audit writer queue
    pub audit_buffer: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            instruments: Vec::new(),
            market_data: MarketDataConfig::default(),
            analytics: AnalyticsConfig::default(),
            orb: OrbConfig::default(),
            exits: ExitPolicy::default(),
            risk: RiskConfig::default(),
            execution_timeout_ms: 2000,
            input_buffer: 1024,
            audit_buffer: 4096,
        }
    }
}

impl EngineConfig {
    pub fn execution_timeout(&self) -> Duration {
        Duration::from_millis(self.execution_timeout_ms)
    }
}
