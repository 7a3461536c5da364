use rust_decimal::Decimal;
use std::path::Path;
use thiserror::Error;

use super::types::EngineConfig;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Failed to parse config: {0}")]
    ParseError(#[from] serde_json::Error),
    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// Load engine configuration from a JSON file
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<EngineConfig, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    load_config_from_str(&content)
}

/// Load configuration from a JSON string
pub fn load_config_from_str(json: &str) -> Result<EngineConfig, ConfigError> {
    let config: EngineConfig = serde_json::from_str(json)?;
    Ok(config)
}

/// Load the default embedded configuration
pub fn load_default_config() -> Result<EngineConfig, ConfigError> {
    let default_config = include_str!("default_config.json");
    load_config_from_str(default_config)
}

fn invalid(msg: impl Into<String>) -> ConfigError {
    ConfigError::Invalid(msg.into())
}

impl EngineConfig {
    /// Reject values the pipeline cannot run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        let md = &self.market_data;
        if md.max_depth_levels == 0 {
            return Err(invalid("market_data.max_depth_levels must be at least 1"));
        }
        if md.published_levels == 0 || md.published_levels > md.max_depth_levels {
            return Err(invalid(format!(
                "market_data.published_levels must be in 1..={}",
                md.max_depth_levels
            )));
        }

        let an = &self.analytics;
        for (name, window) in [
            ("analytics.volatility_window", an.volatility_window),
            ("analytics.volume_window", an.volume_window),
            ("analytics.vwap_window", an.vwap_window),
        ] {
            if window == 0 {
                return Err(invalid(format!("{} must be at least 1", name)));
            }
        }
        if an.intervals_per_day == 0 {
            return Err(invalid("analytics.intervals_per_day must be at least 1"));
        }

        if self.orb.range_minutes <= 0 {
            return Err(invalid("orb.range_minutes must be positive"));
        }
        if self.orb.volume_lookback == 0 {
            return Err(invalid("orb.volume_lookback must be at least 1"));
        }

        if !self.risk.circuit_breaker.is_ordered() {
            return Err(invalid(
                "risk.circuit_breaker thresholds must satisfy 0 < level1 < level2 < halt",
            ));
        }
        if self.risk.base_size <= Decimal::ZERO {
            return Err(invalid("risk.base_size must be positive"));
        }
        if self.risk.min_volatility <= Decimal::ZERO {
            return Err(invalid("risk.min_volatility must be positive"));
        }
        if self.risk.liquidity_reference_size <= Decimal::ZERO {
            return Err(invalid("risk.liquidity_reference_size must be positive"));
        }

        if self.execution_timeout_ms == 0 {
            return Err(invalid("execution_timeout_ms must be positive"));
        }
        if self.input_buffer == 0 {
            return Err(invalid("input_buffer must be at least 1"));
        }

        let mut seen = std::collections::HashSet::new();
        for symbol in &self.instruments {
            if symbol.trim().is_empty() {
                return Err(invalid("instrument symbols must not be empty"));
            }
            if !seen.insert(symbol.as_str()) {
                return Err(invalid(format!("instrument {} listed twice", symbol)));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_load_default_config() {
        let config = load_default_config().unwrap();
        assert!(config.validate().is_ok());
        assert_eq!(config.instruments, vec!["AAPL", "MSFT"]);
        assert_eq!(config.orb.range_minutes, 15);
        assert_eq!(config.risk.circuit_breaker.halt_pct, dec!(20));
        assert_eq!(config.execution_timeout_ms, 2000);
    }

    #[test]
    fn test_missing_fields_fall_back_to_defaults() {
        let config = load_config_from_str(r#"{ "orb": { "range_minutes": 30 } }"#).unwrap();
        assert_eq!(config.orb.range_minutes, 30);
        assert_eq!(config.orb.volume_lookback, 5);
        assert_eq!(config.analytics.volatility_window, 20);
        assert_eq!(config.risk.base_size, dec!(1000));
        assert!(config.instruments.is_empty());
    }

    #[test]
    fn test_parse_error() {
        assert!(matches!(
            load_config_from_str("{ not json"),
            Err(ConfigError::ParseError(_))
        ));
    }

    #[test]
    fn test_missing_file() {
        assert!(matches!(
            load_config("/nonexistent/sentinel.json"),
            Err(ConfigError::IoError(_))
        ));
    }

    #[test]
    fn test_validate_rejects_zero_window() {
        let mut config = EngineConfig::default();
        config.analytics.volatility_window = 0;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_validate_rejects_zero_depth() {
        let mut config = EngineConfig::default();
        config.market_data.max_depth_levels = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_inverted_thresholds() {
        let mut config = EngineConfig::default();
        config.risk.circuit_breaker.level2_pct = dec!(25);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_duplicate_instrument() {
        let config = EngineConfig {
            instruments: vec!["AAPL".into(), "AAPL".into()],
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
