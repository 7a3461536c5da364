//! Intraday circuit breaker
//!
//! Staged restriction keyed by the absolute intraday price change `p`
//! (percent of the reference price):
//!
//! ```text
//!   p < 7%   NORMAL   ×1.0
//!   p < 13%  LEVEL1   ×0.7   no aggressive entries
//!   p < 20%  LEVEL2   ×0.3   no aggressive entries, no short selling
//!   else     HALTED   ×0     nothing
//! ```
//!
//! Status only escalates within a session; `reset` at the day boundary is
//! the only way back to NORMAL.

use log::{error, info, warn};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CircuitBreakerStatus {
    #[default]
    Normal,
    Level1,
    Level2,
    Halted,
}

impl CircuitBreakerStatus {
    /// Multiplier applied to position size
    pub fn size_multiplier(&self) -> Decimal {
        match self {
            Self::Normal => Decimal::ONE,
            Self::Level1 => dec!(0.7),
            Self::Level2 => dec!(0.3),
            Self::Halted => Decimal::ZERO,
        }
    }

    pub fn blocks_all(&self) -> bool {
        matches!(self, Self::Halted)
    }

    pub fn allows_short_selling(&self) -> bool {
        matches!(self, Self::Normal | Self::Level1)
    }

    /// Whether tick-level composite entries may fire
    pub fn allows_aggressive(&self) -> bool {
        matches!(self, Self::Normal)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Normal => "NORMAL",
            Self::Level1 => "LEVEL1",
            Self::Level2 => "LEVEL2",
            Self::Halted => "HALTED",
        }
    }
}

impl fmt::Display for CircuitBreakerStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Percent thresholds at which each level starts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CircuitBreakerThresholds {
    pub level1_pct: Decimal,
    pub level2_pct: Decimal,
    pub halt_pct: Decimal,
}

impl Default for CircuitBreakerThresholds {
    fn default() -> Self {
        Self {
            level1_pct: dec!(7),
            level2_pct: dec!(13),
            halt_pct: dec!(20),
        }
    }
}

impl CircuitBreakerThresholds {
    /// Status for a given absolute change in percent
    pub fn classify(&self, change_pct: Decimal) -> CircuitBreakerStatus {
        let p = change_pct.abs();
        if p >= self.halt_pct {
            CircuitBreakerStatus::Halted
        } else if p >= self.level2_pct {
            CircuitBreakerStatus::Level2
        } else if p >= self.level1_pct {
            CircuitBreakerStatus::Level1
        } else {
            CircuitBreakerStatus::Normal
        }
    }

    /// Thresholds strictly increase and start above zero
    pub fn is_ordered(&self) -> bool {
        self.level1_pct > Decimal::ZERO
            && self.level1_pct < self.level2_pct
            && self.level2_pct < self.halt_pct
    }
}

/// Per-instrument breaker
#[derive(Debug, Clone)]
pub struct CircuitBreaker {
    thresholds: CircuitBreakerThresholds,
    status: CircuitBreakerStatus,
    last_change_pct: Decimal,
}

impl CircuitBreaker {
    pub fn new(thresholds: CircuitBreakerThresholds) -> Self {
        Self {
            thresholds,
            status: CircuitBreakerStatus::Normal,
            last_change_pct: Decimal::ZERO,
        }
    }

    /// Re-evaluate on a fresh intraday change; never de-escalates
    pub fn evaluate(&mut self, symbol: &str, change_pct: Decimal) -> CircuitBreakerStatus {
        self.last_change_pct = change_pct.abs();
        let level = self.thresholds.classify(change_pct);
        if level > self.status {
            match level {
                CircuitBreakerStatus::Halted => error!(
                    "[RISK] {} circuit breaker HALTED: intraday move {:.2}%",
                    symbol, self.last_change_pct
                ),
                _ => warn!(
                    "[RISK] {} circuit breaker {} -> {}: intraday move {:.2}%",
                    symbol, self.status, level, self.last_change_pct
                ),
            }
            self.status = level;
        }
        self.status
    }

    pub fn status(&self) -> CircuitBreakerStatus {
        self.status
    }

    pub fn last_change_pct(&self) -> Decimal {
        self.last_change_pct
    }

    pub fn reset(&mut self, symbol: &str) {
        if self.status != CircuitBreakerStatus::Normal {
            info!("[RISK] {} circuit breaker reset from {}", symbol, self.status);
        }
        self.status = CircuitBreakerStatus::Normal;
        self.last_change_pct = Decimal::ZERO;
    }
}

impl Default for CircuitBreaker {
    fn default() -> Self {
        Self::new(CircuitBreakerThresholds::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_levels_and_multipliers() {
        let thresholds = CircuitBreakerThresholds::default();
        for (p, status, multiplier) in [
            (dec!(3), CircuitBreakerStatus::Normal, dec!(1)),
            (dec!(7), CircuitBreakerStatus::Level1, dec!(0.7)),
            (dec!(-8), CircuitBreakerStatus::Level1, dec!(0.7)),
            (dec!(15), CircuitBreakerStatus::Level2, dec!(0.3)),
            (dec!(25), CircuitBreakerStatus::Halted, dec!(0)),
        ] {
            let level = thresholds.classify(p);
            assert_eq!(level, status, "p = {}", p);
            assert_eq!(level.size_multiplier(), multiplier);
        }
    }

    #[test]
    fn test_monotone_within_session() {
        let mut breaker = CircuitBreaker::default();
        assert_eq!(breaker.evaluate("AAPL", dec!(14)), CircuitBreakerStatus::Level2);
        // Price comes back: status holds
        assert_eq!(breaker.evaluate("AAPL", dec!(2)), CircuitBreakerStatus::Level2);
        assert_eq!(breaker.last_change_pct(), dec!(2));

        breaker.reset("AAPL");
        assert_eq!(breaker.status(), CircuitBreakerStatus::Normal);
    }

    #[test]
    fn test_restrictions() {
        assert!(CircuitBreakerStatus::Normal.allows_aggressive());
        assert!(!CircuitBreakerStatus::Level1.allows_aggressive());
        assert!(CircuitBreakerStatus::Level1.allows_short_selling());
        assert!(!CircuitBreakerStatus::Level2.allows_short_selling());
        assert!(CircuitBreakerStatus::Halted.blocks_all());
    }

    #[test]
    fn test_threshold_ordering() {
        assert!(CircuitBreakerThresholds::default().is_ordered());
        let inverted = CircuitBreakerThresholds {
            level1_pct: dec!(13),
            level2_pct: dec!(7),
            halt_pct: dec!(20),
        };
        assert!(!inverted.is_ordered());
    }
}
