//! Per-instrument risk state

use crate::breaker::{CircuitBreaker, CircuitBreakerStatus, CircuitBreakerThresholds};
use log::debug;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use sentinel_analytics::{AnalyticsConfig, VolatilityAnalyzer, VolumeSpikeDetector};
use sentinel_market_data::MarketSnapshot;

/// Rolling price and volume windows plus the circuit breaker for one
/// instrument. Guarded together with the rest of the instrument's state.
#[derive(Debug, Clone)]
pub struct RiskContext {
    symbol: String,
    volatility: VolatilityAnalyzer,
    volume: VolumeSpikeDetector,
    breaker: CircuitBreaker,
}

impl RiskContext {
    pub fn new(
        symbol: impl Into<String>,
        analytics: &AnalyticsConfig,
        thresholds: CircuitBreakerThresholds,
    ) -> Self {
        Self {
            symbol: symbol.into(),
            volatility: VolatilityAnalyzer::new(analytics.volatility_window),
            volume: VolumeSpikeDetector::new(
                analytics.volume_window,
                analytics.volume_spike_multiplier,
            ),
            breaker: CircuitBreaker::new(thresholds),
        }
    }

    /// Fold a trade print into the windows; returns whether its size spiked
    pub fn on_trade(&mut self, price: Decimal, size: Decimal) -> bool {
        self.volatility.observe(price);
        self.volume.check_and_observe(size)
    }

    /// Re-evaluate the breaker from the snapshot's intraday change.
    ///
    /// Reference: previous close, else session open, else first trade.
    pub fn update_breaker(&mut self, snapshot: &MarketSnapshot) -> CircuitBreakerStatus {
        let Some(change) = intraday_change_pct(snapshot) else {
            debug!("[RISK] {} no reference price yet for circuit breaker", self.symbol);
            return self.breaker.status();
        };
        self.breaker.evaluate(&self.symbol, change)
    }

    pub fn volatility(&self) -> Option<Decimal> {
        self.volatility.volatility()
    }

    pub fn volatility_samples(&self) -> usize {
        self.volatility.samples()
    }

    pub fn average_trade_size(&self) -> Option<Decimal> {
        self.volume.average()
    }

    pub fn breaker(&self) -> &CircuitBreaker {
        &self.breaker
    }

    pub fn status(&self) -> CircuitBreakerStatus {
        self.breaker.status()
    }

    pub fn reset_session(&mut self) {
        self.volatility.clear();
        self.volume.clear();
        self.breaker.reset(&self.symbol);
    }
}

/// |last − reference| / reference × 100
pub fn intraday_change_pct(snapshot: &MarketSnapshot) -> Option<Decimal> {
    let last = snapshot.last_price?;
    let reference = snapshot
        .prev_close
        .or(snapshot.open)
        .or(snapshot.first_trade)
        .filter(|r| *r > Decimal::ZERO)?;
    Some(((last - reference) / reference * dec!(100)).abs())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use sentinel_core::InstrumentHandle;
    use sentinel_market_data::{InstrumentNormalizer, MarketDataConfig};

    fn normalizer() -> InstrumentNormalizer {
        InstrumentNormalizer::new("AAPL", InstrumentHandle(1), MarketDataConfig::default())
    }

    fn trade(n: &mut InstrumentNormalizer, price: Decimal) {
        n.apply_trade(price, dec!(100), Utc.with_ymd_and_hms(2024, 3, 1, 15, 0, 0).unwrap());
    }

    #[test]
    fn test_reference_precedence() {
        let mut n = normalizer();
        trade(&mut n, dec!(110));
        // Only the first trade is known: 110 → 110
        assert_eq!(intraday_change_pct(&n.snapshot()), Some(dec!(0)));

        n.apply_field(14, dec!(100));
        assert_eq!(intraday_change_pct(&n.snapshot()), Some(dec!(10)));

        n.seed_previous_close(dec!(88));
        trade(&mut n, dec!(99));
        assert_eq!(intraday_change_pct(&n.snapshot()), Some(dec!(12.5)));
    }

    #[test]
    fn test_breaker_follows_snapshot() {
        let mut n = normalizer();
        n.seed_previous_close(dec!(100));
        let mut ctx = RiskContext::new(
            "AAPL",
            &AnalyticsConfig::default(),
            CircuitBreakerThresholds::default(),
        );

        trade(&mut n, dec!(108));
        assert_eq!(ctx.update_breaker(&n.snapshot()), CircuitBreakerStatus::Level1);
        trade(&mut n, dec!(85));
        assert_eq!(ctx.update_breaker(&n.snapshot()), CircuitBreakerStatus::Level2);
        trade(&mut n, dec!(101));
        assert_eq!(ctx.update_breaker(&n.snapshot()), CircuitBreakerStatus::Level2);

        ctx.reset_session();
        assert_eq!(ctx.status(), CircuitBreakerStatus::Normal);
    }

    #[test]
    fn test_trade_windows() {
        let mut ctx = RiskContext::new(
            "AAPL",
            &AnalyticsConfig::default(),
            CircuitBreakerThresholds::default(),
        );
        for _ in 0..5 {
            assert!(!ctx.on_trade(dec!(100), dec!(100)));
        }
        assert!(ctx.on_trade(dec!(100), dec!(300)));
        assert_eq!(ctx.volatility(), Some(Decimal::ZERO));
        assert_eq!(ctx.volatility_samples(), 6);
    }
}
