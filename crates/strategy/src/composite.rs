//! Tick-level composite entry signal
//!
//! Fallback entry when the breakout strategy has nothing to say: price
//! pulling away from the rolling VWAP on unusual volume. The caller applies
//! the sector and circuit-breaker gates.

use rust_decimal::Decimal;
use sentinel_analytics::RollingVwap;
use sentinel_core::Side;

/// Direction suggested by the VWAP position and a volume spike.
///
/// `trade_spike` is the per-trade size spike; `projection_spike` is the
/// daily-volume projection firing for the current interval. Either one
/// qualifies.
pub fn composite_candidate(
    price: Decimal,
    vwap: &RollingVwap,
    trade_spike: bool,
    projection_spike: bool,
) -> Option<Side> {
    if !(trade_spike || projection_spike) {
        return None;
    }
    if vwap.is_above(price) {
        Some(Side::Buy)
    } else if vwap.is_below(price) {
        Some(Side::Sell)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn vwap_at_100() -> RollingVwap {
        let mut vwap = RollingVwap::new(50, dec!(0.005));
        vwap.observe(dec!(100), dec!(1000));
        vwap.observe(dec!(100), dec!(2000));
        vwap
    }

    #[test]
    fn test_direction_follows_vwap() {
        let vwap = vwap_at_100();
        assert_eq!(composite_candidate(dec!(101), &vwap, true, false), Some(Side::Buy));
        assert_eq!(composite_candidate(dec!(99), &vwap, false, true), Some(Side::Sell));
        // Inside the 0.5% buffer
        assert_eq!(composite_candidate(dec!(100.4), &vwap, true, true), None);
    }

    #[test]
    fn test_requires_spike() {
        let vwap = vwap_at_100();
        assert_eq!(composite_candidate(dec!(101), &vwap, false, false), None);
    }

    #[test]
    fn test_no_vwap_no_signal() {
        let vwap = RollingVwap::new(50, dec!(0.005));
        assert_eq!(composite_candidate(dec!(101), &vwap, true, true), None);
    }
}
