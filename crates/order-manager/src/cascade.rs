//! Decision Cascade
//!
//! Folds every per-tick input into one decision with fixed precedence:
//!
//! ```text
//!  1. open position breaches its exit band ──► EXIT        (stop)
//!  2. circuit breaker HALTED               ──► HALT        (stop)
//!  3. breakout strategy signal             ──► candidate
//!  4. composite signal, sector + breaker   ──► candidate
//!  5.                                      ──► HOLD
//!
//!  candidate ──► daily latch ──► no pyramiding ──► RiskEngine::validate
//!            ──► size ──► TRADE
//! ```

use chrono::{DateTime, Utc};
use log::{debug, info};
use rust_decimal::Decimal;
use sentinel_analytics::RelativeStrength;
use sentinel_core::{Position, Side};
use sentinel_gateway::{InstructionTag, TradeInstruction};
use sentinel_market_data::MarketSnapshot;
use sentinel_risk_manager::{RejectReason, RiskContext, RiskEngine, RiskVerdict};
use sentinel_strategy::{ExitPolicy, Signal, evaluate_exit};
use std::sync::Arc;

/// Everything the cascade looks at for one tick of one instrument
pub struct CascadeInput<'a> {
    pub snapshot: &'a MarketSnapshot,
    pub risk: &'a RiskContext,
    pub position: Option<&'a Position>,
    pub exit_pending: bool,
    pub entry_pending: bool,
    /// An entry was already instructed this trading day
    pub entered_today: bool,
    /// Breakout signal produced on this tick, if any
    pub breakout: Option<Signal>,
    /// Composite direction from VWAP + volume spike
    pub composite: Option<Side>,
    /// Instrument's sector against the benchmark; `None` when unknown
    pub sector: Option<RelativeStrength>,
    pub now: DateTime<Utc>,
}

/// Outcome of one pass through the cascade
#[derive(Debug, Clone, PartialEq)]
pub enum Decision {
    Hold,
    /// Circuit breaker HALTED: nothing may trade
    Halt,
    /// Entry candidate dropped before risk (pyramiding, pending, gated)
    Suppressed { side: Side, reason: &'static str },
    /// Entry candidate vetoed by risk
    Vetoed { side: Side, reason: RejectReason },
    Trade(TradeInstruction),
}

impl Decision {
    pub fn instruction(&self) -> Option<&TradeInstruction> {
        match self {
            Self::Trade(instruction) => Some(instruction),
            _ => None,
        }
    }

    pub fn is_veto(&self) -> bool {
        matches!(self, Self::Vetoed { .. })
    }
}

pub struct DecisionCascade {
    risk: Arc<RiskEngine>,
    exits: ExitPolicy,
}

impl DecisionCascade {
    pub fn new(risk: Arc<RiskEngine>, exits: ExitPolicy) -> Self {
        Self { risk, exits }
    }

    pub fn decide(&self, input: CascadeInput<'_>) -> Decision {
        let snapshot = input.snapshot;
        let Some(last) = snapshot.last_price else {
            return Decision::Hold;
        };

        // 1. Exit bands, regardless of what produced the position
        if let Some(position) = input.position
            && let Some(exit) = evaluate_exit(&self.exits, position, last)
        {
            if input.exit_pending {
                return Decision::Suppressed {
                    side: exit.side,
                    reason: "exit already pending",
                };
            }
            info!(
                "[CASCADE] {} {}, unrealized {}",
                snapshot.symbol,
                exit.reason,
                position.unrealized_pnl(last)
            );
            return Decision::Trade(TradeInstruction::new(
                snapshot.symbol.clone(),
                snapshot.handle,
                exit.side,
                position.quantity,
                last,
                exit.tag,
                input.now,
            ));
        }

        // 2. Halt
        if input.risk.status().blocks_all() {
            return Decision::Halt;
        }

        // 3 / 4. Breakout beats composite
        let (side, tag) = match (input.breakout.as_ref(), input.composite) {
            (Some(signal), _) => (signal.side, signal.tag),
            (None, Some(side)) => {
                if let Some(reason) = self.composite_gate(side, &input) {
                    debug!("[CASCADE] {} composite {} gated: {}", snapshot.symbol, side, reason);
                    return Decision::Suppressed { side, reason };
                }
                (side, InstructionTag::Composite)
            }
            // 5.
            (None, None) => return Decision::Hold,
        };

        self.entry(side, tag, last, &input)
    }

    fn composite_gate(&self, side: Side, input: &CascadeInput<'_>) -> Option<&'static str> {
        if !input.risk.status().allows_aggressive() {
            return Some("circuit breaker disables aggressive entries");
        }
        match (side, input.sector) {
            (Side::Buy, Some(RelativeStrength::Outperform)) => None,
            (Side::Sell, Some(RelativeStrength::Underperform)) => None,
            // Unknown sector data: filter is neutral
            (_, None) => None,
            (Side::Buy, Some(_)) => Some("sector not outperforming"),
            (Side::Sell, Some(_)) => Some("sector not underperforming"),
        }
    }

    fn entry(
        &self,
        side: Side,
        tag: InstructionTag,
        last: Decimal,
        input: &CascadeInput<'_>,
    ) -> Decision {
        let snapshot = input.snapshot;

        if input.entered_today {
            return Decision::Suppressed {
                side,
                reason: "daily entry already taken",
            };
        }
        if let Some(position) = input.position {
            let reason = if position.side == side.opens() {
                "position already open in this direction"
            } else {
                "opposite position open; exits are band-driven"
            };
            return Decision::Suppressed { side, reason };
        }
        if input.entry_pending {
            return Decision::Suppressed {
                side,
                reason: "entry already pending",
            };
        }

        if let RiskVerdict::Reject(reason) = self.risk.validate(side, snapshot, input.risk) {
            return Decision::Vetoed { side, reason };
        }

        let quantity = self.risk.max_position_size(side, snapshot, input.risk);
        if quantity <= Decimal::ZERO {
            info!("[CASCADE] {} {} {} sized to zero", snapshot.symbol, tag, side);
            return Decision::Vetoed {
                side,
                reason: RejectReason::ZeroSize,
            };
        }

        let instruction = TradeInstruction::new(
            snapshot.symbol.clone(),
            snapshot.handle,
            side,
            quantity,
            last,
            tag,
            input.now,
        );
        info!(
            "[CASCADE] {} {} {} {} @ {} (notional {})",
            snapshot.symbol,
            tag,
            side,
            quantity,
            last,
            instruction.notional()
        );
        Decision::Trade(instruction)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rust_decimal_macros::dec;
    use sentinel_analytics::AnalyticsConfig;
    use sentinel_core::{BookSide, InstrumentHandle, PositionSide};
    use sentinel_market_data::{InstrumentNormalizer, MarketDataConfig};
    use sentinel_risk_manager::{CircuitBreakerStatus, CircuitBreakerThresholds};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 15, 0, 0).unwrap()
    }

    struct Fixture {
        normalizer: InstrumentNormalizer,
        risk: RiskContext,
    }

    impl Fixture {
        fn new() -> Self {
            let mut normalizer =
                InstrumentNormalizer::new("AAPL", InstrumentHandle(3), MarketDataConfig::default());
            normalizer.seed_previous_close(dec!(100));
            normalizer.apply_depth(BookSide::Bid, 0, 0, dec!(99.99), dec!(1000));
            normalizer.apply_depth(BookSide::Ask, 0, 0, dec!(100.01), dec!(1000));
            Self {
                normalizer,
                risk: RiskContext::new("AAPL", &AnalyticsConfig::default(), CircuitBreakerThresholds::default()),
            }
        }

        fn trade(&mut self, price: Decimal) {
            self.normalizer.apply_trade(price, dec!(100), now());
            self.risk.on_trade(price, dec!(100));
            self.risk.update_breaker(&self.normalizer.snapshot());
        }
    }

    fn cascade() -> DecisionCascade {
        DecisionCascade::new(Arc::new(RiskEngine::default()), ExitPolicy::default())
    }

    fn input<'a>(snapshot: &'a MarketSnapshot, risk: &'a RiskContext) -> CascadeInput<'a> {
        CascadeInput {
            snapshot,
            risk,
            position: None,
            exit_pending: false,
            entry_pending: false,
            entered_today: false,
            breakout: None,
            composite: None,
            sector: None,
            now: now(),
        }
    }

    fn breakout(side: Side) -> Option<Signal> {
        Some(Signal::new(side, InstructionTag::OpeningRangeBreakout, "breakout"))
    }

    #[test]
    fn test_hold_by_default() {
        let mut f = Fixture::new();
        f.trade(dec!(100.5));
        let snapshot = f.normalizer.snapshot();
        assert_eq!(cascade().decide(input(&snapshot, &f.risk)), Decision::Hold);
    }

    #[test]
    fn test_breakout_beats_composite() {
        let mut f = Fixture::new();
        f.trade(dec!(100));
        f.trade(dec!(101));
        let snapshot = f.normalizer.snapshot();

        let decision = cascade().decide(CascadeInput {
            breakout: breakout(Side::Buy),
            composite: Some(Side::Sell),
            ..input(&snapshot, &f.risk)
        });
        let instruction = decision.instruction().unwrap();
        assert_eq!(instruction.tag, InstructionTag::OpeningRangeBreakout);
        assert_eq!(instruction.side, Side::Buy);
        // σ 0.5, liquidity 1 → 1000 / 0.5
        assert_eq!(instruction.quantity, dec!(2000));
        assert_eq!(instruction.reference_price, dec!(101));
    }

    #[test]
    fn test_composite_sector_gate() {
        let mut f = Fixture::new();
        f.trade(dec!(100));
        f.trade(dec!(101));
        let snapshot = f.normalizer.snapshot();
        let cascade = cascade();

        let lagging = cascade.decide(CascadeInput {
            composite: Some(Side::Buy),
            sector: Some(RelativeStrength::Neutral),
            ..input(&snapshot, &f.risk)
        });
        assert!(matches!(lagging, Decision::Suppressed { side: Side::Buy, .. }));

        let leading = cascade.decide(CascadeInput {
            composite: Some(Side::Buy),
            sector: Some(RelativeStrength::Outperform),
            ..input(&snapshot, &f.risk)
        });
        assert_eq!(leading.instruction().map(|i| i.tag), Some(InstructionTag::Composite));

        // No sector data: neutral gate
        let unknown = cascade.decide(CascadeInput {
            composite: Some(Side::Buy),
            ..input(&snapshot, &f.risk)
        });
        assert!(unknown.instruction().is_some());
    }

    #[test]
    fn test_level1_disables_composite_only() {
        let mut f = Fixture::new();
        f.trade(dec!(108));
        assert_eq!(f.risk.status(), CircuitBreakerStatus::Level1);
        let snapshot = f.normalizer.snapshot();
        let cascade = cascade();

        let composite = cascade.decide(CascadeInput {
            composite: Some(Side::Buy),
            ..input(&snapshot, &f.risk)
        });
        assert!(matches!(composite, Decision::Suppressed { .. }));

        let orb = cascade.decide(CascadeInput {
            breakout: breakout(Side::Buy),
            ..input(&snapshot, &f.risk)
        });
        assert!(orb.instruction().is_some());
    }

    #[test]
    fn test_halt_blocks_entries() {
        let mut f = Fixture::new();
        f.trade(dec!(125));
        let snapshot = f.normalizer.snapshot();
        let decision = cascade().decide(CascadeInput {
            breakout: breakout(Side::Buy),
            ..input(&snapshot, &f.risk)
        });
        assert_eq!(decision, Decision::Halt);
    }

    #[test]
    fn test_no_pyramiding() {
        let mut f = Fixture::new();
        f.trade(dec!(100));
        let snapshot = f.normalizer.snapshot();
        let position = Position::new("AAPL", PositionSide::Long, dec!(100), dec!(50), dec!(0.02), now());

        let decision = cascade().decide(CascadeInput {
            breakout: breakout(Side::Buy),
            position: Some(&position),
            ..input(&snapshot, &f.risk)
        });
        assert!(matches!(decision, Decision::Suppressed { side: Side::Buy, .. }));
    }

    #[test]
    fn test_one_entry_per_day() {
        let mut f = Fixture::new();
        f.trade(dec!(100));
        f.trade(dec!(101));
        let snapshot = f.normalizer.snapshot();
        let cascade = cascade();

        for (breakout, composite) in [(breakout(Side::Buy), None), (None, Some(Side::Sell))] {
            let decision = cascade.decide(CascadeInput {
                breakout,
                composite,
                entered_today: true,
                ..input(&snapshot, &f.risk)
            });
            assert!(matches!(
                decision,
                Decision::Suppressed {
                    reason: "daily entry already taken",
                    ..
                }
            ));
        }
    }

    #[test]
    fn test_latch_does_not_block_exits() {
        let mut f = Fixture::new();
        f.trade(dec!(97));
        let snapshot = f.normalizer.snapshot();
        let position = Position::new("AAPL", PositionSide::Long, dec!(100), dec!(50), dec!(0.02), now());

        let exit = cascade().decide(CascadeInput {
            position: Some(&position),
            entered_today: true,
            ..input(&snapshot, &f.risk)
        });
        assert_eq!(exit.instruction().map(|i| i.tag), Some(InstructionTag::StopLoss));
    }

    #[test]
    fn test_exit_emitted_once() {
        let mut f = Fixture::new();
        f.trade(dec!(97));
        let snapshot = f.normalizer.snapshot();
        let position = Position::new("AAPL", PositionSide::Long, dec!(100), dec!(50), dec!(0.02), now());
        let cascade = cascade();

        let exit = cascade.decide(CascadeInput {
            position: Some(&position),
            ..input(&snapshot, &f.risk)
        });
        let instruction = exit.instruction().unwrap();
        assert_eq!(instruction.tag, InstructionTag::StopLoss);
        assert_eq!(instruction.side, Side::Sell);
        assert_eq!(instruction.quantity, dec!(50));

        let again = cascade.decide(CascadeInput {
            position: Some(&position),
            exit_pending: true,
            ..input(&snapshot, &f.risk)
        });
        assert!(matches!(again, Decision::Suppressed { .. }));
    }

    #[test]
    fn test_risk_veto_is_terminal() {
        let mut f = Fixture::new();
        f.trade(dec!(100));
        // Quote gap of 3%
        f.normalizer.apply_field(2, dec!(103));
        f.normalizer.apply_field(1, dec!(100));
        let snapshot = f.normalizer.snapshot();

        let decision = cascade().decide(CascadeInput {
            breakout: breakout(Side::Buy),
            ..input(&snapshot, &f.risk)
        });
        assert_eq!(
            decision,
            Decision::Vetoed {
                side: Side::Buy,
                reason: RejectReason::SpreadTooWide
            }
        );
        assert!(decision.is_veto());
    }
}
