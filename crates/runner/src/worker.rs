//! Per-instrument worker
//!
//! Owns every piece of mutable state for one instrument and runs the
//! synchronous pipeline for it:
//!
//! ```text
//! FeedEvent ──► normalizer ──► trade print ──► risk windows, VWAP,
//!                   │                          volume projection, sector
//!                   │
//!                   ├─► sealed bar ──► ORB ──► breakout
//!                   │
//!                   └─► snapshot ──► breaker ──► DecisionCascade ──► Decision
//! ```
//!
//! The engine keeps each worker behind its own mutex, so two updates for
//! the same instrument never interleave while different instruments run
//! independently.

use crate::config::EngineConfig;
use log::{debug, info, warn};
use rust_decimal::Decimal;
use sentinel_analytics::{
    IntervalVolumeProjector, RelativeStrength, RollingVwap, SectorStrength, imbalance_ratio,
};
use sentinel_core::{Bar, InstrumentHandle, PreviousDay, Symbol, Timestamp};
use sentinel_gateway::{ExecutionReport, FeedEvent, TickRecord};
use sentinel_market_data::{InstrumentNormalizer, MarketSnapshot};
use sentinel_order_manager::{CascadeInput, Decision, DecisionCascade, PositionBook, PositionEvent};
use sentinel_risk_manager::RiskContext;
use sentinel_strategy::{
    BarContext, BarStrategy, OpeningRangeBreakout, SessionContext, Signal, composite_candidate,
};

/// Shared services a worker reads while processing one event
pub struct WorkerContext<'a> {
    pub cascade: &'a DecisionCascade,
    pub sectors: &'a SectorStrength,
    pub benchmark: Option<&'a str>,
    /// Fallback time for events that carry none
    pub now: Timestamp,
}

/// Result of one feed event
#[derive(Debug)]
pub struct FeedOutcome {
    pub applied: bool,
    pub anomaly: bool,
    /// Audit record of the normalized tick, when the event was applied
    pub tick: Option<TickRecord>,
    pub decision: Option<Decision>,
}

pub struct InstrumentWorker {
    symbol: Symbol,
    normalizer: InstrumentNormalizer,
    risk: RiskContext,
    orb: OpeningRangeBreakout,
    vwap: RollingVwap,
    projector: IntervalVolumeProjector,
    book: PositionBook,
    previous_day: PreviousDay,
    warned_sector: bool,
    warned_halt: bool,
}

impl InstrumentWorker {
    pub fn new(symbol: impl Into<Symbol>, handle: InstrumentHandle, config: &EngineConfig) -> Self {
        let symbol = symbol.into();
        let analytics = &config.analytics;
        Self {
            normalizer: InstrumentNormalizer::new(symbol.clone(), handle, config.market_data.clone()),
            risk: RiskContext::new(
                symbol.clone(),
                analytics,
                config.risk.circuit_breaker.clone(),
            ),
            orb: OpeningRangeBreakout::new(symbol.clone(), config.orb.clone()),
            vwap: RollingVwap::new(analytics.vwap_window, analytics.vwap_buffer),
            projector: IntervalVolumeProjector::new(
                analytics.intervals_per_day,
                analytics.daily_volume_multiple,
            ),
            book: PositionBook::new(symbol.clone()),
            previous_day: PreviousDay::default(),
            warned_sector: false,
            warned_halt: false,
            symbol,
        }
    }

    /// Run one feed event through the pipeline
    pub fn on_feed(&mut self, event: &FeedEvent, ctx: &WorkerContext<'_>) -> FeedOutcome {
        let outcome = self.normalizer.apply(event);
        if !outcome.applied {
            return FeedOutcome {
                applied: false,
                anomaly: outcome.anomaly,
                tick: None,
                decision: None,
            };
        }

        let snapshot = self.normalizer.snapshot();

        let mut trade_spike = false;
        let mut projection_spike = false;
        if let Some(print) = &outcome.trade {
            trade_spike = self.risk.on_trade(print.price, print.size);
            let time = print.time.unwrap_or(ctx.now);
            projection_spike = self.projector.observe(&self.symbol, time, print.size);
            self.vwap.observe(print.price, snapshot.day_volume);
            self.update_sector(&snapshot, ctx.sectors);
        }
        self.risk.update_breaker(&snapshot);

        let breakout = outcome
            .sealed_bar
            .as_ref()
            .and_then(|bar| self.run_breakout(bar, &snapshot));

        let composite = match (&outcome.trade, snapshot.last_price) {
            (Some(_), Some(price)) => {
                composite_candidate(price, &self.vwap, trade_spike, projection_spike)
            }
            _ => None,
        };

        let sector = if composite.is_some() {
            self.relative_strength(ctx.sectors, ctx.benchmark)
        } else {
            None
        };

        let now = snapshot.last_time.unwrap_or(ctx.now);

        // Bar-only feeds have no trade print yet; the sealed bar's close
        // stands in so a breakout is still decided
        let bar_priced = match (&snapshot.last_price, &breakout, &outcome.sealed_bar) {
            (None, Some(_), Some(bar)) => {
                debug!("[WORKER] {} no trade yet, pricing breakout at bar close {}", self.symbol, bar.close);
                Some(MarketSnapshot {
                    last_price: Some(bar.close),
                    ..snapshot.clone()
                })
            }
            _ => None,
        };
        let priced = bar_priced.as_ref().unwrap_or(&snapshot);

        let decision = if priced.last_price.is_some() {
            let decision = ctx.cascade.decide(CascadeInput {
                snapshot: priced,
                risk: &self.risk,
                position: self.book.position(),
                exit_pending: self.book.has_pending_exit(),
                entry_pending: self.book.has_pending_entry(),
                entered_today: self.book.entered_today(),
                breakout,
                composite,
                sector,
                now,
            });
            match &decision {
                Decision::Trade(instruction) => {
                    let volatility = self.risk.volatility().unwrap_or(Decimal::ZERO);
                    self.book.register(instruction, volatility);
                }
                Decision::Halt if !self.warned_halt => {
                    warn!(
                        "[WORKER] {} circuit breaker halted, no entries until the next session",
                        self.symbol
                    );
                    self.warned_halt = true;
                }
                _ => {}
            }
            Some(decision)
        } else {
            None
        };

        FeedOutcome {
            applied: true,
            anomaly: outcome.anomaly,
            tick: Some(snapshot.to_tick_record(now)),
            decision,
        }
    }

    fn run_breakout(&mut self, bar: &Bar, snapshot: &MarketSnapshot) -> Option<Signal> {
        // History ends with the bar that was just sealed
        let history = self.normalizer.state().bars.history();
        let earlier = history.len().saturating_sub(1);
        let recent: Vec<Bar> = history.iter().take(earlier).cloned().collect();
        let ctx = BarContext {
            recent: &recent,
            imbalance_ratio: imbalance_ratio(&snapshot.bids, &snapshot.asks),
        };
        self.orb.on_bar(bar, &ctx)
    }

    fn update_sector(&self, snapshot: &MarketSnapshot, sectors: &SectorStrength) {
        let Some(sector) = self.previous_day.sector.as_deref() else {
            return;
        };
        // Signed return against the same reference the breaker uses
        let reference = snapshot
            .prev_close
            .or(snapshot.open)
            .or(snapshot.first_trade)
            .filter(|r| *r > Decimal::ZERO);
        if let (Some(last), Some(reference)) = (snapshot.last_price, reference) {
            sectors.update(sector, (last - reference) / reference);
        }
    }

    fn relative_strength(
        &mut self,
        sectors: &SectorStrength,
        benchmark: Option<&str>,
    ) -> Option<RelativeStrength> {
        let relative = match (self.previous_day.sector.as_deref(), benchmark) {
            (Some(sector), Some(benchmark)) => sectors.relative(sector, benchmark),
            _ => None,
        };
        if relative.is_none() && !self.warned_sector {
            warn!(
                "[WORKER] {} has no sector comparison available, sector filter neutral",
                self.symbol
            );
            self.warned_sector = true;
        }
        relative
    }

    /// Start a new trading day. Runs under the session barrier.
    pub fn start_session(&mut self, previous_day: Option<&PreviousDay>, session_open: Option<Timestamp>) {
        let previous_day = match previous_day {
            Some(p) => p.clone(),
            None => {
                warn!("[WORKER] {} has no previous-day reference data", self.symbol);
                PreviousDay::default()
            }
        };

        self.normalizer.reset_session();
        if let Some(close) = previous_day.close {
            self.normalizer.seed_previous_close(close);
        }
        self.risk.reset_session();
        self.vwap.clear();
        self.projector.reset();
        self.projector.set_avg_daily_volume(previous_day.avg_daily_volume);
        self.orb.reset_session(&SessionContext {
            previous_day: previous_day.clone(),
            session_open,
            session_open_price: None,
        });
        self.book.start_session();
        self.previous_day = previous_day;
        self.warned_sector = false;
        self.warned_halt = false;
        debug!("[WORKER] {} session reset", self.symbol);
    }

    /// The opening-range window was declared over
    pub fn on_range_elapsed(&mut self) {
        self.orb.on_range_elapsed();
    }

    /// Apply an execution report to the position book
    pub fn on_report(&mut self, report: &ExecutionReport) -> sentinel_order_manager::Result<PositionEvent> {
        let event = self.book.on_report(report)?;
        if let PositionEvent::Closed { realized_pnl } = &event {
            info!(
                "[WORKER] {} round trip done, realized {} (session total {})",
                self.symbol,
                realized_pnl,
                self.book.realized_pnl()
            );
        }
        Ok(event)
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn snapshot(&self) -> MarketSnapshot {
        self.normalizer.snapshot()
    }

    pub fn book(&self) -> &PositionBook {
        &self.book
    }

    pub fn risk(&self) -> &RiskContext {
        &self.risk
    }

    pub fn orb(&self) -> &OpeningRangeBreakout {
        &self.orb
    }
}
