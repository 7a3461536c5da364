//! Pre-trade validation and position sizing
//!
//! ```text
//!  candidate side ──► validate ──► Accept ──► max_position_size ──► quantity
//!                        │
//!                        └──► Reject(reason)   terminal for the tick
//! ```
//!
//! Sizing: `base × 1/max(ε, σ) × liquidity × breaker multiplier × side
//! reduction`, floored to whole shares and capped by the exposure limit.

use crate::availability::{ShortAvailability, VolumeDecayAvailability};
use crate::config::{RiskConfig, SpreadCheck};
use crate::context::RiskContext;
use log::{debug, info};
use rust_decimal::Decimal;
use sentinel_analytics::liquidity_score;
use sentinel_core::Side;
use sentinel_market_data::MarketSnapshot;
use std::fmt;
use std::sync::Arc;

/// Why a candidate was vetoed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    CircuitBreakerHalted,
    NoLastPrice,
    SpreadTooWide,
    VolatilityTooHigh,
    /// Circuit breaker level forbids new shorts
    ShortSaleProhibited,
    ShortSaleIneligible,
    ZeroSize,
}

impl RejectReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CircuitBreakerHalted => "circuit breaker halted",
            Self::NoLastPrice => "no last price",
            Self::SpreadTooWide => "spread too wide",
            Self::VolatilityTooHigh => "volatility too high",
            Self::ShortSaleProhibited => "short selling prohibited at breaker level",
            Self::ShortSaleIneligible => "short sale ineligible",
            Self::ZeroSize => "position size rounds to zero",
        }
    }
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RiskVerdict {
    Accept,
    Reject(RejectReason),
}

impl RiskVerdict {
    pub fn is_accept(&self) -> bool {
        matches!(self, Self::Accept)
    }
}

/// Stateless checks over an instrument's snapshot and risk context.
/// Shared by every instrument worker.
pub struct RiskEngine {
    config: RiskConfig,
    availability: Arc<dyn ShortAvailability>,
}

impl RiskEngine {
    pub fn new(config: RiskConfig) -> Self {
        Self::with_availability(config, Arc::new(VolumeDecayAvailability::default()))
    }

    pub fn with_availability(config: RiskConfig, availability: Arc<dyn ShortAvailability>) -> Self {
        Self {
            config,
            availability,
        }
    }

    pub fn config(&self) -> &RiskConfig {
        &self.config
    }

    /// Veto checks for a new entry in direction `side` (Sell opens a short)
    pub fn validate(&self, side: Side, snapshot: &MarketSnapshot, ctx: &RiskContext) -> RiskVerdict {
        let verdict = self.check(side, snapshot, ctx);
        if let RiskVerdict::Reject(reason) = verdict {
            info!("[RISK] {} {} rejected: {}", snapshot.symbol, side, reason);
        }
        verdict
    }

    fn check(&self, side: Side, snapshot: &MarketSnapshot, ctx: &RiskContext) -> RiskVerdict {
        let status = ctx.status();
        if status.blocks_all() {
            return RiskVerdict::Reject(RejectReason::CircuitBreakerHalted);
        }
        let Some(last) = snapshot.last_price.filter(|p| *p > Decimal::ZERO) else {
            return RiskVerdict::Reject(RejectReason::NoLastPrice);
        };

        if !self.spread_acceptable(snapshot, last) {
            return RiskVerdict::Reject(RejectReason::SpreadTooWide);
        }

        if let Some(volatility) = ctx.volatility()
            && volatility > last * self.config.max_volatility_pct
        {
            return RiskVerdict::Reject(RejectReason::VolatilityTooHigh);
        }

        if side == Side::Sell {
            if !status.allows_short_selling() {
                return RiskVerdict::Reject(RejectReason::ShortSaleProhibited);
            }
            if !self.validate_short_sell(snapshot) {
                return RiskVerdict::Reject(RejectReason::ShortSaleIneligible);
            }
        }

        RiskVerdict::Accept
    }

    fn spread_acceptable(&self, snapshot: &MarketSnapshot, last: Decimal) -> bool {
        let limit = last * self.config.max_spread_pct;
        match self.config.spread_check {
            SpreadCheck::QuotedSpread => match snapshot.spread() {
                Some(spread) => spread <= limit,
                // One-sided or no quote: nothing to measure
                None => true,
            },
            SpreadCheck::ImbalanceProxy => {
                (snapshot.total_bid_size() - snapshot.total_ask_size()).abs() <= limit
            }
        }
    }

    /// Short entry needs an up move from the previous close and a borrowable name
    pub fn validate_short_sell(&self, snapshot: &MarketSnapshot) -> bool {
        let (Some(last), Some(reference)) = (snapshot.last_price, snapshot.prev_close.or(snapshot.open))
        else {
            debug!("[RISK] {} no reference price for short sale", snapshot.symbol);
            return false;
        };
        let score = self.availability.score(snapshot);
        last > reference && score > self.config.short_availability_threshold
    }

    /// Whole-share size for a new entry
    pub fn max_position_size(&self, side: Side, snapshot: &MarketSnapshot, ctx: &RiskContext) -> Decimal {
        let liquidity = liquidity_score(
            &snapshot.bids,
            &snapshot.asks,
            self.config.liquidity_reference_size,
        );
        let size = self.size_from(
            side,
            ctx.volatility().unwrap_or(Decimal::ZERO),
            liquidity,
            ctx.status().size_multiplier(),
        );
        debug!(
            "[RISK] {} {} size {} (σ={:?} liquidity={} breaker={})",
            snapshot.symbol,
            side,
            size,
            ctx.volatility(),
            liquidity,
            ctx.status()
        );
        size
    }

    /// Short entries already carry the side reduction
    pub fn max_short_size(&self, snapshot: &MarketSnapshot, ctx: &RiskContext) -> Decimal {
        self.max_position_size(Side::Sell, snapshot, ctx)
    }

    /// Sizing formula on explicit inputs
    pub fn size_from(
        &self,
        side: Side,
        volatility: Decimal,
        liquidity: Decimal,
        breaker_multiplier: Decimal,
    ) -> Decimal {
        let floor = self.config.min_volatility.max(Decimal::new(1, 28));
        let side_reduction = match side {
            Side::Buy => Decimal::ONE,
            Side::Sell => self.config.short_size_reduction,
        };
        let raw = self.config.base_size / volatility.max(floor)
            * liquidity
            * breaker_multiplier
            * side_reduction;
        let sized = raw.floor().max(Decimal::ZERO);
        match self.config.max_position_quantity {
            Some(cap) => sized.min(cap),
            None => sized,
        }
    }
}

impl Default for RiskEngine {
    fn default() -> Self {
        Self::new(RiskConfig::default())
    }
}
