//! Volatility-scaled exits
//!
//! Bands are fixed at entry: the position carries the volatility observed
//! when it was opened, and the return since entry is compared against a
//! multiple of that figure.
//!
//! ```text
//!  LONG   r ≥ +1.5σ → TAKE_PROFIT     r ≤ −0.8σ → STOP_LOSS
//!  SHORT  r ≤ −1.2σ → TAKE_PROFIT     r ≥ +0.6σ → STOP_LOSS
//! ```

use crate::config::ExitPolicy;
use crate::signal::Signal;
use rust_decimal::Decimal;
use sentinel_core::{Position, PositionSide, Side};
use sentinel_gateway::InstructionTag;

/// Check an open position against its exit bands at `price`.
///
/// Returns the closing signal when a band is crossed. A position whose
/// entry volatility is zero or negative has no bands.
pub fn evaluate_exit(policy: &ExitPolicy, position: &Position, price: Decimal) -> Option<Signal> {
    let sigma = position.volatility_at_entry;
    if sigma <= Decimal::ZERO || position.is_closed() {
        return None;
    }
    let r = position.return_at(price)?;

    let tag = match position.side {
        PositionSide::Long if r >= policy.long_take_profit * sigma => InstructionTag::TakeProfit,
        PositionSide::Long if r <= -(policy.long_stop_loss * sigma) => InstructionTag::StopLoss,
        PositionSide::Short if r <= -(policy.short_take_profit * sigma) => {
            InstructionTag::TakeProfit
        }
        PositionSide::Short if r >= policy.short_stop_loss * sigma => InstructionTag::StopLoss,
        _ => return None,
    };

    let side = match position.side {
        PositionSide::Long => Side::Sell,
        PositionSide::Short => Side::Buy,
    };
    Some(Signal::new(
        side,
        tag,
        format!("{} at {} (return {:.4}, σ {})", tag, price, r, sigma),
    ))
}
