use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Position side - long (bought) or short (sold)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PositionSide {
    /// Long position - profit when price rises
    Long,
    /// Short position - profit when price falls
    Short,
}

/// An open position in one instrument
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Position {
    /// Instrument being traded
    pub instrument_id: String,

    /// Position side (long/short)
    pub side: PositionSide,

    /// Average entry price
    pub entry_price: Decimal,

    /// Current position quantity (always positive)
    pub quantity: Decimal,

    /// Volatility snapshotted when the position was opened.
    /// Used for the life of the position to place stop/target bands.
    pub volatility_at_entry: Decimal,

    /// Realized profit/loss from closed portions
    pub realized_pnl: Decimal,

    /// When the position was opened
    pub opened_at: DateTime<Utc>,
}

impl Position {
    /// Create a new position
    pub fn new(
        instrument_id: impl Into<String>,
        side: PositionSide,
        entry_price: Decimal,
        quantity: Decimal,
        volatility_at_entry: Decimal,
        opened_at: DateTime<Utc>,
    ) -> Self {
        Self {
            instrument_id: instrument_id.into(),
            side,
            entry_price,
            quantity,
            volatility_at_entry,
            realized_pnl: Decimal::ZERO,
            opened_at,
        }
    }

    /// Price return relative to entry: (price - entry) / entry
    pub fn return_at(&self, price: Decimal) -> Option<Decimal> {
        if self.entry_price.is_zero() {
            return None;
        }
        Some((price - self.entry_price) / self.entry_price)
    }

    /// Unrealized P&L at the given mark price
    pub fn unrealized_pnl(&self, mark_price: Decimal) -> Decimal {
        let price_diff = mark_price - self.entry_price;
        match self.side {
            PositionSide::Long => self.quantity * price_diff,
            PositionSide::Short => self.quantity * -price_diff,
        }
    }

    /// Add to the position, re-averaging the entry price
    pub fn increase(&mut self, quantity: Decimal, price: Decimal) {
        let old_notional = self.quantity * self.entry_price;
        let new_notional = quantity * price;
        let total_quantity = self.quantity + quantity;

        if total_quantity > Decimal::ZERO {
            self.entry_price = (old_notional + new_notional) / total_quantity;
        }
        self.quantity = total_quantity;
    }

    /// Reduce the position, returning the realized P&L of the reduction.
    /// The reduction is capped at the open quantity.
    pub fn decrease(&mut self, quantity: Decimal, price: Decimal) -> Decimal {
        let close_qty = quantity.min(self.quantity);
        let pnl = match self.side {
            PositionSide::Long => close_qty * (price - self.entry_price),
            PositionSide::Short => close_qty * (self.entry_price - price),
        };
        self.quantity -= close_qty;
        self.realized_pnl += pnl;
        pnl
    }

    pub fn is_closed(&self) -> bool {
        self.quantity <= Decimal::ZERO
    }
}
