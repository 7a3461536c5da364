//! Positional depth ladder
//!
//! The feed addresses book levels by position, not by price: Insert shifts
//! later rows down, Update replaces in place, Delete removes and shifts up.
//! After every operation the side is re-sorted (bids descending, asks
//! ascending) and truncated to the configured depth.

use rust_decimal::Decimal;
use sentinel_core::{BookSide, PriceLevel};
use sentinel_gateway::DepthOp;

/// Result of one depth operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DepthOutcome {
    Applied,
    /// Update or insert past the end of the ladder, applied as an append
    AppendedOutOfRange,
    /// Operation discarded as malformed
    Discarded(&'static str),
}

impl DepthOutcome {
    /// Whether the ladder changed
    pub fn changed(&self) -> bool {
        !matches!(self, Self::Discarded(_))
    }

    pub fn is_anomaly(&self) -> bool {
        !matches!(self, Self::Applied)
    }
}

/// Bid and ask ladders for one instrument
#[derive(Debug, Clone)]
pub struct DepthLadder {
    bids: Vec<PriceLevel>,
    asks: Vec<PriceLevel>,
    max_levels: usize,
}

impl DepthLadder {
    pub fn new(max_levels: usize) -> Self {
        Self {
            bids: Vec::with_capacity(max_levels + 1),
            asks: Vec::with_capacity(max_levels + 1),
            max_levels,
        }
    }

    /// Apply one positional operation
    pub fn apply(
        &mut self,
        side: BookSide,
        position: usize,
        op: DepthOp,
        price: Decimal,
        size: Decimal,
    ) -> DepthOutcome {
        let max_levels = self.max_levels;
        let levels = self.side_mut(side);

        let outcome = match op {
            DepthOp::Insert | DepthOp::Update if price <= Decimal::ZERO => {
                return DepthOutcome::Discarded("non-positive price");
            }
            DepthOp::Insert | DepthOp::Update if size <= Decimal::ZERO => {
                return DepthOutcome::Discarded("non-positive size");
            }
            DepthOp::Insert => {
                let level = PriceLevel::new(price, size);
                if position <= levels.len() {
                    levels.insert(position, level);
                    DepthOutcome::Applied
                } else {
                    levels.push(level);
                    DepthOutcome::AppendedOutOfRange
                }
            }
            DepthOp::Update => {
                let level = PriceLevel::new(price, size);
                match levels.get_mut(position) {
                    Some(existing) => {
                        *existing = level;
                        DepthOutcome::Applied
                    }
                    None => {
                        levels.push(level);
                        DepthOutcome::AppendedOutOfRange
                    }
                }
            }
            DepthOp::Delete => {
                if position < levels.len() {
                    levels.remove(position);
                    DepthOutcome::Applied
                } else {
                    return DepthOutcome::Discarded("delete past end of ladder");
                }
            }
        };

        match side {
            BookSide::Bid => levels.sort_by(|a, b| b.price.cmp(&a.price)),
            BookSide::Ask => levels.sort_by(|a, b| a.price.cmp(&b.price)),
        }
        levels.truncate(max_levels);
        outcome
    }

    fn side_mut(&mut self, side: BookSide) -> &mut Vec<PriceLevel> {
        match side {
            BookSide::Bid => &mut self.bids,
            BookSide::Ask => &mut self.asks,
        }
    }

    pub fn levels(&self, side: BookSide) -> &[PriceLevel] {
        match side {
            BookSide::Bid => &self.bids,
            BookSide::Ask => &self.asks,
        }
    }

    /// First `n` levels of one side
    pub fn top(&self, side: BookSide, n: usize) -> Vec<PriceLevel> {
        self.levels(side).iter().take(n).copied().collect()
    }

    pub fn best_bid(&self) -> Option<PriceLevel> {
        self.bids.first().copied()
    }

    pub fn best_ask(&self) -> Option<PriceLevel> {
        self.asks.first().copied()
    }

    /// Total size over the first `n` levels of one side
    pub fn total_size(&self, side: BookSide, n: usize) -> Decimal {
        self.levels(side).iter().take(n).map(|l| l.size).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.bids.is_empty() && self.asks.is_empty()
    }

    pub fn max_levels(&self) -> usize {
        self.max_levels
    }

    pub fn clear(&mut self) {
        self.bids.clear();
        self.asks.clear();
    }
}
