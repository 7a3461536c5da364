//! Book-derived liquidity measures

use rust_decimal::Decimal;
use sentinel_core::PriceLevel;

/// `min(1, average size per populated level / reference)`; 0 for an empty book
pub fn liquidity_score(bids: &[PriceLevel], asks: &[PriceLevel], reference: Decimal) -> Decimal {
    let populated: Vec<&PriceLevel> = bids
        .iter()
        .chain(asks.iter())
        .filter(|l| l.size > Decimal::ZERO)
        .collect();
    if populated.is_empty() || reference <= Decimal::ZERO {
        return Decimal::ZERO;
    }

    let total: Decimal = populated.iter().map(|l| l.size).sum();
    let average = total / Decimal::from(populated.len());
    (average / reference).min(Decimal::ONE)
}

/// Σ bid size / Σ ask size over the given levels
pub fn imbalance_ratio(bids: &[PriceLevel], asks: &[PriceLevel]) -> Option<Decimal> {
    let bid_total: Decimal = bids.iter().map(|l| l.size).sum();
    let ask_total: Decimal = asks.iter().map(|l| l.size).sum();
    if ask_total <= Decimal::ZERO {
        return None;
    }
    Some(bid_total / ask_total)
}
