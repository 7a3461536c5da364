//! Normalizer invariants over long event sequences

use chrono::{DateTime, TimeZone, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use sentinel_core::{BookSide, InstrumentHandle, Richness};
use sentinel_gateway::FeedEvent;
use sentinel_market_data::{InstrumentNormalizer, MarketDataConfig};

const HANDLE: InstrumentHandle = InstrumentHandle(1);

/// Small deterministic generator so sequences are reproducible
struct Lcg(u64);

impl Lcg {
    fn next(&mut self) -> u64 {
        self.0 = self.0.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
        self.0 >> 33
    }

    fn below(&mut self, n: u64) -> u64 {
        self.next() % n
    }
}

fn at(h: u32, m: u32, s: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 1, h, m, s).unwrap()
}

fn random_event(rng: &mut Lcg) -> FeedEvent {
    let price = dec!(100) + Decimal::new(rng.below(200) as i64 - 100, 2);
    let size = Decimal::from(rng.below(500) as i64 - 20);
    match rng.below(4) {
        0 => FeedEvent::Field {
            handle: HANDLE,
            code: rng.below(60) as u16,
            value: price,
        },
        1 => FeedEvent::Trade {
            handle: HANDLE,
            price,
            size,
            time: at(14, 30, rng.below(60) as u32),
        },
        2 => FeedEvent::Depth {
            handle: HANDLE,
            side: if rng.below(2) == 0 { BookSide::Bid } else { BookSide::Ask },
            position: rng.below(25) as usize,
            op: rng.below(4) as u8,
            price,
            size,
        },
        _ => FeedEvent::BarSample {
            handle: HANDLE,
            window_start: at(14, 30 + rng.below(10) as u32, rng.below(60) as u32),
            open: price,
            high: price + dec!(0.05),
            low: price - dec!(0.05),
            close: price,
            volume: size,
            wap: price,
            count: 3,
        },
    }
}

#[test]
fn test_richness_is_monotone() {
    let _ = env_logger::try_init();
    let mut normalizer = InstrumentNormalizer::new("AAPL", HANDLE, MarketDataConfig::default());
    let mut rng = Lcg(7);
    let mut previous = Richness::None;

    for _ in 0..5_000 {
        normalizer.apply(&random_event(&mut rng));
        let current = normalizer.state().richness;
        assert!(current >= previous, "richness went from {:?} to {:?}", previous, current);
        previous = current;
    }
    assert_eq!(previous, Richness::FullDepth);

    // Trade-only traffic after full depth does not lower the level
    for i in 0..10 {
        normalizer.apply_trade(dec!(100) + Decimal::from(i), dec!(10), at(15, 0, i));
    }
    assert_eq!(normalizer.state().richness, Richness::FullDepth);
}

#[test]
fn test_depth_ladder_invariant() {
    let _ = env_logger::try_init();
    let config = MarketDataConfig::default();
    let mut normalizer = InstrumentNormalizer::new("MSFT", HANDLE, config.clone());
    let mut rng = Lcg(42);

    for _ in 0..10_000 {
        let side = if rng.below(2) == 0 { BookSide::Bid } else { BookSide::Ask };
        let price = dec!(400) + Decimal::new(rng.below(1000) as i64 - 500, 2);
        let size = Decimal::from(rng.below(1000) as i64 - 10);
        normalizer.apply_depth(side, rng.below(30) as usize, rng.below(3) as u8, price, size);

        let depth = &normalizer.state().depth;
        let snapshot = normalizer.snapshot();
        for (side, published) in [(BookSide::Bid, &snapshot.bids), (BookSide::Ask, &snapshot.asks)] {
            let levels = depth.levels(side);
            assert!(levels.len() <= config.max_depth_levels);
            assert!(levels.iter().all(|l| l.size > Decimal::ZERO));
            for pair in levels.windows(2) {
                match side {
                    BookSide::Bid => assert!(pair[0].price >= pair[1].price),
                    BookSide::Ask => assert!(pair[0].price <= pair[1].price),
                }
            }
            let expected: Vec<_> = levels.iter().take(config.published_levels).copied().collect();
            assert_eq!(published, &expected);
        }
    }
}

#[test]
fn test_bar_sealing() {
    let _ = env_logger::try_init();
    let mut normalizer = InstrumentNormalizer::new("AAPL", HANDLE, MarketDataConfig::default());

    let first = normalizer.apply_bar_sample(at(9, 30, 1), dec!(10), dec!(10), dec!(10), dec!(10), dec!(5), dec!(10));
    assert!(first.sealed_bar.is_none());

    let second = normalizer.apply_bar_sample(at(9, 30, 45), dec!(10), dec!(11), dec!(9), dec!(10.5), dec!(3), dec!(10.4));
    assert!(second.sealed_bar.is_none());

    let third = normalizer.apply_bar_sample(at(9, 31, 2), dec!(10.5), dec!(10.6), dec!(10.4), dec!(10.6), dec!(2), dec!(10.5));
    let bar = third.sealed_bar.expect("9:30 bar sealed on first 9:31 sample");

    assert_eq!(bar.start, at(9, 30, 0));
    assert_eq!(bar.open, dec!(10));
    assert_eq!(bar.high, dec!(11));
    assert_eq!(bar.low, dec!(9));
    assert_eq!(bar.close, dec!(10.5));
    assert_eq!(bar.volume, dec!(8));
    // (10×5 + 10.4×3) / 8
    assert_eq!(bar.vwap, (dec!(10) * dec!(5) + dec!(10.4) * dec!(3)) / dec!(8));
    assert_eq!(bar.vwap, dec!(10.15));

    assert_eq!(normalizer.state().bars.history().len(), 1);
    assert_eq!(normalizer.snapshot().last_bar, Some(bar));
}

#[test]
fn test_reset_session_clears_day_state() {
    let mut normalizer = InstrumentNormalizer::new("AAPL", HANDLE, MarketDataConfig::default());
    normalizer.apply_depth(BookSide::Bid, 0, 0, dec!(100), dec!(10));
    normalizer.apply_trade(dec!(100.1), dec!(10), at(14, 30, 0));
    normalizer.apply_bar_sample(at(14, 30, 0), dec!(100), dec!(100), dec!(100), dec!(100), dec!(1), dec!(100));
    assert_eq!(normalizer.state().richness, Richness::FullDepth);

    normalizer.reset_session();

    let snapshot = normalizer.snapshot();
    assert_eq!(snapshot.richness, Richness::None);
    assert!(snapshot.bids.is_empty());
    assert_eq!(snapshot.day_volume, Decimal::ZERO);
    assert!(normalizer.state().bars.forming().is_none());
}
