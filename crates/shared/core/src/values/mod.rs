use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

/// Price value - uses Decimal for precision
pub type Price = Decimal;

/// Quantity value - uses Decimal for precision
pub type Quantity = Decimal;

/// Timestamp in UTC
pub type Timestamp = DateTime<Utc>;

/// Stable symbol identifier for a tradeable instrument
pub type Symbol = String;

/// Truncate a timestamp to the start of its minute
pub fn minute_floor(ts: Timestamp) -> Timestamp {
    let secs = ts.timestamp();
    DateTime::from_timestamp(secs - secs.rem_euclid(60), 0).unwrap_or(ts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_minute_floor() {
        let ts = Utc.with_ymd_and_hms(2024, 3, 1, 9, 30, 45).unwrap();
        let floored = minute_floor(ts);
        assert_eq!(floored, Utc.with_ymd_and_hms(2024, 3, 1, 9, 30, 0).unwrap());
        assert_eq!(minute_floor(floored), floored);
    }
}
