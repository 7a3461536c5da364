//! Session boundary events

use chrono::NaiveDate;
use sentinel_core::{PreviousDay, Symbol, Timestamp};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Instrument-set-wide session boundary.
///
/// The engine applies these as a barrier: every instrument is reset before
/// the next feed event is processed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SessionEvent {
    NewTradingDay {
        date: NaiveDate,
        /// Start of the regular session. When absent the first bar of the
        /// day anchors the opening-range window.
        #[serde(default)]
        session_open: Option<Timestamp>,
        /// Previous-day reference data keyed by symbol
        #[serde(default)]
        reference: HashMap<Symbol, PreviousDay>,
    },
    OpeningRangeElapsed,
}

impl SessionEvent {
    pub fn name(&self) -> &'static str {
        match self {
            Self::NewTradingDay { .. } => "new_trading_day",
            Self::OpeningRangeElapsed => "opening_range_elapsed",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_new_trading_day_from_json() {
        let json = r#"{
            "type": "new_trading_day",
            "date": "2024-03-01",
            "session_open": "2024-03-01T14:30:00Z",
            "reference": {
                "AAPL": {"high": "182.5", "low": "179.1", "close": "181.0", "sector": "tech"}
            }
        }"#;
        let event: SessionEvent = serde_json::from_str(json).unwrap();

        match event {
            SessionEvent::NewTradingDay {
                date,
                session_open,
                reference,
            } => {
                assert_eq!(date, NaiveDate::from_ymd_opt(2024, 3, 1).unwrap());
                assert!(session_open.is_some());
                let aapl = &reference["AAPL"];
                assert_eq!(aapl.high, Some(dec!(182.5)));
                assert_eq!(aapl.avg_daily_volume, None);
                assert_eq!(aapl.sector.as_deref(), Some("tech"));
            }
            other => panic!("unexpected event {:?}", other),
        }
    }

    #[test]
    fn test_opening_range_elapsed_from_json() {
        let event: SessionEvent =
            serde_json::from_str(r#"{"type":"opening_range_elapsed"}"#).unwrap();
        assert_eq!(event, SessionEvent::OpeningRangeElapsed);
        assert_eq!(event.name(), "opening_range_elapsed");
    }
}
