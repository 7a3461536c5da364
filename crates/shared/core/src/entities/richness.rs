use serde::{Deserialize, Serialize};

/// Completeness tier of the data seen for an instrument this session.
///
/// Ordered so that `max` gives the advance rule: the level only moves up.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
pub enum Richness {
    #[default]
    None,
    TradeOnly,
    Quote,
    FullDepth,
}

impl Richness {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::TradeOnly => "trade_only",
            Self::Quote => "quote",
            Self::FullDepth => "full_depth",
        }
    }
}
