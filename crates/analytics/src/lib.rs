//! Sentinel Analytics
//!
//! Fixed-window incremental statistics shared by the strategy and risk
//! layers. Every analyzer updates in O(1): push the new sample, evict the
//! oldest when full, and adjust the running aggregates. Queries are pure
//! functions of the current window.
//!
//! | Analyzer | Window | Query |
//! |----------|--------|-------|
//! | [`VolatilityAnalyzer`] | 20 trade prices | population std dev |
//! | [`VolumeSpikeDetector`] | 20 non-zero trade sizes | size > SMA × 2.5 |
//! | [`RollingVwap`] | 50 samples | price above/below VWAP ± 0.5% |
//! | [`SectorStrength`] | damped average per sector | >0.5% differential |
//! | [`IntervalVolumeProjector`] | one interval | projected volume > ADV × 2 |

pub mod config;
pub mod liquidity;
pub mod projection;
pub mod sector;
pub mod volatility;
pub mod volume;
pub mod vwap;
pub mod window;

pub use config::AnalyticsConfig;
pub use liquidity::{imbalance_ratio, liquidity_score};
pub use projection::IntervalVolumeProjector;
pub use sector::{RelativeStrength, SectorStrength};
pub use volatility::VolatilityAnalyzer;
pub use volume::VolumeSpikeDetector;
pub use vwap::RollingVwap;
pub use window::RollingWindow;
