//! Sentinel Core Domain
//!
//! Pure domain types shared by every stage of the pipeline.
//! This crate contains no async, no I/O, and is 100% unit testable.

pub mod entities;
pub mod values;

// Re-export commonly used types at crate root
pub use entities::{
    Bar, BookSide, InstrumentHandle, Position, PositionSide, PreviousDay, PriceLevel, Richness,
    Side,
};
pub use values::{Price, Quantity, Symbol, Timestamp, minute_floor};
