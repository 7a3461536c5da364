mod bar;
mod book;
mod handle;
mod position;
mod reference;
mod richness;
mod side;

pub use bar::Bar;
pub use book::{BookSide, PriceLevel};
pub use handle::InstrumentHandle;
pub use position::{Position, PositionSide};
pub use reference::PreviousDay;
pub use richness::Richness;
pub use side::Side;
