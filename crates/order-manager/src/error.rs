//! Order Manager errors

use thiserror::Error;
use uuid::Uuid;

#[derive(Error, Debug, PartialEq)]
pub enum Error {
    #[error("Unknown instruction: {0}")]
    UnknownInstruction(Uuid),

    #[error("Report for {got} routed to the {expected} book")]
    InstrumentMismatch { expected: String, got: String },

    #[error("Filled report without fill details: {0}")]
    MissingFill(Uuid),
}

pub type Result<T> = std::result::Result<T, Error>;
