//! Error types for mailframe operations.
//!
//! The public rendering entry points never surface these: they recover
//! locally and log. They exist for the fallible steps underneath.

use thiserror::Error;

/// Errors that can occur while repairing, sanitizing or normalizing content.
#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Mojibake reversal failed: {0}")]
    Mojibake(String),

    #[error("Document unavailable: {0}")]
    DocumentUnavailable(String),

    #[error("Node {0} is detached from the document")]
    Detached(u32),

    #[error("Invalid selector: {0}")]
    Selector(String),
}

pub type Result<T> = std::result::Result<T, Error>;
