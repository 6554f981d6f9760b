use std::collections::TryReserveError;
use std::io;
use thiserror::Error;

/// The primary error type for the `divelink` library.
#[derive(Error, Debug)]
pub enum DcError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Protocol error: {0}")]
    Protocol(String),

    #[error("Data format error: {0}")]
    DataFormat(String),

    #[error("Out of memory: {0}")]
    NoMemory(#[from] TryReserveError),

    #[error("Unsupported: {0}")]
    Unsupported(String),
}

impl DcError {
    /// Shorthand for a bounds failure while decoding a dive buffer.
    pub(crate) fn out_of_bounds(what: &str, offset: usize, len: usize) -> Self {
        DcError::DataFormat(format!("{what} at offset {offset} is outside the {len} byte buffer"))
    }
}
