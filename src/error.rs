//! Error type for disassembly

use crate::script::ScriptError;
use std::{io, result};
use thiserror::Error;

/// Every failure that aborts a disassembly call.
///
/// Truncated instructions are not represented here: the driver recovers from
/// them locally by dumping the remaining bytes as data.
#[derive(Debug, Error)]
pub enum Error {
    /// Underlying cause of error is I/O related
    #[error("I/O error: {0}")]
    IoError(#[from] io::Error),

    /// Project file could not be parsed
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// A directive's textual form could not be decoded.
    #[error("Malformed directive {text:?}: {reason}")]
    MalformedDirective { text: String, reason: String },

    /// A data or pattern block program failed.
    #[error("{0}")]
    Script(#[from] ScriptError),

    /// The requested window does not fit inside the supplied buffer or the
    /// 16-bit address space.
    #[error("Window of {length} bytes at offset {offset} (origin {origin:04X}) does not fit a buffer of {available} bytes")]
    OutOfBounds {
        offset: usize,
        length: usize,
        origin: u16,
        available: usize,
    },
}

impl Error {
    pub fn malformed(text: &str, reason: &str) -> Self {
        Error::MalformedDirective {
            text: text.to_string(),
            reason: reason.to_string(),
        }
    }
}

impl From<Error> for io::Error {
    fn from(err: Error) -> io::Error {
        match err {
            Error::IoError(e) => e,
            Error::MalformedDirective { .. } => {
                io::Error::new(io::ErrorKind::InvalidInput, format!("{}", err))
            }
            _ => io::Error::new(io::ErrorKind::Other, format!("{}", err)),
        }
    }
}

pub type Result<T> = result::Result<T, Error>;
