//! Protocol error.
use std::fmt;

use super::backend;

/// An error when translating buffer from postgres.
pub enum ProtocolError {
    /// Backend sent a message that is not valid at this point.
    Unexpected {
        found: u8,
        phase: Option<&'static str>,
    },
    /// A read would pass the declared end of the current frame.
    OutOfBounds { requested: usize, remaining: usize },
    /// Declared frame length cannot cover the length field itself.
    InvalidLength(i32),
    /// A string field was not nul terminated inside its frame.
    MissingNul,
    /// Backend sent a non UTF-8 string.
    NonUtf8(std::str::Utf8Error),
    /// DataRow column count differs from the active RowDescription.
    ColumnCountMismatch { described: usize, received: usize },
    /// A previous exchange ended before its ReadyForQuery was observed.
    Desynchronized,
}

impl ProtocolError {
    pub(crate) fn unknown(found: u8) -> ProtocolError {
        Self::Unexpected { found, phase: None }
    }

    pub(crate) fn unexpected_phase(found: u8, phase: &'static str) -> ProtocolError {
        Self::Unexpected { found, phase: Some(phase) }
    }
}

impl std::error::Error for ProtocolError {}

impl fmt::Display for ProtocolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::Unexpected { found, phase } => {
                write!(f, "unexpected message `{}`", backend::message_name(found))?;
                if let Some(phase) = phase {
                    write!(f, " in `{phase}`")?;
                }
                Ok(())
            }
            Self::OutOfBounds { requested, remaining } => write!(
                f,
                "read of {requested} bytes passes the end of the frame ({remaining} remaining)",
            ),
            Self::InvalidLength(len) => write!(f, "invalid frame length {len}"),
            Self::MissingNul => write!(f, "string field is not nul terminated"),
            Self::NonUtf8(e) => write!(f, "non UTF-8 string: {e}"),
            Self::ColumnCountMismatch { described, received } => write!(
                f,
                "DataRow carries {received} columns, RowDescription described {described}",
            ),
            Self::Desynchronized => {
                write!(f, "connection is out of sync with the backend")
            }
        }
    }
}

impl fmt::Debug for ProtocolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "\"{self}\"")
    }
}
