//! `pgsimple` error types.
use std::{backtrace::Backtrace, fmt, io};

use crate::{
    config::ConfigError,
    connection::UnsupportedAuth,
    dberror::DbError,
    protocol::ProtocolError,
    value::DecodeError,
};

/// A specialized [`Result`] type for `pgsimple` operation.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// All possible error from `pgsimple` library.
pub struct Error {
    backtrace: Backtrace,
    kind: ErrorKind,
}

impl Error {
    pub fn kind(&self) -> &ErrorKind {
        &self.kind
    }

    /// Turn the error into the [`DbError`] it carries, if any.
    pub fn into_db_error(self) -> Result<DbError, Error> {
        match self.kind {
            ErrorKind::Database(e) => Ok(e),
            _ => Err(self),
        }
    }

    pub fn backtrace(&self) -> &Backtrace {
        &self.backtrace
    }
}

/// All possible error kind from `pgsimple` library.
pub enum ErrorKind {
    /// Conflicting or incomplete connection configuration.
    Config(ConfigError),
    /// Transport level failure.
    Io(io::Error),
    /// The backend closed the connection, possibly mid-frame.
    ConnectionClosed,
    /// The byte stream does not follow the frontend/backend protocol.
    Protocol(ProtocolError),
    /// The server asked for an authentication method this build does not do.
    Auth(UnsupportedAuth),
    /// The server reported an error while handling a query.
    Database(DbError),
    /// A result cell could not be decoded as its column type.
    Decode(DecodeError),
}

macro_rules! from {
    (<$ty:ty>$pat:pat => $body:expr) => {
        impl From<$ty> for Error {
            fn from($pat: $ty) -> Self {
                let backtrace = std::backtrace::Backtrace::capture();
                Self { backtrace, kind: $body }
            }
        }
    };
}

from!(<ErrorKind>e => e);
from!(<ConfigError>e => ErrorKind::Config(e));
from!(<io::Error>e => ErrorKind::Io(e));
from!(<ProtocolError>e => ErrorKind::Protocol(e));
from!(<UnsupportedAuth>e => ErrorKind::Auth(e));
from!(<DbError>e => ErrorKind::Database(e));
from!(<DecodeError>e => ErrorKind::Decode(e));

impl std::error::Error for Error { }

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.kind, f)?;

        if let std::backtrace::BacktraceStatus::Captured = self.backtrace.status() {
            let mut backtrace = self.backtrace.to_string();
            write!(f, "\n\n")?;
            writeln!(f, "Stack backtrace:")?;
            backtrace.truncate(backtrace.trim_end().len());
            write!(f, "{}", backtrace)?;
        }

        Ok(())
    }
}

impl fmt::Debug for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "\"{self}\"")
    }
}

impl std::error::Error for ErrorKind { }

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(e) => e.fmt(f),
            Self::Io(e) => e.fmt(f),
            Self::ConnectionClosed => f.write_str("connection closed by the backend"),
            Self::Protocol(e) => e.fmt(f),
            Self::Auth(e) => e.fmt(f),
            Self::Database(e) => e.fmt(f),
            Self::Decode(e) => e.fmt(f),
        }
    }
}

impl fmt::Debug for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "\"{self}\"")
    }
}
