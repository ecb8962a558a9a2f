//! Server reported error.
use std::fmt;

use crate::protocol::{MessageReader, ProtocolError};
use crate::sqlstate;

/// An error or notice reported by the server.
///
/// Decoded from the field list of an `ErrorResponse` or `NoticeResponse`
/// frame. `severity`, `code` and `message` are always present; everything
/// else appears only when the server has something to say.
///
/// <https://www.postgresql.org/docs/current/protocol-error-fields.html>
#[derive(Debug, Default)]
pub struct DbError {
    /// `ERROR`, `FATAL`, `PANIC`, or a notice severity.
    pub severity: String,
    /// The SQLSTATE code.
    pub code: String,
    /// Condition name derived from `code`, e.g. `UniqueViolation`.
    pub name: Option<&'static str>,
    /// The primary human-readable error message.
    pub message: String,
    /// Secondary message carrying more detail.
    pub detail: Option<String>,
    /// Suggestion what to do about the problem.
    pub hint: Option<String>,
    /// Cursor position into the original query string, counting from 1.
    pub position: Option<String>,
    pub internal_position: Option<String>,
    pub internal_query: Option<String>,
    /// Context in which the error occurred, e.g. a PL/pgSQL call stack.
    pub where_: Option<String>,
    pub schema_name: Option<String>,
    pub table_name: Option<String>,
    pub column_name: Option<String>,
    pub data_type_name: Option<String>,
    pub constraint_name: Option<String>,
    /// Source file of the reporting server code.
    pub file: Option<String>,
    /// Source line of the reporting server code.
    pub line: Option<String>,
    /// Source routine of the reporting server code.
    pub routine: Option<String>,
}

impl DbError {
    /// Decode the field list of the frame currently held by `reader`.
    ///
    /// A nul byte in place of a field code ends the list. Field codes this
    /// build does not recognize are read and dropped, as the protocol asks.
    pub fn decode(reader: &mut MessageReader) -> Result<Self, ProtocolError> {
        let mut error = Self::default();

        while reader.remaining() > 0 {
            let Some(field) = reader.read_char()? else {
                break;
            };
            let value = reader.read_cstring()?;
            match field {
                'S' => error.severity = value,
                'V' => {}, // non-localized severity, same set of values as `S`
                'C' => {
                    error.name = sqlstate::condition_name(&value);
                    error.code = value;
                }
                'M' => error.message = value,
                'D' => error.detail = Some(value),
                'H' => error.hint = Some(value),
                'P' => error.position = Some(value),
                'p' => error.internal_position = Some(value),
                'q' => error.internal_query = Some(value),
                'W' => error.where_ = Some(value),
                's' => error.schema_name = Some(value),
                't' => error.table_name = Some(value),
                'c' => error.column_name = Some(value),
                'd' => error.data_type_name = Some(value),
                'n' => error.constraint_name = Some(value),
                'F' => error.file = Some(value),
                'L' => error.line = Some(value),
                'R' => error.routine = Some(value),
                _ => {}
            }
        }

        Ok(error)
    }
}

impl std::error::Error for DbError {}

impl fmt::Display for DbError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Self { severity, code, message, .. } = self;
        write!(f, "{severity}: {message}")?;
        match self.name {
            Some(name) => write!(f, " ({name})"),
            None => write!(f, " ({code})"),
        }?;
        if let Some(detail) = &self.detail {
            write!(f, ": {detail}")?;
        }
        if let Some(hint) = &self.hint {
            write!(f, ", hint: {hint}")?;
        }
        Ok(())
    }
}
