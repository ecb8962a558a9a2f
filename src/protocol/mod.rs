//! Postgres Frontend and Backend Protocol
//!
//! docs here mostly quoted from the official postgres documentation
//!
//! <https://www.postgresql.org/docs/17/protocol-overview.html>
//!
//! # Messaging Overview
//!
//! All communication is through a stream of messages. The first byte of a message identifies the message type,
//! and the next four bytes specify the length of the rest of the message (this length count includes itself,
//! but not the message-type byte). The remaining contents of the message are determined by the message type.
//!
//! ```text
//! | u8 |        i32        | body
//! |----|-------------------|-----
//! | 43 | 00 | 00 | 00 | 32 |  ..
//!
//! Message Type -> length -> body
//! ```
//!
//! For historical reasons, the very first message sent by the client (the startup message)
//! has no initial message-type byte.
//!
//! # Simple Query Overview
//!
//! Only the simple query sub-protocol is implemented here: the frontend sends
//! one `Query` message containing a textual SQL string, and the backend
//! replies with zero or more `RowDescription`/`DataRow`/`CommandComplete`
//! sequences, terminated by `ReadyForQuery`.
//!
//! All result values arrive in the text format (format code 0); the text
//! representation of a value is whatever string is produced by the output
//! conversion function for the particular data type, with no trailing nul.

pub mod backend;
pub mod frontend;

mod error;
mod reader;
mod writer;

pub use backend::BackendMessage;
pub use error::ProtocolError;
pub use frontend::FrontendMessage;
pub use reader::MessageReader;
pub use writer::MessageWriter;
