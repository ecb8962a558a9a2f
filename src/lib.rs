//! Postgres simple-query wire client.
//!
//! A from-scratch implementation of the PostgreSQL frontend/backend protocol
//! (v3.0), restricted to the startup/authentication handshake and the simple
//! query flow. No extended protocol, no COPY, no pooling.
//!
//! # Examples
//!
//! ```no_run
//! use pgsimple::{Config, Connection, Value};
//!
//! # async fn app() -> pgsimple::Result<()> {
//! let config = Config::new("alice", "mydb")
//!     .password("secret")
//!     .option("client_encoding", "UTF8")
//!     .camel_case(true);
//!
//! let mut conn = Connection::open(config).await?;
//!
//! let res = conn.execute("SELECT 420 AS the_answer").await?;
//!
//! assert_eq!(res.row_count, 1);
//! assert_eq!(res.rows[0].get("theAnswer"), Some(&Value::Int(420)));
//! # Ok(())
//! # }
//! ```

mod common;
mod ext;
mod net;

// Protocol
pub mod protocol;

// Lookup tables
pub mod pg_type;
pub mod sqlstate;

// Decoding
pub mod row;
pub mod value;
mod dberror;

// Connection
mod config;
mod connection;
mod query;
mod stream;

mod error;

pub use config::{Config, ConfigError};
pub use connection::{CancelInfo, Connection, ServerStatus, UnsupportedAuth};
pub use dberror::DbError;
pub use error::{Error, ErrorKind, Result};
pub use net::Socket;
pub use row::{ColumnDescription, QueryResult, Row};
pub use value::{DecodeError, Value};
