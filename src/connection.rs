//! Postgres connection and startup handshake.
use std::collections::HashMap;
use std::fmt;

use tokio::io::{AsyncRead, AsyncWrite};

use crate::config::{Config, Target};
use crate::error::{Error, Result};
use crate::net::Socket;
use crate::protocol::{
    BackendMessage, ProtocolError,
    backend::Authentication,
    frontend::{PasswordMessage, Startup, Terminate},
};
use crate::stream::Stream;

/// Backend transaction status, as reported by `ReadyForQuery`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServerStatus {
    /// Not in a transaction block.
    Idle,
    /// In a transaction block.
    Transaction,
    /// In a failed transaction block, queries are rejected until rollback.
    Error,
    /// The server sent a status byte this build does not recognize.
    Unknown,
}

impl ServerStatus {
    fn from_byte(status: u8) -> ServerStatus {
        match status {
            b'I' => Self::Idle,
            b'T' => Self::Transaction,
            b'E' => Self::Error,
            _ => Self::Unknown,
        }
    }
}

/// Cancellation key data captured from `BackendKeyData`.
///
/// Kept so a cancel request could be issued out of band; no cancellation
/// protocol is implemented here.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CancelInfo {
    pub process_id: i32,
    pub secret_key: i32,
}

/// The server asked for an authentication method this build does not do.
///
/// Only trust (`AuthenticationOk` right away) and cleartext password are
/// supported.
pub struct UnsupportedAuth {
    pub(crate) code: i32,
}

impl UnsupportedAuth {
    /// The method behind the authentication request code, if known.
    pub fn method(&self) -> Option<&'static str> {
        Some(match self.code {
            2 => "kerberos-v5",
            5 => "md5",
            7 => "gss",
            9 => "sspi",
            10 | 11 | 12 => "sasl",
            _ => return None,
        })
    }
}

impl std::error::Error for UnsupportedAuth {}

impl fmt::Display for UnsupportedAuth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.method() {
            Some(method) => write!(f, "unsupported authentication method `{method}`"),
            None => write!(f, "unknown authentication request code {}", self.code),
        }
    }
}

impl fmt::Debug for UnsupportedAuth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "\"{self}\"")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    /// Socket is up, startup not yet exchanged.
    Opened,
    Connected,
    /// Handshake aborted or the framing is beyond recovery.
    Failed,
    Closed,
}

/// A single postgres connection.
///
/// Owns its socket exclusively. One request may be in flight at a time; the
/// simple query protocol has no pipelining, and an exchange abandoned before
/// its `ReadyForQuery` leaves the connection unusable.
pub struct Connection<S = Socket> {
    stream: Stream<S>,
    config: Config,
    state: State,
    in_flight: bool,
    server_params: HashMap<String, String>,
    server_status: Option<ServerStatus>,
    cancel_info: Option<CancelInfo>,
}

impl Connection<Socket> {
    /// Connect to the server named by `config` and run the startup
    /// handshake.
    pub async fn open(config: Config) -> Result<Connection<Socket>> {
        let socket = match config.target()? {
            Target::Tcp { host, port } => Socket::connect_tcp(host, port).await?,
            Target::Unix(path) => Socket::connect_unix(path).await?,
        };
        let mut conn = Connection::with_transport(socket, config);
        conn.connect().await?;
        Ok(conn)
    }
}

impl<S> Connection<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    /// Wrap an already connected transport. The handshake still has to be
    /// run via [`connect`][Connection::connect].
    pub fn with_transport(io: S, config: Config) -> Connection<S> {
        Self {
            stream: Stream::new(io),
            config,
            state: State::Opened,
            in_flight: false,
            server_params: HashMap::new(),
            server_status: None,
            cancel_info: None,
        }
    }

    /// Run the startup handshake until the first `ReadyForQuery`.
    ///
    /// Idempotent: calling this on an already connected instance does
    /// nothing, no second startup message is written.
    pub async fn connect(&mut self) -> Result<()> {
        match self.state {
            State::Connected => return Ok(()),
            State::Opened => {}
            State::Failed | State::Closed => {
                return Err(ProtocolError::Desynchronized.into());
            }
        }
        self.begin_exchange()?;

        match self.handshake().await {
            Ok(()) => {
                self.in_flight = false;
                self.state = State::Connected;
                log::debug!(
                    "connected, server version {}",
                    self.server_param("server_version").unwrap_or("unknown"),
                );
                Ok(())
            }
            Err(err) => {
                self.state = State::Failed;
                Err(err)
            }
        }
    }

    async fn handshake(&mut self) -> Result<()> {
        let startup = Startup {
            user: &self.config.user,
            database: &self.config.database,
            options: &self.config.options,
        };
        self.stream.send_startup(&startup).await?;

        loop {
            match self.stream.recv().await? {
                BackendMessage::Authentication(Authentication::Ok) => {}
                BackendMessage::Authentication(Authentication::CleartextPassword) => {
                    let Some(password) = self.config.password.as_deref() else {
                        return Err(crate::config::ConfigError {
                            reason: "server asked for a password, none is configured".into(),
                        }
                        .into());
                    };
                    self.stream.send(&PasswordMessage { password }).await?;
                }
                BackendMessage::Authentication(Authentication::Unsupported(code)) => {
                    return Err(UnsupportedAuth { code }.into());
                }
                BackendMessage::ParameterStatus(param) => {
                    self.server_params.insert(param.name, param.value);
                }
                BackendMessage::BackendKeyData(key) => {
                    self.cancel_info = Some(CancelInfo {
                        process_id: key.process_id,
                        secret_key: key.secret_key,
                    });
                }
                BackendMessage::ReadyForQuery(ready) => {
                    self.server_status = Some(ServerStatus::from_byte(ready.status));
                    return Ok(());
                }
                BackendMessage::ErrorResponse(error) => return Err(error.into()),
                message => {
                    return Err(
                        ProtocolError::unexpected_phase(message.tag(), "startup").into()
                    );
                }
            }
        }
    }

    /// Send `Terminate` and shut the transport down.
    pub async fn close(&mut self) -> Result<()> {
        if self.state == State::Closed {
            return Ok(());
        }
        if self.state == State::Connected && !self.in_flight {
            self.stream.send(&Terminate).await?;
        }
        self.state = State::Closed;
        self.stream.shutdown().await
    }

    /// A run-time parameter the server reported, e.g. `server_version`.
    pub fn server_param(&self, name: &str) -> Option<&str> {
        self.server_params.get(name).map(String::as_str)
    }

    /// Transaction status from the latest `ReadyForQuery`, if any.
    pub fn server_status(&self) -> Option<ServerStatus> {
        self.server_status
    }

    /// Cancellation key data, captured during the handshake.
    pub fn cancel_info(&self) -> Option<CancelInfo> {
        self.cancel_info
    }

    pub(crate) fn stream(&mut self) -> &mut Stream<S> {
        &mut self.stream
    }

    pub(crate) fn set_server_status(&mut self, status: u8) {
        self.server_status = Some(ServerStatus::from_byte(status));
    }

    pub(crate) fn set_server_param(&mut self, name: String, value: String) {
        self.server_params.insert(name, value);
    }

    pub(crate) fn camel_case(&self) -> bool {
        self.config.camel_case
    }

    /// Reject a second exchange while one is in flight, and any exchange on
    /// a connection that never completed its previous one.
    pub(crate) fn begin_exchange(&mut self) -> Result<(), Error> {
        if self.in_flight {
            return Err(ProtocolError::Desynchronized.into());
        }
        self.in_flight = true;
        Ok(())
    }

    pub(crate) fn end_exchange(&mut self) {
        self.in_flight = false;
    }

    pub(crate) fn require_connected(&self) -> Result<(), Error> {
        match self.state {
            State::Connected => Ok(()),
            _ => Err(ProtocolError::Desynchronized.into()),
        }
    }

    pub(crate) fn mark_failed(&mut self) {
        self.state = State::Failed;
    }
}

impl<S> fmt::Debug for Connection<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Connection")
            .field("state", &self.state)
            .field("server_status", &self.server_status)
            .finish_non_exhaustive()
    }
}
