//! Postgres connection config.
use std::{borrow::Cow, env::var, fmt, path::PathBuf};

const DEFAULT_HOST: &str = "localhost";
const DEFAULT_PORT: u16 = 5432;

/// Postgres connection config.
///
/// The server is reached over TCP by default, `localhost:5432` unless
/// [`host`][Config::host]/[`port`][Config::port] say otherwise. Setting a
/// [`unix_path`][Config::unix_path] switches to a unix domain socket and
/// conflicts with an explicit host or port.
#[derive(Clone, Debug)]
pub struct Config {
    pub(crate) user: String,
    pub(crate) database: String,
    pub(crate) password: Option<String>,
    pub(crate) host: Option<String>,
    pub(crate) port: Option<u16>,
    pub(crate) unix_path: Option<PathBuf>,
    pub(crate) options: Vec<(String, String)>,
    pub(crate) camel_case: bool,
}

impl Config {
    pub fn new(user: impl Into<String>, database: impl Into<String>) -> Config {
        Self {
            user: user.into(),
            database: database.into(),
            password: None,
            host: None,
            port: None,
            unix_path: None,
            options: Vec::new(),
            camel_case: false,
        }
    }

    /// Retrieve configuration from environment variable.
    ///
    /// It reads:
    /// - `PGUSER`
    /// - `PGPASSWORD`
    /// - `PGHOST`
    /// - `PGPORT`
    /// - `PGDATABASE`, falls back to the user name like `psql` does.
    pub fn from_env() -> Config {
        let user = var("PGUSER").unwrap_or_else(|_| "postgres".into());
        let database = var("PGDATABASE").unwrap_or_else(|_| user.clone());

        let mut config = Config::new(user, database);
        if let Ok(password) = var("PGPASSWORD") {
            config = config.password(password);
        }
        if let Ok(host) = var("PGHOST") {
            config = config.host(host);
        }
        if let Some(port) = var("PGPORT").ok().and_then(|p| p.parse().ok()) {
            config = config.port(port);
        }
        config
    }

    /// Password for cleartext authentication, sent only when the server asks.
    pub fn password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into());
        self
    }

    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.host = Some(host.into());
        self
    }

    pub fn port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    /// Connect through a unix domain socket instead of TCP.
    pub fn unix_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.unix_path = Some(path.into());
        self
    }

    /// Add a run-time parameter to send with the startup message, e.g.
    /// `client_encoding` or `application_name`.
    pub fn option(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.options.push((name.into(), value.into()));
        self
    }

    /// Alias result columns from `snake_case` to `camelCase`.
    pub fn camel_case(mut self, camel_case: bool) -> Self {
        self.camel_case = camel_case;
        self
    }

    /// Resolve where to connect.
    pub(crate) fn target(&self) -> Result<Target<'_>, ConfigError> {
        match &self.unix_path {
            Some(path) => {
                if self.host.is_some() || self.port.is_some() {
                    return Err(ConfigError {
                        reason: "both unix_path and host/port are set".into(),
                    });
                }
                Ok(Target::Unix(path))
            }
            None => Ok(Target::Tcp {
                host: self.host.as_deref().unwrap_or(DEFAULT_HOST),
                port: self.port.unwrap_or(DEFAULT_PORT),
            }),
        }
    }
}

pub(crate) enum Target<'a> {
    Tcp { host: &'a str, port: u16 },
    Unix(&'a PathBuf),
}

/// Error for conflicting or incomplete connection configuration.
pub struct ConfigError {
    pub(crate) reason: Cow<'static, str>,
}

impl std::error::Error for ConfigError { }

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if f.alternate() {
            return f.write_str(&self.reason)
        }
        write!(f, "invalid config: {}", self.reason)
    }
}

impl fmt::Debug for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "\"{self}\"")
    }
}
