//! Server configuration read from the environment.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use crate::error::AppError;

/// Settings for one server process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Bind host (`HOST`, default `0.0.0.0`).
    pub host: String,
    /// Bind port (`PORT`, default `3000`).
    pub port: u16,
    /// Course root (`COURSE_ROOT`, default `courses`).
    pub course_root: PathBuf,
    /// Longest a watch request may block (`SESSION_WAIT_TIMEOUT_MS`, default 25 s).
    pub session_wait_timeout: Duration,
    /// How long a session may sit unused before it is closed
    /// (`SESSION_IDLE_TTL_SECS`, default 30 min).
    pub session_idle_ttl: Duration,
}

impl ServerConfig {
    /// Reads the process environment.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if a numeric variable does not parse.
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads settings through `lookup`.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if a numeric variable does not parse.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, AppError> {
        let host = lookup("HOST").unwrap_or_else(|| "0.0.0.0".to_string());
        let port: u16 = lookup("PORT")
            .unwrap_or_else(|| "3000".to_string())
            .parse()
            .map_err(|e| AppError::Config(format!("PORT must be a valid u16: {e}")))?;
        let course_root = lookup("COURSE_ROOT").unwrap_or_else(|| "courses".to_string());
        let wait_ms: u64 = lookup("SESSION_WAIT_TIMEOUT_MS")
            .unwrap_or_else(|| "25000".to_string())
            .parse()
            .map_err(|e| {
                AppError::Config(format!("SESSION_WAIT_TIMEOUT_MS must be milliseconds: {e}"))
            })?;

        let idle_secs: u64 = lookup("SESSION_IDLE_TTL_SECS")
            .unwrap_or_else(|| "1800".to_string())
            .parse()
            .map_err(|e| AppError::Config(format!("SESSION_IDLE_TTL_SECS must be seconds: {e}")))?;
        if idle_secs == 0 {
            return Err(AppError::Config(
                "SESSION_IDLE_TTL_SECS must be greater than zero".to_string(),
            ));
        }

        Ok(Self {
            host,
            port,
            course_root: PathBuf::from(course_root),
            session_wait_timeout: Duration::from_millis(wait_ms),
            session_idle_ttl: Duration::from_secs(idle_secs),
        })
    }

    /// How often idle sessions are swept: the TTL, capped at one minute.
    #[must_use]
    pub fn session_sweep_period(&self) -> Duration {
        self.session_idle_ttl.min(Duration::from_secs(60))
    }

    /// The socket address to bind.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if `HOST:PORT` is not an address.
    pub fn bind_addr(&self) -> Result<SocketAddr, AppError> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e| AppError::Config(format!("invalid HOST:PORT combination: {e}")))
    }
}
