//! Error handling for the cache load tester

use std::time::Duration;
use thiserror::Error;

/// Application-level error types
///
/// These cover the fatal/startup conditions that abort a run: invalid
/// configuration, cache client initialization failures, distributed
/// coordination breakdowns and shutdown drain failures. Per-operation
/// failures inside a run are modeled separately by [`CacheError`] and
/// surface as failure counts in the report, never as an `AppError`.
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Validation errors for CLI input
    #[error("Validation error: {0}")]
    Validation(String),

    /// Cache client initialization / connectivity errors
    #[error("Connection error: {0}")]
    Connection(String),

    /// Distributed master/worker coordination errors
    #[error("Coordination error: {0}")]
    Coordination(String),

    /// Shutdown/drain errors at the end of a run
    #[error("Shutdown error: {0}")]
    Shutdown(String),

    /// I/O errors (file operations, etc.)
    #[error("I/O error: {0}")]
    Io(String),

    /// Parsing errors (protocol messages, numeric values)
    #[error("Parsing error: {0}")]
    Parse(String),

    /// Generic internal errors
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config(message.into())
    }

    /// Create a new validation error
    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation(message.into())
    }

    /// Create a new connection error
    pub fn connection<S: Into<String>>(message: S) -> Self {
        Self::Connection(message.into())
    }

    /// Create a new coordination error
    pub fn coordination<S: Into<String>>(message: S) -> Self {
        Self::Coordination(message.into())
    }

    /// Create a new shutdown error
    pub fn shutdown<S: Into<String>>(message: S) -> Self {
        Self::Shutdown(message.into())
    }

    /// Create a new I/O error
    pub fn io<S: Into<String>>(message: S) -> Self {
        Self::Io(message.into())
    }

    /// Create a new parsing error
    pub fn parse<S: Into<String>>(message: S) -> Self {
        Self::Parse(message.into())
    }

    /// Create a new internal error
    pub fn internal<S: Into<String>>(message: S) -> Self {
        Self::Internal(message.into())
    }

    /// Get error category for logging and reporting
    pub fn category(&self) -> &'static str {
        match self {
            Self::Config(_) => "CONFIG",
            Self::Validation(_) => "VALIDATION",
            Self::Connection(_) => "CONNECTION",
            Self::Coordination(_) => "COORDINATION",
            Self::Shutdown(_) => "SHUTDOWN",
            Self::Io(_) => "IO",
            Self::Parse(_) => "PARSE",
            Self::Internal(_) => "INTERNAL",
        }
    }

    /// Get exit code for this error type
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Config(_) | Self::Validation(_) | Self::Parse(_) => 1, // Invalid configuration/usage
            Self::Connection(_) => 2,                                    // Cache connectivity
            Self::Coordination(_) => 3,                                  // Distributed control plane
            Self::Shutdown(_) => 4,                                      // Drain failures
            Self::Io(_) => 5,                                            // I/O issues
            Self::Internal(_) => 99,                                     // Internal/unexpected errors
        }
    }

    /// Format error for console display with color coding
    pub fn format_for_console(&self, use_color: bool) -> String {
        let category = self.category();
        let message = self.to_string();

        if use_color {
            use colored::Colorize;
            match self {
                Self::Config(_) | Self::Validation(_) | Self::Parse(_) => {
                    format!("[{}] {}", category.red().bold(), message.red())
                }
                Self::Connection(_) => {
                    format!("[{}] {}", category.yellow().bold(), message.yellow())
                }
                Self::Coordination(_) | Self::Shutdown(_) => {
                    format!("[{}] {}", category.magenta().bold(), message.magenta())
                }
                Self::Io(_) => {
                    format!("[{}] {}", category.cyan().bold(), message.cyan())
                }
                Self::Internal(_) => {
                    format!("[{}] {}", category.bright_red().bold(), message.bright_red())
                }
            }
        } else {
            format!("[{}] {}", category, message)
        }
    }
}

// Standard library error conversions
impl From<std::io::Error> for AppError {
    fn from(error: std::io::Error) -> Self {
        Self::io(error.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(error: serde_json::Error) -> Self {
        Self::parse(format!("JSON parse error: {}", error))
    }
}

impl From<std::num::ParseIntError> for AppError {
    fn from(error: std::num::ParseIntError) -> Self {
        Self::parse(format!("Integer parse error: {}", error))
    }
}

impl From<std::num::ParseFloatError> for AppError {
    fn from(error: std::num::ParseFloatError) -> Self {
        Self::parse(format!("Float parse error: {}", error))
    }
}

impl From<std::str::ParseBoolError> for AppError {
    fn from(error: std::str::ParseBoolError) -> Self {
        Self::parse(format!("Boolean parse error: {}", error))
    }
}

impl From<std::net::AddrParseError> for AppError {
    fn from(error: std::net::AddrParseError) -> Self {
        Self::parse(format!("Socket address parse error: {}", error))
    }
}

impl From<dotenv::Error> for AppError {
    fn from(error: dotenv::Error) -> Self {
        Self::config(format!("Environment file error: {}", error))
    }
}

// Anyhow integration
impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        Self::internal(error.to_string())
    }
}

/// Custom Result type for the application
pub type Result<T> = std::result::Result<T, AppError>;

/// Per-operation error taxonomy for cache calls
///
/// Timeouts, connection failures and cluster-unavailable conditions are
/// transient and eligible for retry; anything else is permanent and fails
/// the operation immediately.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CacheError {
    /// The operation exceeded the configured per-call timeout
    #[error("operation timed out")]
    Timeout,

    /// The connection to a cluster node failed or was dropped
    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    /// The cluster reported itself unavailable (e.g. CLUSTERDOWN)
    #[error("cluster unavailable: {0}")]
    ClusterUnavailable(String),

    /// Any other error; not retried
    #[error("{0}")]
    Other(String),
}

impl CacheError {
    /// Whether this error belongs to the declared transient set
    pub fn is_transient(&self) -> bool {
        !matches!(self, Self::Other(_))
    }

    /// Short machine-readable kind, used in outcomes and log fields
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Timeout => "timeout",
            Self::ConnectionFailed(_) => "connection_failed",
            Self::ClusterUnavailable(_) => "cluster_unavailable",
            Self::Other(_) => "other",
        }
    }
}

/// Result type for individual cache operations
pub type CacheResult<T> = std::result::Result<T, CacheError>;

/// Compute the drain grace period for a run: the worst-case time one
/// in-flight operation can legitimately take (all attempts plus backoff)
/// plus the pacing bound and a fixed margin.
pub fn drain_grace(
    op_timeout: Duration,
    retry_count: u32,
    retry_wait: Duration,
    wait_max: Duration,
) -> Duration {
    op_timeout * retry_count + retry_wait * retry_count + wait_max + Duration::from_secs(5)
}
