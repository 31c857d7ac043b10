use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Notify(#[from] NotifyError),
    #[error(transparent)]
    Import(#[from] ImportError),
    #[error("telemetry initialization failed: {0}")]
    Telemetry(String),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to parse configuration: {0}")]
    Parse(String),
    #[error("invalid configuration for {field}: {message}")]
    InvalidField {
        field: &'static str,
        message: String,
    },
    #[error("configuration error: {0}")]
    Other(String),
}

#[derive(Debug, Error)]
pub enum NotifyError {
    /// The page has no document to attach the notification host to.
    #[error("notification host unavailable: {0}")]
    HostUnavailable(String),
    #[error("no async runtime available to schedule notification timers")]
    NoRuntime,
}

#[derive(Debug, Error)]
pub enum ImportError {
    #[error("failed to read page markup {path}")]
    PageRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed page markup at byte {position}: {message}")]
    Markup { position: u64, message: String },
}

impl Error {
    /// Whether the error means the subsystem cannot run at all on this page.
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::Notify(NotifyError::HostUnavailable(_) | NotifyError::NoRuntime)
        )
    }
}
