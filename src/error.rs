//! Error types for filexfer
//!
//! Every transfer operation reports failures through [`TransferError`].
//! The boolean API of the service collapses these into `false`, so each
//! variant carries enough context to be useful in a log line on its own.

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Main error type for transfer operations
#[derive(Error, Debug)]
pub enum TransferError {
    /// Local source file does not exist
    #[error("Local file not found: {0}")]
    LocalFileNotFound(PathBuf),

    /// Could not reach or talk to the remote side
    #[error("Connection error to '{endpoint}': {message}")]
    Connection { endpoint: String, message: String },

    /// Remote side refused the credentials
    #[error("Authentication failed for '{user}@{host}': {message}")]
    Authentication {
        user: String,
        host: String,
        message: String,
    },

    /// HTTP status other than 200
    #[error("'{url}' answered with status {status}")]
    UnexpectedStatus { url: String, status: u16 },

    /// Remote side refused a store or retrieve command
    #[error("Remote rejected request at '{endpoint}': {message}")]
    RemoteRejected { endpoint: String, message: String },

    /// Local filesystem failure (create, write, rename, delete)
    #[error("I/O error at '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Malformed transfer endpoint
    #[error("Invalid endpoint '{input}': {reason}")]
    InvalidEndpoint { input: String, reason: String },

    /// No operation moves bytes between these two endpoints
    #[error("Unsupported transfer from {from} to {to}")]
    UnsupportedRoute { from: String, to: String },

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Coarse failure taxonomy used for logging and metrics labels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Source path is missing
    LocalFileNotFound,
    /// Connect, reset, timeout
    ConnectionFailure,
    /// Credentials rejected
    AuthenticationFailure,
    /// Non-200 status, store or retrieve refused
    RemoteRejected,
    /// Copy, write, rename or delete failed locally
    FilesystemError,
    /// Request could not be interpreted
    InvalidRequest,
}

impl ErrorKind {
    /// Stable identifier for log fields
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::LocalFileNotFound => "local_file_not_found",
            Self::ConnectionFailure => "connection_failure",
            Self::AuthenticationFailure => "authentication_failure",
            Self::RemoteRejected => "remote_rejected",
            Self::FilesystemError => "filesystem_error",
            Self::InvalidRequest => "invalid_request",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TransferError {
    /// Create an I/O error with path context
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Create a connection error
    pub fn connection(endpoint: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Connection {
            endpoint: endpoint.into(),
            message: message.into(),
        }
    }

    /// Create an authentication error
    pub fn auth(
        user: impl Into<String>,
        host: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::Authentication {
            user: user.into(),
            host: host.into(),
            message: message.into(),
        }
    }

    /// Create a remote rejection error
    pub fn rejected(endpoint: impl Into<String>, message: impl Into<String>) -> Self {
        Self::RemoteRejected {
            endpoint: endpoint.into(),
            message: message.into(),
        }
    }

    /// Create an invalid endpoint error
    pub fn invalid_endpoint(input: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidEndpoint {
            input: input.into(),
            reason: reason.into(),
        }
    }

    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::ConfigError(message.into())
    }

    /// Classify this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::LocalFileNotFound(_) => ErrorKind::LocalFileNotFound,
            Self::Connection { .. } => ErrorKind::ConnectionFailure,
            Self::Authentication { .. } => ErrorKind::AuthenticationFailure,
            Self::UnexpectedStatus { .. } | Self::RemoteRejected { .. } => {
                ErrorKind::RemoteRejected
            }
            Self::Io { .. } => ErrorKind::FilesystemError,
            Self::InvalidEndpoint { .. }
            | Self::UnsupportedRoute { .. }
            | Self::ConfigError(_) => ErrorKind::InvalidRequest,
        }
    }

    /// Get the local path associated with this error, if any
    pub fn path(&self) -> Option<&PathBuf> {
        match self {
            Self::LocalFileNotFound(path) | Self::Io { path, .. } => Some(path),
            _ => None,
        }
    }
}

/// Result type alias for transfer operations
pub type Result<T> = std::result::Result<T, TransferError>;

impl From<serde_json::Error> for TransferError {
    fn from(err: serde_json::Error) -> Self {
        TransferError::ConfigError(err.to_string())
    }
}

/// Extension trait for adding path context to std::io::Result
pub trait IoResultExt<T> {
    /// Add path context to an I/O error
    fn with_path(self, path: impl Into<PathBuf>) -> Result<T>;
}

impl<T> IoResultExt<T> for std::io::Result<T> {
    fn with_path(self, path: impl Into<PathBuf>) -> Result<T> {
        self.map_err(|e| TransferError::io(path, e))
    }
}
