//! Error types shared by the registry, the device facade and collaborators.

use thiserror::Error;

/// Errors surfaced by device lookup, construction and data access.
///
/// Collaborator failures (network, vendor rejections) are carried through
/// unchanged; the facade only adds its own capability and configuration
/// checks on top.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DeviceError {
    /// No device registered under the requested key.
    #[error("unknown device '{0}'")]
    NotFound(String),

    /// Unsupported data type, bad init parameter or duplicate registration.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// The authentication collaborator rejected the credentials.
    #[error("authentication failed: {0}")]
    Authentication(String),

    /// The device declares the capability but cannot serve it this way.
    #[error("unsupported operation: {0}")]
    UnsupportedOperation(String),

    /// The real-fetch collaborator failed.
    #[error("fetch failed: {0}")]
    Fetch(String),
}

impl DeviceError {
    pub(crate) fn config(msg: impl Into<String>) -> Self {
        DeviceError::Configuration(msg.into())
    }
}
