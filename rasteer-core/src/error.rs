//! Error types for rasteer

use thiserror::Error;

/// Result type alias for rasteer operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for rasteer
#[derive(Error, Debug)]
pub enum Error {
    /// Network I/O error
    #[error("Network I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Interface not found
    #[error("Interface '{0}' not found")]
    InterfaceNotFound(String),

    /// Interface error
    #[error("Interface error: {0}")]
    Interface(String),

    /// Frame construction error
    #[error("Frame construction error: {0}")]
    FrameConstruction(String),

    /// Invalid link-layer or IP address
    #[error("Invalid address '{addr}': {reason}")]
    InvalidAddress { addr: String, reason: String },

    /// Topology snapshot could not be obtained
    #[error("Topology read failed: {0}")]
    Topology(String),

    /// Neighbor table inspection error
    #[error("Neighbor table error: {0}")]
    Neighbor(String),

    /// Insufficient privileges
    #[error("Insufficient privileges: {0}")]
    InsufficientPrivileges(String),

    /// Scheduler control error
    #[error("Scheduler error: {0}")]
    Scheduler(String),
}

impl Error {
    /// Create a frame construction error with a custom message
    pub fn frame<S: Into<String>>(msg: S) -> Self {
        Error::FrameConstruction(msg.into())
    }

    /// Create a topology error with a custom message
    pub fn topology<S: Into<String>>(msg: S) -> Self {
        Error::Topology(msg.into())
    }

    /// Create an invalid address error
    pub fn invalid_address<S: Into<String>>(addr: S, reason: S) -> Self {
        Error::InvalidAddress {
            addr: addr.into(),
            reason: reason.into(),
        }
    }
}
