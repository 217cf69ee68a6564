use std::fmt;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BridgeError {
    #[error("Malformed locator: {0}")]
    MalformedLocator(String),

    #[error("Script resource not found: {0}")]
    ResourceNotFound(String),

    #[error(transparent)]
    Remote(#[from] RemoteError),

    // Errors reconstructed from a remote payload keep the remote message verbatim.
    #[error("{0}")]
    NoSuchElement(String),

    #[error("{0}")]
    StaleElementReference(String),

    #[error("{0}")]
    InvalidArgument(String),

    #[error("{0}")]
    InvalidElementState(String),

    #[error("{0}")]
    ElementNotInteractable(String),

    #[error("{0}")]
    Timeout(String),

    #[error("{0}")]
    UnsupportedOperation(String),

    #[error("Browser launch failed: {0}")]
    LaunchFailed(String),

    #[error("Navigation failed: {0}")]
    NavigationFailed(String),

    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, BridgeError>;

/// Where a remote failure came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoteErrorKind {
    /// The script raised an exception in the remote environment.
    Javascript,
    /// The call did not complete within the executor's timeout.
    Timeout,
    /// The script returned a value that cannot cross the boundary, such as a DOM node.
    Marshalling,
    /// The remote endpoint itself failed (connection, protocol).
    Transport,
}

impl fmt::Display for RemoteErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            RemoteErrorKind::Javascript => "JavaScript",
            RemoteErrorKind::Timeout => "Timeout",
            RemoteErrorKind::Marshalling => "Marshalling",
            RemoteErrorKind::Transport => "Transport",
        };
        f.write_str(label)
    }
}

/// Failure reported by a [`ScriptExecutor`](crate::script::ScriptExecutor).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{kind} error: {message}")]
pub struct RemoteError {
    pub kind: RemoteErrorKind,
    pub message: String,
}

impl RemoteError {
    pub fn new(kind: RemoteErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn javascript(message: impl Into<String>) -> Self {
        Self::new(RemoteErrorKind::Javascript, message)
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        Self::new(RemoteErrorKind::Timeout, message)
    }

    pub fn marshalling(message: impl Into<String>) -> Self {
        Self::new(RemoteErrorKind::Marshalling, message)
    }

    pub fn transport(message: impl Into<String>) -> Self {
        Self::new(RemoteErrorKind::Transport, message)
    }
}
