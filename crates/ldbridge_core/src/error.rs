//! Error types for the bridge core.

use rocksdb::ErrorKind;
use thiserror::Error;

/// Result type for core operations.
pub type BridgeResult<T> = Result<T, BridgeError>;

/// Errors that can occur while driving the engine.
///
/// Not-found is deliberately absent: reads report it as `Ok(None)`.
#[derive(Debug, Error)]
pub enum BridgeError {
    /// The engine returned a non-ok status. The message is the engine's own
    /// status string.
    #[error("{0}")]
    Engine(#[from] rocksdb::Error),

    /// Key or value was requested from a cursor that is not positioned.
    #[error("Cursor is not valid")]
    CursorNotValid,

    /// An argument was rejected before reaching the engine.
    #[error("invalid argument: {message}")]
    InvalidArgument {
        /// Description of the rejected argument.
        message: String,
    },

    /// A snapshot was released against a database that did not create it.
    #[error("snapshot does not belong to this database")]
    ForeignSnapshot,
}

/// Classification of an engine status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusKind {
    /// Key not present.
    NotFound,
    /// On-disk data failed validation.
    Corruption,
    /// Operation unsupported by the engine build.
    NotSupported,
    /// The engine rejected an argument or the path state.
    InvalidArgument,
    /// Filesystem failure.
    IoError,
    /// Anything else.
    Other,
}

impl From<ErrorKind> for StatusKind {
    fn from(kind: ErrorKind) -> Self {
        match kind {
            ErrorKind::NotFound => StatusKind::NotFound,
            ErrorKind::Corruption => StatusKind::Corruption,
            ErrorKind::NotSupported => StatusKind::NotSupported,
            ErrorKind::InvalidArgument => StatusKind::InvalidArgument,
            ErrorKind::IOError => StatusKind::IoError,
            _ => StatusKind::Other,
        }
    }
}

impl BridgeError {
    /// Creates an invalid argument error.
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    /// Returns the engine status classification, if this is an engine error.
    pub fn status_kind(&self) -> Option<StatusKind> {
        match self {
            Self::Engine(err) => Some(err.kind().into()),
            _ => None,
        }
    }

    /// Returns true if the engine reported corruption.
    pub fn is_corruption(&self) -> bool {
        self.status_kind() == Some(StatusKind::Corruption)
    }

    /// Returns true if the engine reported a missing key.
    pub fn is_not_found(&self) -> bool {
        self.status_kind() == Some(StatusKind::NotFound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cursor_message() {
        assert_eq!(BridgeError::CursorNotValid.to_string(), "Cursor is not valid");
    }

    #[test]
    fn invalid_argument_message() {
        let err = BridgeError::invalid_argument("cache size must be positive");
        assert_eq!(
            err.to_string(),
            "invalid argument: cache size must be positive"
        );
    }

    #[test]
    fn bridge_errors_have_no_status() {
        assert_eq!(BridgeError::CursorNotValid.status_kind(), None);
        assert!(!BridgeError::ForeignSnapshot.is_corruption());
        assert!(!BridgeError::invalid_argument("x").is_not_found());
    }

    #[test]
    fn kind_mapping() {
        assert_eq!(StatusKind::from(ErrorKind::Corruption), StatusKind::Corruption);
        assert_eq!(StatusKind::from(ErrorKind::IOError), StatusKind::IoError);
        assert_eq!(StatusKind::from(ErrorKind::Busy), StatusKind::Other);
    }
}
