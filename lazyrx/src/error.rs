use thiserror::Error;

/// Errors carried by a [`Lazy`](crate::Lazy) slot or raised while waiting on one.
///
/// Loaders store these in [`Lazy::error`](crate::Lazy::error); the stream
/// operators only ever produce [`LazyError::Incomplete`].
#[derive(Error, Debug, Clone, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum LazyError {
    /// A general load failure with a message describing what went wrong.
    #[error("{0}")]
    Error(String),

    /// The load produced `None` when a value was expected.
    #[error("Load returned None!")]
    None,

    /// The load was cancelled before completion.
    #[error("Load was cancelled!")]
    Cancelled,

    /// The load did not finish before its deadline.
    #[error("deadline has elapsed!")]
    Timeout,

    /// The observed source completed before the awaited condition held.
    #[error("source completed before the lazy value was ready")]
    Incomplete,
}

impl LazyError {
    pub fn error(message: impl Into<String>) -> Self {
        LazyError::Error(message.into())
    }

    /// Returns true if this error represents a None result.
    pub fn is_none(&self) -> bool {
        matches!(self, LazyError::None)
    }

    pub fn is_error(&self) -> bool {
        matches!(self, LazyError::Error(_))
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, LazyError::Cancelled)
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, LazyError::Timeout)
    }

    pub fn is_incomplete(&self) -> bool {
        matches!(self, LazyError::Incomplete)
    }
}
