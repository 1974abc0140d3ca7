//! Error types
//!
//! Storage and signal failures never reach the player: the guard turns
//! storage errors into a redirect and signal errors are dropped.

use thiserror::Error;

/// Key/value storage failure
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StorageError {
    /// No storage area (no window, storage disabled, private mode)
    #[error("storage unavailable")]
    Unavailable,
    /// The storage area threw while reading or writing a key
    #[error("storage access failed for `{key}`: {message}")]
    Access { key: String, message: String },
    /// A stored value did not have the expected shape
    #[error("malformed value under `{key}`: {message}")]
    Malformed { key: String, message: String },
    /// A value could not be serialized for writing
    #[error("failed to encode value for `{key}`: {message}")]
    Encode { key: String, message: String },
}

/// Transition signal could not be emitted
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SignalError {
    #[error("no window to dispatch on")]
    NoWindow,
    #[error("failed to dispatch `{event}`: {message}")]
    Dispatch { event: String, message: String },
}

/// Progress bookkeeping failure
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProgressError {
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error("level {0} is not a completable level")]
    LevelOutOfRange(u32),
}
