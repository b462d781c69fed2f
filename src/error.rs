//! Error types for kalpa

use thiserror::Error;

/// Result type alias for kalpa operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in kalpa operations
///
/// Absence conditions (missing key, stored type mismatch, out-of-range
/// version on a read) are not errors; `get` reports them as `None`.
#[derive(Error, Debug)]
pub enum Error {
    #[error("key must not be empty")]
    EmptyKey,

    #[error("version out of range: requested {requested}, latest is {latest}")]
    VersionOutOfRange { requested: usize, latest: usize },
}
