//! Store error type.

use thiserror::Error;

/// Errors raised by the cache and credential stores.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Filesystem failure.
    #[error("Storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A value could not be encoded or decoded.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// System keychain failure.
    #[error("Keychain error: {0}")]
    Keyring(#[from] keyring::Error),
}
