//! Sync error type.

use thiserror::Error;
use unipal_core::ParseError;
use unipal_fetch::FetchError;
use unipal_providers::ProviderError;
use unipal_store::StoreError;

/// Errors surfaced by the repository layer.
#[derive(Debug, Error)]
pub enum SyncError {
    /// No usable credentials; the user must sign in again.
    #[error("Sign-in required")]
    ShouldReSignIn,

    /// The cached timetable does not cover the current term.
    #[error("Timetable must be refreshed for the current term")]
    ShouldRefreshTimetable,

    /// Authentication or transport failure.
    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// A fetched page could not be parsed.
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// Cache or keychain failure.
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<ProviderError> for SyncError {
    fn from(err: ProviderError) -> Self {
        match err {
            ProviderError::Fetch(e) => SyncError::Fetch(e),
            ProviderError::Parse(e) => SyncError::Parse(e),
        }
    }
}
