//! Provider error type.

use thiserror::Error;
use unipal_core::ParseError;
use unipal_fetch::FetchError;

/// Errors raised by the per-service fetchers.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// Authentication or transport failure.
    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// A fetched page could not be parsed.
    #[error(transparent)]
    Parse(#[from] ParseError),
}
