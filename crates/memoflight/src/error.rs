// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! The error shared by every caller coalesced onto a failed fetch.

use std::error::Error as StdError;
use std::fmt;
use std::sync::Arc;

/// A fetch function's error, as observed through the cache.
///
/// When a fetch fails, every caller coalesced onto it receives a clone of the
/// same `FetchError`; the fetch is not re-run per waiter and the failure is
/// not cached. The original error is reachable through
/// [`source()`][StdError::source] or, typed, through [`source_as`][Self::source_as].
///
/// # Examples
///
/// ```
/// use memoflight::FetchError;
///
/// let error = FetchError::caused_by(std::io::Error::other("connection pool exhausted"));
///
/// assert!(error.to_string().contains("connection pool exhausted"));
/// assert!(error.source_as::<std::io::Error>().is_some());
/// ```
#[derive(Clone)]
pub struct FetchError {
    cause: Arc<dyn StdError + Send + Sync>,
}

impl FetchError {
    /// Wraps the error a fetch function failed with.
    pub fn caused_by(cause: impl Into<Box<dyn StdError + Send + Sync>>) -> Self {
        Self {
            cause: Arc::from(cause.into()),
        }
    }

    /// Returns the original fetch error if it is a `T`.
    ///
    /// This is how the layer above the cache recovers its own error type from
    /// a shared failure, rather than reporting a generic one.
    #[must_use]
    pub fn source_as<T: StdError + 'static>(&self) -> Option<&T> {
        self.cause.downcast_ref::<T>()
    }
}

impl fmt::Debug for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("FetchError").field(&self.cause).finish()
    }
}

impl fmt::Display for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.cause, f)
    }
}

impl StdError for FetchError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        let cause: &(dyn StdError + 'static) = self.cause.as_ref();
        Some(cause)
    }
}

/// A specialized [`Result`](std::result::Result) for cache lookups.
pub type Result<T> = std::result::Result<T, FetchError>;
