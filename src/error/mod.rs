//! Error definitions
//!
//! This module provides the error type shared by mocks, spies and assertions.
//! A mock implementation "throws" by returning `Err(Error)`, which is why the
//! type is `Clone` and `PartialEq`: every thrown or rejected value is also
//! recorded in the mock's history.

use thiserror::Error;

/// Main error type for testkit-mock
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Value thrown (or rejected) by a mock implementation
    #[error("{0}")]
    Thrown(String),

    /// Assertion failed
    #[error("Assertion failed: {0}")]
    AssertionFailed(String),

    /// Mock misuse
    #[error("Mock error: {0}")]
    Mock(String),
}

impl Error {
    /// Create an error value for an implementation to throw.
    ///
    /// ```rust
    /// use testkit_mock::Error;
    ///
    /// let err = Error::thrown("boom");
    /// assert_eq!(err.to_string(), "boom");
    /// ```
    #[must_use]
    pub fn thrown(message: impl Into<String>) -> Self {
        Self::Thrown(message.into())
    }

    /// Create an assertion failure error.
    #[must_use]
    pub fn assertion_failed(message: impl Into<String>) -> Self {
        Self::AssertionFailed(message.into())
    }

    /// Create a mock misuse error.
    #[must_use]
    pub fn mock(message: impl Into<String>) -> Self {
        Self::Mock(message.into())
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;
