//! Cloneable futures returned by async mocks.

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use futures::future::{BoxFuture, Shared};
use futures::FutureExt;

use crate::error::{Error, Result};

/// A shared, cloneable future resolving to `Result<V>`.
///
/// Every clone observes the same settlement, so a copy can be kept in a
/// mock's history while another is handed to the caller. Polling any clone
/// drives the underlying future.
///
/// # Example
///
/// ```rust
/// use testkit_mock::mock::Awaitable;
///
/// let value = Awaitable::resolved(5);
/// let copy = value.clone();
///
/// assert_eq!(futures::executor::block_on(value), Ok(5));
/// assert_eq!(copy.peek(), Some(&Ok(5)));
/// ```
pub struct Awaitable<V> {
    inner: Shared<BoxFuture<'static, Result<V>>>,
}

/// The outcome of an awaitable once it has been awaited.
#[derive(Debug, Clone, PartialEq)]
pub enum SettledResult<V> {
    /// The awaitable resolved to a value.
    Fulfilled(V),
    /// The awaitable rejected with an error.
    Rejected(Error),
}

impl<V> SettledResult<V> {
    /// The fulfilled value, if any.
    pub fn value(&self) -> Option<&V> {
        match self {
            Self::Fulfilled(value) => Some(value),
            Self::Rejected(_) => None,
        }
    }

    /// Whether the awaitable was rejected.
    #[must_use]
    pub fn is_rejected(&self) -> bool {
        matches!(self, Self::Rejected(_))
    }
}

impl<V: Clone> From<&Result<V>> for SettledResult<V> {
    fn from(outcome: &Result<V>) -> Self {
        match outcome {
            Ok(value) => Self::Fulfilled(value.clone()),
            Err(err) => Self::Rejected(err.clone()),
        }
    }
}

impl<V> Awaitable<V>
where
    V: Clone + Send + Sync + 'static,
{
    /// Wrap a future.
    pub fn new<F>(future: F) -> Self
    where
        F: Future<Output = Result<V>> + Send + 'static,
    {
        Self {
            inner: future.boxed().shared(),
        }
    }

    /// An awaitable that is already fulfilled with `value`.
    pub fn resolved(value: V) -> Self {
        Self::new(futures::future::ready(Ok(value)))
    }

    /// An awaitable that is already rejected with `error`.
    #[must_use]
    pub fn rejected(error: Error) -> Self {
        Self::new(futures::future::ready(Err(error)))
    }

    /// The settled outcome, if some clone has already been awaited to
    /// completion.
    pub fn peek(&self) -> Option<&Result<V>> {
        self.inner.peek()
    }

    /// Whether the awaitable has settled.
    #[must_use]
    pub fn is_settled(&self) -> bool {
        self.peek().is_some()
    }

    /// A clone that runs `on_settle` when it is awaited to completion.
    pub(crate) fn observed<F>(&self, on_settle: F) -> Self
    where
        F: FnOnce(&Result<V>) + Send + 'static,
    {
        Self::new(self.clone().inspect(on_settle))
    }
}

impl<V> Clone for Awaitable<V> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<V: Clone> Future for Awaitable<V> {
    type Output = Result<V>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.inner).poll(cx)
    }
}

/// Resolves to `V::default()`, standing in for "no value" on async mocks.
impl<V> Default for Awaitable<V>
where
    V: Clone + Default + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::resolved(V::default())
    }
}

impl<V: Clone + fmt::Debug> fmt::Debug for Awaitable<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.inner.peek() {
            Some(outcome) => f.debug_tuple("Awaitable").field(outcome).finish(),
            None => f.write_str("Awaitable(<pending>)"),
        }
    }
}

/// Two awaitables are equal when they share one underlying future.
impl<V: Clone> PartialEq for Awaitable<V> {
    fn eq(&self, other: &Self) -> bool {
        self.inner.ptr_eq(&other.inner)
    }
}
