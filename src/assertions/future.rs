//! Polling helpers for awaitables.
//!
//! Async mocks hand out awaitables that may be settled immediately or stay
//! pending until a test drives them. These helpers observe that without an
//! executor:
//!
//! - [`poll_once`] - Poll a future once and return the result
//! - [`assert_settled!`] - Assert a future is immediately ready
//! - [`assert_pending!`] - Assert a future is not ready
//!
//! # Example
//!
//! ```rust
//! use testkit_mock::mock::AsyncMockFn;
//! use testkit_mock::{assert_pending, assert_settled};
//!
//! let mock: AsyncMockFn<(), u8> = AsyncMockFn::new();
//! mock.mock_resolved_value_once(1);
//! mock.mock_implementation_once(|()| futures::future::pending());
//!
//! assert_eq!(assert_settled!(mock.invoke(()).unwrap()), Ok(1));
//! assert_pending!(mock.invoke(()).unwrap());
//! ```

use std::future::Future;
use std::task::{Context, Poll};

use futures::task::noop_waker;

/// Poll a future once with a no-op waker.
///
/// The future is pinned on the heap, so it need not be `Unpin`. Polling a
/// clone of an [`Awaitable`](crate::mock::Awaitable) drives the shared
/// future, and a clone that settles here counts as awaited.
///
/// # Example
///
/// ```rust
/// use testkit_mock::assertions::poll_once;
/// use std::task::Poll;
///
/// assert_eq!(poll_once(async { 42 }), Poll::Ready(42));
/// ```
pub fn poll_once<F: Future>(future: F) -> Poll<F::Output> {
    let waker = noop_waker();
    let mut cx = Context::from_waker(&waker);
    let mut pinned = Box::pin(future);
    pinned.as_mut().poll(&mut cx)
}

/// Assert that a future is immediately ready and return its output.
///
/// # Panics
///
/// Panics if the future returns `Poll::Pending`.
#[macro_export]
macro_rules! assert_settled {
    ($future:expr) => {{
        match $crate::assertions::poll_once($future) {
            ::std::task::Poll::Ready(value) => value,
            ::std::task::Poll::Pending => {
                panic!("assertion failed: expected future to be settled, but it was pending");
            }
        }
    }};
    ($future:expr, $($arg:tt)+) => {{
        match $crate::assertions::poll_once($future) {
            ::std::task::Poll::Ready(value) => value,
            ::std::task::Poll::Pending => {
                panic!(
                    "assertion failed: expected future to be settled, but it was pending: {}",
                    format_args!($($arg)+)
                );
            }
        }
    }};
}

/// Assert that a future is still pending.
///
/// # Panics
///
/// Panics if the future returns `Poll::Ready`.
#[macro_export]
macro_rules! assert_pending {
    ($future:expr) => {{
        match $crate::assertions::poll_once($future) {
            ::std::task::Poll::Pending => {}
            ::std::task::Poll::Ready(value) => {
                panic!(
                    "assertion failed: expected future to be pending, but it was settled with {:?}",
                    value
                );
            }
        }
    }};
    ($future:expr, $($arg:tt)+) => {{
        match $crate::assertions::poll_once($future) {
            ::std::task::Poll::Pending => {}
            ::std::task::Poll::Ready(value) => {
                panic!(
                    "assertion failed: expected future to be pending, but it was settled with {:?}: {}",
                    value,
                    format_args!($($arg)+)
                );
            }
        }
    }};
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::future::ready;

    use crate::mock::{AsyncMockFn, Awaitable, SettledResult};
    use crate::Error;

    #[test]
    fn test_poll_once_ready() {
        assert_eq!(poll_once(ready(42)), Poll::Ready(42));
    }

    #[test]
    fn test_poll_once_pending() {
        assert_eq!(poll_once(futures::future::pending::<i32>()), Poll::Pending);
    }

    #[test]
    fn test_assert_settled_returns_output() {
        let value = assert_settled!(Awaitable::resolved(3_u8));
        assert_eq!(value, Ok(3));
    }

    #[test]
    #[should_panic(expected = "expected future to be settled")]
    fn test_assert_settled_failure() {
        assert_settled!(futures::future::pending::<i32>());
    }

    #[test]
    fn test_assert_pending_success() {
        assert_pending!(futures::future::pending::<i32>(), "never resolves");
    }

    #[test]
    #[should_panic(expected = "expected future to be pending")]
    fn test_assert_pending_failure() {
        assert_pending!(ready(42));
    }

    #[test]
    fn test_settling_through_poll_is_recorded() {
        let mock: AsyncMockFn<(), u8> = AsyncMockFn::new();
        mock.mock_rejected_value(Error::thrown("nope"));

        let outcome = assert_settled!(mock.invoke(()).unwrap());

        assert_eq!(outcome, Err(Error::thrown("nope")));
        assert_eq!(
            mock.settled_results(),
            vec![SettledResult::Rejected(Error::thrown("nope"))]
        );
    }

    #[test]
    fn test_pending_is_not_recorded() {
        let mock: AsyncMockFn<(), u8> = AsyncMockFn::new();
        mock.mock_implementation(|()| futures::future::pending());

        assert_pending!(mock.invoke(()).unwrap());

        assert_eq!(mock.call_count(), 1);
        assert!(mock.settled_results().is_empty());
    }
}
