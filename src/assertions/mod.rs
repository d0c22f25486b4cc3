//! Assertions over mock history.
//!
//! This module provides assertion utilities for test doubles:
//!
//! - [`assert_called!`] / [`assert_not_called!`] - Whether a mock ran
//! - [`assert_called_times!`] - Exact invocation count
//! - [`assert_called_with!`], [`assert_last_called_with!`],
//!   [`assert_nth_called_with!`] - Argument matching
//! - [`assert_returned_with!`] / [`assert_resolved_with!`] - Outcome matching
//! - [`assert_called_before!`] - Ordering across mocks
//! - [`assert_settled!`] / [`assert_pending!`] - Awaitable state
//! - [`poll_once`] - Poll a future once and return the result
//!
//! # Call Assertions
//!
//! ```rust
//! use testkit_mock::mock::MockFn;
//! use testkit_mock::{assert_called_before, assert_nth_called_with};
//!
//! let open: MockFn<(&str,), ()> = MockFn::new();
//! let close: MockFn<(), ()> = MockFn::new();
//!
//! open.invoke(("a.txt",)).unwrap();
//! open.invoke(("b.txt",)).unwrap();
//! close.invoke(()).unwrap();
//!
//! assert_nth_called_with!(open, 2, ("b.txt",));
//! assert_called_before!(open, close);
//! ```
//!
//! # Non-panicking Checks
//!
//! ```rust
//! use testkit_mock::assertions::check_called;
//! use testkit_mock::mock::MockFn;
//! use testkit_mock::Error;
//!
//! let mock: MockFn<(), ()> = MockFn::new();
//! assert!(matches!(check_called(&mock), Err(Error::AssertionFailed(_))));
//! ```

mod calls;
mod future;

pub use calls::{
    check_called, check_called_before, check_called_times, check_called_with,
    check_last_called_with, check_not_called, check_nth_called_with, check_resolved_with,
    check_returned_with, Recorded,
};
pub use future::poll_once;
