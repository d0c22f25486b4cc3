//! Assertions over recorded invocations.
//!
//! Every check comes in two forms: a `check_*` function returning
//! [`Result<()>`](crate::Result) with an [`Error::AssertionFailed`] describing
//! the mismatch, and a panicking `assert_*!` macro built on it.
//!
//! # Example
//!
//! ```rust
//! use testkit_mock::mock::MockFn;
//! use testkit_mock::{assert_called_times, assert_called_with, assert_returned_with};
//!
//! let double: MockFn<(i32,), i32> = MockFn::from_fn(|(x,)| x * 2);
//! double.invoke((4,)).unwrap();
//!
//! assert_called_times!(double, 1);
//! assert_called_with!(double, (4,));
//! assert_returned_with!(double, 8);
//! ```

use std::fmt::Debug;

use crate::error::{Error, Result};
use crate::mock::{AsyncMockFn, MockFn, MockResult, SettledResult, Spy};

/// Read access to a double's recorded history.
///
/// Implemented by [`MockFn`], [`AsyncMockFn`] and [`Spy`].
pub trait Recorded {
    /// Argument tuple type.
    type Args;
    /// Immediate return type.
    type Output;

    /// Arguments of every invocation.
    fn recorded_calls(&self) -> Vec<Self::Args>;

    /// Outcome of every invocation.
    fn recorded_results(&self) -> Vec<MockResult<Self::Output>>;

    /// Global order number of every invocation.
    fn recorded_order(&self) -> Vec<u64>;

    /// Display name used in failure messages.
    fn recorded_name(&self) -> String;
}

impl<A, R, T> Recorded for MockFn<A, R, T>
where
    A: Clone + Send + 'static,
    R: Clone + Send + Sync + 'static,
    T: Clone + Send + Sync + 'static,
{
    type Args = A;
    type Output = R;

    fn recorded_calls(&self) -> Vec<A> {
        self.calls()
    }

    fn recorded_results(&self) -> Vec<MockResult<R>> {
        self.results()
    }

    fn recorded_order(&self) -> Vec<u64> {
        self.invocation_call_order()
    }

    fn recorded_name(&self) -> String {
        self.get_mock_name()
    }
}

impl<A, V, T> Recorded for AsyncMockFn<A, V, T>
where
    A: Clone + Send + 'static,
    V: Clone + Default + Send + Sync + 'static,
    T: Clone + Send + Sync + 'static,
{
    type Args = A;
    type Output = crate::mock::Awaitable<V>;

    fn recorded_calls(&self) -> Vec<A> {
        self.calls()
    }

    fn recorded_results(&self) -> Vec<MockResult<Self::Output>> {
        self.results()
    }

    fn recorded_order(&self) -> Vec<u64> {
        self.invocation_call_order()
    }

    fn recorded_name(&self) -> String {
        self.get_mock_name()
    }
}

impl<A, R, T> Recorded for Spy<A, R, T>
where
    A: Clone + Send + 'static,
    R: Clone + Default + Send + Sync + 'static,
    T: Clone + Send + Sync + 'static,
{
    type Args = A;
    type Output = R;

    fn recorded_calls(&self) -> Vec<A> {
        self.mock().calls()
    }

    fn recorded_results(&self) -> Vec<MockResult<R>> {
        self.mock().results()
    }

    fn recorded_order(&self) -> Vec<u64> {
        self.mock().invocation_call_order()
    }

    fn recorded_name(&self) -> String {
        self.mock().get_mock_name()
    }
}

/// Check that `mock` was invoked at least once.
///
/// # Errors
///
/// Returns [`Error::AssertionFailed`] if it was never invoked.
pub fn check_called<M: Recorded>(mock: &M) -> Result<()> {
    if mock.recorded_calls().is_empty() {
        return Err(Error::assertion_failed(format!(
            "expected {} to have been called, but it was not called",
            mock.recorded_name()
        )));
    }
    Ok(())
}

/// Check that `mock` was never invoked.
///
/// # Errors
///
/// Returns [`Error::AssertionFailed`] listing the recorded calls otherwise.
pub fn check_not_called<M>(mock: &M) -> Result<()>
where
    M: Recorded,
    M::Args: Debug,
{
    let calls = mock.recorded_calls();
    if !calls.is_empty() {
        return Err(Error::assertion_failed(format!(
            "expected {} not to have been called, but it was called {} time(s): {calls:?}",
            mock.recorded_name(),
            calls.len()
        )));
    }
    Ok(())
}

/// Check that `mock` was invoked exactly `times` times.
///
/// # Errors
///
/// Returns [`Error::AssertionFailed`] with the actual count otherwise.
pub fn check_called_times<M: Recorded>(mock: &M, times: usize) -> Result<()> {
    let actual = mock.recorded_calls().len();
    if actual != times {
        return Err(Error::assertion_failed(format!(
            "expected {} to have been called {times} time(s), but it was called {actual} time(s)",
            mock.recorded_name()
        )));
    }
    Ok(())
}

/// Check that some invocation of `mock` received `args`.
///
/// # Errors
///
/// Returns [`Error::AssertionFailed`] listing the recorded calls otherwise.
pub fn check_called_with<M>(mock: &M, args: &M::Args) -> Result<()>
where
    M: Recorded,
    M::Args: PartialEq + Debug,
{
    let calls = mock.recorded_calls();
    if !calls.iter().any(|call| call == args) {
        return Err(Error::assertion_failed(format!(
            "expected {} to have been called with {args:?}, recorded calls: {calls:?}",
            mock.recorded_name()
        )));
    }
    Ok(())
}

/// Check that the most recent invocation of `mock` received `args`.
///
/// # Errors
///
/// Returns [`Error::AssertionFailed`] if `mock` was never invoked or the last
/// call differs.
pub fn check_last_called_with<M>(mock: &M, args: &M::Args) -> Result<()>
where
    M: Recorded,
    M::Args: PartialEq + Debug,
{
    match mock.recorded_calls().last() {
        Some(last) if last == args => Ok(()),
        Some(last) => Err(Error::assertion_failed(format!(
            "expected last call of {} to be {args:?}, but it was {last:?}",
            mock.recorded_name()
        ))),
        None => Err(Error::assertion_failed(format!(
            "expected last call of {} to be {args:?}, but it was not called",
            mock.recorded_name()
        ))),
    }
}

/// Check that the `nth` invocation of `mock` received `args`.
///
/// `nth` counts from 1.
///
/// # Errors
///
/// Returns [`Error::AssertionFailed`] if `nth` is 0, there were fewer than
/// `nth` calls, or that call differs.
pub fn check_nth_called_with<M>(mock: &M, nth: usize, args: &M::Args) -> Result<()>
where
    M: Recorded,
    M::Args: PartialEq + Debug,
{
    if nth == 0 {
        return Err(Error::assertion_failed(
            "call positions start at 1, got 0".to_string(),
        ));
    }
    let calls = mock.recorded_calls();
    match calls.get(nth - 1) {
        Some(call) if call == args => Ok(()),
        Some(call) => Err(Error::assertion_failed(format!(
            "expected call {nth} of {} to be {args:?}, but it was {call:?}",
            mock.recorded_name()
        ))),
        None => Err(Error::assertion_failed(format!(
            "expected call {nth} of {} to be {args:?}, but it was called {} time(s)",
            mock.recorded_name(),
            calls.len()
        ))),
    }
}

/// Check that some invocation of `mock` returned `value`.
///
/// Thrown and incomplete invocations never match.
///
/// # Errors
///
/// Returns [`Error::AssertionFailed`] listing the recorded results otherwise.
pub fn check_returned_with<M>(mock: &M, value: &M::Output) -> Result<()>
where
    M: Recorded,
    M::Output: PartialEq + Debug,
{
    let results = mock.recorded_results();
    if !results.iter().any(|result| result.value() == Some(value)) {
        return Err(Error::assertion_failed(format!(
            "expected {} to have returned {value:?}, recorded results: {results:?}",
            mock.recorded_name()
        )));
    }
    Ok(())
}

/// Check that some awaited invocation of `mock` fulfilled with `value`.
///
/// # Errors
///
/// Returns [`Error::AssertionFailed`] listing the settled results otherwise.
pub fn check_resolved_with<A, V, T>(mock: &AsyncMockFn<A, V, T>, value: &V) -> Result<()>
where
    A: Clone + Send + 'static,
    V: Clone + Default + PartialEq + Debug + Send + Sync + 'static,
    T: Clone + Send + Sync + 'static,
{
    let settled = mock.settled_results();
    let found = settled
        .iter()
        .any(|result| matches!(result, SettledResult::Fulfilled(v) if v == value));
    if !found {
        return Err(Error::assertion_failed(format!(
            "expected {} to have resolved to {value:?}, settled results: {settled:?}",
            mock.get_mock_name()
        )));
    }
    Ok(())
}

/// Check that the first invocation of `first` happened before the first
/// invocation of `second`.
///
/// # Errors
///
/// Returns [`Error::AssertionFailed`] if either was never invoked or the
/// order is reversed.
pub fn check_called_before<M, N>(first: &M, second: &N) -> Result<()>
where
    M: Recorded,
    N: Recorded,
{
    let (Some(a), Some(b)) = (
        first.recorded_order().first().copied(),
        second.recorded_order().first().copied(),
    ) else {
        return Err(Error::assertion_failed(format!(
            "expected {} to have been called before {}, but one of them was not called",
            first.recorded_name(),
            second.recorded_name()
        )));
    };
    if a >= b {
        return Err(Error::assertion_failed(format!(
            "expected {} (order {a}) to have been called before {} (order {b})",
            first.recorded_name(),
            second.recorded_name()
        )));
    }
    Ok(())
}

/// Assert that a mock was called at least once.
///
/// # Panics
///
/// Panics if the mock was never called.
#[macro_export]
macro_rules! assert_called {
    ($mock:expr) => {
        if let Err(err) = $crate::assertions::check_called(&$mock) {
            panic!("{}", err);
        }
    };
}

/// Assert that a mock was never called.
///
/// # Panics
///
/// Panics if the mock was called.
#[macro_export]
macro_rules! assert_not_called {
    ($mock:expr) => {
        if let Err(err) = $crate::assertions::check_not_called(&$mock) {
            panic!("{}", err);
        }
    };
}

/// Assert that a mock was called exactly `n` times.
///
/// # Panics
///
/// Panics if the count differs.
#[macro_export]
macro_rules! assert_called_times {
    ($mock:expr, $times:expr) => {
        if let Err(err) = $crate::assertions::check_called_times(&$mock, $times) {
            panic!("{}", err);
        }
    };
}

/// Assert that some call of a mock received the given argument tuple.
///
/// # Panics
///
/// Panics if no recorded call matches.
#[macro_export]
macro_rules! assert_called_with {
    ($mock:expr, $args:expr) => {
        if let Err(err) = $crate::assertions::check_called_with(&$mock, &$args) {
            panic!("{}", err);
        }
    };
}

/// Assert that the last call of a mock received the given argument tuple.
///
/// # Panics
///
/// Panics if the mock was not called or the last call differs.
#[macro_export]
macro_rules! assert_last_called_with {
    ($mock:expr, $args:expr) => {
        if let Err(err) = $crate::assertions::check_last_called_with(&$mock, &$args) {
            panic!("{}", err);
        }
    };
}

/// Assert that the `n`th call (1-based) of a mock received the given argument
/// tuple.
///
/// # Panics
///
/// Panics if there is no such call or it differs.
#[macro_export]
macro_rules! assert_nth_called_with {
    ($mock:expr, $nth:expr, $args:expr) => {
        if let Err(err) = $crate::assertions::check_nth_called_with(&$mock, $nth, &$args) {
            panic!("{}", err);
        }
    };
}

/// Assert that some call of a mock returned the given value.
///
/// # Panics
///
/// Panics if no recorded result matches.
#[macro_export]
macro_rules! assert_returned_with {
    ($mock:expr, $value:expr) => {
        if let Err(err) = $crate::assertions::check_returned_with(&$mock, &$value) {
            panic!("{}", err);
        }
    };
}

/// Assert that some awaited call of an async mock resolved to the given value.
///
/// # Panics
///
/// Panics if no settled result matches.
#[macro_export]
macro_rules! assert_resolved_with {
    ($mock:expr, $value:expr) => {
        if let Err(err) = $crate::assertions::check_resolved_with(&$mock, &$value) {
            panic!("{}", err);
        }
    };
}

/// Assert that one mock was first called before another.
///
/// # Panics
///
/// Panics if either was not called or the order is reversed.
#[macro_export]
macro_rules! assert_called_before {
    ($first:expr, $second:expr) => {
        if let Err(err) = $crate::assertions::check_called_before(&$first, &$second) {
            panic!("{}", err);
        }
    };
}
