// Allow must_use_candidate since mock configuration methods return `&Self`
// for chaining and are routinely called for their side effect alone
#![allow(clippy::must_use_candidate)]

//! Mocks of async functions.
//!
//! An [`AsyncMockFn`] is a [`MockFn`] whose return values are [`Awaitable`]s.
//! The immediate outcome of each invocation is recorded in
//! [`results`](AsyncMockFn::results) as `Return(awaitable)`; the eventual
//! outcome is appended to [`settled_results`](AsyncMockFn::settled_results)
//! once the caller awaits it. A rejection therefore never turns a `results`
//! entry into `Throw`.
//!
//! # Example
//!
//! ```rust
//! use testkit_mock::mock::{AsyncMockFn, SettledResult};
//! use testkit_mock::Error;
//!
//! # futures::executor::block_on(async {
//! let fetch: AsyncMockFn<(u32,), String> = AsyncMockFn::new();
//! fetch.mock_rejected_value_once(Error::thrown("offline"));
//!
//! let outcome = fetch.invoke((1,)).unwrap().await;
//!
//! assert_eq!(outcome, Err(Error::thrown("offline")));
//! assert!(fetch.results()[0].is_return());
//! assert_eq!(
//!     fetch.settled_results(),
//!     vec![SettledResult::Rejected(Error::thrown("offline"))]
//! );
//! # });
//! ```

use std::fmt;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;

use super::awaitable::{Awaitable, SettledResult};
use super::implementation::Implementation;
use super::lifecycle::MockLifecycle;
use super::mock_fn::MockFn;
use super::order::CallOrder;
use super::state::{MockResult, MockState};
use crate::error::{Error, Result};

/// A mock of an async function.
///
/// Cloning produces another handle to the same mock.
pub struct AsyncMockFn<A, V, T = ()> {
    mock: MockFn<A, Awaitable<V>, T>,
    settled: Arc<SettledLog<V>>,
}

struct SettledLog<V> {
    entries: Mutex<Vec<SettledResult<V>>>,
    generation: AtomicU64,
}

impl<V: Clone> SettledLog<V> {
    fn record(&self, generation: u64, outcome: &Result<V>) {
        let mut entries = self.entries.lock();
        // Checked under the lock so a concurrent clear cannot interleave.
        if self.generation.load(Ordering::SeqCst) == generation {
            entries.push(SettledResult::from(outcome));
        }
    }

    fn clear(&self) {
        let mut entries = self.entries.lock();
        entries.clear();
        self.generation.fetch_add(1, Ordering::SeqCst);
    }
}

impl<A, V, T> AsyncMockFn<A, V, T>
where
    A: Clone + Send + 'static,
    V: Clone + Default + Send + Sync + 'static,
    T: Clone + Send + Sync + 'static,
{
    /// Create an async mock whose invocations resolve to `V::default()`.
    pub fn new() -> Self {
        Self::from_mock(MockFn::new())
    }

    /// Create an async mock whose default implementation is `func`.
    ///
    /// # Example
    ///
    /// ```rust
    /// use testkit_mock::mock::AsyncMockFn;
    ///
    /// # futures::executor::block_on(async {
    /// let double: AsyncMockFn<(u32,), u32> = AsyncMockFn::from_fn(|(x,)| async move { Ok(x * 2) });
    /// assert_eq!(double.invoke((4,)).unwrap().await, Ok(8));
    /// # });
    /// ```
    pub fn from_fn<F, Fut>(func: F) -> Self
    where
        F: Fn(A) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<V>> + Send + 'static,
    {
        Self::from_mock(MockFn::from_implementation(Self::wrap(func)))
    }

    /// Build an async mock around an existing [`MockFn`], e.g. one created
    /// with [`MockFn::builder`].
    pub fn from_mock(mock: MockFn<A, Awaitable<V>, T>) -> Self {
        Self {
            mock,
            settled: Arc::new(SettledLog {
                entries: Mutex::new(Vec::new()),
                generation: AtomicU64::new(0),
            }),
        }
    }

    fn wrap<F, Fut>(func: F) -> Implementation<A, Awaitable<V>, T>
    where
        F: Fn(A) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<V>> + Send + 'static,
    {
        Implementation::new(move |args: A| Awaitable::new(func(args)))
    }

    // =========================================================================
    // Invocation
    // =========================================================================

    /// Invoke the mock with a default receiver.
    ///
    /// # Errors
    ///
    /// Returns an error only if the implementation throws synchronously.
    /// Rejections surface when the returned awaitable is awaited.
    pub fn invoke(&self, args: A) -> Result<Awaitable<V>>
    where
        T: Default,
    {
        self.invoke_with(T::default(), args)
    }

    /// Invoke the mock with an explicit receiver.
    ///
    /// # Errors
    ///
    /// Returns an error only if the implementation throws synchronously.
    pub fn invoke_with(&self, this: T, args: A) -> Result<Awaitable<V>> {
        let generation = self.settled.generation.load(Ordering::SeqCst);
        let log = Arc::clone(&self.settled);
        self.mock.invoke_mapped(this, args, move |awaitable| {
            awaitable.observed(move |outcome| log.record(generation, outcome))
        })
    }

    // =========================================================================
    // Behavior
    // =========================================================================

    /// Queue an async implementation for a single invocation.
    pub fn mock_implementation_once<F, Fut>(&self, func: F) -> &Self
    where
        F: Fn(A) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<V>> + Send + 'static,
    {
        self.mock.use_implementation_once(Self::wrap(func));
        self
    }

    /// Replace the default async implementation.
    pub fn mock_implementation<F, Fut>(&self, func: F) -> &Self
    where
        F: Fn(A) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<V>> + Send + 'static,
    {
        self.mock.use_implementation(Self::wrap(func));
        self
    }

    /// Queue an already-fulfilled result for a single invocation.
    pub fn mock_resolved_value_once(&self, value: V) -> &Self {
        self.mock.use_implementation_once(Implementation::new(move |_: A| {
            Awaitable::resolved(value.clone())
        }));
        self
    }

    /// Make every default invocation resolve to `value`.
    pub fn mock_resolved_value(&self, value: V) -> &Self {
        self.mock.use_implementation(Implementation::new(move |_: A| {
            Awaitable::resolved(value.clone())
        }));
        self
    }

    /// Queue an already-rejected result for a single invocation.
    pub fn mock_rejected_value_once(&self, error: Error) -> &Self {
        self.mock.use_implementation_once(Implementation::new(move |_: A| {
            Awaitable::rejected(error.clone())
        }));
        self
    }

    /// Make every default invocation reject with `error`.
    pub fn mock_rejected_value(&self, error: Error) -> &Self {
        self.mock.use_implementation(Implementation::new(move |_: A| {
            Awaitable::rejected(error.clone())
        }));
        self
    }

    /// The default implementation set on this mock, if any.
    pub fn get_mock_implementation(&self) -> Option<Implementation<A, Awaitable<V>, T>> {
        self.mock.get_mock_implementation()
    }

    /// Run `callback` with `func` overriding every other implementation
    /// until `callback` returns.
    pub fn with_implementation<F, Fut, C, O>(&self, func: F, callback: C) -> O
    where
        F: Fn(A) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<V>> + Send + 'static,
        C: FnOnce() -> O,
    {
        self.mock
            .with_implementation(move |args: A| Awaitable::new(func(args)), callback)
    }

    /// Run `callback` with `func` overriding every other implementation
    /// until the future returned by `callback` completes.
    pub async fn with_implementation_async<F, Fut, C, CFut>(
        &self,
        func: F,
        callback: C,
    ) -> CFut::Output
    where
        F: Fn(A) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<V>> + Send + 'static,
        C: FnOnce() -> CFut,
        CFut: Future,
    {
        self.mock
            .with_implementation_async(move |args: A| Awaitable::new(func(args)), callback)
            .await
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    /// Forget recorded history, including settled results.
    pub fn mock_clear(&self) {
        self.mock.mock_clear();
        self.settled.clear();
    }

    /// Clear and drop every configured implementation.
    pub fn mock_reset(&self) {
        self.mock.mock_reset();
        self.settled.clear();
    }

    /// Reset and reinstate the implementation given at creation.
    pub fn mock_restore(&self) {
        self.mock.mock_restore();
        self.settled.clear();
    }

    /// Set the mock name.
    pub fn mock_name(&self, name: impl Into<String>) -> &Self {
        self.mock.mock_name(name);
        self
    }

    /// The mock's name.
    pub fn get_mock_name(&self) -> String {
        self.mock.get_mock_name()
    }

    // =========================================================================
    // Inspection
    // =========================================================================

    /// Settled outcome of every awaited invocation, in settlement order.
    pub fn settled_results(&self) -> Vec<SettledResult<V>> {
        self.settled.entries.lock().clone()
    }

    /// Snapshot of the synchronous history.
    pub fn mock(&self) -> MockState<A, Awaitable<V>, T> {
        self.mock.mock()
    }

    /// Arguments of every invocation.
    pub fn calls(&self) -> Vec<A> {
        self.mock.calls()
    }

    /// Immediate outcome of every invocation.
    pub fn results(&self) -> Vec<MockResult<Awaitable<V>>> {
        self.mock.results()
    }

    /// Receiver of every invocation.
    pub fn contexts(&self) -> Vec<T> {
        self.mock.contexts()
    }

    /// Global order number of every invocation.
    pub fn invocation_call_order(&self) -> Vec<u64> {
        self.mock.invocation_call_order()
    }

    /// Arguments of the most recent invocation.
    pub fn last_call(&self) -> Option<A> {
        self.mock.last_call()
    }

    /// Number of recorded invocations.
    #[must_use]
    pub fn call_count(&self) -> usize {
        self.mock.call_count()
    }

    /// The order source this mock draws from.
    pub fn call_order(&self) -> &CallOrder {
        self.mock.call_order()
    }

    /// The underlying synchronous mock.
    pub fn as_mock(&self) -> &MockFn<A, Awaitable<V>, T> {
        &self.mock
    }
}

impl<A, V, T> Default for AsyncMockFn<A, V, T>
where
    A: Clone + Send + 'static,
    V: Clone + Default + Send + Sync + 'static,
    T: Clone + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<A, V, T> Clone for AsyncMockFn<A, V, T> {
    fn clone(&self) -> Self {
        Self {
            mock: self.mock.clone(),
            settled: Arc::clone(&self.settled),
        }
    }
}

impl<A, V, T> fmt::Debug for AsyncMockFn<A, V, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AsyncMockFn")
            .field("mock", &self.mock)
            .field("settled", &self.settled.entries.lock().len())
            .finish()
    }
}

impl<A, V, T> MockLifecycle for AsyncMockFn<A, V, T>
where
    A: Clone + Send + 'static,
    V: Clone + Default + Send + Sync + 'static,
    T: Clone + Send + Sync + 'static,
{
    fn mock_clear(&self) {
        AsyncMockFn::mock_clear(self);
    }

    fn mock_reset(&self) {
        AsyncMockFn::mock_reset(self);
    }

    fn mock_restore(&self) {
        AsyncMockFn::mock_restore(self);
    }

    fn get_mock_name(&self) -> String {
        AsyncMockFn::get_mock_name(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assertions::poll_once;

    #[tokio::test]
    async fn test_unconfigured_resolves_to_default() {
        let mock: AsyncMockFn<(), u32> = AsyncMockFn::new();
        assert_eq!(mock.invoke(()).unwrap().await, Ok(0));
        assert_eq!(mock.settled_results(), vec![SettledResult::Fulfilled(0)]);
    }

    #[tokio::test]
    async fn test_resolved_value_once_then_default() {
        let mock: AsyncMockFn<(), &str> = AsyncMockFn::new();
        mock.mock_resolved_value("default")
            .mock_resolved_value_once("first")
            .mock_resolved_value_once("second");

        let mut seen = Vec::new();
        for _ in 0..3 {
            seen.push(mock.invoke(()).unwrap().await.unwrap());
        }

        assert_eq!(seen, vec!["first", "second", "default"]);
    }

    #[tokio::test]
    async fn test_rejection_recorded_only_in_settled() {
        let mock: AsyncMockFn<(), String> = AsyncMockFn::new();
        mock.mock_rejected_value_once(Error::thrown("x"));

        let awaited = async {
            let value = mock.invoke(())?.await?;
            Ok::<_, Error>(value)
        }
        .await;

        assert_eq!(awaited, Err(Error::thrown("x")));
        assert!(mock.results()[0].is_return());
        assert_eq!(
            mock.settled_results(),
            vec![SettledResult::Rejected(Error::thrown("x"))]
        );
    }

    #[test]
    fn test_settled_only_after_await() {
        let mock: AsyncMockFn<(), u8> = AsyncMockFn::new();
        mock.mock_resolved_value(1);

        let first = mock.invoke(()).unwrap();
        let _second = mock.invoke(()).unwrap();

        assert_eq!(mock.results().len(), 2);
        assert!(mock.settled_results().is_empty());

        assert_eq!(futures::executor::block_on(first), Ok(1));
        assert_eq!(mock.settled_results(), vec![SettledResult::Fulfilled(1)]);
    }

    #[test]
    fn test_pending_result_stays_unsettled() {
        let (tx, rx) = futures::channel::oneshot::channel::<u8>();
        let rx = futures::future::FutureExt::shared(rx);
        let mock: AsyncMockFn<(), u8> = AsyncMockFn::new();
        mock.mock_implementation_once(move |()| {
            let rx = rx.clone();
            async move { rx.await.map_err(|_| Error::thrown("canceled")) }
        });

        let pending = mock.invoke(()).unwrap();
        assert!(poll_once(pending.clone()).is_pending());
        assert!(mock.settled_results().is_empty());
        assert!(mock.results()[0].is_return());

        tx.send(5).unwrap();
        assert_eq!(futures::executor::block_on(pending), Ok(5));
        assert_eq!(mock.settled_results(), vec![SettledResult::Fulfilled(5)]);
    }

    #[tokio::test]
    async fn test_results_hold_same_awaitable_outcome() {
        let mock: AsyncMockFn<(), u8> = AsyncMockFn::new();
        mock.mock_resolved_value_once(3);

        mock.invoke(()).unwrap().await.unwrap();

        let recorded = mock.results()[0].value().cloned().unwrap();
        assert_eq!(recorded.peek(), Some(&Ok(3)));
    }

    #[tokio::test]
    async fn test_recorded_awaitable_is_returned_awaitable() {
        let mock: AsyncMockFn<(), u8> = AsyncMockFn::new();
        mock.mock_resolved_value(1);

        let returned = mock.invoke(()).unwrap();
        let recorded = mock.results()[0].value().cloned().unwrap();
        assert_eq!(recorded, returned);
        assert!(crate::assertions::check_returned_with(&mock, &returned).is_ok());

        assert_eq!(recorded.await, Ok(1));
        assert_eq!(mock.settled_results(), vec![SettledResult::Fulfilled(1)]);

        assert_eq!(returned.await, Ok(1));
        assert_eq!(mock.settled_results(), vec![SettledResult::Fulfilled(1)]);
    }

    #[tokio::test]
    async fn test_get_mock_implementation_and_sync_override() {
        let mock: AsyncMockFn<(), u32> = AsyncMockFn::new();
        assert!(mock.get_mock_implementation().is_none());

        mock.mock_resolved_value(1);
        assert!(mock.get_mock_implementation().is_some());

        let inside = mock.with_implementation(|()| async { Ok(5) }, || mock.invoke(()).unwrap());
        assert_eq!(inside.await, Ok(5));
        assert_eq!(mock.invoke(()).unwrap().await, Ok(1));
    }

    #[tokio::test]
    async fn test_async_implementation() {
        let mock: AsyncMockFn<(u32, u32), u32> = AsyncMockFn::from_fn(|(a, b)| async move {
            tokio::task::yield_now().await;
            Ok(a + b)
        });

        assert_eq!(mock.invoke((2, 3)).unwrap().await, Ok(5));
        assert_eq!(mock.calls(), vec![(2, 3)]);
    }

    #[tokio::test]
    async fn test_restore_returns_to_original() {
        let mock: AsyncMockFn<(), u32> = AsyncMockFn::from_fn(|()| async { Ok(10) });
        mock.mock_resolved_value(99);
        assert_eq!(mock.invoke(()).unwrap().await, Ok(99));

        mock.mock_reset();
        assert_eq!(mock.invoke(()).unwrap().await, Ok(0));

        mock.mock_restore();
        assert!(mock.settled_results().is_empty());
        assert_eq!(mock.invoke(()).unwrap().await, Ok(10));
    }

    #[tokio::test]
    async fn test_clear_before_await_discards_settlement() {
        let mock: AsyncMockFn<(), u32> = AsyncMockFn::new();
        let awaitable = mock.invoke(()).unwrap();

        mock.mock_clear();
        awaitable.await.unwrap();

        assert!(mock.settled_results().is_empty());
        assert!(mock.calls().is_empty());
    }

    #[tokio::test]
    async fn test_with_implementation_async() {
        let mock: AsyncMockFn<(), u32> = AsyncMockFn::new();
        mock.mock_resolved_value(1);

        let inside = mock
            .with_implementation_async(|()| async { Ok(2) }, || async {
                mock.invoke(()).unwrap().await
            })
            .await;

        assert_eq!(inside, Ok(2));
        assert_eq!(mock.invoke(()).unwrap().await, Ok(1));
    }

    #[test]
    fn test_debug() {
        let mock: AsyncMockFn<(), u32> = AsyncMockFn::new();
        mock.mock_name("fetch");
        let debug = format!("{mock:?}");
        assert!(debug.contains("AsyncMockFn"));
        assert!(debug.contains("fetch"));
    }
}
