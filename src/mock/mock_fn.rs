// Allow must_use_candidate since mock configuration methods return `&Self`
// for chaining and are routinely called for their side effect alone
#![allow(clippy::must_use_candidate)]

//! The mock function recorder and resolver.
//!
//! A [`MockFn`] records every invocation (arguments, receiver, outcome and a
//! global order number) and decides what each invocation does:
//!
//! 1. an implementation installed by [`MockFn::with_implementation`], if one
//!    is active;
//! 2. otherwise the front of the one-shot queue (`*_once` methods);
//! 3. otherwise the default implementation;
//! 4. otherwise a no-op returning `R::default()`.
//!
//! # Example
//!
//! ```rust
//! use testkit_mock::mock::MockFn;
//!
//! let mock: MockFn<(i32,), &str> = MockFn::new();
//! mock.mock_return_value_once("first")
//!     .mock_return_value_once("second")
//!     .mock_return_value("default");
//!
//! assert_eq!(mock.invoke((1,)), Ok("first"));
//! assert_eq!(mock.invoke((2,)), Ok("second"));
//! assert_eq!(mock.invoke((3,)), Ok("default"));
//! assert_eq!(mock.invoke((4,)), Ok("default"));
//! assert_eq!(mock.calls(), vec![(1,), (2,), (3,), (4,)]);
//! ```

use std::collections::VecDeque;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, trace};

use super::implementation::Implementation;
use super::lifecycle::MockLifecycle;
use super::order::CallOrder;
use super::state::{History, MockResult, MockState};
use crate::error::{Error, Result};

/// Name reported by mocks that were never given one.
pub const DEFAULT_MOCK_NAME: &str = "mock_fn()";

/// A recording, configurable stand-in for a function.
///
/// # Type Parameters
///
/// - `A` - The argument tuple, e.g. `(i32, String)`
/// - `R` - The return type; `R::default()` stands in for "no value"
/// - `T` - The receiver type passed alongside the arguments (default `()`)
///
/// Cloning a `MockFn` produces another handle to the same mock: calls through
/// either handle land in one history.
pub struct MockFn<A, R, T = ()> {
    inner: Arc<Inner<A, R, T>>,
}

struct Inner<A, R, T> {
    shared: Mutex<Shared<A, R, T>>,
    order: CallOrder,
}

struct Shared<A, R, T> {
    history: History<A, R, T>,
    behavior: Behavior<A, R, T>,
}

struct Behavior<A, R, T> {
    once: VecDeque<Implementation<A, R, T>>,
    default: Option<Implementation<A, R, T>>,
    original: Option<Implementation<A, R, T>>,
    overrides: Vec<(u64, Implementation<A, R, T>)>,
    next_override: u64,
    name: Option<String>,
}

/// Where the implementation for an invocation came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Source {
    Override,
    Once,
    Default,
    Noop,
}

impl<A, R, T> Behavior<A, R, T> {
    fn new(original: Option<Implementation<A, R, T>>) -> Self {
        Self {
            once: VecDeque::new(),
            default: original.clone(),
            original,
            overrides: Vec::new(),
            next_override: 0,
            name: None,
        }
    }

    fn select(&mut self) -> (Source, Option<Implementation<A, R, T>>) {
        if let Some((_, implementation)) = self.overrides.last() {
            return (Source::Override, Some(implementation.clone()));
        }
        if let Some(implementation) = self.once.pop_front() {
            return (Source::Once, Some(implementation));
        }
        match &self.default {
            Some(implementation) => (Source::Default, Some(implementation.clone())),
            None => (Source::Noop, None),
        }
    }

    fn name(&self) -> &str {
        self.name.as_deref().unwrap_or(DEFAULT_MOCK_NAME)
    }
}

impl<A, R, T> MockFn<A, R, T>
where
    A: Clone + Send + 'static,
    R: Clone + Send + Sync + 'static,
    T: Clone + Send + Sync + 'static,
{
    /// Create a mock with no implementation.
    ///
    /// Every invocation returns `R::default()` until configured otherwise.
    pub fn new() -> Self {
        Self::builder().build()
    }

    /// Create a mock whose default implementation is `func`.
    ///
    /// `func` is also the original implementation reinstated by
    /// [`mock_restore`](Self::mock_restore).
    ///
    /// # Example
    ///
    /// ```rust
    /// use testkit_mock::mock::MockFn;
    ///
    /// let mock: MockFn<(i32,), i32> = MockFn::from_fn(|(x,)| x + 1);
    /// assert_eq!(mock.invoke((1,)), Ok(2));
    /// ```
    pub fn from_fn<F>(func: F) -> Self
    where
        F: Fn(A) -> R + Send + Sync + 'static,
    {
        Self::from_implementation(Implementation::new(func))
    }

    /// Create a mock seeded with an arbitrary implementation.
    pub fn from_implementation(implementation: Implementation<A, R, T>) -> Self {
        Self::builder().with_implementation(implementation).build()
    }

    /// Start building a mock.
    pub fn builder() -> MockBuilder<A, R, T> {
        MockBuilder::new()
    }

    // =========================================================================
    // Invocation
    // =========================================================================

    /// Invoke the mock with a default receiver.
    ///
    /// # Errors
    ///
    /// Returns the error thrown by the selected implementation.
    pub fn invoke(&self, args: A) -> Result<R>
    where
        R: Default,
        T: Default,
    {
        self.invoke_with(T::default(), args)
    }

    /// Invoke the mock with an explicit receiver.
    ///
    /// The receiver is recorded in [`contexts`](Self::contexts) and handed to
    /// the implementation.
    ///
    /// # Errors
    ///
    /// Returns the error thrown by the selected implementation. The error is
    /// also recorded as [`MockResult::Throw`].
    pub fn invoke_with(&self, this: T, args: A) -> Result<R>
    where
        R: Default,
    {
        self.dispatch(this, args, |value| value, |_, _| {})
    }

    /// Invoke with `map` applied to a returned value before it is recorded,
    /// so the recorded result and the caller's value are the same.
    pub(super) fn invoke_mapped<M>(&self, this: T, args: A, map: M) -> Result<R>
    where
        R: Default,
        M: FnOnce(R) -> R,
    {
        self.dispatch(this, args, map, |_, _| {})
    }

    /// Shared bookkeeping for plain and constructor invocations.
    ///
    /// `on_return` runs under the state lock after a normal return, and only
    /// if the history was not cleared while the implementation ran.
    fn dispatch<M, F>(&self, this: T, args: A, map: M, on_return: F) -> Result<R>
    where
        R: Default,
        M: FnOnce(R) -> R,
        F: FnOnce(&mut MockState<A, R, T>, &R),
    {
        let (generation, index, implementation) = {
            let mut shared = self.inner.shared.lock();
            let order = self.inner.order.next();
            let index = shared.history.begin(order, args.clone(), this.clone());
            let (source, implementation) = shared.behavior.select();
            trace!(
                mock = shared.behavior.name(),
                order,
                source = ?source,
                "mock invoked"
            );
            (shared.history.generation, index, implementation)
        };

        // The lock is released while user code runs so implementations can
        // inspect or reconfigure their own mock.
        let outcome = match implementation {
            Some(implementation) => implementation.call(&this, args),
            None => Ok(R::default()),
        }
        .map(map);

        let mut shared = self.inner.shared.lock();
        if shared.history.finish(generation, index, &outcome) {
            if let Ok(value) = &outcome {
                on_return(&mut shared.history.state, value);
            }
        }
        outcome
    }

    // =========================================================================
    // One-shot implementations
    // =========================================================================

    /// Queue an implementation for a single invocation.
    ///
    /// Queued implementations are consumed in the order they were added and
    /// take precedence over the default implementation.
    pub fn mock_implementation_once<F>(&self, func: F) -> &Self
    where
        F: Fn(A) -> R + Send + Sync + 'static,
    {
        self.use_implementation_once(Implementation::new(func))
    }

    /// Queue a value to return from a single invocation.
    pub fn mock_return_value_once(&self, value: R) -> &Self {
        self.use_implementation_once(Implementation::returning(value))
    }

    /// Queue an error to throw from a single invocation.
    pub fn mock_throw_once(&self, error: Error) -> &Self {
        self.use_implementation_once(Implementation::throwing(error))
    }

    /// Queue an arbitrary implementation for a single invocation.
    pub fn use_implementation_once(&self, implementation: Implementation<A, R, T>) -> &Self {
        self.inner.shared.lock().behavior.once.push_back(implementation);
        self
    }

    // =========================================================================
    // Default implementation
    // =========================================================================

    /// Replace the default implementation.
    ///
    /// The default is used whenever the one-shot queue is empty.
    pub fn mock_implementation<F>(&self, func: F) -> &Self
    where
        F: Fn(A) -> R + Send + Sync + 'static,
    {
        self.use_implementation(Implementation::new(func))
    }

    /// Make every default invocation return `value`.
    pub fn mock_return_value(&self, value: R) -> &Self {
        self.use_implementation(Implementation::returning(value))
    }

    /// Make every default invocation throw `error`.
    pub fn mock_throw(&self, error: Error) -> &Self {
        self.use_implementation(Implementation::throwing(error))
    }

    /// Replace the default implementation with an arbitrary one.
    pub fn use_implementation(&self, implementation: Implementation<A, R, T>) -> &Self {
        self.inner.shared.lock().behavior.default = Some(implementation);
        self
    }

    /// The default implementation set on this mock, if any.
    ///
    /// A mock that was never given a default reports `None`, even though
    /// invocations still run the built-in no-op.
    pub fn get_mock_implementation(&self) -> Option<Implementation<A, R, T>> {
        self.inner.shared.lock().behavior.default.clone()
    }

    // =========================================================================
    // Temporary overrides
    // =========================================================================

    /// Run `callback` with `func` overriding every other implementation.
    ///
    /// The override is removed when `callback` returns or unwinds. Neither
    /// the one-shot queue nor the default is consumed or changed. Nested
    /// overrides stack: the innermost one wins while it is installed.
    ///
    /// # Example
    ///
    /// ```rust
    /// use testkit_mock::mock::MockFn;
    ///
    /// let mock: MockFn<(), &str> = MockFn::from_fn(|()| "inner");
    ///
    /// mock.with_implementation(|()| "temp", || {
    ///     assert_eq!(mock.invoke(()), Ok("temp"));
    /// });
    ///
    /// assert_eq!(mock.invoke(()), Ok("inner"));
    /// ```
    pub fn with_implementation<F, C, O>(&self, func: F, callback: C) -> O
    where
        F: Fn(A) -> R + Send + Sync + 'static,
        C: FnOnce() -> O,
    {
        let _scope = self.install_override(Implementation::new(func));
        callback()
    }

    /// Async form of [`with_implementation`](Self::with_implementation).
    ///
    /// The override stays installed until the future returned by `callback`
    /// completes, so the result must be awaited before relying on the
    /// previous behavior again.
    pub async fn with_implementation_async<F, C, Fut>(&self, func: F, callback: C) -> Fut::Output
    where
        F: Fn(A) -> R + Send + Sync + 'static,
        C: FnOnce() -> Fut,
        Fut: Future,
    {
        let _scope = self.install_override(Implementation::new(func));
        callback().await
    }

    fn install_override(&self, implementation: Implementation<A, R, T>) -> OverrideScope<A, R, T> {
        let mut shared = self.inner.shared.lock();
        let id = shared.behavior.next_override;
        shared.behavior.next_override += 1;
        shared.behavior.overrides.push((id, implementation));
        debug!(
            mock = shared.behavior.name(),
            depth = shared.behavior.overrides.len(),
            "installed temporary implementation"
        );
        OverrideScope {
            inner: Arc::clone(&self.inner),
            id,
        }
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    /// Forget every recorded invocation.
    ///
    /// Implementations (queued, default and overrides) are left untouched.
    pub fn mock_clear(&self) {
        let mut shared = self.inner.shared.lock();
        shared.history.clear();
        debug!(mock = shared.behavior.name(), "mock cleared");
    }

    /// Clear, then drop every queued implementation and the default.
    ///
    /// Afterwards invocations return `R::default()`.
    pub fn mock_reset(&self) {
        let mut shared = self.inner.shared.lock();
        shared.history.clear();
        shared.behavior.once.clear();
        shared.behavior.default = None;
        debug!(mock = shared.behavior.name(), "mock reset");
    }

    /// Reset, then reinstate the implementation given at creation.
    pub fn mock_restore(&self) {
        let mut shared = self.inner.shared.lock();
        shared.history.clear();
        shared.behavior.once.clear();
        shared.behavior.default = shared.behavior.original.clone();
        debug!(
            mock = shared.behavior.name(),
            has_original = shared.behavior.original.is_some(),
            "mock restored"
        );
    }

    /// Set the name reported by [`get_mock_name`](Self::get_mock_name).
    pub fn mock_name(&self, name: impl Into<String>) -> &Self {
        self.inner.shared.lock().behavior.name = Some(name.into());
        self
    }

    /// The mock's name, or [`DEFAULT_MOCK_NAME`] if none was set.
    pub fn get_mock_name(&self) -> String {
        self.inner.shared.lock().behavior.name().to_string()
    }

    // =========================================================================
    // Inspection
    // =========================================================================

    /// Snapshot of everything recorded so far.
    pub fn mock(&self) -> MockState<A, R, T> {
        self.inner.shared.lock().history.state.clone()
    }

    /// Arguments of every invocation, oldest first.
    pub fn calls(&self) -> Vec<A> {
        self.inner.shared.lock().history.state.calls.clone()
    }

    /// Outcome of every invocation, aligned with [`calls`](Self::calls).
    pub fn results(&self) -> Vec<MockResult<R>> {
        self.inner.shared.lock().history.state.results.clone()
    }

    /// Receiver of every invocation.
    pub fn contexts(&self) -> Vec<T> {
        self.inner.shared.lock().history.state.contexts.clone()
    }

    /// Receivers recorded by constructor invocations.
    pub fn instances(&self) -> Vec<T> {
        self.inner.shared.lock().history.state.instances.clone()
    }

    /// Global order number of every invocation.
    pub fn invocation_call_order(&self) -> Vec<u64> {
        self.inner
            .shared
            .lock()
            .history
            .state
            .invocation_call_order
            .clone()
    }

    /// Arguments of the most recent invocation.
    pub fn last_call(&self) -> Option<A> {
        self.inner.shared.lock().history.state.last_call().cloned()
    }

    /// Arguments of the Nth invocation (0-indexed).
    pub fn nth_call(&self, n: usize) -> Option<A> {
        self.inner.shared.lock().history.state.calls.get(n).cloned()
    }

    /// Number of recorded invocations.
    #[must_use]
    pub fn call_count(&self) -> usize {
        self.inner.shared.lock().history.state.calls.len()
    }

    /// Check if the mock was invoked at least once.
    #[must_use]
    pub fn was_called(&self) -> bool {
        self.call_count() > 0
    }

    /// Number of one-shot implementations still queued.
    #[must_use]
    pub fn pending_once(&self) -> usize {
        self.inner.shared.lock().behavior.once.len()
    }

    /// The order source this mock draws from.
    pub fn call_order(&self) -> &CallOrder {
        &self.inner.order
    }
}

impl<A, T> MockFn<A, Option<T>, T>
where
    A: Clone + Send + 'static,
    T: Clone + Send + Sync + 'static,
{
    /// Invoke the mock as a constructor.
    ///
    /// `this` is the freshly created receiver. If the implementation returns
    /// `None` the receiver is recorded in [`instances`](Self::instances) and
    /// returned. If it returns `Some(object)`, that object is the result and
    /// `instances` is left alone.
    ///
    /// # Errors
    ///
    /// Returns the error thrown by the selected implementation.
    ///
    /// # Example
    ///
    /// ```rust
    /// use testkit_mock::mock::MockFn;
    ///
    /// #[derive(Clone, Debug, Default, PartialEq)]
    /// struct Widget { id: u32 }
    ///
    /// let ctor: MockFn<(), Option<Widget>, Widget> = MockFn::new();
    /// let widget = ctor.construct(Widget { id: 1 }, ()).unwrap();
    ///
    /// assert_eq!(widget, Widget { id: 1 });
    /// assert_eq!(ctor.instances(), vec![Widget { id: 1 }]);
    /// ```
    pub fn construct(&self, this: T, args: A) -> Result<T> {
        let receiver = this.clone();
        let produced = self.dispatch(this, args, |value| value, |state, returned| {
            if returned.is_none() {
                state.instances.push(receiver.clone());
            }
        })?;
        Ok(produced.unwrap_or(receiver))
    }
}

impl<A, T> MockFn<A, T, T>
where
    A: Clone + Send + 'static,
    T: Clone + Send + Sync + 'static,
{
    /// Make every default invocation return its receiver.
    pub fn mock_return_this(&self) -> &Self {
        self.use_implementation(Implementation::returning_this())
    }
}

impl<A, R, T> Default for MockFn<A, R, T>
where
    A: Clone + Send + 'static,
    R: Clone + Send + Sync + 'static,
    T: Clone + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<A, R, T> Clone for MockFn<A, R, T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<A, R, T> fmt::Debug for MockFn<A, R, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let shared = self.inner.shared.lock();
        f.debug_struct("MockFn")
            .field("name", &shared.behavior.name())
            .field("call_count", &shared.history.state.calls.len())
            .field("pending_once", &shared.behavior.once.len())
            .field("has_default", &shared.behavior.default.is_some())
            .field("overrides", &shared.behavior.overrides.len())
            .finish()
    }
}

impl<A, R, T> MockLifecycle for MockFn<A, R, T>
where
    A: Clone + Send + 'static,
    R: Clone + Send + Sync + 'static,
    T: Clone + Send + Sync + 'static,
{
    fn mock_clear(&self) {
        MockFn::mock_clear(self);
    }

    fn mock_reset(&self) {
        MockFn::mock_reset(self);
    }

    fn mock_restore(&self) {
        MockFn::mock_restore(self);
    }

    fn get_mock_name(&self) -> String {
        MockFn::get_mock_name(self)
    }
}

/// Removes a temporary implementation when dropped.
struct OverrideScope<A, R, T> {
    inner: Arc<Inner<A, R, T>>,
    id: u64,
}

impl<A, R, T> Drop for OverrideScope<A, R, T> {
    fn drop(&mut self) {
        let mut shared = self.inner.shared.lock();
        shared.behavior.overrides.retain(|(id, _)| *id != self.id);
        debug!(
            mock = shared.behavior.name(),
            depth = shared.behavior.overrides.len(),
            "removed temporary implementation"
        );
    }
}

/// Builder for [`MockFn`].
///
/// # Example
///
/// ```rust
/// use testkit_mock::mock::{CallOrder, MockFn};
///
/// let mock: MockFn<(), u8> = MockFn::builder()
///     .with_name("fetch")
///     .with_call_order(CallOrder::isolated())
///     .build();
///
/// assert_eq!(mock.get_mock_name(), "fetch");
/// ```
pub struct MockBuilder<A, R, T = ()> {
    name: Option<String>,
    order: CallOrder,
    implementation: Option<Implementation<A, R, T>>,
}

impl<A, R, T> MockBuilder<A, R, T>
where
    A: Clone + Send + 'static,
    R: Clone + Send + Sync + 'static,
    T: Clone + Send + Sync + 'static,
{
    /// Create a builder for an unnamed mock on the global order source.
    #[must_use]
    pub fn new() -> Self {
        Self {
            name: None,
            order: CallOrder::global(),
            implementation: None,
        }
    }

    /// Set the mock name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Draw order numbers from `order` instead of the global source.
    #[must_use]
    pub fn with_call_order(mut self, order: CallOrder) -> Self {
        self.order = order;
        self
    }

    /// Seed the default (and original) implementation.
    #[must_use]
    pub fn with_implementation(mut self, implementation: Implementation<A, R, T>) -> Self {
        self.implementation = Some(implementation);
        self
    }

    /// Build the mock.
    #[must_use]
    pub fn build(self) -> MockFn<A, R, T> {
        let mut behavior = Behavior::new(self.implementation);
        behavior.name = self.name;
        MockFn {
            inner: Arc::new(Inner {
                shared: Mutex::new(Shared {
                    history: History::new(),
                    behavior,
                }),
                order: self.order,
            }),
        }
    }
}

impl<A, R, T> Default for MockBuilder<A, R, T>
where
    A: Clone + Send + 'static,
    R: Clone + Send + Sync + 'static,
    T: Clone + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}
