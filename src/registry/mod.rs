//! Bulk lifecycle management for test doubles.
//!
//! A [`MockRegistry`] keeps a handle to every double created through it (or
//! registered with it) and can clear, reset or restore all of them at once.
//! [`MockConfig`] selects an operation to run automatically when a
//! [`RegistryScope`] ends, which is how `#[testkit_mock::test]` restores spies
//! after each test.
//!
//! # Example
//!
//! ```rust
//! use testkit_mock::mock::Method;
//! use testkit_mock::registry::MockRegistry;
//!
//! let send: Method<(String,), usize> = Method::new(|(msg,): (String,)| msg.len());
//! let registry = MockRegistry::new();
//!
//! let spy = registry.spy_on(&send);
//! let counter = registry.fn_mock::<(), u32, ()>();
//!
//! send.call(("hi".to_string(),)).unwrap();
//! counter.invoke(()).unwrap();
//!
//! registry.restore_all_mocks();
//! assert_eq!(spy.call_count(), 0);
//! assert_eq!(counter.call_count(), 0);
//! ```

mod config;

use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::debug;

use crate::mock::{
    replace_property, spy_on, AsyncMockFn, Method, MockFn, MockLifecycle, Property,
    ReplacedProperty, Spy,
};

pub use config::{
    LifecycleAction, MockConfig, CLEAR_MOCKS_ENV, RESET_MOCKS_ENV, RESTORE_MOCKS_ENV,
};

/// A collection of test doubles managed together.
///
/// Cloning produces another handle to the same collection.
#[derive(Clone, Default)]
pub struct MockRegistry {
    entries: Arc<Mutex<Vec<Arc<dyn MockLifecycle>>>>,
}

impl MockRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Track `double` and hand it back.
    pub fn register<M>(&self, double: M) -> M
    where
        M: MockLifecycle + Clone + 'static,
    {
        self.entries.lock().push(Arc::new(double.clone()));
        double
    }

    /// Create and track an unconfigured [`MockFn`].
    pub fn fn_mock<A, R, T>(&self) -> MockFn<A, R, T>
    where
        A: Clone + Send + 'static,
        R: Clone + Send + Sync + 'static,
        T: Clone + Send + Sync + 'static,
    {
        self.register(MockFn::new())
    }

    /// Create and track a [`MockFn`] with a default implementation.
    pub fn fn_mock_from<A, R, T, F>(&self, func: F) -> MockFn<A, R, T>
    where
        A: Clone + Send + 'static,
        R: Clone + Send + Sync + 'static,
        T: Clone + Send + Sync + 'static,
        F: Fn(A) -> R + Send + Sync + 'static,
    {
        self.register(MockFn::from_fn(func))
    }

    /// Create and track an unconfigured [`AsyncMockFn`].
    pub fn async_mock<A, V, T>(&self) -> AsyncMockFn<A, V, T>
    where
        A: Clone + Send + 'static,
        V: Clone + Default + Send + Sync + 'static,
        T: Clone + Send + Sync + 'static,
    {
        self.register(AsyncMockFn::new())
    }

    /// Spy on `method` and track the spy.
    pub fn spy_on<A, R, T>(&self, method: &Method<A, R, T>) -> Spy<A, R, T>
    where
        A: Clone + Send + 'static,
        R: Clone + Default + Send + Sync + 'static,
        T: Clone + Send + Sync + 'static,
    {
        self.register(spy_on(method))
    }

    /// Replace `property` and track the replacement.
    pub fn replace_property<V>(&self, property: &Property<V>, value: V) -> ReplacedProperty<V>
    where
        V: Clone + Send + Sync + 'static,
    {
        self.register(replace_property(property, value))
    }

    /// Number of tracked doubles.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    /// Check if nothing is tracked.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Clear every tracked double.
    pub fn clear_all_mocks(&self) {
        self.apply_action(LifecycleAction::Clear);
    }

    /// Reset every tracked double.
    pub fn reset_all_mocks(&self) {
        self.apply_action(LifecycleAction::Reset);
    }

    /// Restore every tracked double.
    pub fn restore_all_mocks(&self) {
        self.apply_action(LifecycleAction::Restore);
    }

    /// Run the operation selected by `config`, if any.
    pub fn apply(&self, config: &MockConfig) {
        if let Some(action) = config.action() {
            self.apply_action(action);
        }
    }

    /// Run `action` on every tracked double.
    pub fn apply_action(&self, action: LifecycleAction) {
        // Snapshot so doubles may touch the registry while being reset.
        let entries: Vec<_> = self.entries.lock().clone();
        debug!(?action, count = entries.len(), "applying lifecycle action");
        for entry in &entries {
            match action {
                LifecycleAction::Clear => entry.mock_clear(),
                LifecycleAction::Reset => entry.mock_reset(),
                LifecycleAction::Restore => entry.mock_restore(),
            }
        }
    }

    /// Names of every tracked double, in registration order.
    #[must_use]
    pub fn names(&self) -> Vec<String> {
        self.entries
            .lock()
            .iter()
            .map(|entry| entry.get_mock_name())
            .collect()
    }

    /// A guard that applies `config` to this registry when dropped.
    #[must_use]
    pub fn scoped(&self, config: MockConfig) -> RegistryScope {
        RegistryScope {
            registry: self.clone(),
            config,
        }
    }
}

impl fmt::Debug for MockRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MockRegistry")
            .field("mocks", &self.names())
            .finish()
    }
}

/// Applies a [`MockConfig`] to a registry when dropped, including while
/// unwinding from a panic.
#[derive(Debug)]
pub struct RegistryScope {
    registry: MockRegistry,
    config: MockConfig,
}

impl RegistryScope {
    /// The registry this scope manages.
    #[must_use]
    pub fn registry(&self) -> &MockRegistry {
        &self.registry
    }
}

impl Drop for RegistryScope {
    fn drop(&mut self) {
        self.registry.apply(&self.config);
    }
}
