// Allow must_use_candidate since spy methods often have useful side effects
#![allow(clippy::must_use_candidate)]

//! Spies on replaceable methods.
//!
//! A [`Method`] is a slot holding the implementation production code calls
//! through. [`spy_on`] swaps a recording mock into that slot; the mock keeps
//! calling the original until configured otherwise, and
//! [`Spy::mock_restore`] puts the original back. Spying on a method that is
//! already spied returns the installed spy.
//!
//! # Example
//!
//! ```rust
//! use testkit_mock::mock::{spy_on, Method};
//!
//! struct Greeter {
//!     greet: Method<(String,), String>,
//! }
//!
//! let greeter = Greeter {
//!     greet: Method::new(|(name,): (String,)| format!("hello {name}")),
//! };
//!
//! let spy = spy_on(&greeter.greet);
//! assert_eq!(greeter.greet.call(("ann".to_string(),)), Ok("hello ann".to_string()));
//! assert_eq!(spy.mock().calls(), vec![("ann".to_string(),)]);
//!
//! spy.mock().mock_return_value("hi".to_string());
//! assert_eq!(greeter.greet.call(("bo".to_string(),)), Ok("hi".to_string()));
//!
//! spy.mock_restore();
//! assert_eq!(greeter.greet.call(("cy".to_string(),)), Ok("hello cy".to_string()));
//! assert_eq!(spy.mock().call_count(), 0);
//! ```

use std::fmt;
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use tracing::debug;

use super::implementation::Implementation;
use super::lifecycle::MockLifecycle;
use super::mock_fn::MockFn;
use crate::error::Result;

/// A replaceable method.
///
/// Clones share the slot, so a spy installed through one handle is seen by
/// every other.
pub struct Method<A, R, T = ()> {
    slot: Arc<RwLock<Implementation<A, R, T>>>,
    spy: Arc<Mutex<Option<Installed<A, R, T>>>>,
}

/// The spy currently occupying a method slot.
struct Installed<A, R, T> {
    mock: MockFn<A, R, T>,
    original: Implementation<A, R, T>,
    recorder: Implementation<A, R, T>,
}

impl<A, R, T> Method<A, R, T>
where
    A: 'static,
    R: 'static,
    T: 'static,
{
    /// Create a method from an infallible function.
    pub fn new<F>(func: F) -> Self
    where
        F: Fn(A) -> R + Send + Sync + 'static,
    {
        Self::from_implementation(Implementation::new(func))
    }

    /// Create a method from an arbitrary implementation.
    pub fn from_implementation(implementation: Implementation<A, R, T>) -> Self {
        Self {
            slot: Arc::new(RwLock::new(implementation)),
            spy: Arc::new(Mutex::new(None)),
        }
    }

    /// Call the method with a default receiver.
    ///
    /// # Errors
    ///
    /// Returns whatever error the current implementation throws.
    pub fn call(&self, args: A) -> Result<R>
    where
        T: Default,
    {
        self.call_with(&T::default(), args)
    }

    /// Call the method on `this`.
    ///
    /// # Errors
    ///
    /// Returns whatever error the current implementation throws.
    pub fn call_with(&self, this: &T, args: A) -> Result<R> {
        // Clone out of the slot so the implementation may replace it.
        let implementation = self.current();
        implementation.call(this, args)
    }

    /// The implementation currently installed.
    pub fn current(&self) -> Implementation<A, R, T> {
        self.slot.read().clone()
    }

    /// Install `implementation`, returning the previous one.
    pub fn replace(&self, implementation: Implementation<A, R, T>) -> Implementation<A, R, T> {
        std::mem::replace(&mut *self.slot.write(), implementation)
    }
}

impl<A, R, T> Clone for Method<A, R, T> {
    fn clone(&self) -> Self {
        Self {
            slot: Arc::clone(&self.slot),
            spy: Arc::clone(&self.spy),
        }
    }
}

impl<A, R, T> fmt::Debug for Method<A, R, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Method")
            .field("current", &*self.slot.read())
            .finish()
    }
}

/// A mock installed into a [`Method`] slot.
///
/// Created by [`spy_on`]. The spy's mock starts with the method's original
/// implementation as both its default and its original, so calls pass
/// through until the mock is configured otherwise.
pub struct Spy<A, R, T = ()> {
    mock: MockFn<A, R, T>,
    method: Method<A, R, T>,
    original: Implementation<A, R, T>,
    recorder: Implementation<A, R, T>,
}

/// Install a recording spy into `method`.
///
/// If the slot still holds a spy installed earlier, a handle to that spy is
/// returned instead of stacking a second recorder on top of it.
pub fn spy_on<A, R, T>(method: &Method<A, R, T>) -> Spy<A, R, T>
where
    A: Clone + Send + 'static,
    R: Clone + Default + Send + Sync + 'static,
    T: Clone + Send + Sync + 'static,
{
    let mut installed = method.spy.lock();
    if let Some(existing) = installed.as_ref() {
        if method.current().ptr_eq(&existing.recorder) {
            debug!(mock = %existing.mock.get_mock_name(), "spy reused");
            return Spy {
                mock: existing.mock.clone(),
                method: method.clone(),
                original: existing.original.clone(),
                recorder: existing.recorder.clone(),
            };
        }
    }

    let original = method.current();
    let mock = MockFn::from_implementation(original.clone());
    let handle = mock.clone();
    let recorder = Implementation::with_receiver(move |this: &T, args: A| {
        handle.invoke_with(this.clone(), args)
    });
    method.replace(recorder.clone());
    debug!(mock = %mock.get_mock_name(), "spy installed");

    *installed = Some(Installed {
        mock: mock.clone(),
        original: original.clone(),
        recorder: recorder.clone(),
    });
    Spy {
        mock,
        method: method.clone(),
        original,
        recorder,
    }
}

impl<A, R, T> Spy<A, R, T>
where
    A: Clone + Send + 'static,
    R: Clone + Default + Send + Sync + 'static,
    T: Clone + Send + Sync + 'static,
{
    /// The recording mock behind the spy.
    pub fn mock(&self) -> &MockFn<A, R, T> {
        &self.mock
    }

    /// The original implementation of the spied method.
    pub fn original(&self) -> &Implementation<A, R, T> {
        &self.original
    }

    /// Check if the spied method was called at least once.
    #[must_use]
    pub fn was_called(&self) -> bool {
        self.mock.was_called()
    }

    /// Get the number of times the spied method was called.
    #[must_use]
    pub fn call_count(&self) -> usize {
        self.mock.call_count()
    }

    /// Forget recorded calls.
    pub fn mock_clear(&self) {
        self.mock.mock_clear();
    }

    /// Forget calls and behavior; the method now returns `R::default()`.
    pub fn mock_reset(&self) {
        self.mock.mock_reset();
    }

    /// Put the original implementation back into the method slot.
    ///
    /// The mock is reset to call the original too, so a handle kept to it
    /// still behaves like the real method. A slot that no longer holds this
    /// spy's recorder is left as it is.
    pub fn mock_restore(&self) {
        self.mock.mock_restore();
        let mut installed = self.method.spy.lock();
        if installed
            .as_ref()
            .is_some_and(|spy| spy.recorder.ptr_eq(&self.recorder))
        {
            *installed = None;
        }
        if self.method.current().ptr_eq(&self.recorder) {
            self.method.replace(self.original.clone());
            debug!(mock = %self.mock.get_mock_name(), "spy restored");
        }
    }
}

impl<A, R, T> Clone for Spy<A, R, T> {
    fn clone(&self) -> Self {
        Self {
            mock: self.mock.clone(),
            method: self.method.clone(),
            original: self.original.clone(),
            recorder: self.recorder.clone(),
        }
    }
}

impl<A, R, T> fmt::Debug for Spy<A, R, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Spy")
            .field("mock", &self.mock)
            .field("original", &self.original)
            .finish()
    }
}

impl<A, R, T> MockLifecycle for Spy<A, R, T>
where
    A: Clone + Send + 'static,
    R: Clone + Default + Send + Sync + 'static,
    T: Clone + Send + Sync + 'static,
{
    fn mock_clear(&self) {
        Spy::mock_clear(self);
    }

    fn mock_reset(&self) {
        Spy::mock_reset(self);
    }

    fn mock_restore(&self) {
        Spy::mock_restore(self);
    }

    fn get_mock_name(&self) -> String {
        self.mock.get_mock_name()
    }
}
