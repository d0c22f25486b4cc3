//! Mock functions, spies and replaced properties.
//!
//! This module provides the test doubles:
//!
//! - [`MockFn`] - Recording mock function with one-shot and default behavior
//! - [`AsyncMockFn`] - Mock of an async function, tracking settled outcomes
//! - [`Spy`] - Recording mock installed into a replaceable [`Method`]
//! - [`ReplacedProperty`] - Temporarily replaced [`Property`] value
//! - [`CallOrder`] - Global invocation ordering shared across mocks
//!
//! # Mock Functions
//!
//! ```rust
//! use testkit_mock::mock::{MockFn, MockResult};
//!
//! let add: MockFn<(i32, i32), i32> = MockFn::from_fn(|(a, b)| a + b);
//!
//! assert_eq!(add.invoke((1, 2)), Ok(3));
//! assert_eq!(add.calls(), vec![(1, 2)]);
//! assert_eq!(add.results(), vec![MockResult::Return(3)]);
//! ```
//!
//! # Async Mock Functions
//!
//! ```rust
//! use testkit_mock::mock::{AsyncMockFn, SettledResult};
//!
//! # futures::executor::block_on(async {
//! let load: AsyncMockFn<(), Vec<u8>> = AsyncMockFn::new();
//! load.mock_resolved_value(vec![1, 2]);
//!
//! assert_eq!(load.invoke(()).unwrap().await, Ok(vec![1, 2]));
//! assert_eq!(load.settled_results(), vec![SettledResult::Fulfilled(vec![1, 2])]);
//! # });
//! ```

mod async_mock;
mod awaitable;
mod implementation;
mod lifecycle;
mod mock_fn;
mod order;
mod property;
mod spy;
mod state;

pub use async_mock::AsyncMockFn;
pub use awaitable::{Awaitable, SettledResult};
pub use implementation::Implementation;
pub use lifecycle::MockLifecycle;
pub use mock_fn::{MockBuilder, MockFn, DEFAULT_MOCK_NAME};
pub use order::CallOrder;
pub use property::{replace_property, Property, ReplacedProperty};
pub use spy::{spy_on, Method, Spy};
pub use state::{MockResult, MockState};
