//! # testkit-mock
//!
//! > Recording mock functions for Rust tests
//!
//! **testkit-mock** provides mock functions that record every invocation
//! (arguments, receiver, outcome and global call order) and resolve each call
//! through one-shot, default, original or temporarily scoped implementations.
//!
//! ## Quick Start
//!
//! ```rust
//! use testkit_mock::prelude::*;
//!
//! let fetch: MockFn<(u32,), String> = MockFn::new();
//! fetch
//!     .mock_return_value("default".to_string())
//!     .mock_return_value_once("first".to_string());
//!
//! assert_eq!(fetch.invoke((1,)), Ok("first".to_string()));
//! assert_eq!(fetch.invoke((2,)), Ok("default".to_string()));
//! assert_eq!(fetch.calls(), vec![(1,), (2,)]);
//!
//! fetch.mock_reset();
//! assert_eq!(fetch.invoke((3,)), Ok(String::new()));
//! ```
//!
//! ## Features
//!
//! - **Mock Functions** - Record calls and results, queue one-shot behavior
//! - **Async Mocks** - Track how returned awaitables settle
//! - **Spies** - Wrap a replaceable method and restore it afterwards
//! - **Registry** - Clear, reset or restore every double at once
//! - **Assertions** - Panicking macros and `Result`-returning checks

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod assertions;
pub mod error;
pub mod mock;
pub mod registry;

/// Prelude for convenient imports
///
/// ```rust
/// use testkit_mock::prelude::*;
/// ```
pub mod prelude {
    pub use crate::error::{Error, Result};
    pub use crate::mock::{
        replace_property, spy_on, AsyncMockFn, Awaitable, Implementation, Method, MockFn,
        MockLifecycle, MockResult, Property, SettledResult, Spy,
    };
    pub use crate::registry::{MockConfig, MockRegistry};
}

// Re-exports
pub use error::{Error, Result};

// Re-export the test macro when macros feature is enabled
#[cfg(feature = "macros")]
pub use testkit_mock_macros::test;
