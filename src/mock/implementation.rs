//! Implementations installed into mocks.

use std::fmt;
use std::sync::Arc;

use crate::error::{Error, Result};

type ImplFn<A, R, T> = dyn Fn(&T, A) -> Result<R> + Send + Sync;

/// A behavior a mock can execute for an invocation.
///
/// Every implementation receives the invocation receiver and the argument
/// tuple, and either returns a value or throws an [`Error`]. Cloning is
/// cheap; clones compare equal with [`Implementation::ptr_eq`].
///
/// # Example
///
/// ```rust
/// use testkit_mock::mock::Implementation;
///
/// let double: Implementation<(i32,), i32> = Implementation::new(|(x,)| x * 2);
/// assert_eq!(double.call(&(), (4,)), Ok(8));
/// ```
pub struct Implementation<A, R, T = ()> {
    func: Arc<ImplFn<A, R, T>>,
}

impl<A: 'static, R: 'static, T: 'static> Implementation<A, R, T> {
    /// Wrap an infallible function of the arguments.
    pub fn new<F>(func: F) -> Self
    where
        F: Fn(A) -> R + Send + Sync + 'static,
    {
        Self {
            func: Arc::new(move |_: &T, args: A| -> Result<R> { Ok(func(args)) }),
        }
    }

    /// Wrap a function that may throw.
    pub fn fallible<F>(func: F) -> Self
    where
        F: Fn(A) -> Result<R> + Send + Sync + 'static,
    {
        Self {
            func: Arc::new(move |_: &T, args: A| -> Result<R> { func(args) }),
        }
    }

    /// Wrap a function that also sees the invocation receiver.
    pub fn with_receiver<F>(func: F) -> Self
    where
        F: Fn(&T, A) -> Result<R> + Send + Sync + 'static,
    {
        Self {
            func: Arc::new(func),
        }
    }

    /// Always return a clone of `value`.
    pub fn returning(value: R) -> Self
    where
        R: Clone + Send + Sync + 'static,
    {
        Self {
            func: Arc::new(move |_: &T, _: A| -> Result<R> { Ok(value.clone()) }),
        }
    }

    /// Always throw a clone of `error`.
    #[must_use]
    pub fn throwing(error: Error) -> Self {
        Self {
            func: Arc::new(move |_: &T, _: A| -> Result<R> { Err(error.clone()) }),
        }
    }

    /// Execute the implementation.
    ///
    /// # Errors
    ///
    /// Returns whatever error the implementation throws.
    pub fn call(&self, this: &T, args: A) -> Result<R> {
        (self.func)(this, args)
    }

    /// Whether both handles refer to the same installed function.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.func, &other.func)
    }
}

impl<A: 'static, R: Clone + Send + Sync + 'static> Implementation<A, R, R> {
    /// Return the invocation receiver.
    #[must_use]
    pub fn returning_this() -> Self {
        Self {
            func: Arc::new(|this: &R, _: A| -> Result<R> { Ok(this.clone()) }),
        }
    }
}

impl<A, R, T> Clone for Implementation<A, R, T> {
    fn clone(&self) -> Self {
        Self {
            func: Arc::clone(&self.func),
        }
    }
}

impl<A, R, T> fmt::Debug for Implementation<A, R, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Implementation")
            .field("ptr", &Arc::as_ptr(&self.func).cast::<()>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_ignores_receiver() {
        let imp: Implementation<(i32, i32), i32, String> = Implementation::new(|(a, b)| a + b);
        assert_eq!(imp.call(&"ignored".to_string(), (2, 3)), Ok(5));
    }

    #[test]
    fn test_fallible() {
        let imp: Implementation<(i32,), i32> = Implementation::fallible(|(x,)| {
            if x < 0 {
                Err(Error::thrown("negative"))
            } else {
                Ok(x)
            }
        });
        assert_eq!(imp.call(&(), (1,)), Ok(1));
        assert_eq!(imp.call(&(), (-1,)), Err(Error::thrown("negative")));
    }

    #[test]
    fn test_returning_and_throwing() {
        let ret: Implementation<(), &str> = Implementation::returning("x");
        assert_eq!(ret.call(&(), ()), Ok("x"));

        let throw: Implementation<(), &str> = Implementation::throwing(Error::thrown("e"));
        assert_eq!(throw.call(&(), ()), Err(Error::thrown("e")));
    }

    #[test]
    fn test_returning_this() {
        let imp: Implementation<(), u8, u8> = Implementation::returning_this();
        assert_eq!(imp.call(&7, ()), Ok(7));
    }

    #[test]
    fn test_ptr_eq() {
        let a: Implementation<(), ()> = Implementation::new(|()| ());
        let b = a.clone();
        let c: Implementation<(), ()> = Implementation::new(|()| ());
        assert!(a.ptr_eq(&b));
        assert!(!a.ptr_eq(&c));
    }
}
