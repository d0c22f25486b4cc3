//! Recorded invocation history.

use crate::error::{Error, Result};

/// The outcome recorded for one invocation.
///
/// `Incomplete` is visible while the implementation is still running, for
/// example to an implementation that inspects its own mock.
#[derive(Debug, Clone, PartialEq)]
pub enum MockResult<R> {
    /// The implementation returned a value.
    Return(R),
    /// The implementation threw.
    Throw(Error),
    /// The implementation has not finished yet.
    Incomplete,
}

impl<R> MockResult<R> {
    /// The returned value, if any.
    pub fn value(&self) -> Option<&R> {
        match self {
            Self::Return(value) => Some(value),
            _ => None,
        }
    }

    /// The thrown error, if any.
    pub fn error(&self) -> Option<&Error> {
        match self {
            Self::Throw(err) => Some(err),
            _ => None,
        }
    }

    /// Whether the implementation returned normally.
    #[must_use]
    pub fn is_return(&self) -> bool {
        matches!(self, Self::Return(_))
    }

    /// Whether the implementation threw.
    #[must_use]
    pub fn is_throw(&self) -> bool {
        matches!(self, Self::Throw(_))
    }

    /// Whether the implementation is still running.
    #[must_use]
    pub fn is_incomplete(&self) -> bool {
        matches!(self, Self::Incomplete)
    }
}

/// A point-in-time copy of everything a mock has recorded.
///
/// `calls`, `results`, `contexts` and `invocation_call_order` are indexed by
/// invocation: entry `i` of each belongs to the same call.
#[derive(Debug, Clone, PartialEq)]
pub struct MockState<A, R, T> {
    /// Argument tuple of every invocation.
    pub calls: Vec<A>,
    /// Outcome of every invocation.
    pub results: Vec<MockResult<R>>,
    /// Receiver of every invocation.
    pub contexts: Vec<T>,
    /// Receivers of constructor invocations that produced no object of their own.
    pub instances: Vec<T>,
    /// Global order number of every invocation.
    pub invocation_call_order: Vec<u64>,
}

impl<A, R, T> MockState<A, R, T> {
    /// Arguments of the most recent invocation.
    pub fn last_call(&self) -> Option<&A> {
        self.calls.last()
    }
}

impl<A, R, T> Default for MockState<A, R, T> {
    fn default() -> Self {
        Self {
            calls: Vec::new(),
            results: Vec::new(),
            contexts: Vec::new(),
            instances: Vec::new(),
            invocation_call_order: Vec::new(),
        }
    }
}

/// Live history owned by a mock.
pub(crate) struct History<A, R, T> {
    pub(crate) state: MockState<A, R, T>,
    /// Bumped by every clear so stale in-flight invocations do not write
    /// into the new history.
    pub(crate) generation: u64,
}

impl<A, R, T> History<A, R, T> {
    pub(crate) fn new() -> Self {
        Self {
            state: MockState::default(),
            generation: 0,
        }
    }

    /// Append the bookkeeping for a new invocation and return its slot.
    pub(crate) fn begin(&mut self, order: u64, args: A, this: T) -> usize {
        self.state.invocation_call_order.push(order);
        self.state.calls.push(args);
        self.state.contexts.push(this);
        self.state.results.push(MockResult::Incomplete);
        self.state.results.len() - 1
    }

    /// Record the outcome of the invocation in slot `index`.
    ///
    /// Returns `false` without writing if the history was cleared since the
    /// invocation began.
    pub(crate) fn finish(&mut self, generation: u64, index: usize, outcome: &Result<R>) -> bool
    where
        R: Clone,
    {
        if generation != self.generation {
            return false;
        }
        let Some(slot) = self.state.results.get_mut(index) else {
            return false;
        };
        *slot = match outcome {
            Ok(value) => MockResult::Return(value.clone()),
            Err(err) => MockResult::Throw(err.clone()),
        };
        true
    }

    pub(crate) fn clear(&mut self) {
        self.state = MockState::default();
        self.generation += 1;
    }
}
