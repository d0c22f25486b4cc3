//! Process-wide invocation ordering.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

static GLOBAL_ORDER: AtomicU64 = AtomicU64::new(0);

/// Source of invocation order numbers.
///
/// Every mock draws one number per invocation. Mocks sharing a `CallOrder`
/// can be merged into a single timeline by sorting on those numbers. The
/// default source is process-wide; [`CallOrder::isolated`] creates a private
/// one.
///
/// # Example
///
/// ```rust
/// use testkit_mock::mock::CallOrder;
///
/// let order = CallOrder::isolated();
/// assert_eq!(order.next(), 1);
/// assert_eq!(order.next(), 2);
/// ```
#[derive(Clone, Debug, Default)]
pub struct CallOrder {
    source: Source,
}

#[derive(Clone, Debug, Default)]
enum Source {
    #[default]
    Global,
    Isolated(Arc<AtomicU64>),
}

impl CallOrder {
    /// The process-wide counter shared by every mock created without an
    /// explicit source.
    #[must_use]
    pub fn global() -> Self {
        Self {
            source: Source::Global,
        }
    }

    /// A fresh counter starting at 1, shared only by its clones.
    #[must_use]
    pub fn isolated() -> Self {
        Self {
            source: Source::Isolated(Arc::new(AtomicU64::new(0))),
        }
    }

    /// Draw the next order number. Numbers start at 1 and never repeat.
    #[allow(clippy::should_implement_trait)]
    pub fn next(&self) -> u64 {
        let counter = match &self.source {
            Source::Global => &GLOBAL_ORDER,
            Source::Isolated(counter) => counter.as_ref(),
        };
        counter.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// The most recently drawn number, or 0 if none was drawn yet.
    #[must_use]
    pub fn current(&self) -> u64 {
        match &self.source {
            Source::Global => GLOBAL_ORDER.load(Ordering::SeqCst),
            Source::Isolated(counter) => counter.load(Ordering::SeqCst),
        }
    }

    /// Whether both handles draw from the same counter.
    #[must_use]
    pub fn same_source(&self, other: &Self) -> bool {
        match (&self.source, &other.source) {
            (Source::Global, Source::Global) => true,
            (Source::Isolated(a), Source::Isolated(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}
