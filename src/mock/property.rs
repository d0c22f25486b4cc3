//! Temporarily replaced property values.
//!
//! # Example
//!
//! ```rust
//! use testkit_mock::mock::{replace_property, Property};
//!
//! let timeout = Property::new(30_u64);
//!
//! let replaced = replace_property(&timeout, 1);
//! assert_eq!(timeout.get(), 1);
//!
//! replaced.replace_value(2);
//! assert_eq!(timeout.get(), 2);
//!
//! replaced.restore();
//! assert_eq!(timeout.get(), 30);
//! ```

use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::debug;

use super::lifecycle::MockLifecycle;

/// A shared value that tests can replace.
///
/// Clones refer to the same value.
pub struct Property<V> {
    value: Arc<RwLock<V>>,
}

impl<V: Clone> Property<V> {
    /// Create a property holding `value`.
    pub fn new(value: V) -> Self {
        Self {
            value: Arc::new(RwLock::new(value)),
        }
    }

    /// Read the current value.
    pub fn get(&self) -> V {
        self.value.read().clone()
    }

    /// Overwrite the current value, returning the previous one.
    pub fn set(&self, value: V) -> V {
        std::mem::replace(&mut *self.value.write(), value)
    }
}

impl<V> Clone for Property<V> {
    fn clone(&self) -> Self {
        Self {
            value: Arc::clone(&self.value),
        }
    }
}

impl<V: fmt::Debug> fmt::Debug for Property<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Property").field(&*self.value.read()).finish()
    }
}

/// Handle to a replaced [`Property`], able to put the original back.
pub struct ReplacedProperty<V> {
    property: Property<V>,
    original: V,
}

/// Replace the value of `property` until [`ReplacedProperty::restore`].
pub fn replace_property<V: Clone>(property: &Property<V>, value: V) -> ReplacedProperty<V> {
    let original = property.set(value);
    debug!(property = std::any::type_name::<V>(), "property replaced");
    ReplacedProperty {
        property: property.clone(),
        original,
    }
}

impl<V: Clone> ReplacedProperty<V> {
    /// Change the replacement value.
    pub fn replace_value(&self, value: V) -> &Self {
        self.property.set(value);
        self
    }

    /// Put the original value back.
    pub fn restore(&self) {
        self.property.set(self.original.clone());
        debug!(property = std::any::type_name::<V>(), "property restored");
    }

    /// The value present before replacement.
    pub fn original(&self) -> &V {
        &self.original
    }
}

impl<V: Clone> Clone for ReplacedProperty<V> {
    fn clone(&self) -> Self {
        Self {
            property: self.property.clone(),
            original: self.original.clone(),
        }
    }
}

impl<V: fmt::Debug> fmt::Debug for ReplacedProperty<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReplacedProperty")
            .field("property", &self.property)
            .field("original", &self.original)
            .finish()
    }
}

/// Clearing and resetting leave a replaced value alone; restoring puts the
/// original back.
impl<V: Clone + Send + Sync> MockLifecycle for ReplacedProperty<V> {
    fn mock_clear(&self) {}

    fn mock_reset(&self) {}

    fn mock_restore(&self) {
        self.restore();
    }

    fn get_mock_name(&self) -> String {
        "replaced property".to_string()
    }
}
