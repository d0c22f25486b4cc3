//! Lifecycle operations shared by every kind of test double.

/// Bulk lifecycle operations.
///
/// Implemented by [`MockFn`](super::MockFn), [`AsyncMockFn`](super::AsyncMockFn),
/// [`Spy`](super::Spy) and [`ReplacedProperty`](super::ReplacedProperty) so a
/// [`MockRegistry`](crate::registry::MockRegistry) can clear, reset or
/// restore all of them at once.
pub trait MockLifecycle: Send + Sync {
    /// Forget recorded history, keep behavior.
    fn mock_clear(&self);

    /// Forget recorded history and configured behavior.
    fn mock_reset(&self);

    /// Reset, then return to the behavior present at creation.
    fn mock_restore(&self);

    /// Display name used in diagnostics.
    fn get_mock_name(&self) -> String;
}
