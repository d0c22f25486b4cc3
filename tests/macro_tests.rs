//! Integration tests for the `#[testkit_mock::test]` macro.

#![cfg(feature = "macros")]

use std::sync::OnceLock;

use testkit_mock::mock::{Method, MockFn, Property};
use testkit_mock::registry::MockRegistry;

/// Basic sync test without registry injection.
#[testkit_mock::test]
fn test_basic_sync() {
    let mock: MockFn<(), u8> = MockFn::new();
    assert_eq!(mock.invoke(()), Ok(0));
}

/// Basic async test without registry injection.
#[testkit_mock::test]
async fn test_basic_async() {
    tokio::task::yield_now().await;
}

/// Test with MockRegistry injection.
#[testkit_mock::test]
fn test_with_registry(registry: MockRegistry) {
    let mock: MockFn<(u8,), u8> = registry.fn_mock_from(|(x,)| x);
    mock.invoke((4,)).unwrap();

    assert_eq!(registry.len(), 1);
    assert_eq!(mock.calls(), vec![(4,)]);
}

/// Test with a mutable binding for the injected registry.
#[testkit_mock::test(clear_mocks = true)]
fn test_mut_registry_binding(mut registry: MockRegistry) {
    assert!(registry.is_empty());
    registry = MockRegistry::new();
    assert!(registry.is_empty());
}

fn shared_method() -> &'static Method<(), &'static str> {
    static METHOD: OnceLock<Method<(), &'static str>> = OnceLock::new();
    METHOD.get_or_init(|| Method::new(|()| "real"))
}

#[testkit_mock::test(restore_mocks = true)]
#[ignore = "run through test_restore_mocks_runs_after_body"]
fn restore_inner(registry: MockRegistry) {
    let spy = registry.spy_on(shared_method());
    spy.mock().mock_return_value("fake");
    assert_eq!(shared_method().call(()), Ok("fake"));
}

/// A spy installed by a restoring test is removed when it returns.
#[test]
fn test_restore_mocks_runs_after_body() {
    restore_inner();
    assert_eq!(shared_method().call(()), Ok("real"));
}

fn shared_property() -> &'static Property<u32> {
    static PROPERTY: OnceLock<Property<u32>> = OnceLock::new();
    PROPERTY.get_or_init(|| Property::new(10))
}

#[testkit_mock::test(restore_mocks = true)]
#[ignore = "run through test_restore_mocks_runs_on_panic"]
#[should_panic(expected = "body failed")]
fn panicking_inner(registry: MockRegistry) {
    registry.replace_property(shared_property(), 99);
    assert_eq!(shared_property().get(), 99);
    panic!("body failed");
}

/// Restoration still happens when the body panics.
#[test]
fn test_restore_mocks_runs_on_panic() {
    let outcome = std::panic::catch_unwind(panicking_inner);
    assert!(outcome.is_err());
    assert_eq!(shared_property().get(), 10);
}

/// Test with multi_thread flavor.
#[testkit_mock::test(flavor = "multi_thread", reset_mocks = true)]
async fn test_multi_thread(registry: MockRegistry) {
    let mock: MockFn<(), u8> = registry.fn_mock();
    mock.mock_return_value(7);

    let handle = tokio::spawn({
        let mock = mock.clone();
        async move { mock.invoke(()).unwrap() }
    });

    assert_eq!(handle.await.unwrap(), 7);
    assert_eq!(mock.call_count(), 1);
}

/// The macro keeps other attributes and return types.
#[testkit_mock::test]
#[allow(clippy::unnecessary_wraps)]
fn test_returns_result(registry: MockRegistry) -> testkit_mock::Result<()> {
    let mock: MockFn<(), u8> = registry.fn_mock();
    mock.invoke(())?;
    Ok(())
}
