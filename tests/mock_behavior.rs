//! Integration tests for recording and resolution behavior.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use testkit_mock::mock::{spy_on, AsyncMockFn, CallOrder, Method, MockFn, MockResult, SettledResult};
use testkit_mock::{assert_called_before, assert_called_times, assert_returned_with, Error};

#[test]
fn test_calls_and_results_stay_aligned() {
    let mock: MockFn<(u32,), u32> = MockFn::from_fn(|(x,)| x * 10);
    mock.mock_throw_once(Error::thrown("first fails"));

    for i in 0..5 {
        let _ = mock.invoke((i,));
    }

    let state = mock.mock();
    assert_eq!(state.calls.len(), 5);
    assert_eq!(state.results.len(), 5);
    assert_eq!(state.invocation_call_order.len(), 5);
    assert_eq!(state.results[0], MockResult::Throw(Error::thrown("first fails")));
    for (call, result) in state.calls.iter().zip(&state.results).skip(1) {
        assert_eq!(result, &MockResult::Return(call.0 * 10));
    }
}

#[test]
fn test_interleaved_order_reconstructs_sequence() {
    let a: MockFn<(), ()> = MockFn::new();
    let b: MockFn<(), ()> = MockFn::new();
    a.mock_name("a");
    b.mock_name("b");

    a.invoke(()).unwrap();
    b.invoke(()).unwrap();
    b.invoke(()).unwrap();
    a.invoke(()).unwrap();

    let mut union: Vec<(u64, &str)> = a
        .invocation_call_order()
        .into_iter()
        .map(|n| (n, "a"))
        .chain(b.invocation_call_order().into_iter().map(|n| (n, "b")))
        .collect();
    union.sort_unstable();

    let sequence: Vec<&str> = union.into_iter().map(|(_, name)| name).collect();
    assert_eq!(sequence, vec!["a", "b", "b", "a"]);
    assert_called_before!(a, b);
}

#[test]
fn test_isolated_order_starts_at_one() {
    let order = CallOrder::isolated();
    let a: MockFn<(), ()> = MockFn::builder().with_call_order(order.clone()).build();
    let b: MockFn<(), ()> = MockFn::builder().with_call_order(order).build();

    a.invoke(()).unwrap();
    b.invoke(()).unwrap();
    a.invoke(()).unwrap();

    assert_eq!(a.invocation_call_order(), vec![1, 3]);
    assert_eq!(b.invocation_call_order(), vec![2]);
}

#[test]
fn test_once_queue_is_fifo_then_default() {
    let mock: MockFn<(), &str> = MockFn::new();
    mock.mock_return_value_once("first")
        .mock_return_value_once("second");
    mock.mock_return_value("default");

    let seen: Vec<&str> = (0..4).map(|_| mock.invoke(()).unwrap()).collect();
    assert_eq!(seen, vec!["first", "second", "default", "default"]);
}

#[test]
fn test_clear_keeps_behavior() {
    let mock: MockFn<(), i32> = MockFn::new();
    mock.mock_return_value(1).mock_return_value_once(2);
    mock.invoke(()).unwrap();
    mock.mock_return_value_once(3);

    mock.mock_clear();

    assert!(mock.calls().is_empty());
    assert!(mock.results().is_empty());
    assert!(mock.invocation_call_order().is_empty());
    assert_eq!(mock.invoke(()), Ok(3));
    assert_eq!(mock.invoke(()), Ok(1));
}

#[test]
fn test_reset_returns_default_value() {
    let mock: MockFn<(), String> = MockFn::from_fn(|()| "original".to_string());
    mock.mock_return_value("set".to_string())
        .mock_return_value_once("queued".to_string());

    mock.mock_reset();

    assert_eq!(mock.invoke(()), Ok(String::new()));
    assert_eq!(mock.pending_once(), 0);
    assert!(mock.get_mock_implementation().is_none());
}

#[test]
fn test_restore_returns_to_creation_implementation() {
    let mock: MockFn<(i32,), i32> = MockFn::from_fn(|(x,)| x + 1);
    mock.mock_implementation(|(x,)| x * 100);
    mock.invoke((1,)).unwrap();

    mock.mock_restore();

    assert_eq!(mock.call_count(), 0);
    assert_eq!(mock.invoke((1,)), Ok(2));
}

#[test]
fn test_with_implementation_scopes_override() {
    let mock: MockFn<(), &str> = MockFn::new();
    mock.mock_return_value("outer").mock_return_value_once("queued");

    let inside = mock.with_implementation(|()| "temp", || mock.invoke(()).unwrap());

    assert_eq!(inside, "temp");
    assert_eq!(mock.pending_once(), 1);
    assert_eq!(mock.invoke(()), Ok("queued"));
    assert_eq!(mock.invoke(()), Ok("outer"));
}

#[test]
fn test_with_implementation_restores_after_panic() {
    let mock: MockFn<(), i32> = MockFn::from_fn(|()| 1);

    let caught = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
        mock.with_implementation(|()| 2, || {
            assert_eq!(mock.invoke(()), Ok(2));
            panic!("callback failed");
        })
    }));

    assert!(caught.is_err());
    assert_eq!(mock.invoke(()), Ok(1));
}

#[tokio::test]
async fn test_with_implementation_async_holds_until_awaited() {
    let mock: MockFn<(), u8> = MockFn::from_fn(|()| 1);

    let inside = mock
        .with_implementation_async(
            |()| 9,
            || async {
                tokio::task::yield_now().await;
                mock.invoke(()).unwrap()
            },
        )
        .await;

    assert_eq!(inside, 9);
    assert_eq!(mock.invoke(()), Ok(1));
}

#[tokio::test]
async fn test_rejection_settles_without_throwing_result() {
    let mock: AsyncMockFn<(), String> = AsyncMockFn::new();
    mock.mock_rejected_value_once(Error::thrown("x"));

    let caught = match mock.invoke(()).unwrap().await {
        Ok(_) => None,
        Err(err) => Some(err),
    };

    assert_eq!(caught, Some(Error::thrown("x")));
    assert_eq!(
        mock.settled_results()[0],
        SettledResult::Rejected(Error::thrown("x"))
    );
    assert!(mock.results()[0].is_return());
}

#[tokio::test]
async fn test_async_result_is_the_returned_awaitable() {
    let mock: AsyncMockFn<(), u8> = AsyncMockFn::new();
    mock.mock_resolved_value(1);

    let returned = mock.invoke(()).unwrap();
    assert_returned_with!(mock, returned.clone());

    let recorded = mock.results()[0].value().cloned().unwrap();
    assert_eq!(recorded.clone().await, Ok(1));
    assert_eq!(returned.await, Ok(1));
    assert_eq!(mock.settled_results(), vec![SettledResult::Fulfilled(1)]);
}

#[test]
fn test_spy_on_twice_shares_one_recorder() {
    let method: Method<(u8,), u8> = Method::new(|(x,)| x);
    let first = spy_on(&method);
    let second = spy_on(&method);

    method.call((1,)).unwrap();
    assert_eq!(first.call_count(), 1);
    assert_eq!(second.call_count(), 1);

    first.mock_restore();
    method.call((2,)).unwrap();

    assert_eq!(first.call_count(), 0);
    assert_eq!(second.call_count(), 0);
    assert!(method.current().ptr_eq(first.original()));
}

#[test]
fn test_construct_records_instances_only_for_implicit_return() {
    #[derive(Clone, Debug, Default, PartialEq)]
    struct Conn {
        id: u32,
    }

    let ctor: MockFn<(u32,), Option<Conn>, Conn> = MockFn::new();
    ctor.mock_implementation_once(|(_,)| None)
        .mock_implementation_once(|(id,)| Some(Conn { id: id + 100 }));

    let implicit = ctor.construct(Conn { id: 1 }, (1,)).unwrap();
    let explicit = ctor.construct(Conn { id: 2 }, (2,)).unwrap();

    assert_eq!(implicit, Conn { id: 1 });
    assert_eq!(explicit, Conn { id: 102 });
    assert_eq!(ctor.instances(), vec![Conn { id: 1 }]);
    assert_eq!(
        ctor.results(),
        vec![
            MockResult::Return(None),
            MockResult::Return(Some(Conn { id: 102 }))
        ]
    );
    assert_eq!(ctor.contexts(), vec![Conn { id: 1 }, Conn { id: 2 }]);
}

#[test]
fn test_implementation_can_reenter_its_mock() {
    let mock: MockFn<(), usize> = MockFn::new();
    let handle = mock.clone();
    mock.mock_implementation(move |()| handle.call_count());

    assert_eq!(mock.invoke(()), Ok(1));
    assert!(mock.results()[0].is_return());
}

#[test]
fn test_concurrent_invocations_are_all_recorded() {
    let mock: MockFn<(usize,), usize> = MockFn::from_fn(|(x,)| x);
    let counter = Arc::new(AtomicUsize::new(0));

    std::thread::scope(|scope| {
        for t in 0..4 {
            let mock = mock.clone();
            let counter = Arc::clone(&counter);
            scope.spawn(move || {
                for i in 0..25 {
                    mock.invoke((t * 25 + i,)).unwrap();
                    counter.fetch_add(1, Ordering::SeqCst);
                }
            });
        }
    });

    assert_eq!(counter.load(Ordering::SeqCst), 100);
    assert_called_times!(mock, 100);
    let order = mock.invocation_call_order();
    assert!(order.windows(2).all(|w| w[0] < w[1]));
}
