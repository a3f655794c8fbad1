//! Fan-out combinators, end to end: ordering, empty inputs, failure
//! propagation, and the race's non-cancellation of losers.

use ambidex::prelude::*;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

fn value_routine(n: u32) -> BoxRoutine<u32> {
    Operation::builder()
        .name("value")
        .blocking(move |()| Ok(n))
        .build()
        .unwrap()
        .invoke(())
        .boxed()
}

/// A routine whose non-blocking settlement is handed to the test.
fn deferred_routine(parked: &Arc<Mutex<Vec<Completion<u32>>>>) -> BoxRoutine<u32> {
    let parked = Arc::clone(parked);
    Operation::builder()
        .name("deferred")
        .blocking(|()| Ok(0))
        .errback(move |(), completion| {
            parked.lock().unwrap().push(completion);
            Ok(())
        })
        .build()
        .unwrap()
        .invoke(())
        .boxed()
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// wait-for-all — ordered results regardless of completion order
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[tokio::test]
async fn results_keep_input_order_when_the_middle_item_finishes_first() {
    let parked = Arc::new(Mutex::new(Vec::new()));
    let items = vec![
        deferred_routine(&parked), // A
        deferred_routine(&parked), // B
        deferred_routine(&parked), // C
    ];

    let pending = all().call_async((items,));
    {
        let parked = parked.lock().unwrap();
        assert_eq!(parked.len(), 3, "fan-out must start every routine");
        parked[1].resolve(20); // B first
        parked[0].resolve(10);
        parked[2].resolve(30);
    }

    assert_eq!(pending.await.unwrap(), vec![10, 20, 30]);
}

#[test]
fn blocking_path_evaluates_in_input_order() {
    let order = Arc::new(Mutex::new(Vec::new()));
    let mk = |tag: u32| {
        let order = Arc::clone(&order);
        Operation::builder()
            .name("tagged")
            .blocking(move |()| {
                order.lock().unwrap().push(tag);
                Ok(tag)
            })
            .build()
            .unwrap()
            .invoke(())
            .boxed()
    };

    let results = all().call_sync((vec![mk(1), mk(2), mk(3)],)).unwrap();
    assert_eq!(results, vec![1, 2, 3]);
    assert_eq!(*order.lock().unwrap(), vec![1, 2, 3]);
}

#[tokio::test]
async fn empty_input_succeeds_immediately() {
    let result = all::<u32>().call_async((Vec::new(),)).await.unwrap();
    assert_eq!(result, Vec::<u32>::new());
}

#[tokio::test]
async fn first_failure_settles_the_combinator_without_cancelling_the_rest() {
    let parked = Arc::new(Mutex::new(Vec::new()));
    let failing: BoxRoutine<u32> = Operation::<(), u32>::builder()
        .name("failing")
        .blocking(|()| Err(BoxError::from("bad item")))
        .build()
        .unwrap()
        .invoke(())
        .boxed();
    let items = vec![deferred_routine(&parked), failing];

    let err = all().call_async((items,)).await.unwrap_err();
    assert_eq!(err.into_reason().to_string(), "bad item");

    // The other routine is still in flight and may settle later; its
    // outcome is simply dropped.
    let survivors = parked.lock().unwrap();
    assert_eq!(survivors.len(), 1);
    survivors[0].resolve(5);
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// race-first — first settlement wins, losers are not cancelled
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[test]
fn empty_race_fails_blocking() {
    let err = race::<u32>().call_sync((Vec::new(),)).unwrap_err();
    assert!(matches!(
        err.into_reason().downcast_ref::<UsageError>(),
        Some(UsageError::EmptyRace)
    ));
}

#[tokio::test]
async fn empty_race_fails_non_blocking() {
    let err = race::<u32>().call_async((Vec::new(),)).await.unwrap_err();
    assert!(matches!(
        err.into_reason().downcast_ref::<UsageError>(),
        Some(UsageError::EmptyRace)
    ));
}

#[tokio::test]
async fn second_item_wins_when_it_settles_first() {
    let parked = Arc::new(Mutex::new(Vec::new()));
    let items = vec![deferred_routine(&parked), value_routine(7)];

    assert_eq!(race().call_async((items,)).await.unwrap(), 7);
}

#[tokio::test]
async fn a_losing_failure_cannot_overturn_the_winner() {
    let parked = Arc::new(Mutex::new(Vec::new()));
    let items = vec![deferred_routine(&parked), value_routine(7)];

    let result = race().call_async((items,)).await.unwrap();
    assert_eq!(result, 7);

    // The loser fails afterwards; the outcome is already decided.
    parked.lock().unwrap()[0].reject(BoxError::from("too late"));
}

#[tokio::test]
async fn the_loser_still_runs_to_completion() {
    let finished = Arc::new(AtomicUsize::new(0));
    let seen = Arc::clone(&finished);
    let slow: BoxRoutine<u32> = Operation::builder()
        .name("slow")
        .blocking(|()| Ok(2))
        .future(move |()| {
            let seen = Arc::clone(&seen);
            async move {
                tokio::time::sleep(Duration::from_millis(30)).await;
                seen.fetch_add(1, Ordering::SeqCst);
                Ok(2)
            }
        })
        .build()
        .unwrap()
        .invoke(())
        .boxed();

    let winner = race().call_async((vec![slow, value_routine(1)],)).await;
    assert_eq!(winner.unwrap(), 1);
    assert_eq!(finished.load(Ordering::SeqCst), 0, "loser still in flight");

    tokio::time::sleep(Duration::from_millis(120)).await;
    assert_eq!(
        finished.load(Ordering::SeqCst),
        1,
        "losing work runs to completion"
    );
}

#[tokio::test]
async fn winner_failure_is_the_outcome() {
    let parked = Arc::new(Mutex::new(Vec::new()));
    let failing: BoxRoutine<u32> = Operation::<(), u32>::builder()
        .name("failing")
        .blocking(|()| Err(BoxError::from("fastest failure")))
        .build()
        .unwrap()
        .invoke(())
        .boxed();
    let items = vec![deferred_routine(&parked), failing];

    let err = race().call_async((items,)).await.unwrap_err();
    assert_eq!(err.into_reason().to_string(), "fastest failure");
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Combinators are operations — every convention applies
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[test]
fn combinators_work_through_the_errback_convention() {
    let outcome = Arc::new(Mutex::new(None));
    let seen = Arc::clone(&outcome);
    all().call_errback((vec![value_routine(4), value_routine(5)],), move |result| {
        *seen.lock().unwrap() = Some(result);
    });
    assert_eq!(
        outcome.lock().unwrap().take().unwrap().unwrap(),
        vec![4, 5]
    );
}

#[test]
fn invoked_combinator_routines_compose_like_any_routine() {
    // race([all([a, b]), c]) — combinator routines are routines too.
    let inner = wait_for_all(vec![value_routine(1), value_routine(2)]);
    let sum = Operation::builder()
        .name("sum")
        .blocking(|(pair,): (Vec<u32>,)| Ok(pair.iter().sum::<u32>()))
        .build()
        .unwrap();
    let total = sum
        .call_sync((blocking::drive(inner).unwrap(),))
        .unwrap();
    assert_eq!(total, 3);

    let first = race_first(vec![value_routine(9), value_routine(8)]);
    assert_eq!(blocking::drive(first).unwrap(), 9);
}
