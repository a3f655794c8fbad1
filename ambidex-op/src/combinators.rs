//! Fan-out combinators over already-invoked routines, themselves
//! expressed as operations.
//!
//! Both take a `Vec` of boxed routines — not operations — so callers
//! invoke each operation with its own arguments first and hand over the
//! resulting routines. Under the blocking driver the combinators stay
//! fully sequential; under the trampoline they drive every routine
//! through its own handshake concurrently.

use crate::operation::{NonBlocking, Operation};
use crate::routine::OperationRoutine;
use ambidex_drive::{blocking, trampoline};
use ambidex_protocol::{BoxRoutine, Descriptor, RoutineError, UsageError};
use std::sync::{Arc, Mutex};

/// Argument type of a combinator operation.
pub type Routines<T> = (Vec<BoxRoutine<T>>,);

struct Gather<T> {
    results: Vec<Option<T>>,
    remaining: usize,
}

/// Wait for every routine; results keep input order regardless of
/// completion order.
///
/// Blocking path: evaluate each routine sequentially in input order,
/// failing as soon as one fails. Non-blocking path: fire all routines
/// before waiting on any; the first failure settles the combinator
/// (remaining routines keep running, their settlements are dropped);
/// an empty input resolves immediately with an empty vec.
pub fn all<T>() -> Operation<Routines<T>, Vec<T>>
where
    T: Send + 'static,
{
    Operation::from_parts(
        Descriptor::new("all", 1),
        Box::new(|(items,): Routines<T>| {
            let mut results = Vec::with_capacity(items.len());
            for item in items {
                results.push(blocking::drive(item).map_err(RoutineError::into_reason)?);
            }
            Ok(results)
        }),
        NonBlocking::Errback(Box::new(|(items,): Routines<T>, completion| {
            if items.is_empty() {
                completion.resolve(Vec::new());
                return Ok(());
            }

            let total = items.len();
            tracing::trace!(total, "ambidex.all.fan_out");
            let gathered = Arc::new(Mutex::new(Gather {
                results: std::iter::repeat_with(|| None).take(total).collect(),
                remaining: total,
            }));

            for (index, item) in items.into_iter().enumerate() {
                let gathered = Arc::clone(&gathered);
                let completion = completion.clone();
                trampoline::drive(item, move |settled| match settled {
                    Ok(value) => {
                        let finished = {
                            let mut gather = gathered.lock().expect("lock poisoned");
                            gather.results[index] = Some(value);
                            gather.remaining -= 1;
                            gather.remaining == 0
                        };
                        if finished {
                            let results = {
                                let mut gather = gathered.lock().expect("lock poisoned");
                                std::mem::take(&mut gather.results)
                            };
                            completion.resolve(results.into_iter().flatten().collect());
                        }
                    }
                    Err(error) => {
                        completion.reject(error.into_reason());
                    }
                });
            }
            Ok(())
        })),
    )
}

/// Return the first settlement — success or failure — among the given
/// routines.
///
/// Blocking path: evaluate only the first routine; the rest are never
/// started. Non-blocking path: start every routine; the first to settle
/// decides the outcome, ties in the same synchronous turn go to the
/// earlier-started routine, and losers run to completion with their
/// settlements dropped. An empty input fails with
/// [`UsageError::EmptyRace`] in both paths.
pub fn race<T>() -> Operation<Routines<T>, T>
where
    T: Send + 'static,
{
    Operation::from_parts(
        Descriptor::new("race", 1),
        Box::new(|(items,): Routines<T>| {
            let mut items = items.into_iter();
            let Some(first) = items.next() else {
                return Err(UsageError::EmptyRace.into());
            };
            blocking::drive(first).map_err(RoutineError::into_reason)
        }),
        NonBlocking::Errback(Box::new(|(items,): Routines<T>, completion| {
            if items.is_empty() {
                return Err(UsageError::EmptyRace.into());
            }
            tracing::trace!(total = items.len(), "ambidex.race.fan_out");
            for item in items {
                let completion = completion.clone();
                trampoline::drive(item, move |settled| {
                    completion.settle(settled.map_err(RoutineError::into_reason));
                });
            }
            Ok(())
        })),
    )
}

/// Invoke [`all`] over the given routines.
pub fn wait_for_all<T>(items: Vec<BoxRoutine<T>>) -> OperationRoutine<Routines<T>, Vec<T>>
where
    T: Send + 'static,
{
    all().invoke((items,))
}

/// Invoke [`race`] over the given routines.
pub fn race_first<T>(items: Vec<BoxRoutine<T>>) -> OperationRoutine<Routines<T>, T>
where
    T: Send + 'static,
{
    race().invoke((items,))
}

// -- Tests --
