//! Waiting specs
//!
//! Fast path, multi-waiter fairness and multi-slot waits.

use crate::prelude::*;
use futures::FutureExt;

#[test]
fn wait_on_bound_slot_resolves_in_the_same_poll() {
    let engine = engine();
    engine.bind("x", handle("h")).unwrap();

    let started = std::time::Instant::now();
    let value = engine.wait_for_bind("x").unwrap().now_or_never();
    assert_eq!(value, Some(Ok(handle("h"))));
    assert!(started.elapsed() < Duration::from_millis(5));
}

#[tokio::test]
async fn waiters_resolve_in_registration_order() {
    let engine = engine();
    let trace = Trace::default();

    let mut tasks = Vec::new();
    for i in 0..3 {
        let wait = engine.wait_for_bind("x").unwrap();
        let trace = trace.clone();
        tasks.push(tokio::spawn(async move {
            let h = wait.await.unwrap();
            trace.push(format!("waiter-{i}:{h}"));
        }));
    }
    tokio::task::yield_now().await;

    let bound = engine.bind("x", handle("h")).unwrap();
    assert_eq!(bound.resolved, 3);
    for task in tasks {
        task.await.unwrap();
    }

    assert_eq!(
        trace.entries(),
        vec!["waiter-0:h", "waiter-1:h", "waiter-2:h"]
    );
}

#[test]
fn unbind_leaves_waiters_waiting() {
    let engine = engine();
    let mut wait = engine.wait_for_bind("x").unwrap();

    engine.bind("y", handle("other")).unwrap();
    engine.unbind("y").unwrap();
    assert!((&mut wait).now_or_never().is_none());

    engine.bind("x", handle("h")).unwrap();
    assert_eq!(wait.now_or_never(), Some(Ok(handle("h"))));
}

#[tokio::test]
async fn wait_for_all_collects_every_handle() {
    let engine = engine();
    engine.bind("a", handle("ha")).unwrap();

    let all = engine.wait_for_all(&["a", "b", "c"]).unwrap();
    engine.bind("c", handle("hc")).unwrap();
    engine.bind("b", handle("hb")).unwrap();

    let values = all.await.unwrap();
    assert_eq!(values.len(), 3);
    assert_eq!(values["a"], "ha");
    assert_eq!(values["b"], "hb");
    assert_eq!(values["c"], "hc");

    let snapshot = engine.snapshot();
    assert_eq!(snapshot.len(), 3);
    assert!(snapshot.values().all(Option::is_some));
}
