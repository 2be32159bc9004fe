//! Cancellation, timeout and retry specs

use crate::prelude::*;
use tokio::sync::Notify;

#[tokio::test]
async fn cancel_all_rejects_every_pending_operation() {
    let engine = engine();
    engine.bind("x", handle("h")).unwrap();
    let started = Arc::new(Notify::new());
    let gate = Arc::new(Notify::new());

    let running = {
        let started = started.clone();
        let gate = gate.clone();
        engine
            .with_target(
                "x",
                move |_t: String, _ctx: CancelContext| {
                    let started = started.clone();
                    let gate = gate.clone();
                    async move {
                        started.notify_one();
                        gate.notified().await;
                        Ok::<_, String>(())
                    }
                },
                OperationOptions::new(),
            )
            .unwrap()
    };
    started.notified().await;

    let noop = |_t: String, _ctx: CancelContext| std::future::ready(Ok::<_, String>(()));
    let pending: Vec<_> = (0..4)
        .map(|_| engine.with_target("x", noop, OperationOptions::new()).unwrap())
        .collect();
    let failed_before = engine.stats("x").unwrap().failed;

    assert_eq!(engine.cancel_all("x"), 4);

    let stats = engine.stats("x").unwrap();
    assert_eq!(stats.pending, 0);
    assert_eq!(stats.failed, failed_before + 4);
    for p in pending {
        assert!(p.await.error().unwrap().is_cancelled());
    }

    gate.notify_one();
    assert!(running.await.is_success());
}

#[tokio::test(start_paused = true)]
async fn timeout_fails_at_limit_and_queue_moves_on() {
    let engine = engine();
    engine.bind("x", handle("h")).unwrap();
    let t0 = tokio::time::Instant::now();

    let slow = engine
        .with_target(
            "x",
            |_t: String, _ctx: CancelContext| async move {
                tokio::time::sleep(Duration::from_millis(200)).await;
                Ok::<_, String>(())
            },
            OperationOptions::new().with_timeout(Duration::from_millis(50)),
        )
        .unwrap();
    let next = engine
        .with_target(
            "x",
            |_t: String, _ctx: CancelContext| async move {
                Ok::<_, String>(tokio::time::Instant::now())
            },
            OperationOptions::new(),
        )
        .unwrap();

    let result = slow.await;
    assert!(result.error().unwrap().is_timeout());

    let next_started = next.await.into_result().unwrap();
    assert!(next_started - t0 >= Duration::from_millis(50));
    assert!(next_started - t0 < Duration::from_millis(100));
}

#[tokio::test]
async fn retry_twice_then_succeed_counts_one_completion() {
    let engine = engine();
    engine.bind("x", handle("h")).unwrap();
    let calls = Arc::new(AtomicU32::new(0));

    let flaky = {
        let calls = calls.clone();
        move |_t: String, _ctx: CancelContext| {
            let n = calls.fetch_add(1, Ordering::SeqCst) + 1;
            std::future::ready(if n < 3 {
                Err(format!("attempt {n} failed"))
            } else {
                Ok(n)
            })
        }
    };

    let result = engine
        .with_target("x", flaky, OperationOptions::new().with_retries(2))
        .unwrap()
        .await;

    assert_eq!(result.into_result(), Ok(3));
    let stats = engine.stats("x").unwrap();
    assert_eq!(stats.completed, 1);
    assert_eq!(stats.failed, 0);
    assert_eq!(engine.events().query("queue:item:retry").len(), 2);
}

#[tokio::test]
async fn operation_error_names_slot_and_item() {
    let engine = engine();
    engine.bind("x", handle("h")).unwrap();

    let result = engine
        .with_target(
            "x",
            |_t: String, _ctx: CancelContext| async move { Err::<(), _>("boom") },
            OperationOptions::new().with_id("paint"),
        )
        .unwrap()
        .await;

    let err = result.error().unwrap();
    assert_eq!(err.slot(), "x");
    assert_eq!(err.item_id(), "paint");
}
