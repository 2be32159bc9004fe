// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use std::sync::Arc;
use tether_core::{CancelContext, OperationOptions, SequentialIdGen, SystemClock};
use tokio::sync::Notify;

type Registry = QueueRegistry<u32, SystemClock, SequentialIdGen>;

fn registry() -> Registry {
    QueueRegistry::new(SystemClock, SequentialIdGen::default(), EventBus::new())
}

fn ok(_target: u32, _ctx: CancelContext) -> std::future::Ready<Result<(), String>> {
    std::future::ready(Ok(()))
}

fn fail(_target: u32, _ctx: CancelContext) -> std::future::Ready<Result<(), String>> {
    std::future::ready(Err("boom".to_string()))
}

#[test]
fn queues_are_created_lazily_and_cached() {
    let registry = registry();
    assert!(registry.get("canvas").is_none());
    assert!(registry.stats_for("canvas").is_none());

    let first = registry.queue("canvas").unwrap();
    let again = registry.queue("canvas").unwrap();
    assert_eq!(first.slot(), "canvas");
    assert_eq!(again.slot(), "canvas");
    registry.queue("scene").unwrap();

    assert_eq!(registry.names(), vec!["canvas", "scene"]);
}

#[test]
fn cancel_all_on_unknown_name_is_a_noop() {
    let registry = registry();
    assert_eq!(registry.cancel_all("nothing"), 0);
    assert!(registry.names().is_empty());
}

#[tokio::test]
async fn stats_are_kept_per_name_and_aggregated() {
    let registry = registry();
    let canvas = registry.queue("canvas").unwrap();
    let scene = registry.queue("scene").unwrap();

    canvas.enqueue(|| Some(1), ok, OperationOptions::new()).unwrap().await;
    canvas.enqueue(|| Some(1), ok, OperationOptions::new()).unwrap().await;
    scene.enqueue(|| Some(2), fail, OperationOptions::new()).unwrap().await;

    let stats = registry.stats();
    assert_eq!(stats["canvas"].completed, 2);
    assert_eq!(stats["scene"].failed, 1);

    let total = registry.aggregate();
    assert_eq!(total.completed, 2);
    assert_eq!(total.failed, 1);
    assert_eq!(total.settled, 3);
    assert!(total.last_error.unwrap().contains("boom"));
}

#[tokio::test]
async fn cancel_all_only_touches_the_named_queue() {
    let registry = registry();
    let canvas = registry.queue("canvas").unwrap();
    let scene = registry.queue("scene").unwrap();
    let started = Arc::new(Notify::new());
    let gate = Arc::new(Notify::new());

    let hold = {
        let started = started.clone();
        let gate = gate.clone();
        move |_t: u32, _ctx: CancelContext| {
            let started = started.clone();
            let gate = gate.clone();
            async move {
                started.notify_one();
                gate.notified().await;
                Ok::<_, String>(())
            }
        }
    };

    let running = canvas.enqueue(|| Some(1), hold, OperationOptions::new()).unwrap();
    started.notified().await;
    let queued = canvas.enqueue(|| Some(1), ok, OperationOptions::new()).unwrap();
    let other = scene.enqueue(|| Some(2), ok, OperationOptions::new()).unwrap();

    assert_eq!(registry.cancel_all("canvas"), 1);
    assert!(queued.await.error().unwrap().is_cancelled());
    assert!(other.await.is_success());

    gate.notify_one();
    assert!(running.await.is_success());
}

#[tokio::test]
async fn shutdown_all_closes_and_resets() {
    let registry = registry();
    let canvas = registry.queue("canvas").unwrap();
    canvas.enqueue(|| Some(1), ok, OperationOptions::new()).unwrap().await;
    let pending = canvas.enqueue(|| Some(1), ok, OperationOptions::new()).unwrap();

    assert_eq!(registry.shutdown_all(), 1);
    assert!(pending.await.error().unwrap().is_cancelled());

    assert!(registry.is_closed());
    assert!(canvas.is_closed());
    assert!(registry.stats().is_empty());
    assert_eq!(
        registry.queue("canvas").err(),
        Some(QueueError::Closed {
            slot: "canvas".to_string()
        })
    );
}
