//! Queue ordering specs

use crate::prelude::*;

fn record(
    trace: &Trace,
    name: &'static str,
) -> impl Fn(String, CancelContext) -> std::future::Ready<Result<(), String>> + Send + Sync + 'static {
    let trace = trace.clone();
    move |_target, _ctx| {
        trace.push(name);
        std::future::ready(Ok(()))
    }
}

#[tokio::test]
async fn priority_desc_then_enqueue_order() {
    let engine = engine();
    engine.bind("x", handle("h")).unwrap();
    let trace = Trace::default();

    let a = engine
        .with_target("x", record(&trace, "A"), OperationOptions::new().with_priority(5))
        .unwrap();
    let b = engine
        .with_target("x", record(&trace, "B"), OperationOptions::new().with_priority(1))
        .unwrap();
    let c = engine
        .with_target("x", record(&trace, "C"), OperationOptions::new().with_priority(5))
        .unwrap();

    a.await;
    b.await;
    c.await;
    assert_eq!(trace.entries(), vec!["A", "C", "B"]);
}

#[tokio::test]
async fn different_slots_do_not_wait_for_each_other() {
    let engine = engine();
    engine.bind("x", handle("hx")).unwrap();
    engine.bind("y", handle("hy")).unwrap();
    let gate = Arc::new(tokio::sync::Notify::new());

    let blocked = {
        let gate = gate.clone();
        engine
            .with_target(
                "x",
                move |_t: String, _ctx: CancelContext| {
                    let gate = gate.clone();
                    async move {
                        gate.notified().await;
                        Ok::<_, String>(())
                    }
                },
                OperationOptions::new(),
            )
            .unwrap()
    };

    let trace = Trace::default();
    let other = engine
        .with_target("y", record(&trace, "y"), OperationOptions::new())
        .unwrap();
    assert!(other.await.is_success());
    assert_eq!(engine.stats("x").unwrap().completed, 0);

    gate.notify_one();
    assert!(blocked.await.is_success());
}
