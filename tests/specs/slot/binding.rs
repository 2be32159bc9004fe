//! Binding specs
//!
//! Rebinding, validation fallback and cleanup as seen through the engine.

use crate::prelude::*;
use tether_adapters::FnValidator;

#[tokio::test]
async fn operation_runs_against_handle_bound_when_it_starts() {
    let engine = engine();
    engine.bind("x", handle("h1")).unwrap();

    let seen = engine
        .with_target(
            "x",
            |target: String, _ctx: CancelContext| async move { Ok::<_, String>(target) },
            OperationOptions::new(),
        )
        .unwrap();
    // Rebind before the queued operation gets a turn
    engine.bind("x", handle("h2")).unwrap();

    assert_eq!(seen.await.into_result(), Ok(handle("h2")));
}

#[test]
fn invalid_candidate_with_static_fallback_binds_the_fallback() {
    let engine = engine();
    engine.define(
        "x",
        SlotDefinition::new().with_validator(FnValidator::new("not-bad", |h: &String| {
            h != "bad"
        })),
    );

    let bound = engine
        .bind_with("x", handle("bad"), &RecoveryStrategy::fallback(handle("f")))
        .unwrap();

    assert!(bound.fallback);
    assert!(engine.is_bound("x"));
    assert_eq!(engine.current("x"), Some(handle("f")));
}

#[test]
fn invalid_candidate_with_fail_keeps_previous_state() {
    let engine = engine();
    engine.define(
        "x",
        SlotDefinition::new().with_validator(FnValidator::new("not-bad", |h: &String| {
            h != "bad"
        })),
    );

    assert!(engine.bind("x", handle("bad")).is_err());
    assert!(!engine.is_bound("x"));

    engine.bind("x", handle("good")).unwrap();
    assert!(engine.bind("x", handle("bad")).is_err());
    assert_eq!(engine.current("x"), Some(handle("good")));
}

#[test]
fn failing_cleanup_never_reaches_the_unbinder() {
    let engine = engine();
    engine.define(
        "x",
        SlotDefinition::new().with_cleanup(tether_adapters::FnCleanup::new(
            "explode",
            |_h: &String| -> Result<(), tether_core::CleanupError> {
                Err(tether_core::CleanupError::new("device lost"))
            },
        )),
    );
    engine.bind("x", handle("h1")).unwrap();

    assert!(engine.unbind("x").is_ok());
    assert!(!engine.is_bound("x"));
    assert_eq!(engine.slot_info("x").unwrap().cleanup_failures, 1);
    assert_eq!(engine.events().query("slot:cleanup_failed").len(), 1);
}
