// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

fn unbound(slot: &str) -> Event {
    Event::SlotUnbound {
        slot: slot.to_string(),
    }
}

#[test]
fn append_assigns_increasing_sequence() {
    let mut log = EventLog::new(8);
    log.append(unbound("a"));
    log.append(unbound("b"));
    let records = log.records();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].sequence, 1);
    assert_eq!(records[1].sequence, 2);
    assert_eq!(records[1].name, "slot:unbound");
}

#[test]
fn oldest_records_are_evicted_at_capacity() {
    let mut log = EventLog::new(2);
    for slot in ["a", "b", "c"] {
        log.append(unbound(slot));
    }
    let slots: Vec<_> = log.records().iter().map(|r| r.event.slot().to_string()).collect();
    assert_eq!(slots, vec!["b", "c"]);
    assert_eq!(log.current_sequence(), 3);
}

#[test]
fn zero_capacity_counts_but_keeps_nothing() {
    let mut log = EventLog::new(0);
    assert!(log.append(unbound("a")).is_none());
    assert!(log.is_empty());
    assert_eq!(log.current_sequence(), 1);
}

#[test]
fn query_and_after_filter_records() {
    let mut log = EventLog::new(8);
    log.append(unbound("a"));
    log.append(Event::SlotRejected {
        slot: "a".to_string(),
        reason: "wrong kind".to_string(),
    });
    log.append(unbound("b"));

    let rejected = log.query(&EventPattern::new("slot:rejected"));
    assert_eq!(rejected.len(), 1);
    assert_eq!(log.after(1).len(), 2);
}

#[tokio::test(start_paused = true)]
async fn elapsed_follows_the_engine_clock() {
    let mut log = EventLog::new(8);
    log.append(unbound("a"));
    tokio::time::advance(std::time::Duration::from_millis(1_500)).await;
    log.append(unbound("b"));

    let elapsed: Vec<u64> = log.records().iter().map(|r| r.elapsed_ms).collect();
    assert_eq!(elapsed, vec![0, 1_500]);
}
