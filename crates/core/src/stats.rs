// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Running statistics for one operation queue

use serde::Serialize;
use std::time::Duration;

/// Snapshot of one queue's counters
///
/// `pending` and `processing` are sampled at snapshot time; everything else
/// accumulates from the queue's creation until its registry shuts down.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct QueueStats {
    pub pending: usize,
    /// 0 or 1; a queue runs one item at a time
    pub processing: usize,
    pub completed: u64,
    pub failed: u64,
    pub cancelled: u64,
    /// Failed attempts that were put back for another try
    pub retried: u64,
    /// Processing time of completed items
    #[serde(with = "humantime_serde")]
    pub total_duration: Duration,
    /// Time settled items spent between enqueue and settlement
    #[serde(with = "humantime_serde")]
    pub total_wait: Duration,
    /// Settled items counted in `total_wait`
    pub settled: u64,
    pub last_error: Option<String>,
}

impl QueueStats {
    pub fn average_duration(&self) -> Duration {
        average(self.total_duration, self.completed)
    }

    pub fn average_wait(&self) -> Duration {
        average(self.total_wait, self.settled)
    }

    pub fn record_success(&mut self, duration: Duration, waited: Duration) {
        self.completed += 1;
        self.total_duration += duration;
        self.record_settled(waited);
    }

    pub fn record_failure(&mut self, error: impl Into<String>, waited: Duration) {
        self.failed += 1;
        self.last_error = Some(error.into());
        self.record_settled(waited);
    }

    /// Item rejected by `cancel_all` or shutdown before it started
    pub fn record_rejected(&mut self, waited: Duration) {
        self.failed += 1;
        self.cancelled += 1;
        self.record_settled(waited);
    }

    /// Item skipped because its own token was cancelled before it started
    pub fn record_skipped(&mut self, waited: Duration) {
        self.cancelled += 1;
        self.record_settled(waited);
    }

    pub fn record_retry(&mut self) {
        self.retried += 1;
    }

    /// Fold another queue's counters into this one
    pub fn merge(&mut self, other: &QueueStats) {
        self.pending += other.pending;
        self.processing += other.processing;
        self.completed += other.completed;
        self.failed += other.failed;
        self.cancelled += other.cancelled;
        self.retried += other.retried;
        self.total_duration += other.total_duration;
        self.total_wait += other.total_wait;
        self.settled += other.settled;
        if other.last_error.is_some() {
            self.last_error.clone_from(&other.last_error);
        }
    }

    fn record_settled(&mut self, waited: Duration) {
        self.settled += 1;
        self.total_wait += waited;
    }
}

fn average(total: Duration, count: u64) -> Duration {
    match u32::try_from(count) {
        Ok(0) => Duration::ZERO,
        Ok(n) => total / n,
        Err(_) => Duration::from_secs_f64(total.as_secs_f64() / count as f64),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn averages_are_zero_without_samples() {
        let stats = QueueStats::default();
        assert_eq!(stats.average_duration(), Duration::ZERO);
        assert_eq!(stats.average_wait(), Duration::ZERO);
    }

    #[test]
    fn success_updates_duration_and_wait() {
        let mut stats = QueueStats::default();
        stats.record_success(Duration::from_millis(10), Duration::from_millis(2));
        stats.record_success(Duration::from_millis(30), Duration::from_millis(4));
        assert_eq!(stats.completed, 2);
        assert_eq!(stats.average_duration(), Duration::from_millis(20));
        assert_eq!(stats.average_wait(), Duration::from_millis(3));
    }

    #[test]
    fn rejection_counts_as_failed_and_cancelled() {
        let mut stats = QueueStats::default();
        stats.record_rejected(Duration::ZERO);
        stats.record_skipped(Duration::ZERO);
        assert_eq!(stats.failed, 1);
        assert_eq!(stats.cancelled, 2);
        assert_eq!(stats.average_duration(), Duration::ZERO);
    }

    #[test]
    fn merge_sums_counters() {
        let mut a = QueueStats::default();
        a.record_success(Duration::from_millis(5), Duration::ZERO);
        let mut b = QueueStats {
            pending: 2,
            ..QueueStats::default()
        };
        b.record_failure("boom", Duration::ZERO);

        a.merge(&b);
        assert_eq!(a.pending, 2);
        assert_eq!(a.completed, 1);
        assert_eq!(a.failed, 1);
        assert_eq!(a.last_error.as_deref(), Some("boom"));
    }

    #[test]
    fn serializes_durations_human_readably() {
        let mut stats = QueueStats::default();
        stats.record_success(Duration::from_millis(1500), Duration::ZERO);
        let json = serde_json::to_value(&stats).unwrap();
        assert_eq!(json["total_duration"], "1s 500ms");
        assert_eq!(json["completed"], 1);
    }
}
