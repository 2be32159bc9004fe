// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::cleanup::FakeCleanup;
use crate::validate::FakeValidator;
use std::sync::Mutex;
use tracing_subscriber::fmt::MakeWriter;

/// A writer that captures log output for testing
#[derive(Clone, Default)]
struct CapturedLogs {
    logs: Arc<Mutex<Vec<u8>>>,
}

impl CapturedLogs {
    fn contents(&self) -> String {
        let logs = self.logs.lock().unwrap();
        String::from_utf8_lossy(&logs).to_string()
    }
}

impl std::io::Write for CapturedLogs {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.logs.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for CapturedLogs {
    type Writer = CapturedLogs;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

/// Run a closure with captured tracing output
fn with_tracing<R>(f: impl FnOnce() -> R) -> (String, R) {
    let logs = CapturedLogs::default();

    let subscriber = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::TRACE)
        .with_writer(logs.clone())
        .with_ansi(false)
        .without_time()
        .finish();

    let result = tracing::subscriber::with_default(subscriber, f);
    (logs.contents(), result)
}

#[test]
fn traced_validator_delegates_verdict() {
    let fake = FakeValidator::new();
    fake.reject("7");
    let traced = TracedValidator::new("canvas", Arc::new(fake.clone()) as Arc<dyn Validator<u32>>);

    assert!(traced.validate(&6));
    assert!(!traced.validate(&7));
    assert_eq!(fake.calls().len(), 2);
    assert_eq!(traced.name(), "fake");
}

#[test]
fn traced_validator_logs_span_and_rejection() {
    let (logs, accepted) = with_tracing(|| {
        let fake = FakeValidator::new();
        fake.reject("\"bad\"");
        let traced =
            TracedValidator::new("canvas", Arc::new(fake) as Arc<dyn Validator<&str>>);
        traced.validate(&"bad")
    });

    assert!(!accepted);
    assert!(logs.contains("hook.validate"), "Should log span name. Logs:\n{}", logs);
    assert!(logs.contains("canvas"), "Should log slot. Logs:\n{}", logs);
    assert!(logs.contains("rejected"), "Should log verdict. Logs:\n{}", logs);
}

#[test]
fn traced_cleanup_passes_errors_through() {
    let (logs, result) = with_tracing(|| {
        let fake = FakeCleanup::new();
        fake.fail_on("3");
        let traced = TracedCleanup::new("scene", Arc::new(fake) as Arc<dyn Cleanup<u32>>);
        traced.cleanup(&3)
    });

    let err = result.unwrap_err();
    assert!(err.to_string().contains("fake cleanup refused 3"), "got: {}", err);
    assert!(logs.contains("hook.cleanup"), "Should log span name. Logs:\n{}", logs);
    assert!(logs.contains("release failed"), "Should log failure. Logs:\n{}", logs);
}

#[test]
fn traced_cleanup_logs_release() {
    let (logs, result) = with_tracing(|| {
        let traced = TracedCleanup::new(
            "scene",
            Arc::new(FakeCleanup::new()) as Arc<dyn Cleanup<u32>>,
        );
        traced.cleanup(&1)
    });

    assert!(result.is_ok());
    assert!(logs.contains("released"), "Logs:\n{}", logs);
}
