//! Tests for routing `tracing` events through the JSON layer.

use serde_json::Value;
use std::io::{self, Write};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tracing_json_sink::layer::JsonLayer;
use tracing_json_sink::{JsonSink, LogEntry, LogSink, SinkError};
use tracing_subscriber::layer::SubscriberExt;

/// Cloneable in-memory writer so the test can read back what the sink wrote.
#[derive(Clone, Default)]
struct SharedBuf(Arc<Mutex<Vec<u8>>>);

impl SharedBuf {
    fn lines(&self) -> Vec<Value> {
        let buf = self.0.lock().unwrap();
        std::str::from_utf8(&buf)
            .unwrap()
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect()
    }
}

impl Write for SharedBuf {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

fn capture(f: impl FnOnce()) -> Vec<Value> {
    let buf = SharedBuf::default();
    let sink: Arc<dyn LogSink> = Arc::new(JsonSink::new(buf.clone()));
    let subscriber = tracing_subscriber::registry().with(JsonLayer::new(sink));
    tracing::subscriber::with_default(subscriber, f);
    buf.lines()
}

#[test]
fn event_outside_span_has_no_trace() {
    let lines = capture(|| tracing::info!("service started"));
    assert_eq!(lines.len(), 1);

    let line = &lines[0];
    assert_eq!(line["level"], "INFO");
    assert_eq!(line["msg"], "service started");
    assert_eq!(line["component"], "layer");
    assert_eq!(line["func"], "layer");
    assert!(line["caller"].as_str().unwrap().starts_with("tests/layer.rs:"));
    assert!(line.get("trace").is_none());
    assert!(line.get("span").is_none());
    assert!(line.get("fields").is_none());
}

#[test]
fn event_fields_keep_types_and_order() {
    let lines = capture(|| {
        tracing::error!(user_id = 42u64, reason = "invalid password", retry = false, "auth failed");
    });

    let line = &lines[0];
    assert_eq!(line["level"], "ERROR");
    assert_eq!(line["msg"], "auth failed");
    let fields = line["fields"].as_object().unwrap();
    let names: Vec<_> = fields.keys().map(String::as_str).collect();
    assert_eq!(names, ["user_id", "reason", "retry"]);
    assert_eq!(fields["user_id"], 42);
    assert_eq!(fields["reason"], "invalid password");
    assert_eq!(fields["retry"], false);
}

#[test]
fn floats_stay_numbers() {
    let lines = capture(|| tracing::info!(ratio = 0.75f64, "sampled"));
    let ratio = &lines[0]["fields"]["ratio"];
    assert!(ratio.is_f64());
    assert_eq!(ratio.as_f64(), Some(0.75));
}

#[test]
fn debug_and_error_values_become_strings() {
    let err = io::Error::new(io::ErrorKind::Other, "disk full");
    let lines = capture(|| {
        tracing::warn!(
            ids = ?vec![1, 2],
            cause = &err as &(dyn std::error::Error + 'static),
            "write failed"
        );
    });

    let fields = &lines[0]["fields"];
    assert_eq!(fields["ids"], "[1, 2]");
    assert_eq!(fields["cause"], "disk full");
}

#[test]
fn non_finite_field_drops_the_event_and_counts_it() {
    let buf = SharedBuf::default();
    let layer = JsonLayer::new(Arc::new(JsonSink::new(buf.clone())));
    let failed = Arc::clone(&layer.failed_events);

    let subscriber = tracing_subscriber::registry().with(layer);
    tracing::subscriber::with_default(subscriber, || {
        tracing::info!(ratio = f64::NAN, "bad sample");
        tracing::info!(ratio = 0.5f64, "good sample");
    });

    assert_eq!(failed.load(Ordering::Relaxed), 1);
    let lines = buf.lines();
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0]["msg"], "good sample");
}

#[test]
fn nested_spans_set_trace_and_span() {
    let lines = capture(|| {
        let outer = tracing::info_span!("handle_request");
        let _outer = outer.enter();
        tracing::warn!("in outer");

        let inner = tracing::info_span!("query_db");
        let _inner = inner.enter();
        tracing::warn!(table = "users", "in inner");
    });
    assert_eq!(lines.len(), 2);

    let (outer, inner) = (&lines[0], &lines[1]);
    assert_eq!(outer["func"], "layer::handle_request");
    assert_eq!(inner["func"], "layer::query_db");

    // Both events share the root span's trace id; span ids differ.
    assert_eq!(outer["trace"], inner["trace"]);
    assert_ne!(outer["span"], inner["span"]);
    assert_eq!(outer["trace"].as_str().unwrap().len(), 32);
    assert_eq!(inner["span"].as_str().unwrap().len(), 16);

    let keys: Vec<_> = inner.as_object().unwrap().keys().map(String::as_str).collect();
    assert_eq!(
        keys,
        ["ts", "level", "component", "msg", "caller", "func", "trace", "span", "fields"]
    );
}

struct FailingSink;

impl LogSink for FailingSink {
    fn log_entry(&self, _entry: &LogEntry) -> Result<(), SinkError> {
        Err(SinkError::Write(io::Error::new(io::ErrorKind::Other, "disk full")))
    }
}

#[test]
fn sink_failures_are_counted_not_propagated() {
    let layer = JsonLayer::new(Arc::new(FailingSink));
    let total = Arc::clone(&layer.total_events);
    let failed = Arc::clone(&layer.failed_events);

    let subscriber = tracing_subscriber::registry().with(layer);
    tracing::subscriber::with_default(subscriber, || {
        tracing::info!("one");
        tracing::debug!("two");
    });

    assert_eq!(total.load(Ordering::Relaxed), 2);
    assert_eq!(failed.load(Ordering::Relaxed), 2);
}

#[derive(Default)]
struct CountingSink {
    syncs: AtomicUsize,
}

impl LogSink for CountingSink {
    fn log_entry(&self, _entry: &LogEntry) -> Result<(), SinkError> {
        Ok(())
    }

    fn sync(&self) -> Result<(), SinkError> {
        self.syncs.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }
}

#[test]
fn layer_sync_reaches_the_sink() {
    let sink = Arc::new(CountingSink::default());
    let layer = JsonLayer::new(sink.clone());

    layer.sync().unwrap();
    layer.sync().unwrap();
    assert_eq!(sink.syncs.load(Ordering::Relaxed), 2);
}
