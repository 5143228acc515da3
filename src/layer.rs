use crate::record::{Fields, LogEntry, SpanContext, SpanId, TraceId};
use crate::sink::LogSink;
use chrono::Local;
use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc,
};
use tracing::field::{Field, Visit};
use tracing::{Event, Subscriber};
use tracing_subscriber::layer::{Context, Layer};
use tracing_subscriber::registry::LookupSpan;

/// `tracing_subscriber` layer that turns every event into a [`LogEntry`]
/// and hands it to a [`LogSink`] on the calling thread.
///
/// No filtering happens here; put a filter layer in front if one is needed.
/// Sink failures can't be returned from a layer, so they are counted and
/// reported on stderr. They are never re-logged through `tracing`.
pub struct JsonLayer {
    sink: Arc<dyn LogSink>,
    /// Total events seen by the layer.
    pub total_events: Arc<AtomicU64>,
    /// Events the sink failed to encode or write.
    pub failed_events: Arc<AtomicU64>,
}

impl JsonLayer {
    pub fn new(sink: Arc<dyn LogSink>) -> Self {
        Self {
            sink,
            total_events: Arc::new(AtomicU64::new(0)),
            failed_events: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Sync the underlying sink.
    pub fn sync(&self) -> Result<(), crate::error::SinkError> {
        self.sink.sync()
    }
}

impl<S> Layer<S> for JsonLayer
where
    S: Subscriber + for<'span> LookupSpan<'span>,
{
    fn on_event(&self, event: &Event<'_>, ctx: Context<'_, S>) {
        self.total_events.fetch_add(1, Ordering::Relaxed);

        let mut fields = Fields::new();
        let mut message: Option<String> = None;

        let mut visitor = FieldVisitor {
            fields: &mut fields,
            message: &mut message,
        };
        event.record(&mut visitor);

        let meta = event.metadata();
        let mut func = meta.module_path().unwrap_or_default().to_string();
        let mut span_context = None;

        // Innermost span names the function; the root span stands in for the trace.
        if let Some(scope) = ctx.event_scope(event) {
            let spans: Vec<_> = scope.collect();
            if let (Some(leaf), Some(root)) = (spans.first(), spans.last()) {
                if !func.is_empty() {
                    func.push_str("::");
                }
                func.push_str(leaf.name());
                span_context = Some(SpanContext::new(
                    TraceId::from_u64(root.id().into_u64()),
                    SpanId::from_u64(leaf.id().into_u64()),
                ));
            }
        }

        let entry = LogEntry {
            time: Local::now().fixed_offset(),
            level: *meta.level(),
            logger_name: meta.target().replace("::", "."),
            message: message.unwrap_or_default(),
            file: meta.file().unwrap_or_default().to_string(),
            line: meta.line().unwrap_or_default(),
            func,
            span_context,
            fields,
        };

        if let Err(e) = self.sink.log_entry(&entry) {
            self.failed_events.fetch_add(1, Ordering::Relaxed);
            eprintln!("dropping log entry: {}", e);
        }
    }
}

/// Collects event fields in recording order, pulling out `message`.
pub struct FieldVisitor<'a> {
    pub fields: &'a mut Fields,
    pub message: &'a mut Option<String>,
}

impl<'a> Visit for FieldVisitor<'a> {
    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            *self.message = Some(value.to_string());
        } else {
            self.fields.push(field.name(), value.to_string());
        }
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.fields.push(field.name(), value);
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        self.fields.push(field.name(), value);
    }

    fn record_f64(&mut self, field: &Field, value: f64) {
        self.fields.push(field.name(), value);
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        self.fields.push(field.name(), value);
    }

    fn record_error(&mut self, field: &Field, value: &(dyn std::error::Error + 'static)) {
        self.fields.push(field.name(), value.to_string());
    }

    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        if field.name() == "message" {
            *self.message = Some(format!("{:?}", value));
        } else {
            self.fields.push(field.name(), format!("{:?}", value));
        }
    }
}
