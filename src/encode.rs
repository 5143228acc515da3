//! Rendering of a [`LogEntry`] as one line of JSON.
//!
//! Line format, keys always in this order:
//!
//! ```text
//! {
//!   "ts": "2019-09-10T20:19:07.159852-05:00",
//!   "level": "INFO",
//!   "component": "comp.subcomp",
//!   "msg": "hi",
//!   "caller": "slog/examples_test.go:62",
//!   "func": "pkg.TestExampleTest",
//!   "trace": "<trace id>",
//!   "span": "<span id>",
//!   "fields": {
//!     "myField": "fieldValue"
//!   }
//! }
//! ```
//!
//! `trace`/`span` appear only when the entry has a span context and `fields`
//! only when it has at least one field. Absent keys are omitted, not `null`.

use crate::error::SinkError;
use crate::record::{Fields, LogEntry};
use chrono::SecondsFormat;
use serde::Serialize;

/// Borrowed view of an entry in wire order. Field declaration order is the
/// key order of the emitted object.
#[derive(Serialize)]
struct Record<'a> {
    ts: String,
    level: &'static str,
    component: &'a str,
    msg: &'a str,
    caller: String,
    func: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    trace: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    span: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    fields: Option<&'a Fields>,
}

impl<'a> Record<'a> {
    fn from_entry(entry: &'a LogEntry) -> Self {
        let (trace, span) = match &entry.span_context {
            Some(ctx) => (Some(ctx.trace_id.to_string()), Some(ctx.span_id.to_string())),
            None => (None, None),
        };

        Record {
            ts: entry.time.to_rfc3339_opts(SecondsFormat::AutoSi, true),
            level: entry.level.as_str(),
            component: &entry.logger_name,
            msg: &entry.message,
            caller: format!("{}:{}", entry.file, entry.line),
            func: &entry.func,
            trace,
            span,
            fields: (!entry.fields.is_empty()).then_some(&entry.fields),
        }
    }
}

/// Encode `entry` as a single JSON object followed by `\n`.
///
/// Fails with [`SinkError::Encode`] when a field value can't be represented
/// as JSON.
pub fn encode(entry: &LogEntry) -> Result<Vec<u8>, SinkError> {
    let record = Record::from_entry(entry);
    let mut buf = serde_json::to_vec(&record).map_err(SinkError::Encode)?;
    buf.push(b'\n');
    Ok(buf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{SpanContext, SpanId, TraceId};
    use chrono::{FixedOffset, TimeZone};
    use tracing::Level;

    fn entry() -> LogEntry {
        let tz = FixedOffset::west_opt(5 * 3600).unwrap();
        let time = tz
            .with_ymd_and_hms(2019, 9, 10, 20, 19, 7)
            .unwrap()
            + chrono::Duration::microseconds(159_852);
        LogEntry::new(time, Level::INFO, "hi")
            .logger_name("comp.subcomp")
            .caller("slog/examples_test.go", 62)
            .func("pkg.TestExampleTest")
    }

    #[test]
    fn timestamp_keeps_offset_and_micros() {
        let line = String::from_utf8(encode(&entry()).unwrap()).unwrap();
        assert!(line.starts_with(r#"{"ts":"2019-09-10T20:19:07.159852-05:00","#));
    }

    #[test]
    fn utc_timestamp_uses_z() {
        let mut e = entry();
        e.time = chrono::Utc
            .with_ymd_and_hms(2020, 1, 2, 3, 4, 5)
            .unwrap()
            .fixed_offset();
        let line = String::from_utf8(encode(&e).unwrap()).unwrap();
        assert!(line.starts_with(r#"{"ts":"2020-01-02T03:04:05Z","#));
    }

    #[test]
    fn span_ids_render_as_hex() {
        let e = entry().span_context(SpanContext::new(
            TraceId::from_u64(0xab),
            SpanId::from_u64(1),
        ));
        let line = String::from_utf8(encode(&e).unwrap()).unwrap();
        assert!(line.contains(
            r#""trace":"000000000000000000000000000000ab","span":"0000000000000001""#
        ));
    }

    #[test]
    fn escapes_control_characters() {
        let e = entry().field("k", "a\"b\n\u{1}");
        let line = String::from_utf8(encode(&e).unwrap()).unwrap();
        assert!(line.contains(r#""k":"a\"b\n\u0001""#));
        assert_eq!(line.matches('\n').count(), 1);
    }
}
