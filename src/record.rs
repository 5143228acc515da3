use crate::finite::Finite;
use chrono::{DateTime, FixedOffset, TimeZone};
use serde::ser::{Serialize, SerializeMap, Serializer};
use std::fmt;
use std::sync::Arc;
use tracing::Level;

/// One structured log record, handed to a [`LogSink`](crate::sink::LogSink)
/// by value and never mutated by it.
#[derive(Debug, Clone)]
pub struct LogEntry {
    pub time: DateTime<FixedOffset>,
    pub level: Level,
    /// Dot-separated hierarchical name, e.g. `comp.subcomp`.
    pub logger_name: String,
    pub message: String,
    pub file: String,
    pub line: u32,
    pub func: String,
    /// `None` when the entry was not logged inside a trace.
    pub span_context: Option<SpanContext>,
    pub fields: Fields,
}

impl LogEntry {
    /// Create an entry with no call-site, span context or fields.
    ///
    /// The timestamp keeps the offset of whatever time zone `time` was taken in.
    pub fn new<Tz: TimeZone>(time: DateTime<Tz>, level: Level, message: impl Into<String>) -> Self {
        Self {
            time: time.fixed_offset(),
            level,
            logger_name: String::new(),
            message: message.into(),
            file: String::new(),
            line: 0,
            func: String::new(),
            span_context: None,
            fields: Fields::new(),
        }
    }

    pub fn logger_name(mut self, name: impl Into<String>) -> Self {
        self.logger_name = name.into();
        self
    }

    pub fn caller(mut self, file: impl Into<String>, line: u32) -> Self {
        self.file = file.into();
        self.line = line;
        self
    }

    pub fn func(mut self, func: impl Into<String>) -> Self {
        self.func = func.into();
        self
    }

    pub fn span_context(mut self, ctx: SpanContext) -> Self {
        self.span_context = Some(ctx);
        self
    }

    /// Append a named field; see [`Fields::push`].
    pub fn field<V: FieldValue + 'static>(mut self, name: impl Into<String>, value: V) -> Self {
        self.fields.push(name, value);
        self
    }
}

/// 16-byte trace identifier, rendered as 32 lowercase hex digits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct TraceId(pub [u8; 16]);

/// 8-byte span identifier, rendered as 16 lowercase hex digits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct SpanId(pub [u8; 8]);

impl TraceId {
    /// Places `id` in the low 8 bytes.
    pub fn from_u64(id: u64) -> Self {
        let mut bytes = [0u8; 16];
        bytes[8..].copy_from_slice(&id.to_be_bytes());
        TraceId(bytes)
    }
}

impl SpanId {
    pub fn from_u64(id: u64) -> Self {
        SpanId(id.to_be_bytes())
    }
}

fn write_hex(f: &mut fmt::Formatter<'_>, bytes: &[u8]) -> fmt::Result {
    for b in bytes {
        write!(f, "{:02x}", b)?;
    }
    Ok(())
}

impl fmt::Display for TraceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_hex(f, &self.0)
    }
}

impl fmt::Display for SpanId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_hex(f, &self.0)
    }
}

/// Trace/span pair correlating an entry with a distributed trace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SpanContext {
    pub trace_id: TraceId,
    pub span_id: SpanId,
}

impl SpanContext {
    pub fn new(trace_id: TraceId, span_id: SpanId) -> Self {
        Self { trace_id, span_id }
    }
}

/// A value that can be attached to an entry as a named field.
///
/// Implemented for every `Serialize + Debug + Send + Sync` type. Conversion
/// happens at encode time, so a value whose `Serialize` impl fails (or that
/// produces something JSON can't hold, such as a map with non-string keys or
/// a NaN) surfaces as an encoding error rather than being dropped.
pub trait FieldValue: fmt::Debug + Send + Sync {
    fn to_json(&self) -> Result<serde_json::Value, serde_json::Error>;
}

impl<T> FieldValue for T
where
    T: Serialize + fmt::Debug + Send + Sync,
{
    fn to_json(&self) -> Result<serde_json::Value, serde_json::Error> {
        serde_json::to_value(Finite(self))
    }
}

/// Named fields in insertion order. Duplicate names are kept as-is.
#[derive(Debug, Clone, Default)]
pub struct Fields {
    entries: Vec<(String, Arc<dyn FieldValue>)>,
}

impl Fields {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push<V: FieldValue + 'static>(&mut self, name: impl Into<String>, value: V) {
        self.entries.push((name.into(), Arc::new(value)));
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &(dyn FieldValue + 'static))> + '_ {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_ref()))
    }
}

impl Serialize for Fields {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, value) in self.iter() {
            let json = value.to_json().map_err(serde::ser::Error::custom)?;
            map.serialize_entry(name, &json)?;
        }
        map.end()
    }
}
