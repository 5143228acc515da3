use std::fs::OpenOptions;
use std::time::Instant;

use chrono::Local;
use tracing::Level;
use tracing_json_sink::{JsonSink, LogEntry, LogSink};

/// Writes entries straight to a file without going through `tracing`, then
/// syncs the file to disk.
fn main() -> Result<(), Box<dyn std::error::Error>> {
    let path = std::env::temp_dir().join("tracing-json-sink-demo.jsonl");
    let file = OpenOptions::new().create(true).append(true).open(&path)?;
    let sink = JsonSink::file(file);

    let n: u64 = 10_000;
    let start = Instant::now();

    for i in 0..n {
        let entry = LogEntry::new(Local::now(), Level::INFO, "demo entry")
            .logger_name("demo.file_sync")
            .caller(file!(), line!())
            .func("file_sync::main")
            .field("iteration", i);
        sink.log_entry(&entry)?;
    }
    sink.sync()?;

    let elapsed = start.elapsed();
    println!(
        "wrote {} entries to {} in {:?} (~{:.0} entries/s)",
        n,
        path.display(),
        elapsed,
        n as f64 / elapsed.as_secs_f64()
    );
    Ok(())
}
