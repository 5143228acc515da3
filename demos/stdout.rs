use std::sync::Arc;

use tracing::{error, info, info_span};
use tracing_json_sink::init::{init_tracing_with_config, LayerConfig};
use tracing_json_sink::JsonSink;

fn main() {
    let sink = JsonSink::stdout();
    let config = LayerConfig {
        enable_stdout: false,
        ansi: sink.is_terminal(),
    };
    init_tracing_with_config(Arc::new(sink), config).expect("set global subscriber");

    info!("starting service");

    let span = info_span!("authenticate", user_id = 42);
    let _guard = span.enter();
    error!(user_id = 42, reason = "invalid password", "authentication failed");
}
