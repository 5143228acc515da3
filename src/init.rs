use crate::layer::JsonLayer;
use crate::sink::LogSink;
use std::sync::Arc;
use tracing::subscriber::SetGlobalDefaultError;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::Registry;

/// Configuration of the global subscriber installed by
/// [`init_tracing_with_config`].
///
/// **Fields**
/// - `enable_stdout`: if `true`, a `tracing_subscriber::fmt` layer is added
///   next to the [`JsonLayer`] and events are also printed to stdout in
///   human-readable form.
/// - `ansi`: whether that human-readable output uses colors. Pass
///   [`JsonSink::is_terminal`](crate::JsonSink::is_terminal) when the JSON
///   goes to the same terminal.
#[derive(Clone, Debug, Default)]
pub struct LayerConfig {
    pub enable_stdout: bool,
    pub ansi: bool,
}

/// Install `Registry + JsonLayer` as the global default subscriber.
///
/// **Errors**
///
/// Fails if a global subscriber has already been set.
pub fn init_tracing_with_config(
    sink: Arc<dyn LogSink>,
    config: LayerConfig,
) -> Result<(), SetGlobalDefaultError> {
    let layer = JsonLayer::new(sink);

    // The two subscriber shapes have different types, so each branch installs its own.
    if config.enable_stdout {
        let fmt_layer = tracing_subscriber::fmt::layer().with_ansi(config.ansi);
        let subscriber = Registry::default().with(layer).with(fmt_layer);
        tracing::subscriber::set_global_default(subscriber)
    } else {
        let subscriber = Registry::default().with(layer);
        tracing::subscriber::set_global_default(subscriber)
    }
}

/// Equivalent to [`init_tracing_with_config`] with [`LayerConfig::default`]:
/// JSON only, no human-readable echo.
pub fn init_tracing(sink: Arc<dyn LogSink>) -> Result<(), SetGlobalDefaultError> {
    init_tracing_with_config(sink, LayerConfig::default())
}
