//! Logger setup.
//!
//! The crates log through the `log` facade; records are bridged into a
//! `tracing-subscriber` fmt layer, either as text lines or as one JSON object
//! per line. `RUST_LOG` directives are applied on top of the configured level.

use anyhow::Result;
use tracing::Subscriber;
use tracing_subscriber::{
    filter::LevelFilter,
    fmt::{self, MakeWriter},
    layer::SubscriberExt,
    registry::LookupSpan,
    util::SubscriberInitExt,
    EnvFilter, Layer,
};

/// Parse a configured level name, case-insensitively.
///
/// Unknown names fall back to `error`.
pub fn parse_level(name: &str) -> LevelFilter {
    match name.trim().to_ascii_lowercase().as_str() {
        "trace" => LevelFilter::TRACE,
        "debug" => LevelFilter::DEBUG,
        "info" => LevelFilter::INFO,
        "warn" | "warning" => LevelFilter::WARN,
        _ => LevelFilter::ERROR,
    }
}

fn env_filter(level: &str) -> EnvFilter {
    EnvFilter::builder()
        .with_default_directive(parse_level(level).into())
        .from_env_lossy()
}

/// `{timestamp, level, target, message, ...}` per line.
fn json_layer<S, W>(writer: W) -> impl Layer<S>
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    fmt::layer()
        .json()
        .flatten_event(true)
        .with_current_span(false)
        .with_span_list(false)
        .with_target(true)
        .with_writer(writer)
}

/// Install the global logger.
pub fn init(level: &str, json: bool) -> Result<()> {
    let filter = env_filter(level);
    let registry = tracing_subscriber::registry();

    let installed = if json {
        registry
            .with(json_layer(std::io::stderr).with_filter(filter))
            .try_init()
    } else {
        registry
            .with(
                fmt::layer()
                    .with_target(true)
                    .with_writer(std::io::stderr)
                    .with_filter(filter),
            )
            .try_init()
    };

    installed.map_err(|e| anyhow::anyhow!("Failed to initialize logger: {e}"))
}
