//! Tracing set-up for the `depwatch` binary.
//!
//! Events are written to stderr; stdout is reserved for reports.

use anyhow::Result;
use depwatch_core::LoggingConfig;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, Registry};

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

/// Install the global subscriber described by `config`.
///
/// `RUST_LOG`, when set, replaces `config.level`.
pub fn init_tracing(config: &LoggingConfig) -> Result<()> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    tracing_subscriber::registry()
        .with(output_layer(&config.format)?)
        .with(filter)
        .try_init()
        .map_err(|e| anyhow::anyhow!("failed to install {} log subscriber: {e}", config.format))
}

fn output_layer(format: &str) -> Result<BoxedLayer> {
    let layer = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);
    match format {
        "json" => Ok(layer.json().boxed()),
        "pretty" => Ok(layer.pretty().boxed()),
        other => anyhow::bail!("unknown log format '{other}', expected 'json' or 'pretty'"),
    }
}
