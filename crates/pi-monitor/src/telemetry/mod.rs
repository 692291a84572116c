//! Telemetry for Pi Monitor
//!
//! - `metrics` - Prometheus counters and histograms for a run
//! - logging initialisation for the binary (`tracing-subscriber`)

pub mod metrics;

pub use metrics::MonitorMetrics;

use clap::ValueEnum;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Log line format
#[derive(Copy, Clone, PartialEq, Eq, ValueEnum, Debug, Default)]
pub enum LogFormat {
    /// Human-readable lines
    #[default]
    Text,
    /// One JSON object per line
    Json,
}

/// Filter directive for a `-v` count
pub fn level_directive(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "info",
        1 => "debug",
        _ => "trace",
    }
}

/// Build the log filter.
///
/// `-v` flags win over `RUST_LOG`; without them `RUST_LOG` is honoured
/// and `info` is the fallback.
pub fn build_filter(verbosity: u8) -> EnvFilter {
    if verbosity > 0 {
        return EnvFilter::new(level_directive(verbosity));
    }
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level_directive(0)))
}

/// Install the global tracing subscriber
pub fn init_logging(verbosity: u8, format: LogFormat) {
    let registry = tracing_subscriber::registry().with(build_filter(verbosity));

    match format {
        LogFormat::Json => registry.with(tracing_subscriber::fmt::layer().json()).init(),
        LogFormat::Text => registry
            .with(tracing_subscriber::fmt::layer().with_target(false))
            .init(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_directive() {
        assert_eq!(level_directive(0), "info");
        assert_eq!(level_directive(1), "debug");
        assert_eq!(level_directive(5), "trace");
    }

    #[test]
    fn test_verbose_filter_overrides_env() {
        let filter = build_filter(1);
        assert_eq!(filter.to_string(), "debug");
    }
}
