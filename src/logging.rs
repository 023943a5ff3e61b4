//! Tracing subscriber setup.
//!
//! Logs go to stderr so stdout stays parseable for scripts (`gridai extract`
//! output, `gridai chunk --json`). `RUST_LOG` overrides the default filter;
//! `LOG_FORMAT=json` switches to JSON lines.

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

const DEFAULT_FILTER: &str = "warn,gridai=info";

pub struct LogConfig {
    pub json_format: bool,
    /// Raise the crate's own level to debug.
    pub verbose: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            json_format: std::env::var("LOG_FORMAT")
                .map(|v| v.eq_ignore_ascii_case("json"))
                .unwrap_or(false),
            verbose: false,
        }
    }
}

pub fn init_tracing(config: LogConfig) {
    let fallback = if config.verbose {
        "warn,gridai=debug"
    } else {
        DEFAULT_FILTER
    };
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));

    if config.json_format {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().json().with_target(true).with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
            .init();
    }
}
