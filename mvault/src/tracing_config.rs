//! Tracing subscriber setup for the binaries.

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Targets whose level follows the verbosity flag. Everything else,
/// `reqwest` and `hyper` included, stays at `warn`.
const CRATE_TARGETS: [&str; 2] = ["mvault", "mvault_ingest"];

/// Logging options taken from the command line.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingConfig {
    /// Number of `-v` flags: 0 is `info`, 1 is `debug`, more is `trace`
    pub verbosity: u8,
    /// Emit one JSON object per event
    pub json_output: bool,
}

impl TracingConfig {
    /// Config for a binary invocation.
    #[must_use]
    pub const fn new(verbosity: u8, json_output: bool) -> Self {
        Self {
            verbosity,
            json_output,
        }
    }

    /// Filter directives used when `RUST_LOG` is unset.
    #[must_use]
    pub fn directives(&self) -> String {
        let level = match self.verbosity {
            0 => "info",
            1 => "debug",
            _ => "trace",
        };
        let mut directives = String::from("warn");
        for target in CRATE_TARGETS {
            directives.push_str(&format!(",{target}={level}"));
        }
        directives
    }
}

/// Install the global subscriber, writing to stderr.
///
/// `RUST_LOG` replaces the verbosity-derived filter when set.
pub fn init_tracing(config: &TracingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(config.directives()));
    let registry = tracing_subscriber::registry().with(filter);

    if config.json_output {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(false)
                    .with_writer(std::io::stderr),
            )
            .init();
    }
}
