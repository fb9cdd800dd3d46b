//! Logging setup.
//!
//! All log output goes to stderr: stdout carries the MCP protocol and must
//! stay clean. Levels come from `RUST_LOG` when set, otherwise from the
//! CLI's verbosity flags.

use tracing_subscriber::{fmt, EnvFilter};

/// Log level selected by the CLI.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogLevel {
    #[default]
    Info,
    Debug,
    Trace,
    /// Suppress everything below error.
    Quiet,
}

impl LogLevel {
    /// Maps `-v` counts: 0 is info, 1 is debug, 2 and up is trace.
    pub fn from_verbosity(verbosity: u8) -> Self {
        match verbosity {
            0 => Self::Info,
            1 => Self::Debug,
            _ => Self::Trace,
        }
    }

    fn directive(self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Debug => "debug",
            Self::Trace => "trace",
            Self::Quiet => "error",
        }
    }
}

/// Installs the global tracing subscriber. Call once at startup.
pub fn init_logging(level: LogLevel) {
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else {
        EnvFilter::new(level.directive())
    };

    fmt::Subscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .init();
}
