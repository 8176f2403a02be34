//! Logging infrastructure.
//!
//! Two layers:
//! - Process-wide `tracing` output, installed once by the binary with
//!   [`init_tracing`]
//! - One [`RunLogger`] per run, writing its own log file and feeding an
//!   optional UI callback
//!
//! # Example
//!
//! ```no_run
//! use avatar_core::logging::{LogConfig, RunLogger};
//!
//! let logger = RunLogger::new("20260101_120000_p42_000", "outputs/logs", LogConfig::default(), None)
//!     .unwrap();
//!
//! logger.stage("Composite");
//! logger.command("ffmpeg -y -loop 1 -i bg.png ...");
//! logger.success("Run completed");
//! ```

mod run_logger;
mod types;

pub use run_logger::RunLogger;
pub use types::{LogCallback, LogConfig, LogLevel};

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Install the global subscriber writing to stderr.
///
/// `RUST_LOG` wins over `default_level` when set. Call once at startup.
pub fn init_tracing(default_level: LogLevel) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_level.as_filter()));

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(false)
                .with_thread_ids(false)
                .with_writer(std::io::stderr),
        )
        .with(filter)
        .init();
}
