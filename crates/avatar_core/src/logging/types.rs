//! Log levels and per-run log configuration.

use serde::{Deserialize, Serialize};

use crate::config::LoggingSettings;

/// Minimum severity written to a run log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl LogLevel {
    /// Directive understood by `tracing_subscriber::EnvFilter`.
    pub fn as_filter(self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

/// How a [`RunLogger`](super::RunLogger) filters and decorates lines.
#[derive(Debug, Clone)]
pub struct LogConfig {
    pub level: LogLevel,
    /// Keep tool output out of the log (tail only) and thin out progress.
    pub compact: bool,
    /// Progress is logged once per this many percent in compact mode.
    pub progress_step: u32,
    /// Tool output lines retained for failure reports.
    pub error_tail: usize,
    pub show_timestamps: bool,
    /// Also log each external command's arguments one per line.
    pub show_command_pretty: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::Info,
            compact: true,
            progress_step: 20,
            error_tail: 20,
            show_timestamps: true,
            show_command_pretty: false,
        }
    }
}

impl LogConfig {
    /// Build from the `[logging]` config section.
    pub fn from_settings(settings: &LoggingSettings) -> Self {
        Self {
            level: settings.level,
            compact: settings.compact,
            progress_step: settings.progress_step.max(1),
            error_tail: settings.error_tail as usize,
            show_timestamps: true,
            show_command_pretty: settings.show_command_pretty,
        }
    }
}

/// Receives every formatted run log line, e.g. for a UI log pane.
pub type LogCallback = Box<dyn Fn(&str) + Send + Sync>;
