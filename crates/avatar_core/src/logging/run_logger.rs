//! Per-run log file.
//!
//! A [`RunLogger`] belongs to exactly one run. Every line goes to
//! `<logs_folder>/<run_id>.log`, to the optional UI callback and to `tracing`.
//! Output of external tools is held in a bounded tail that is replayed into
//! the log when a tool fails.

use std::collections::VecDeque;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::Local;
use parking_lot::Mutex;

use super::types::{LogCallback, LogConfig, LogLevel};

struct Outputs {
    file: Option<BufWriter<File>>,
    callback: Option<LogCallback>,
}

/// Last lines printed by the current external command.
struct ToolTail {
    lines: VecDeque<String>,
    capacity: usize,
}

impl ToolTail {
    fn new(capacity: usize) -> Self {
        Self {
            lines: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    fn push(&mut self, line: &str) {
        if self.capacity == 0 {
            return;
        }
        if self.lines.len() == self.capacity {
            self.lines.pop_front();
        }
        self.lines.push_back(line.to_string());
    }
}

pub struct RunLogger {
    run_id: String,
    log_path: PathBuf,
    config: LogConfig,
    outputs: Mutex<Outputs>,
    tail: Mutex<ToolTail>,
    /// Stage and percent of the last progress line written.
    last_progress: Mutex<Option<(String, u32)>>,
}

impl RunLogger {
    /// Create `<log_dir>/<run_id>.log`, creating the directory if needed.
    pub fn new(
        run_id: impl Into<String>,
        log_dir: impl AsRef<Path>,
        config: LogConfig,
        callback: Option<LogCallback>,
    ) -> std::io::Result<Self> {
        let run_id = run_id.into();
        let log_dir = log_dir.as_ref();
        fs::create_dir_all(log_dir)?;

        let log_path = log_dir.join(format!("{}.log", sanitize_filename(&run_id)));
        let file = File::create(&log_path)?;

        Ok(Self {
            run_id,
            log_path,
            outputs: Mutex::new(Outputs {
                file: Some(BufWriter::new(file)),
                callback,
            }),
            tail: Mutex::new(ToolTail::new(config.error_tail)),
            last_progress: Mutex::new(None),
            config,
        })
    }

    pub fn run_id(&self) -> &str {
        &self.run_id
    }

    pub fn log_path(&self) -> &Path {
        &self.log_path
    }

    pub fn config(&self) -> &LogConfig {
        &self.config
    }

    /// Write `message` if `level` passes the configured minimum.
    pub fn log(&self, level: LogLevel, message: &str) {
        if level < self.config.level {
            return;
        }

        match level {
            LogLevel::Trace => tracing::trace!(run = %self.run_id, "{}", message),
            LogLevel::Debug => tracing::debug!(run = %self.run_id, "{}", message),
            LogLevel::Info => tracing::info!(run = %self.run_id, "{}", message),
            LogLevel::Warn => tracing::warn!(run = %self.run_id, "{}", message),
            LogLevel::Error => tracing::error!(run = %self.run_id, "{}", message),
        }

        self.emit(message);
    }

    pub fn info(&self, message: &str) {
        self.log(LogLevel::Info, message);
    }

    pub fn debug(&self, message: &str) {
        self.log(LogLevel::Debug, message);
    }

    pub fn warn(&self, message: &str) {
        self.log(LogLevel::Warn, &format!("[WARNING] {}", message));
    }

    pub fn error(&self, message: &str) {
        self.log(LogLevel::Error, &format!("[ERROR] {}", message));
    }

    /// Log `$ <command line>` and start a fresh tool tail.
    pub fn command(&self, line: &str) {
        self.tail.lock().lines.clear();
        self.log(LogLevel::Info, &format!("$ {}", line));
    }

    /// `=== Stage ===`
    pub fn stage(&self, stage_name: &str) {
        self.log(LogLevel::Info, &format!("=== {} ===", stage_name));
    }

    /// `--- Section ---`
    pub fn section(&self, section_name: &str) {
        self.log(LogLevel::Info, &format!("--- {} ---", section_name));
    }

    pub fn success(&self, message: &str) {
        self.log(LogLevel::Info, &format!("[SUCCESS] {}", message));
    }

    /// Log overall progress, thinned out in compact mode.
    ///
    /// In compact mode a line is written when the stage changes, when the
    /// percent crosses a `progress_step` boundary, or at 100%. Returns whether
    /// the line was written.
    pub fn progress(&self, stage: &str, percent: u32) -> bool {
        let percent = percent.min(100);
        {
            let mut last = self.last_progress.lock();
            if self.config.compact {
                let step = self.config.progress_step.max(1);
                if let Some((ref last_stage, last_percent)) = *last {
                    let same_bucket = percent / step <= last_percent / step;
                    if last_stage == stage && same_bucket && percent < 100 {
                        return false;
                    }
                }
            }
            *last = Some((stage.to_string(), percent));
        }

        self.log(LogLevel::Info, &format!("Progress: {} {}%", stage, percent));
        true
    }

    /// Record one line of external tool output.
    ///
    /// The line always enters the tail; it reaches the log only outside
    /// compact mode.
    pub fn output_line(&self, line: &str, is_stderr: bool) {
        self.tail.lock().push(line);

        if self.config.compact || self.config.level > LogLevel::Info {
            return;
        }
        if is_stderr {
            self.emit(&format!("[stderr] {}", line));
        } else {
            self.emit(line);
        }
    }

    /// Replay the tool tail under a `[header/tail]` marker.
    pub fn show_tail(&self, header: &str) {
        let lines = self.tail();
        if lines.is_empty() {
            return;
        }
        self.emit(&format!("[{}/tail]", header));
        for line in &lines {
            self.emit(line);
        }
    }

    /// Current tool tail, oldest first.
    pub fn tail(&self) -> Vec<String> {
        self.tail.lock().lines.iter().cloned().collect()
    }

    /// Log a tool's arguments one per line in shell continuation style.
    pub fn log_args_pretty(&self, tool: &str, args: &[String]) {
        self.section(&format!("{} arguments", tool));
        self.info(&format!("{} \\\n  {}", tool, args.join(" \\\n  ")));
    }

    pub fn flush(&self) {
        if let Some(file) = self.outputs.lock().file.as_mut() {
            let _ = file.flush();
        }
    }

    fn emit(&self, message: &str) {
        let line = if self.config.show_timestamps {
            format!("[{}] {}", Local::now().format("%H:%M:%S"), message)
        } else {
            message.to_string()
        };

        let mut outputs = self.outputs.lock();
        if let Some(file) = outputs.file.as_mut() {
            let _ = writeln!(file, "{}", line);
        }
        if let Some(callback) = outputs.callback.as_ref() {
            callback(&line);
        }
    }
}

impl Drop for RunLogger {
    fn drop(&mut self) {
        if let Some(mut file) = self.outputs.get_mut().file.take() {
            let _ = file.flush();
        }
    }
}

impl std::fmt::Debug for RunLogger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RunLogger")
            .field("run_id", &self.run_id)
            .field("log_path", &self.log_path)
            .finish()
    }
}

fn sanitize_filename(name: &str) -> String {
    name.chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            _ => c,
        })
        .collect()
}
