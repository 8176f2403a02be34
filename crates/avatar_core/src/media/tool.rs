//! External tool invocation.
//!
//! Commands are built as plain argument vectors so they can be inspected in
//! tests, then run synchronously. Output lines are fed to the run logger's
//! tail buffer and the tail is dumped when the tool fails.

use std::env;
use std::path::{Path, PathBuf};
use std::process::Command;

use super::error::{MediaError, MediaResult};
use crate::config::ToolSettings;
use crate::logging::RunLogger;

/// Number of stderr lines carried in a failure message.
const ERROR_TAIL_LINES: usize = 20;

/// A fully built external command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolCommand {
    /// Executable name or path.
    pub program: String,
    pub args: Vec<String>,
    /// Working directory (None = inherit).
    pub cwd: Option<PathBuf>,
}

impl ToolCommand {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
            cwd: None,
        }
    }

    /// Run in the given working directory.
    pub fn with_cwd(mut self, cwd: impl Into<PathBuf>) -> Self {
        self.cwd = Some(cwd.into());
        self
    }

    /// Short tool name for messages (`/usr/bin/ffmpeg` -> `ffmpeg`).
    pub fn tool_name(&self) -> String {
        Path::new(&self.program)
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| self.program.clone())
    }

    /// The command as a single shell-like line, for logging.
    pub fn display_line(&self) -> String {
        let mut parts = Vec::with_capacity(self.args.len() + 1);
        parts.push(quote_arg(&self.program));
        parts.extend(self.args.iter().map(|a| quote_arg(a)));
        parts.join(" ")
    }

    /// Run the command to completion and return its stdout.
    ///
    /// A non-zero exit is an error carrying the tail of stderr.
    pub fn run(&self, logger: Option<&RunLogger>) -> MediaResult<String> {
        let tool = self.tool_name();
        let line = self.display_line();
        match logger {
            Some(logger) => {
                logger.command(&line);
                if logger.config().show_command_pretty {
                    logger.log_args_pretty(&tool, &self.args);
                }
            }
            None => tracing::debug!("$ {}", line),
        }

        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args);
        if let Some(ref cwd) = self.cwd {
            cmd.current_dir(cwd);
        }

        let output = cmd.output().map_err(|source| MediaError::Spawn {
            tool: tool.clone(),
            source,
        })?;

        let stdout = String::from_utf8_lossy(&output.stdout).to_string();
        let stderr = String::from_utf8_lossy(&output.stderr).to_string();

        if let Some(logger) = logger {
            for line in stdout.lines() {
                logger.output_line(line, false);
            }
            for line in stderr.lines() {
                logger.output_line(line, true);
            }
        }

        if !output.status.success() {
            let exit_code = output.status.code().unwrap_or(-1);
            if let Some(logger) = logger {
                logger.show_tail(&format!("{} output", tool));
            }
            return Err(MediaError::command_failed(
                tool,
                exit_code,
                stderr_tail(&stderr, ERROR_TAIL_LINES),
            ));
        }

        Ok(stdout)
    }
}

/// Resolved executables for ffmpeg and ffprobe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaTools {
    ffmpeg: String,
    ffprobe: String,
}

impl Default for MediaTools {
    fn default() -> Self {
        Self::new("ffmpeg", "ffprobe")
    }
}

impl MediaTools {
    pub fn new(ffmpeg: impl Into<String>, ffprobe: impl Into<String>) -> Self {
        Self {
            ffmpeg: ffmpeg.into(),
            ffprobe: ffprobe.into(),
        }
    }

    pub fn from_settings(settings: &ToolSettings) -> Self {
        Self::new(&settings.ffmpeg_path, &settings.ffprobe_path)
    }

    pub fn ffmpeg(&self) -> &str {
        &self.ffmpeg
    }

    pub fn ffprobe(&self) -> &str {
        &self.ffprobe
    }

    pub fn ffmpeg_command(&self, args: Vec<String>) -> ToolCommand {
        ToolCommand::new(&self.ffmpeg, args)
    }

    pub fn ffprobe_command(&self, args: Vec<String>) -> ToolCommand {
        ToolCommand::new(&self.ffprobe, args)
    }
}

/// Last `max_lines` non-empty lines of tool output.
fn stderr_tail(stderr: &str, max_lines: usize) -> String {
    let lines: Vec<&str> = stderr.lines().filter(|l| !l.trim().is_empty()).collect();
    let start = lines.len().saturating_sub(max_lines);
    lines[start..].join("\n")
}

/// Quote an argument for display if it contains whitespace or quotes.
fn quote_arg(arg: &str) -> String {
    if arg.is_empty() {
        return "''".to_string();
    }
    if arg.chars().any(|c| c.is_whitespace() || c == '\'' || c == '"') {
        format!("'{}'", arg.replace('\'', "'\\''"))
    } else {
        arg.to_string()
    }
}

/// Render a path as a command argument.
pub(crate) fn path_arg(path: &Path) -> String {
    path.to_string_lossy().to_string()
}

/// Make a path absolute against the current directory without touching disk.
pub(crate) fn absolute_path(path: &Path) -> MediaResult<PathBuf> {
    if path.is_absolute() {
        return Ok(path.to_path_buf());
    }
    let cwd = env::current_dir().map_err(|e| MediaError::io("resolving current directory", e))?;
    Ok(cwd.join(path))
}
