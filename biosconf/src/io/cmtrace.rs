//! CMTrace-format log sink.
//!
//! Every line carries the message, local time with UTC offset, date,
//! component tag, invoking user, severity and process id:
//!
//! ```text
//! <![LOG[message]LOG]!><time="13:04:05.123+060" date="10-19-2026" component="BiosConfig" context="CORP\jdoe" type="1" thread="4242" file="">
//! ```
//!
//! The file is opened in append mode per entry so a crash never loses
//! earlier lines.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, FixedOffset, Local};

use crate::io::config::LogConfig;

/// Environment variable set by the provisioning task sequence.
pub const TASK_SEQUENCE_LOG_VAR: &str = "_SMSTSLogPath";

#[cfg(windows)]
pub const DEFAULT_LOG_DIR: &str = r"C:\ProgramData\HP\Logs";
#[cfg(not(windows))]
pub const DEFAULT_LOG_DIR: &str = "/var/log/hp";

/// CMTrace `type` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info = 1,
    Warning = 2,
    Error = 3,
}

impl Severity {
    pub fn code(self) -> u8 {
        self as u8
    }
}

/// Resolve where the log file lives.
///
/// Precedence: explicit override, task sequence log directory, configured
/// directory, vendor default.
pub fn resolve_log_path(
    cfg: &LogConfig,
    override_path: Option<&Path>,
    task_sequence_dir: Option<PathBuf>,
) -> PathBuf {
    if let Some(path) = override_path {
        return path.to_path_buf();
    }
    let dir = task_sequence_dir
        .or_else(|| cfg.dir.clone())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_LOG_DIR));
    dir.join(&cfg.file_name)
}

/// Task sequence log directory from the process environment, if any.
pub fn task_sequence_log_dir() -> Option<PathBuf> {
    std::env::var_os(TASK_SEQUENCE_LOG_VAR)
        .filter(|value| !value.is_empty())
        .map(PathBuf::from)
}

/// Identity of the invoking user, `DOMAIN\user` when the domain is known.
pub fn current_user() -> String {
    user_from(|key| std::env::var(key).ok())
}

fn user_from(lookup: impl Fn(&str) -> Option<String>) -> String {
    let user = lookup("USERNAME")
        .or_else(|| lookup("USER"))
        .filter(|name| !name.is_empty());
    match (lookup("USERDOMAIN").filter(|d| !d.is_empty()), user) {
        (Some(domain), Some(user)) => format!("{domain}\\{user}"),
        (None, Some(user)) => user,
        (_, None) => "unknown".to_string(),
    }
}

/// Append-only structured log file.
#[derive(Debug, Clone)]
pub struct LogSink {
    path: PathBuf,
    component: String,
    user: String,
    pid: u32,
}

impl LogSink {
    /// Prepare a sink at `path`, creating parent directories.
    pub fn open(path: impl Into<PathBuf>, component: impl Into<String>) -> Result<Self> {
        let path = path.into();
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)
                .with_context(|| format!("create log directory {}", parent.display()))?;
        }
        Ok(Self {
            path,
            component: component.into(),
            user: current_user(),
            pid: std::process::id(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn write(&self, severity: Severity, message: &str) -> Result<()> {
        let now = Local::now().fixed_offset();
        let line = format_line(message, severity, &now, &self.component, &self.user, self.pid);
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .with_context(|| format!("open log {}", self.path.display()))?;
        writeln!(file, "{line}").with_context(|| format!("append log {}", self.path.display()))?;
        Ok(())
    }

    pub fn info(&self, message: &str) -> Result<()> {
        self.write(Severity::Info, message)
    }

    pub fn warning(&self, message: &str) -> Result<()> {
        self.write(Severity::Warning, message)
    }

    pub fn error(&self, message: &str) -> Result<()> {
        self.write(Severity::Error, message)
    }
}

/// Render one CMTrace line (no trailing newline).
pub fn format_line(
    message: &str,
    severity: Severity,
    at: &DateTime<FixedOffset>,
    component: &str,
    user: &str,
    pid: u32,
) -> String {
    let offset_minutes = at.offset().local_minus_utc() / 60;
    format!(
        "<![LOG[{message}]LOG]!><time=\"{}{offset_minutes:+04}\" date=\"{}\" component=\"{component}\" context=\"{user}\" type=\"{}\" thread=\"{pid}\" file=\"\">",
        at.format("%H:%M:%S%.3f"),
        at.format("%m-%d-%Y"),
        severity.code(),
    )
}
