//! HP BIOS interface reached through PowerShell CIM cmdlets.
//!
//! Each operation runs one short script in a fresh
//! `powershell -NoProfile -NonInteractive -Command -` process. Scripts go
//! over stdin so setup passwords never appear on a command line. Results
//! come back on stdout as JSON or a bare integer.
//!
//! Classes used, all in the `root/HP/InstrumentedBIOS` namespace:
//! `HP_BIOSEnumeration` (Name/Value), `HP_BIOSPassword` (IsSet) and
//! `HP_BIOSSettingInterface` (SetBIOSSetting, returns `Return`).

use std::process::Command;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::{debug, info, instrument, warn};

use crate::core::types::{EnumeratedSetting, WriteStatus};
use crate::error::FatalError;
use crate::io::bios::{BiosInterface, EncodedPassword, SETUP_PASSWORD_SETTING};
use crate::io::config::InterfaceConfig;
use crate::io::process::run_with_stdin;

const SCRIPT_PRELUDE: &str =
    "$ErrorActionPreference = 'Stop'; [Console]::OutputEncoding = [System.Text.Encoding]::UTF8; ";

/// CIM-backed [`BiosInterface`].
#[derive(Debug, Clone)]
pub struct PowerShellBios {
    shell: String,
    namespace: String,
    timeout: Duration,
    output_limit_bytes: usize,
}

impl PowerShellBios {
    pub fn new(cfg: &InterfaceConfig) -> Self {
        Self {
            shell: cfg.shell.clone(),
            namespace: cfg.namespace.clone(),
            timeout: Duration::from_secs(cfg.timeout_secs),
            output_limit_bytes: cfg.output_limit_bytes,
        }
    }

    /// Build the interface and confirm the vendor namespace answers.
    #[instrument(skip_all, fields(shell = %cfg.shell, namespace = %cfg.namespace))]
    pub fn connect(cfg: &InterfaceConfig) -> Result<Self> {
        let bios = Self::new(cfg);
        let out = bios.run_script(&probe_script(&bios.namespace))?;
        if out.trim() != "ok" {
            return Err(FatalError::Connection(format!(
                "unexpected probe output from {}: {:?}",
                bios.shell,
                out.trim()
            ))
            .into());
        }
        info!("connected to BIOS settings interface");
        Ok(bios)
    }

    /// Run a script and return its stdout.
    ///
    /// Every way the child can fail maps to a connection error: the
    /// interface is unusable for this run.
    fn run_script(&self, script: &str) -> Result<String> {
        let mut cmd = Command::new(&self.shell);
        cmd.args([
            "-NoProfile",
            "-NonInteractive",
            "-ExecutionPolicy",
            "Bypass",
            "-Command",
            "-",
        ]);
        let mut input = format!("{SCRIPT_PRELUDE}{script}");
        input.push('\n');

        let output = run_with_stdin(
            cmd,
            input.as_bytes(),
            self.timeout,
            self.output_limit_bytes,
        )
        .map_err(|err| FatalError::Connection(format!("start {}: {err:#}", self.shell)))?;

        if output.timed_out {
            warn!(timeout_secs = self.timeout.as_secs(), "interface call timed out");
            return Err(FatalError::Connection(format!(
                "{} did not answer within {:?}",
                self.shell, self.timeout
            ))
            .into());
        }
        if !output.status.success() {
            warn!(exit_code = ?output.status.code(), "interface call failed");
            return Err(FatalError::Connection(format!(
                "{} exited with status {:?}: {}",
                self.shell,
                output.status.code(),
                output.stderr.trim()
            ))
            .into());
        }
        Ok(output.stdout)
    }
}

impl BiosInterface for PowerShellBios {
    #[instrument(skip_all)]
    fn enumerate(&self) -> Result<Vec<EnumeratedSetting>> {
        let out = self.run_script(&enumerate_script(&self.namespace))?;
        let settings = parse_enumeration(&out).context("parse HP_BIOSEnumeration output")?;
        debug!(count = settings.len(), "enumerated settings");
        Ok(settings)
    }

    #[instrument(skip_all)]
    fn is_password_configured(&self) -> Result<bool> {
        let out = self.run_script(&password_script(&self.namespace))?;
        parse_flag(&out).context("parse HP_BIOSPassword output")
    }

    #[instrument(skip_all, fields(name = %name))]
    fn write(
        &self,
        name: &str,
        value: &str,
        password: Option<&EncodedPassword>,
    ) -> Result<WriteStatus> {
        let script = write_script(
            &self.namespace,
            name,
            value,
            password.map(EncodedPassword::as_str).unwrap_or(""),
        );
        let out = self.run_script(&script)?;
        let status = parse_return_code(&out).context("parse SetBIOSSetting output")?;
        debug!(%status, "write returned");
        Ok(status)
    }
}

#[derive(Debug, Deserialize)]
struct CimSetting {
    #[serde(rename = "Name")]
    name: String,
    #[serde(rename = "Value")]
    value: Option<String>,
}

/// Quote text as a PowerShell single-quoted literal.
///
/// PowerShell also treats the typographic single quotes as delimiters, so
/// those are doubled too.
fn ps_quote(text: &str) -> String {
    let mut quoted = String::with_capacity(text.len() + 2);
    quoted.push('\'');
    for ch in text.chars() {
        if matches!(ch, '\'' | '\u{2018}' | '\u{2019}' | '\u{201A}' | '\u{201B}') {
            quoted.push(ch);
        }
        quoted.push(ch);
    }
    quoted.push('\'');
    quoted
}

fn probe_script(namespace: &str) -> String {
    format!(
        "$null = Get-CimInstance -Namespace {} -ClassName HP_BIOSSettingInterface; 'ok'",
        ps_quote(namespace)
    )
}

fn enumerate_script(namespace: &str) -> String {
    format!(
        "$s = @(Get-CimInstance -Namespace {} -ClassName HP_BIOSEnumeration | Select-Object Name, Value); ConvertTo-Json -InputObject $s -Compress",
        ps_quote(namespace)
    )
}

fn password_script(namespace: &str) -> String {
    format!(
        "$p = Get-CimInstance -Namespace {} -ClassName HP_BIOSPassword -Filter {}; [int]$p.IsSet",
        ps_quote(namespace),
        ps_quote(&format!("Name='{SETUP_PASSWORD_SETTING}'"))
    )
}

fn write_script(namespace: &str, name: &str, value: &str, password: &str) -> String {
    format!(
        "$i = Get-CimInstance -Namespace {} -ClassName HP_BIOSSettingInterface; $r = Invoke-CimMethod -InputObject $i -MethodName SetBIOSSetting -Arguments @{{Name = {}; Value = {}; Password = {}}}; [int]$r.Return",
        ps_quote(namespace),
        ps_quote(name),
        ps_quote(value),
        ps_quote(password)
    )
}

fn parse_enumeration(out: &str) -> Result<Vec<EnumeratedSetting>> {
    let trimmed = out.trim();
    if trimmed.is_empty() {
        return Ok(Vec::new());
    }
    let rows: Vec<CimSetting> = serde_json::from_str(trimmed).context("decode json")?;
    Ok(rows
        .into_iter()
        .map(|row| EnumeratedSetting::new(row.name, row.value.unwrap_or_default()))
        .collect())
}

fn parse_flag(out: &str) -> Result<bool> {
    match out.trim() {
        "1" | "True" | "true" => Ok(true),
        "0" | "False" | "false" | "" => Ok(false),
        other => Err(anyhow::anyhow!("expected 0 or 1, got {other:?}")),
    }
}

fn parse_return_code(out: &str) -> Result<WriteStatus> {
    let code: u32 = out
        .trim()
        .parse()
        .with_context(|| format!("expected a return code, got {:?}", out.trim()))?;
    Ok(WriteStatus::from_code(code))
}
