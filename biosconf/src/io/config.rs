//! Tool configuration loaded from an optional TOML file.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};

/// Top-level configuration (TOML).
///
/// Every field has a default, so an absent file or an empty table is a
/// complete configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ToolConfig {
    pub log: LogConfig,
    pub interface: InterfaceConfig,

    /// Embedded literal table of `"Name,Value"` entries.
    pub settings: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct LogConfig {
    /// Directory for the log file. `None` selects the vendor log directory.
    pub dir: Option<PathBuf>,

    pub file_name: String,

    /// Value of the `component` field on every log line.
    pub component: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            dir: None,
            file_name: "HP_BIOS_Settings.log".to_string(),
            component: "BiosConfig".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct InterfaceConfig {
    /// PowerShell executable used to reach the CIM classes.
    pub shell: String,

    /// CIM namespace hosting the BIOS classes.
    pub namespace: String,

    /// Upper bound on each child process, in seconds.
    pub timeout_secs: u64,

    /// Truncate captured child stdout/stderr beyond this many bytes.
    pub output_limit_bytes: usize,
}

impl Default for InterfaceConfig {
    fn default() -> Self {
        Self {
            shell: "powershell".to_string(),
            namespace: "root/HP/InstrumentedBIOS".to_string(),
            timeout_secs: 120,
            output_limit_bytes: 4_000_000,
        }
    }
}

impl ToolConfig {
    pub fn validate(&self) -> Result<()> {
        if self.log.file_name.trim().is_empty() {
            return Err(anyhow!("log.file_name must be non-empty"));
        }
        if self.log.component.trim().is_empty() {
            return Err(anyhow!("log.component must be non-empty"));
        }
        if self.interface.shell.trim().is_empty() {
            return Err(anyhow!("interface.shell must be non-empty"));
        }
        if self.interface.namespace.trim().is_empty() {
            return Err(anyhow!("interface.namespace must be non-empty"));
        }
        if self.interface.timeout_secs == 0 {
            return Err(anyhow!("interface.timeout_secs must be > 0"));
        }
        if self.interface.output_limit_bytes == 0 {
            return Err(anyhow!("interface.output_limit_bytes must be > 0"));
        }
        Ok(())
    }
}

/// Load config from a TOML file.
///
/// If the file is missing, returns `ToolConfig::default()`.
pub fn load_config(path: &Path) -> Result<ToolConfig> {
    if !path.exists() {
        let cfg = ToolConfig::default();
        cfg.validate()?;
        return Ok(cfg);
    }
    let contents = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let cfg: ToolConfig =
        toml::from_str(&contents).with_context(|| format!("parse {}", path.display()))?;
    cfg.validate()?;
    Ok(cfg)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_missing_returns_default() {
        let temp = tempfile::tempdir().expect("tempdir");
        let cfg = load_config(&temp.path().join("missing.toml")).expect("load");
        assert_eq!(cfg, ToolConfig::default());
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("biosconf.toml");
        fs::write(
            &path,
            r#"
settings = ["Wake On LAN,Boot to Hard Drive", " Fast Boot , Disable "]

[interface]
timeout_secs = 30
"#,
        )
        .expect("write");

        let cfg = load_config(&path).expect("load");
        assert_eq!(cfg.settings.len(), 2);
        assert_eq!(cfg.interface.timeout_secs, 30);
        assert_eq!(cfg.interface.shell, "powershell");
        assert_eq!(cfg.log, LogConfig::default());
    }

    #[test]
    fn rejects_zero_timeout() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("biosconf.toml");
        fs::write(&path, "[interface]\ntimeout_secs = 0\n").expect("write");
        let err = load_config(&path).expect_err("zero timeout");
        assert!(err.to_string().contains("timeout_secs"));
    }
}
