//! CLI tests for mode validation and interface failures.
//!
//! Spawns the `biosconf` binary and checks exit codes and the log file. The
//! interface shell is pointed at a program that does not exist, so any run
//! that gets as far as connecting fails with a connection error.

use std::fs;
use std::path::Path;
use std::process::{Command, Output};

use biosconf::exit_codes;

fn write_config(dir: &Path) -> std::path::PathBuf {
    let path = dir.join("biosconf.toml");
    fs::write(
        &path,
        "[interface]\nshell = \"biosconf-missing-powershell\"\ntimeout_secs = 5\n",
    )
    .expect("write config");
    path
}

fn biosconf(dir: &Path, args: &[&str]) -> Output {
    let config = write_config(dir);
    let log = dir.join("logs").join("bios.log");
    Command::new(env!("CARGO_BIN_EXE_biosconf"))
        .current_dir(dir)
        .arg("--config")
        .arg(&config)
        .arg("--log-file")
        .arg(&log)
        .args(args)
        .output()
        .expect("run biosconf")
}

fn log_contents(dir: &Path) -> String {
    fs::read_to_string(dir.join("logs").join("bios.log")).expect("read log")
}

#[test]
fn no_mode_is_configuration_error() {
    let temp = tempfile::tempdir().expect("tempdir");
    let output = biosconf(temp.path(), &[]);

    assert_eq!(output.status.code(), Some(exit_codes::CONFIGURATION));
    assert!(log_contents(temp.path()).contains("one of --get-settings or --set-settings"));
}

#[test]
fn both_modes_is_configuration_error_before_connecting() {
    let temp = tempfile::tempdir().expect("tempdir");
    let output = biosconf(temp.path(), &["--get-settings", "--set-settings"]);

    assert_eq!(output.status.code(), Some(exit_codes::CONFIGURATION));
    let log = log_contents(temp.path());
    assert!(log.contains("cannot be used together"));
    assert!(!log.contains("biosconf-missing-powershell"));
}

#[test]
fn write_mode_rejects_non_csv_input() {
    let temp = tempfile::tempdir().expect("tempdir");
    let output = biosconf(
        temp.path(),
        &["--set-settings", "--csv-path", "baseline.xlsx"],
    );
    assert_eq!(output.status.code(), Some(exit_codes::CONFIGURATION));
}

#[test]
fn unreachable_interface_is_connection_error() {
    let temp = tempfile::tempdir().expect("tempdir");
    let output = biosconf(temp.path(), &["--get-settings"]);

    assert_eq!(output.status.code(), Some(exit_codes::CONNECTION));
    let log = log_contents(temp.path());
    assert!(log.contains("Starting BIOS configuration run"));
    assert!(log.contains("type=\"3\""));
}

#[test]
fn invalid_config_file_is_configuration_error() {
    let temp = tempfile::tempdir().expect("tempdir");
    let config = temp.path().join("bad.toml");
    fs::write(&config, "[interface]\ntimeout_secs = 0\n").expect("write config");

    let output = Command::new(env!("CARGO_BIN_EXE_biosconf"))
        .current_dir(temp.path())
        .arg("--config")
        .arg(&config)
        .arg("--log-file")
        .arg(temp.path().join("bios.log"))
        .arg("--get-settings")
        .output()
        .expect("run biosconf");

    assert_eq!(output.status.code(), Some(exit_codes::CONFIGURATION));
    let log = fs::read_to_string(temp.path().join("bios.log")).expect("read log");
    assert!(log.contains("type=\"3\""));
    assert!(log.contains("interface.timeout_secs must be > 0"));
}
