//! Read and reconcile HP BIOS settings.
//!
//! `--get-settings` reports the active value of every setting;
//! `--set-settings` brings the device to a desired baseline taken from
//! `--setting` entries, the config file's `settings` table, or a CSV file.

use std::path::{Path, PathBuf};

use anyhow::Result;
use biosconf::error::{FatalError, exit_code_for};
use biosconf::exit_codes;
use biosconf::io::cmtrace::{LogSink, resolve_log_path, task_sequence_log_dir};
use biosconf::io::config::{LogConfig, load_config};
use biosconf::io::powershell::PowerShellBios;
use biosconf::logging;
use biosconf::run::{RunRequest, execute};
use clap::Parser;

#[derive(Parser)]
#[command(
    name = "biosconf",
    version,
    about = "Read and reconcile HP BIOS settings"
)]
struct Cli {
    /// Report the current value of every BIOS setting.
    #[arg(long)]
    get_settings: bool,

    /// Apply the desired settings.
    #[arg(long)]
    set_settings: bool,

    /// Desired setting as "Name,Value" (repeatable).
    #[arg(long = "setting", value_name = "NAME,VALUE")]
    settings: Vec<String>,

    /// Desired settings file (with --set-settings) or export target (with --get-settings).
    #[arg(long, value_name = "FILE")]
    csv_path: Option<PathBuf>,

    /// BIOS setup password, required when one is set on the device.
    #[arg(long, value_name = "PASSWORD")]
    setup_password: Option<String>,

    /// Log file path, overriding the default location.
    #[arg(long, value_name = "FILE")]
    log_file: Option<PathBuf>,

    /// Print diagnostic traces to stderr.
    #[arg(short, long)]
    verbose: bool,

    /// TOML configuration file; defaults apply when it does not exist.
    #[arg(long, value_name = "FILE", default_value = "biosconf.toml")]
    config: PathBuf,
}

fn main() {
    let cli = Cli::parse();
    logging::init(cli.verbose);
    let code = match run(cli) {
        Ok(()) => exit_codes::OK,
        Err(err) => {
            eprintln!("{:#}", err);
            exit_code_for(&err)
        }
    };
    std::process::exit(code);
}

fn run(cli: Cli) -> Result<()> {
    let cfg = match load_config(&cli.config) {
        Ok(cfg) => cfg,
        Err(err) => {
            let err = anyhow::Error::from(FatalError::Configuration(format!("{err:#}")));
            log_config_failure(cli.log_file.as_deref(), &err);
            return Err(err);
        }
    };

    let log_path = resolve_log_path(&cfg.log, cli.log_file.as_deref(), task_sequence_log_dir());
    let log = LogSink::open(log_path, cfg.log.component.as_str())?;

    let mut literal = cfg.settings.clone();
    literal.extend(cli.settings);
    let request = RunRequest {
        get_settings: cli.get_settings,
        set_settings: cli.set_settings,
        csv_path: cli.csv_path,
        literal,
        setup_password: cli.setup_password,
    };

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    execute(&request, &log, || PowerShellBios::connect(&cfg.interface), &mut out)?;
    Ok(())
}

/// Record a config load failure in the default log location.
fn log_config_failure(override_path: Option<&Path>, err: &anyhow::Error) {
    let fallback = LogConfig::default();
    let path = resolve_log_path(&fallback, override_path, task_sequence_log_dir());
    let logged = LogSink::open(path, fallback.component.as_str())
        .and_then(|log| log.error(&format!("{err:#}")));
    if let Err(log_err) = logged {
        tracing::warn!(err = %log_err, "failed to log configuration error");
    }
}
