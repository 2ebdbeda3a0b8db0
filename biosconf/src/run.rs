//! One `biosconf` invocation, end to end.
//!
//! The run is strictly linear: validate inputs, connect to the interface,
//! execute read mode or write mode, report. Inputs are validated before the
//! interface is touched so configuration errors never reach the vendor.

use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::core::tally::RunTally;
use crate::core::types::{DesiredSetting, Mode, SettingResult};
use crate::error::FatalError;
use crate::io::bios::{BiosInterface, EncodedPassword, PasswordState};
use crate::io::cmtrace::LogSink;
use crate::io::csv_file::has_csv_extension;
use crate::io::settings_source::SettingsSource;
use crate::reconcile::reconcile;
use crate::report::{enumeration_records, export_enumeration, print_enumeration, report_tally};

pub const COMPLETION_MESSAGE: &str = "BIOS configuration run complete";

/// Caller intent for one run.
#[derive(Debug, Clone, Default)]
pub struct RunRequest {
    pub get_settings: bool,
    pub set_settings: bool,
    /// Desired settings (write mode) or export target (read mode).
    pub csv_path: Option<PathBuf>,
    /// Literal `"Name,Value"` table.
    pub literal: Vec<String>,
    pub setup_password: Option<String>,
}

/// What a successful run did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunSummary {
    Read {
        settings: usize,
        exported: Option<PathBuf>,
    },
    Write {
        tally: RunTally,
        results: Vec<SettingResult>,
    },
}

/// Exactly one of read mode and write mode.
pub fn select_mode(get_settings: bool, set_settings: bool) -> Result<Mode> {
    match (get_settings, set_settings) {
        (true, false) => Ok(Mode::Read),
        (false, true) => Ok(Mode::Write),
        (true, true) => Err(FatalError::Configuration(
            "--get-settings and --set-settings cannot be used together".to_string(),
        )
        .into()),
        (false, false) => Err(FatalError::Configuration(
            "one of --get-settings or --set-settings is required".to_string(),
        )
        .into()),
    }
}

/// Execute a run, logging any fatal error before returning it.
///
/// `connect` is only called once inputs are valid.
pub fn execute<B, F, W>(
    request: &RunRequest,
    log: &LogSink,
    connect: F,
    out: &mut W,
) -> Result<RunSummary>
where
    B: BiosInterface,
    F: FnOnce() -> Result<B>,
    W: Write,
{
    log.info("Starting BIOS configuration run")?;
    match execute_inner(request, log, connect, out) {
        Ok(summary) => {
            log.info(COMPLETION_MESSAGE)?;
            writeln!(out, "{COMPLETION_MESSAGE}").context("write completion message")?;
            Ok(summary)
        }
        Err(err) => {
            if let Err(log_err) = log.error(&format!("{err:#}")) {
                warn!(err = %log_err, "failed to log fatal error");
            }
            Err(err)
        }
    }
}

/// Inputs validated before any interface call.
enum Plan {
    Read { export: Option<PathBuf> },
    Write { desired: Vec<DesiredSetting> },
}

fn validate_inputs(request: &RunRequest, log: &LogSink) -> Result<Plan> {
    match select_mode(request.get_settings, request.set_settings)? {
        Mode::Read => {
            if let Some(path) = &request.csv_path
                && !has_csv_extension(path)
            {
                return Err(FatalError::Configuration(format!(
                    "{} is not a .csv file",
                    path.display()
                ))
                .into());
            }
            Ok(Plan::Read {
                export: request.csv_path.clone(),
            })
        }
        Mode::Write => {
            let source = SettingsSource::resolve(request.csv_path.as_deref(), &request.literal)?;
            if matches!(source, SettingsSource::Csv(_)) && !request.literal.is_empty() {
                log.warning(&format!(
                    "Ignoring {} literal settings because a CSV path was supplied",
                    request.literal.len()
                ))?;
            }
            let desired = source.load()?;
            log.info(&format!(
                "Loaded {} desired settings from {}",
                desired.len(),
                source.describe()
            ))?;
            Ok(Plan::Write { desired })
        }
    }
}

fn execute_inner<B, F, W>(
    request: &RunRequest,
    log: &LogSink,
    connect: F,
    out: &mut W,
) -> Result<RunSummary>
where
    B: BiosInterface,
    F: FnOnce() -> Result<B>,
    W: Write,
{
    let plan = validate_inputs(request, log)?;
    let bios = connect()?;
    log.info("Connected to BIOS settings interface")?;

    match plan {
        Plan::Read { export } => read_mode(&bios, export, log, out),
        Plan::Write { desired } => {
            let password = establish_password(&bios, request.setup_password.as_deref(), log)?;
            let snapshot = bios.enumerate()?;
            info!(count = snapshot.len(), "captured enumeration snapshot");
            let mut tally = RunTally::default();
            let results = reconcile(&bios, &snapshot, &desired, &password, &mut tally, log)?;
            report_tally(&tally, out, log)?;
            log.info(&format!("Processed {} desired settings", tally.total()))?;
            Ok(RunSummary::Write { tally, results })
        }
    }
}

fn read_mode<B: BiosInterface, W: Write>(
    bios: &B,
    export: Option<PathBuf>,
    log: &LogSink,
    out: &mut W,
) -> Result<RunSummary> {
    let snapshot = bios.enumerate()?;
    let records = enumeration_records(&snapshot);
    log.info(&format!("Enumerated {} settings", records.len()))?;
    match &export {
        Some(path) => export_enumeration(&records, path, log)?,
        None => print_enumeration(&records, out)?,
    }
    Ok(RunSummary::Read {
        settings: records.len(),
        exported: export,
    })
}

/// Derive the run's password state, verifying a supplied password.
///
/// A configured password that is missing or does not verify aborts the run
/// before any setting is written.
pub fn establish_password<B: BiosInterface>(
    bios: &B,
    supplied: Option<&str>,
    log: &LogSink,
) -> Result<PasswordState> {
    let is_configured = bios.is_password_configured()?;
    let supplied = supplied.map(EncodedPassword::from_plain);
    match (is_configured, &supplied) {
        (true, None) => {
            return Err(FatalError::Authentication(
                "a BIOS setup password is set but none was supplied".to_string(),
            )
            .into());
        }
        (true, Some(candidate)) => {
            if !bios.verify_password(candidate)? {
                return Err(FatalError::Authentication(
                    "the supplied setup password does not match".to_string(),
                )
                .into());
            }
            log.info("Setup password verified")?;
        }
        (false, Some(_)) => {
            log.warning("A setup password was supplied but none is set; ignoring it")?;
        }
        (false, None) => log.info("No setup password is set")?,
    }
    Ok(PasswordState {
        is_configured,
        supplied,
    })
}
