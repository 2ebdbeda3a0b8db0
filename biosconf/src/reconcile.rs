//! Reconciliation pass over the desired settings.
//!
//! One pass, in source order, against a snapshot taken once before the pass.
//! Each setting is attempted at most once; failures are recorded and the
//! pass moves on.

use anyhow::Result;
use tracing::{debug, instrument};

use crate::core::plan::{Action, plan_setting};
use crate::core::tally::RunTally;
use crate::core::types::{DesiredSetting, EnumeratedSetting, Outcome, SettingResult};
use crate::io::bios::{BiosInterface, PasswordState};
use crate::io::cmtrace::LogSink;

/// Reconcile every desired setting, updating `tally` once per setting.
///
/// `Err` only when the interface itself fails or the log cannot be written;
/// rejected writes are [`Outcome::Failed`] results.
#[instrument(skip_all, fields(desired = desired.len(), snapshot = snapshot.len()))]
pub fn reconcile<B: BiosInterface>(
    bios: &B,
    snapshot: &[EnumeratedSetting],
    desired: &[DesiredSetting],
    password: &PasswordState,
    tally: &mut RunTally,
    log: &LogSink,
) -> Result<Vec<SettingResult>> {
    let mut results = Vec::with_capacity(desired.len());
    for setting in desired {
        let result = reconcile_one(bios, snapshot, setting, password)?;
        log_result(log, &result)?;
        tally.record(&result.outcome);
        results.push(result);
    }
    Ok(results)
}

fn reconcile_one<B: BiosInterface>(
    bios: &B,
    snapshot: &[EnumeratedSetting],
    desired: &DesiredSetting,
    password: &PasswordState,
) -> Result<SettingResult> {
    let (current, outcome) = match plan_setting(snapshot, desired) {
        Action::NotFound => (None, Outcome::NotFound),
        Action::AlreadySet { current } => (Some(current.to_string()), Outcome::AlreadySet),
        Action::Write { current } => {
            let status = bios.write(&desired.name, &desired.value, password.for_write())?;
            let outcome = if status.is_success() {
                Outcome::Applied
            } else {
                Outcome::Failed(status)
            };
            (current.map(str::to_string), outcome)
        }
    };
    debug!(name = %desired.name, ?outcome, "setting reconciled");
    Ok(SettingResult {
        name: desired.name.clone(),
        desired: desired.value.clone(),
        current,
        outcome,
    })
}

fn log_result(log: &LogSink, result: &SettingResult) -> Result<()> {
    match result.outcome {
        Outcome::AlreadySet => log.info(&format!(
            "{} is already set to {}",
            result.name, result.desired
        )),
        Outcome::Applied => log.info(&format!(
            "Successfully set {} to {} (was {})",
            result.name,
            result.desired,
            result.current.as_deref().unwrap_or("unknown")
        )),
        Outcome::NotFound => log.warning(&format!(
            "{} is not an available setting on this device",
            result.name
        )),
        Outcome::Failed(status) => log.error(&format!(
            "Failed to set {} to {}: {status}",
            result.name, result.desired
        )),
    }
}
