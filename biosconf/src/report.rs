//! Human- and machine-readable run reports.

use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};

use crate::core::encoding::active_value;
use crate::core::tally::RunTally;
use crate::core::types::EnumeratedSetting;
use crate::io::cmtrace::LogSink;
use crate::io::csv_file::{SettingRecord, export_settings_csv};

/// Current active value of every setting, sorted by name.
///
/// Settings without an active marker report an empty value.
pub fn enumeration_records(snapshot: &[EnumeratedSetting]) -> Vec<SettingRecord> {
    let mut records: Vec<SettingRecord> = snapshot
        .iter()
        .map(|setting| {
            SettingRecord::new(
                setting.name.clone(),
                active_value(&setting.encoded).unwrap_or_default(),
            )
        })
        .collect();
    records.sort_by(|a, b| a.name.cmp(&b.name));
    records
}

/// Print the enumeration report as `Name = Value` lines.
pub fn print_enumeration<W: Write>(records: &[SettingRecord], out: &mut W) -> Result<()> {
    for record in records {
        writeln!(out, "{} = {}", record.name, record.value).context("write enumeration")?;
    }
    Ok(())
}

/// Write the enumeration report as an unquoted `Name,Value` CSV file.
pub fn export_enumeration(records: &[SettingRecord], path: &Path, log: &LogSink) -> Result<()> {
    export_settings_csv(path, records)?;
    log.info(&format!(
        "Exported {} settings to {}",
        records.len(),
        path.display()
    ))
}

pub fn tally_lines(tally: &RunTally) -> [String; 4] {
    [
        format!("Already set: {}", tally.already_set),
        format!("Applied: {}", tally.applied),
        format!("Failed: {}", tally.failed),
        format!("Not found: {}", tally.not_found),
    ]
}

/// Emit the tally to `out` and to the log.
pub fn report_tally<W: Write>(tally: &RunTally, out: &mut W, log: &LogSink) -> Result<()> {
    for line in tally_lines(tally) {
        writeln!(out, "{line}").context("write tally")?;
        log.info(&line)?;
    }
    Ok(())
}
