//! Two-column `Name,Value` CSV files.
//!
//! Used both for the desired-settings input and for the read-mode export.
//! Exports are written without quoting so they open cleanly in the vendor
//! tooling; values therefore must not contain commas.

use std::fs;
use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::FatalError;

const REQUIRED_COLUMNS: [&str; 2] = ["Name", "Value"];

/// One `Name,Value` row.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SettingRecord {
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Value")]
    pub value: String,
}

impl SettingRecord {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// Whether `path` carries a `.csv` extension (any case).
pub fn has_csv_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"))
}

fn require_csv_extension(path: &Path) -> Result<()> {
    if has_csv_extension(path) {
        return Ok(());
    }
    Err(FatalError::Configuration(format!(
        "{} is not a .csv file",
        path.display()
    ))
    .into())
}

/// Read all rows of a `Name,Value` CSV file, in file order.
///
/// Values are taken verbatim. Extra columns are ignored.
pub fn read_settings_csv(path: &Path) -> Result<Vec<SettingRecord>> {
    require_csv_extension(path)?;
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::None)
        .from_path(path)
        .map_err(|err| {
            FatalError::Configuration(format!("open {}: {err}", path.display()))
        })?;

    let headers = rdr
        .headers()
        .map_err(|err| FatalError::Configuration(format!("read {} header: {err}", path.display())))?;
    let missing: Vec<&str> = REQUIRED_COLUMNS
        .iter()
        .copied()
        .filter(|column| !headers.iter().any(|header| header == *column))
        .collect();
    if !missing.is_empty() {
        return Err(FatalError::Configuration(format!(
            "{} is missing required columns: {}",
            path.display(),
            missing.join(", ")
        ))
        .into());
    }

    let mut records = Vec::new();
    for result in rdr.deserialize::<SettingRecord>() {
        let record = result.map_err(|err| {
            let line = err.position().map_or(0, |pos| pos.line());
            FatalError::Configuration(format!("{} line {line}: {err}", path.display()))
        })?;
        records.push(record);
    }
    debug!(path = %path.display(), rows = records.len(), "read settings csv");
    Ok(records)
}

/// Write records with a `Name,Value` header and no quoting.
pub fn write_settings_csv<W: Write>(records: &[SettingRecord], writer: W) -> Result<()> {
    let mut wtr = csv::WriterBuilder::new()
        .quote_style(csv::QuoteStyle::Never)
        .from_writer(writer);
    if records.is_empty() {
        wtr.write_record(REQUIRED_COLUMNS).context("write csv header")?;
    }
    for record in records {
        wtr.serialize(record).context("write csv row")?;
    }
    wtr.flush().context("flush csv")?;
    Ok(())
}

/// Export records to `path`, replacing any existing file.
pub fn export_settings_csv(path: &Path, records: &[SettingRecord]) -> Result<()> {
    require_csv_extension(path)?;
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)
            .with_context(|| format!("create export directory {}", parent.display()))?;
    }
    let file =
        fs::File::create(path).with_context(|| format!("create {}", path.display()))?;
    write_settings_csv(records, file).with_context(|| format!("export {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::exit_code_for;
    use crate::exit_codes;

    #[test]
    fn extension_check_is_case_insensitive() {
        assert!(has_csv_extension(Path::new("baseline.csv")));
        assert!(has_csv_extension(Path::new("C:/deploy/Baseline.CSV")));
        assert!(!has_csv_extension(Path::new("baseline.txt")));
        assert!(!has_csv_extension(Path::new("baseline")));
    }

    #[test]
    fn export_is_unquoted() {
        let mut buf = Vec::new();
        let records = vec![
            SettingRecord::new("Fast Boot", "Disable"),
            SettingRecord::new("Wake On LAN", "Boot to Hard Drive"),
        ];
        write_settings_csv(&records, &mut buf).expect("write");
        let text = String::from_utf8(buf).expect("utf8");
        assert_eq!(
            text,
            "Name,Value\nFast Boot,Disable\nWake On LAN,Boot to Hard Drive\n"
        );
        assert!(!text.contains('"'));
    }

    #[test]
    fn empty_export_still_has_header() {
        let mut buf = Vec::new();
        write_settings_csv(&[], &mut buf).expect("write");
        assert_eq!(String::from_utf8(buf).expect("utf8"), "Name,Value\n");
    }

    #[test]
    fn reads_rows_in_order_ignoring_extra_columns() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("desired.csv");
        fs::write(
            &path,
            "Name,Value,Notes\nWake On LAN,Boot to Hard Drive,per baseline\nFast Boot,Disable,\n",
        )
        .expect("write");

        let records = read_settings_csv(&path).expect("read");
        assert_eq!(
            records,
            vec![
                SettingRecord::new("Wake On LAN", "Boot to Hard Drive"),
                SettingRecord::new("Fast Boot", "Disable"),
            ]
        );
    }

    #[test]
    fn missing_value_column_is_configuration_error() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("desired.csv");
        fs::write(&path, "Name,Setting\nFast Boot,Disable\n").expect("write");

        let err = read_settings_csv(&path).expect_err("missing column");
        assert_eq!(exit_code_for(&err), exit_codes::CONFIGURATION);
        assert!(err.to_string().contains("Value"));
    }

    #[test]
    fn short_row_names_its_physical_line() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("desired.csv");
        fs::write(&path, "Name,Value\nAsset Tag,\"multi\nline\"\nFast Boot\n").expect("write");

        let err = read_settings_csv(&path).expect_err("short row");
        assert_eq!(exit_code_for(&err), exit_codes::CONFIGURATION);
        assert!(err.to_string().contains("line 4:"), "{err}");
    }

    #[test]
    fn wrong_extension_rejected_before_open() {
        let err = read_settings_csv(Path::new("/does/not/exist.txt")).expect_err("extension");
        assert!(err.to_string().contains("not a .csv file"));
        assert_eq!(exit_code_for(&err), exit_codes::CONFIGURATION);
    }

    #[test]
    fn export_then_read_round_trips() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("out").join("current.csv");
        let records = vec![
            SettingRecord::new("Boot Mode", "UEFI Native (Without CSM)"),
            SettingRecord::new("Fast Boot", "Disable"),
        ];
        export_settings_csv(&path, &records).expect("export");
        assert_eq!(read_settings_csv(&path).expect("read"), records);
    }
}
