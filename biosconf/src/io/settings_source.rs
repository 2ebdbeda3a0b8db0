//! Desired-settings input.
//!
//! Exactly one origin feeds a run: a literal table of `"Name,Value"` strings
//! or a CSV file with `Name` and `Value` columns.

use std::path::{Path, PathBuf};

use anyhow::Result;

use crate::core::types::DesiredSetting;
use crate::error::FatalError;
use crate::io::csv_file::read_settings_csv;

/// Where desired settings come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SettingsSource {
    Literal(Vec<String>),
    Csv(PathBuf),
}

impl SettingsSource {
    /// Pick the origin for a write run.
    ///
    /// A CSV path wins over the literal table. Neither is a configuration
    /// error.
    pub fn resolve(csv_path: Option<&Path>, literal: &[String]) -> Result<Self> {
        if let Some(path) = csv_path {
            return Ok(SettingsSource::Csv(path.to_path_buf()));
        }
        if literal.is_empty() {
            return Err(FatalError::Configuration(
                "no desired settings: supply --csv-path or a literal settings table".to_string(),
            )
            .into());
        }
        Ok(SettingsSource::Literal(literal.to_vec()))
    }

    /// Produce the desired settings in source order.
    pub fn load(&self) -> Result<Vec<DesiredSetting>> {
        match self {
            SettingsSource::Literal(entries) => parse_literal_table(entries),
            SettingsSource::Csv(path) => Ok(read_settings_csv(path)?
                .into_iter()
                .map(|record| DesiredSetting::new(record.name, record.value))
                .collect()),
        }
    }

    pub fn describe(&self) -> String {
        match self {
            SettingsSource::Literal(entries) => format!("literal table ({} entries)", entries.len()),
            SettingsSource::Csv(path) => format!("CSV file {}", path.display()),
        }
    }
}

/// Parse one `"Name,Value"` entry, trimming both halves.
///
/// Splits at the first comma, so names cannot contain commas but values can.
pub fn parse_literal_entry(entry: &str) -> Result<DesiredSetting> {
    let Some((name, value)) = entry.split_once(',') else {
        return Err(FatalError::Configuration(format!(
            "setting entry {entry:?} is not of the form \"Name,Value\""
        ))
        .into());
    };
    let name = name.trim();
    if name.is_empty() {
        return Err(
            FatalError::Configuration(format!("setting entry {entry:?} has an empty name")).into(),
        );
    }
    Ok(DesiredSetting::new(name, value.trim()))
}

pub fn parse_literal_table(entries: &[String]) -> Result<Vec<DesiredSetting>> {
    entries
        .iter()
        .map(|entry| parse_literal_entry(entry))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::exit_code_for;
    use crate::exit_codes;
    use std::fs;

    #[test]
    fn literal_entries_are_trimmed() {
        let setting = parse_literal_entry("  Wake On LAN , Boot to Hard Drive ").expect("parse");
        assert_eq!(setting, DesiredSetting::new("Wake On LAN", "Boot to Hard Drive"));
    }

    #[test]
    fn literal_entry_splits_at_first_comma() {
        let setting = parse_literal_entry("Boot Order,USB,HDD").expect("parse");
        assert_eq!(setting, DesiredSetting::new("Boot Order", "USB,HDD"));
    }

    #[test]
    fn literal_entry_without_comma_is_rejected() {
        let err = parse_literal_entry("Fast Boot").expect_err("no comma");
        assert_eq!(exit_code_for(&err), exit_codes::CONFIGURATION);
    }

    #[test]
    fn literal_entry_with_blank_name_is_rejected() {
        let err = parse_literal_entry("  ,Enable").expect_err("blank name");
        assert!(err.to_string().contains("empty name"));
    }

    #[test]
    fn resolve_without_any_origin_fails() {
        let err = SettingsSource::resolve(None, &[]).expect_err("no origin");
        assert_eq!(exit_code_for(&err), exit_codes::CONFIGURATION);
    }

    #[test]
    fn csv_path_wins_over_literal_table() {
        let literal = vec!["Fast Boot,Disable".to_string()];
        let source = SettingsSource::resolve(Some(Path::new("baseline.csv")), &literal)
            .expect("resolve");
        assert_eq!(source, SettingsSource::Csv(PathBuf::from("baseline.csv")));
    }

    #[test]
    fn literal_table_preserves_order() {
        let literal = vec![
            "Wake On LAN,Boot to Hard Drive".to_string(),
            "Fast Boot,Disable".to_string(),
        ];
        let source = SettingsSource::resolve(None, &literal).expect("resolve");
        let desired = source.load().expect("load");
        assert_eq!(
            desired,
            vec![
                DesiredSetting::new("Wake On LAN", "Boot to Hard Drive"),
                DesiredSetting::new("Fast Boot", "Disable"),
            ]
        );
    }

    #[test]
    fn csv_values_are_not_trimmed() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("desired.csv");
        fs::write(&path, "Name,Value\nAsset Tag, ABC \n").expect("write");
        let desired = SettingsSource::Csv(path).load().expect("load");
        assert_eq!(desired, vec![DesiredSetting::new("Asset Tag", " ABC ")]);
    }
}
