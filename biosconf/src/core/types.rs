//! Shared deterministic types for reconciliation logic.

use std::fmt;

/// A desired `(name, value)` pair from the settings source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DesiredSetting {
    pub name: String,
    pub value: String,
}

impl DesiredSetting {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// One entry of the vendor enumeration snapshot.
///
/// `encoded` lists every legal option separated by commas, with the active
/// option prefixed by [`ACTIVE_MARKER`](crate::core::encoding::ACTIVE_MARKER).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumeratedSetting {
    pub name: String,
    pub encoded: String,
}

impl EnumeratedSetting {
    pub fn new(name: impl Into<String>, encoded: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            encoded: encoded.into(),
        }
    }
}

/// Return code of a vendor write call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteStatus {
    Success,
    NotSupported,
    UnspecifiedError,
    Timeout,
    InvalidValue,
    InvalidParameter,
    AccessDenied,
    /// A code outside the documented vocabulary.
    Unrecognized(u32),
}

impl WriteStatus {
    pub fn from_code(code: u32) -> Self {
        match code {
            0 => WriteStatus::Success,
            1 => WriteStatus::NotSupported,
            2 => WriteStatus::UnspecifiedError,
            3 => WriteStatus::Timeout,
            4 => WriteStatus::InvalidValue,
            5 => WriteStatus::InvalidParameter,
            6 => WriteStatus::AccessDenied,
            other => WriteStatus::Unrecognized(other),
        }
    }

    pub fn code(self) -> u32 {
        match self {
            WriteStatus::Success => 0,
            WriteStatus::NotSupported => 1,
            WriteStatus::UnspecifiedError => 2,
            WriteStatus::Timeout => 3,
            WriteStatus::InvalidValue => 4,
            WriteStatus::InvalidParameter => 5,
            WriteStatus::AccessDenied => 6,
            WriteStatus::Unrecognized(code) => code,
        }
    }

    pub fn is_success(self) -> bool {
        self == WriteStatus::Success
    }
}

impl fmt::Display for WriteStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            WriteStatus::Success => "Success",
            WriteStatus::NotSupported => "Not Supported",
            WriteStatus::UnspecifiedError => "Unspecified Error",
            WriteStatus::Timeout => "Timeout",
            WriteStatus::InvalidValue => "Invalid Value",
            WriteStatus::InvalidParameter => "Invalid Parameter",
            WriteStatus::AccessDenied => "Access Denied",
            WriteStatus::Unrecognized(_) => "Unrecognized",
        };
        write!(f, "{label} ({})", self.code())
    }
}

/// Per-setting classification for one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    AlreadySet,
    Applied,
    Failed(WriteStatus),
    NotFound,
}

/// Full record of how one desired setting was handled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettingResult {
    pub name: String,
    pub desired: String,
    /// Active value before the run; `None` when the setting was missing or
    /// carried no active marker.
    pub current: Option<String>,
    pub outcome: Outcome,
}

/// Which half of the tool a run executes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Enumerate and report current settings.
    Read,
    /// Reconcile current settings to the desired list.
    Write,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_codes_round_trip_through_status() {
        for code in 0..=6 {
            assert_eq!(WriteStatus::from_code(code).code(), code);
        }
        assert_eq!(WriteStatus::from_code(6), WriteStatus::AccessDenied);
    }

    #[test]
    fn unknown_code_is_preserved() {
        let status = WriteStatus::from_code(32769);
        assert_eq!(status, WriteStatus::Unrecognized(32769));
        assert!(!status.is_success());
        assert_eq!(status.to_string(), "Unrecognized (32769)");
    }

    #[test]
    fn display_includes_raw_code() {
        assert_eq!(WriteStatus::InvalidValue.to_string(), "Invalid Value (4)");
    }
}
