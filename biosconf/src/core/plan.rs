//! Per-setting reconciliation decision.
//!
//! Decides what to do with one desired setting given the enumeration
//! snapshot. Executing the write is left to [`crate::reconcile`].

use crate::core::encoding::active_value;
use crate::core::types::{DesiredSetting, EnumeratedSetting};

/// Decision for a single desired setting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action<'a> {
    /// The name is absent from the snapshot.
    NotFound,
    /// The active value already equals the desired value.
    AlreadySet { current: &'a str },
    /// A write is required. `current` is `None` when no option is marked
    /// active.
    Write { current: Option<&'a str> },
}

/// Find a setting in the snapshot by exact name.
///
/// Names are assumed unique; with duplicates the first entry wins.
pub fn lookup<'a>(snapshot: &'a [EnumeratedSetting], name: &str) -> Option<&'a EnumeratedSetting> {
    snapshot.iter().find(|setting| setting.name == name)
}

/// Decide how to reconcile `desired` against `snapshot`.
///
/// Comparison is exact and case-sensitive.
pub fn plan_setting<'a>(snapshot: &'a [EnumeratedSetting], desired: &DesiredSetting) -> Action<'a> {
    let Some(setting) = lookup(snapshot, &desired.name) else {
        return Action::NotFound;
    };
    match active_value(&setting.encoded) {
        Some(current) if current == desired.value => Action::AlreadySet { current },
        current => Action::Write { current },
    }
}
