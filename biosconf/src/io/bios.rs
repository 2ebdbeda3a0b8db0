//! Management interface abstraction.
//!
//! The [`BiosInterface`] trait decouples reconciliation from the vendor
//! backend (currently the HP CIM classes reached through PowerShell, see
//! [`crate::io::powershell`]). Tests use scripted interfaces that keep
//! settings in memory without spawning processes.

use anyhow::Result;

use crate::core::encoding::encode_password;
use crate::core::types::{EnumeratedSetting, WriteStatus};

/// Name of the setting that holds the BIOS setup password.
pub const SETUP_PASSWORD_SETTING: &str = "Setup Password";

/// A setup password already in the vendor's text encoding.
#[derive(Clone, PartialEq, Eq)]
pub struct EncodedPassword(String);

impl EncodedPassword {
    pub fn from_plain(plain: &str) -> Self {
        Self(encode_password(plain))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for EncodedPassword {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("EncodedPassword(****)")
    }
}

/// Abstraction over the vendor BIOS settings interface.
pub trait BiosInterface {
    /// List every configurable setting with its encoded value.
    fn enumerate(&self) -> Result<Vec<EnumeratedSetting>>;

    /// Whether a setup password currently gates writes.
    fn is_password_configured(&self) -> Result<bool>;

    /// Set `name` to `value`.
    ///
    /// A required but missing password yields [`WriteStatus::AccessDenied`],
    /// not an error. `Err` is reserved for failing to reach the interface.
    fn write(
        &self,
        name: &str,
        value: &str,
        password: Option<&EncodedPassword>,
    ) -> Result<WriteStatus>;

    /// Check a candidate setup password.
    ///
    /// The vendor interface has no verification primitive. Instead the
    /// setup password is written with the candidate as both the new value
    /// and the authorizing password: the write only succeeds when the
    /// candidate matches, and on success the stored password is unchanged.
    fn verify_password(&self, candidate: &EncodedPassword) -> Result<bool> {
        let status = self.write(SETUP_PASSWORD_SETTING, candidate.as_str(), Some(candidate))?;
        Ok(status.is_success())
    }
}

impl<T: BiosInterface + ?Sized> BiosInterface for &T {
    fn enumerate(&self) -> Result<Vec<EnumeratedSetting>> {
        (**self).enumerate()
    }

    fn is_password_configured(&self) -> Result<bool> {
        (**self).is_password_configured()
    }

    fn write(
        &self,
        name: &str,
        value: &str,
        password: Option<&EncodedPassword>,
    ) -> Result<WriteStatus> {
        (**self).write(name, value, password)
    }

    fn verify_password(&self, candidate: &EncodedPassword) -> Result<bool> {
        (**self).verify_password(candidate)
    }
}

/// Setup password facts for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PasswordState {
    pub is_configured: bool,
    pub supplied: Option<EncodedPassword>,
}

impl PasswordState {
    /// The password to pass to writes: only when one is configured.
    pub fn for_write(&self) -> Option<&EncodedPassword> {
        if self.is_configured {
            self.supplied.as_ref()
        } else {
            None
        }
    }
}
