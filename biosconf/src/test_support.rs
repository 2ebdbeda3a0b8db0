//! Test-only helpers: an in-memory BIOS interface and scratch log sinks.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;

use anyhow::Result;

use crate::core::encoding::{ACTIVE_MARKER, OPTION_SEPARATOR, encode_password, options};
use crate::core::types::{EnumeratedSetting, WriteStatus};
use crate::io::bios::{BiosInterface, EncodedPassword, SETUP_PASSWORD_SETTING};
use crate::io::cmtrace::LogSink;

/// One call to [`BiosInterface::write`] as seen by [`FakeBios`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedWrite {
    pub name: String,
    pub value: String,
    pub password: Option<String>,
}

/// Scripted [`BiosInterface`] backed by an in-memory settings table.
///
/// Writes behave like the vendor interface: a configured password must be
/// supplied, the value must be one of the legal options, and a successful
/// write moves the active marker.
#[derive(Debug, Default)]
pub struct FakeBios {
    settings: RefCell<Vec<EnumeratedSetting>>,
    password: RefCell<Option<String>>,
    forced: HashMap<String, WriteStatus>,
    writes: RefCell<Vec<RecordedWrite>>,
    enumerate_calls: Cell<usize>,
}

impl FakeBios {
    /// Build from `(name, encoded value)` pairs.
    pub fn new(settings: &[(&str, &str)]) -> Self {
        Self {
            settings: RefCell::new(
                settings
                    .iter()
                    .map(|(name, encoded)| EnumeratedSetting::new(*name, *encoded))
                    .collect(),
            ),
            ..Self::default()
        }
    }

    /// Require `plain` as the setup password.
    pub fn with_password(self, plain: &str) -> Self {
        *self.password.borrow_mut() = Some(encode_password(plain));
        self
    }

    /// Make every write to `name` return `status` without changing state.
    pub fn with_status(mut self, name: &str, status: WriteStatus) -> Self {
        self.forced.insert(name.to_string(), status);
        self
    }

    pub fn writes(&self) -> Vec<RecordedWrite> {
        self.writes.borrow().clone()
    }

    /// Writes excluding setup password verification.
    pub fn setting_writes(&self) -> Vec<RecordedWrite> {
        self.writes
            .borrow()
            .iter()
            .filter(|write| write.name != SETUP_PASSWORD_SETTING)
            .cloned()
            .collect()
    }

    pub fn enumerate_calls(&self) -> usize {
        self.enumerate_calls.get()
    }

    pub fn encoded_value(&self, name: &str) -> Option<String> {
        self.settings
            .borrow()
            .iter()
            .find(|setting| setting.name == name)
            .map(|setting| setting.encoded.clone())
    }

    fn apply(&self, name: &str, value: &str) -> WriteStatus {
        let mut settings = self.settings.borrow_mut();
        let Some(setting) = settings.iter_mut().find(|setting| setting.name == name) else {
            return WriteStatus::InvalidParameter;
        };
        let legal = options(&setting.encoded);
        if !legal.contains(&value) {
            return WriteStatus::InvalidValue;
        }
        let separator = OPTION_SEPARATOR.to_string();
        setting.encoded = legal
            .iter()
            .map(|option| {
                if *option == value {
                    format!("{ACTIVE_MARKER}{option}")
                } else {
                    (*option).to_string()
                }
            })
            .collect::<Vec<_>>()
            .join(&separator);
        WriteStatus::Success
    }
}

impl BiosInterface for FakeBios {
    fn enumerate(&self) -> Result<Vec<EnumeratedSetting>> {
        self.enumerate_calls.set(self.enumerate_calls.get() + 1);
        Ok(self.settings.borrow().clone())
    }

    fn is_password_configured(&self) -> Result<bool> {
        Ok(self.password.borrow().is_some())
    }

    fn write(
        &self,
        name: &str,
        value: &str,
        password: Option<&EncodedPassword>,
    ) -> Result<WriteStatus> {
        self.writes.borrow_mut().push(RecordedWrite {
            name: name.to_string(),
            value: value.to_string(),
            password: password.map(|p| p.as_str().to_string()),
        });

        if let Some(status) = self.forced.get(name) {
            return Ok(*status);
        }
        let stored = self.password.borrow().clone();
        if let Some(stored) = stored
            && password.map(EncodedPassword::as_str) != Some(stored.as_str())
        {
            return Ok(WriteStatus::AccessDenied);
        }
        if name == SETUP_PASSWORD_SETTING {
            *self.password.borrow_mut() = Some(value.to_string());
            return Ok(WriteStatus::Success);
        }
        Ok(self.apply(name, value))
    }
}

/// Log sink in a fresh temp directory; keep the guard alive while logging.
pub fn temp_log() -> Result<(tempfile::TempDir, LogSink)> {
    let dir = tempfile::tempdir()?;
    let sink = LogSink::open(dir.path().join("bios.log"), "BiosConfig")?;
    Ok((dir, sink))
}
