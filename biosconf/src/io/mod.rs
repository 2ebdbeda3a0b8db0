//! I/O helpers for `biosconf` runs.

pub mod bios;
pub mod cmtrace;
pub mod config;
pub mod csv_file;
pub mod powershell;
pub mod process;
pub mod settings_source;
