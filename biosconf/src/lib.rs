//! Reconcile HP BIOS settings against a desired baseline.
//!
//! The crate keeps the same split throughout:
//!
//! - **[`core`]**: Pure, deterministic logic (value decoding, per-setting
//!   decisions, tallies). No I/O, fully testable in isolation.
//! - **[`io`]**: Side-effecting operations (log file, CSV files, config,
//!   the vendor management interface). Isolated behind small types and the
//!   [`io::bios::BiosInterface`] trait so tests can script them.
//!
//! Orchestration modules ([`run`], [`reconcile`], [`report`]) coordinate core
//! logic with I/O to implement the CLI.

pub mod core;
pub mod error;
pub mod exit_codes;
pub mod io;
pub mod logging;
pub mod reconcile;
pub mod report;
pub mod run;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
