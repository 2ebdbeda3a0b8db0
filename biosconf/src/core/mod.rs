//! Deterministic, pure logic shared by the reconciliation run.
//!
//! Core modules must be free of I/O side effects. They operate on in-memory
//! data structures and return deterministic outputs suitable for tests.

pub mod encoding;
pub mod plan;
pub mod tally;
pub mod types;
