//! Stable exit codes for the `biosconf` CLI.

/// Run completed (per-setting failures included).
pub const OK: i32 = 0;
/// Unexpected failure outside the fatal taxonomy (I/O, malformed vendor output).
pub const FAILURE: i32 = 1;
/// Invalid parameter combination or unusable settings input.
pub const CONFIGURATION: i32 = 2;
/// The vendor management interface could not be reached.
pub const CONNECTION: i32 = 3;
/// Setup password missing or mismatched.
pub const AUTHENTICATION: i32 = 4;
