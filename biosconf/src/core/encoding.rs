//! Vendor value encodings.
//!
//! Enumerated values look like `"Enable,*Disable"`: every legal option,
//! comma separated, with the active one prefixed by `*`. Passwords handed to
//! the vendor interface carry a `<utf-16/>` prefix telling it how to decode
//! the text.

pub const ACTIVE_MARKER: char = '*';
pub const OPTION_SEPARATOR: char = ',';
pub const PASSWORD_ENCODING_PREFIX: &str = "<utf-16/>";

/// Return the active option of an encoded value, without its marker.
///
/// `None` when no option carries the marker.
pub fn active_value(encoded: &str) -> Option<&str> {
    encoded
        .split(OPTION_SEPARATOR)
        .find_map(|option| option.strip_prefix(ACTIVE_MARKER))
}

/// List the legal options of an encoded value with markers stripped.
pub fn options(encoded: &str) -> Vec<&str> {
    encoded
        .split(OPTION_SEPARATOR)
        .map(|option| option.strip_prefix(ACTIVE_MARKER).unwrap_or(option))
        .collect()
}

/// Encode a plain-text password the way the vendor write call expects it.
pub fn encode_password(plain: &str) -> String {
    format!("{PASSWORD_ENCODING_PREFIX}{plain}")
}
