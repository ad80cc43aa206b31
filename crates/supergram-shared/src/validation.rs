//! Input rules enforced by the registration wizard and the profile editor.
//!
//! Validation is intentionally shallow: length and non-emptiness only, plus
//! a character-class filter on handles.

use crate::constants::MIN_PHONE_LEN;

/// A phone number is accepted once it has at least [`MIN_PHONE_LEN`]
/// characters. Every character counts, including `+`, spaces and dashes.
pub fn phone_is_complete(phone: &str) -> bool {
    phone.chars().count() >= MIN_PHONE_LEN
}

pub fn is_handle_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// Drop every character outside `[A-Za-z0-9_]`.
pub fn filter_handle(input: &str) -> String {
    input.chars().filter(|c| is_handle_char(*c)).collect()
}

/// Both profile fields must be non-empty once trimmed.
pub fn profile_is_complete(display_name: &str, handle: &str) -> bool {
    !display_name.trim().is_empty() && !handle.trim().is_empty()
}
