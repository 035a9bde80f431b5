//! Argument checks applied before any command is dispatched.
//!
//! Failures are caller errors and surface as [`Error::InvalidArgument`]; no
//! I/O has happened when one is returned.

use crate::Error;

/// Checks that a 64-bit argument fits the 32-bit range the server command
/// expects, returning the narrowed value.
pub fn check_in_i32_range(name: &str, value: i64) -> crate::Result<i32> {
    i32::try_from(value).map_err(|_| {
        Error::invalid_argument(format!(
            "{name} must be within [{}, {}], got {value}",
            i32::MIN,
            i32::MAX
        ))
    })
}

/// Checks that a textual argument is present.
pub fn check_not_empty<'a>(name: &str, value: &'a str) -> crate::Result<&'a str> {
    if value.trim().is_empty() {
        return Err(Error::invalid_argument(format!("{name} must not be empty")));
    }
    Ok(value)
}
