//! # Utility Functions Module
//!
//! This module provides utility functions that reduce boilerplate when
//! building external tool command lines.
//!
//! File names are not guaranteed to be UTF-8, so arguments are collected as
//! `OsString` instead of `String`.

use std::ffi::{OsStr, OsString};

/// Single argument conversion used by the `args!` macro.
pub fn os_arg<S: AsRef<OsStr> + ?Sized>(item: &S) -> OsString {
    item.as_ref().to_os_string()
}

/// Macro for building mixed argument lists (flags and paths together).
///
/// # Example
/// ```rust
/// use lossless_optimizer::args;
/// use std::path::Path;
///
/// let input = Path::new("song.wav");
/// let args = args!["-f", input, "-o", "song.flac"];
/// assert_eq!(args.len(), 4);
/// ```
#[macro_export]
macro_rules! args {
    [$($item:expr),* $(,)?] => {
        vec![$($crate::utils::os_arg(&$item)),*]
    };
}
