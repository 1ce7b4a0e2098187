//! Warnings with coloured terminal output.
//!
//! Provides deduplication to avoid spamming the same warning multiple times.
//! Used by the markup, builder and layout components to report problems that
//! do not abort rendering.

use std::collections::HashSet;
use std::sync::{Mutex, PoisonError};

use owo_colors::OwoColorize;

/// Global set of warnings we've already printed (to deduplicate)
static WARNED: Mutex<Option<HashSet<String>>> = Mutex::new(None);

/// Warn about a recoverable problem (prints once per unique message).
///
/// Returns `true` if the warning was printed, `false` if it had already
/// been reported since the last [`take_warnings`].
///
/// # Example
/// ```ignore
/// warn_once("image", "cannot open 'logo.png', using placeholder");
/// ```
pub fn warn_once(component: &str, message: &str) -> bool {
    let key = format!("[{component}] {message}");
    let should_print = WARNED
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .get_or_insert_with(HashSet::new)
        .insert(key);

    if should_print {
        eprintln!("{}", format!("[quire {component}] ⚠ {message}").yellow());
    }
    should_print
}

/// The warnings reported so far, as an opaque set for [`restore_warnings`].
#[derive(Debug, Default)]
pub struct ReportedWarnings(HashSet<String>);

/// Clear all recorded warnings and hand back what was recorded (called
/// when a new document is loaded).
#[must_use]
pub fn take_warnings() -> ReportedWarnings {
    let mut guard = WARNED.lock().unwrap_or_else(PoisonError::into_inner);
    ReportedWarnings(guard.take().unwrap_or_default())
}

/// Put back a set returned by [`take_warnings`], replacing whatever was
/// reported in between.
pub fn restore_warnings(warnings: ReportedWarnings) {
    *WARNED.lock().unwrap_or_else(PoisonError::into_inner) = Some(warnings.0);
}
