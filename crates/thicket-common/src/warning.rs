//! Diagnostic warnings with colored terminal output.
//!
//! Provides deduplication to avoid spamming the same warning multiple times.
//! Used by the selector engine and tree loaders to report problems that do
//! not abort a query.

use std::collections::BTreeSet;
use std::sync::{Mutex, MutexGuard, PoisonError};

use owo_colors::OwoColorize;

/// Global set of warnings we've already printed (to deduplicate)
static WARNED: Mutex<BTreeSet<String>> = Mutex::new(BTreeSet::new());

fn warned() -> MutexGuard<'static, BTreeSet<String>> {
    // A panic while holding the lock leaves the set intact, keep using it.
    WARNED.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Warn about a recoverable problem (prints once per unique message)
///
/// # Example
/// ```
/// thicket_common::warning::warn_once("Selector", "unknown pseudo-class ':frob'");
/// ```
pub fn warn_once(component: &str, message: &str) {
    let key = format!("[{component}] {message}");
    if warned().insert(key) {
        eprintln!("{}", format!("[Thicket {component}] ⚠ {message}").yellow());
    }
}

/// Snapshot of every warning recorded since the last [`clear_warnings`],
/// formatted as `[component] message`, in sorted order.
#[must_use]
pub fn recorded_warnings() -> Vec<String> {
    warned().iter().cloned().collect()
}

/// Clear all recorded warnings (call before running an unrelated batch of queries)
pub fn clear_warnings() {
    warned().clear();
}
