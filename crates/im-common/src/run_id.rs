//! Run identifiers for the allocation ledger.
//!
//! Each allocation run gets its own ULID; the process additionally
//! carries a process-level ID so log lines from the same invocation of
//! the runner can be correlated. ULIDs sort lexicographically by
//! creation time, which keeps `ORDER BY run_id` consistent with
//! `ORDER BY created_at` in the ledger tables.

use once_cell::sync::Lazy;
use ulid::Ulid;

/// Process-level ID, generated once at first access.
static PROCESS_ID: Lazy<String> = Lazy::new(|| Ulid::new().to_string());

/// Returns the process-level ID (same value for the process lifetime).
#[inline]
pub fn process() -> &'static str {
    &PROCESS_ID
}

/// Generates a fresh ULID. Use this for `run_id` on each new
/// allocation run.
#[inline]
pub fn generate() -> String {
    Ulid::new().to_string()
}
