//! Snapshot capture and merge-on-save.

use std::collections::HashSet;

use crate::cookie::CookieRecord;

/// Removes records that repeat an earlier `(name, domain, path)`, keeping the
/// last occurrence at its own position.
#[must_use]
pub fn dedupe_by_key(records: Vec<CookieRecord>) -> Vec<CookieRecord> {
    let mut seen = HashSet::new();
    let mut kept: Vec<CookieRecord> = records
        .into_iter()
        .rev()
        .filter(|record| {
            seen.insert((
                record.name.clone(),
                record.domain.clone(),
                record.path.clone(),
            ))
        })
        .collect();
    kept.reverse();
    kept
}

/// Selects the cookies in `jar` that belong to `host`.
#[must_use]
pub fn capture_for_host(jar: Vec<CookieRecord>, host: &str) -> Vec<CookieRecord> {
    dedupe_by_key(
        jar.into_iter()
            .filter(|cookie| cookie.belongs_to(host))
            .collect(),
    )
}

/// Builds a persona's new snapshot after visiting `host`.
///
/// Stored records for `host` are replaced wholesale by `captured`; records for
/// every other host are kept in their original order.
#[must_use]
pub fn merge_snapshot(
    stored: Vec<CookieRecord>,
    captured: Vec<CookieRecord>,
    host: &str,
) -> Vec<CookieRecord> {
    let mut merged: Vec<CookieRecord> = stored
        .into_iter()
        .filter(|cookie| !cookie.belongs_to(host))
        .collect();
    merged.extend(captured);
    dedupe_by_key(merged)
}
