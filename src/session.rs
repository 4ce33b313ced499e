// src/session.rs
//
// Collection runs are not tagged in the store; a "session" is inferred from
// timestamp proximity: everything within 60 seconds of the newest row. Two
// runs closer together than the window merge into one apparent session,
// an accepted approximation rather than a guaranteed partition.

use chrono::{DateTime, Utc};

use crate::store::StoredItem;

pub const SESSION_WINDOW_SECS: i64 = 60;

/// Rows with unparseable timestamps sort as minimal and never make the
/// window, mirroring how an invalid date compares in the dashboard.
fn parse_ts(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or(DateTime::<Utc>::MIN_UTC)
}

/// Isolate the most recent collection session from the full history.
/// Read-only; the store is never touched.
pub fn latest_session(mut rows: Vec<StoredItem>) -> Vec<StoredItem> {
    if rows.is_empty() {
        return rows;
    }

    rows.sort_by_key(|r| std::cmp::Reverse(parse_ts(&r.collected_at)));

    let newest = parse_ts(&rows[0].collected_at);
    if newest == DateTime::<Utc>::MIN_UTC {
        // Nothing in the history carries an orderable timestamp.
        return Vec::new();
    }

    rows.into_iter()
        .filter(|r| {
            let ts = parse_ts(&r.collected_at);
            ts != DateTime::<Utc>::MIN_UTC
                && (newest - ts).num_seconds() < SESSION_WINDOW_SECS
        })
        .collect()
}
