//! Timestamp text normalization.
//!
//! Each backend renders its `created_at` column as text differently:
//! Postgres `::text` yields `2024-01-01 12:34:56.789+00`, MySQL and SQLite
//! yield `2024-01-01 12:34:56` with no offset. Responses normalize all of
//! these to RFC 3339 so clients see one format regardless of provider.

use chrono::{DateTime, NaiveDateTime, Utc};

/// Normalizes database timestamp text to RFC 3339.
///
/// Unrecognized text passes through untouched rather than failing the
/// surrounding request.
pub fn to_rfc3339(raw: &str) -> String {
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return ts.with_timezone(&Utc).to_rfc3339();
    }

    // Postgres text form carries an offset, possibly without minutes.
    if let Ok(ts) = DateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f%#z") {
        return ts.with_timezone(&Utc).to_rfc3339();
    }

    // MySQL and SQLite render without an offset; both store UTC here.
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f") {
        return naive.and_utc().to_rfc3339();
    }

    raw.to_string()
}
