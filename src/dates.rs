//! Date handling for payloads and webhook events.
//!
//! Providers expect `Date` fields as RFC 2822 strings; webhook events
//! deliver timestamps in a handful of formats (RFC 2822, RFC 3339, epoch
//! seconds). Parsing is tolerant: anything unrecognized yields `None`.

use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};

/// Format a date the way mail headers carry it.
///
/// Example: `"Tue, 5 Aug 2025 14:30:00 +0000"`
pub fn rfc2822date(dt: &DateTime<Utc>) -> String {
    dt.to_rfc2822()
}

/// Parse a timestamp from a payload or webhook event.
///
/// Tries RFC 2822, then RFC 3339, then epoch seconds, then a few common
/// unqualified formats (assumed UTC). Returns `None` when nothing matches.
pub fn parse_date(date_str: &str) -> Option<DateTime<Utc>> {
    let trimmed = date_str.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc2822(trimmed) {
        return Some(dt.with_timezone(&Utc));
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(dt.with_timezone(&Utc));
    }

    // Epoch seconds, as Mailgun-style webhook signatures carry
    if let Ok(secs) = trimmed.parse::<i64>() {
        return Utc.timestamp_opt(secs, 0).single();
    }

    let formats = [
        "%d %b %Y %H:%M:%S %z",
        "%d %b %Y %H:%M:%S",
        "%Y-%m-%d %H:%M:%S %z",
        "%Y-%m-%d %H:%M:%S",
    ];
    for fmt in &formats {
        if let Ok(dt) = DateTime::parse_from_str(trimmed, fmt) {
            return Some(dt.with_timezone(&Utc));
        }
        if let Ok(ndt) = NaiveDateTime::parse_from_str(trimmed, fmt) {
            return Some(Utc.from_utc_datetime(&ndt));
        }
    }

    None
}
