//! Timestamp parsing for ordering mentions.

use chrono::{DateTime, NaiveDate, NaiveDateTime};

/// Milliseconds since the Unix epoch, or 0 when `value` is absent or unparsable.
///
/// Accepts RFC 3339, RFC 2822, zone-less ISO date-times (read as UTC) and
/// bare dates.
pub fn epoch_millis(value: Option<&str>) -> i64 {
    let Some(value) = value.map(str::trim).filter(|v| !v.is_empty()) else {
        return 0;
    };

    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return dt.timestamp_millis();
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(value) {
        return dt.timestamp_millis();
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(value, format) {
            return dt.and_utc().timestamp_millis();
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d")
        && let Some(dt) = date.and_hms_opt(0, 0, 0)
    {
        return dt.and_utc().timestamp_millis();
    }

    0
}
