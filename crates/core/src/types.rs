use chrono::SecondsFormat;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// Render a timestamp the way stored records carry it:
/// `2024-05-01T09:30:00.000Z` (millisecond precision, `Z` suffix).
pub fn to_iso(ts: Timestamp) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// The current time as a stored ISO-8601 string.
pub fn now_iso() -> String {
    to_iso(chrono::Utc::now())
}

/// Parse a stored ISO-8601 string. Returns `None` for anything that is not
/// a valid RFC 3339 timestamp.
pub fn parse_iso(value: &str) -> Option<Timestamp> {
    chrono::DateTime::parse_from_rfc3339(value)
        .ok()
        .map(|ts| ts.with_timezone(&chrono::Utc))
}
