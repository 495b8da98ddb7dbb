use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, TimeZone, Utc};

/// Parses the ISO-8601 shapes the catalog accepts into a UTC instant.
///
/// Accepts RFC 3339 (`2024-03-01T10:00:00Z`, `...+02:00`), calendar dates
/// (`2024-03-01`, `2024-03`, `2024`) read as midnight UTC, and naive
/// date-times (`2024-03-01T10:00:00[.sss]`, `2024-03-01T10:00`) read as UTC.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }

    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(Utc.from_utc_datetime(&naive));
        }
    }

    parse_calendar_date(raw)
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| Utc.from_utc_datetime(&naive))
}

fn parse_calendar_date(raw: &str) -> Option<NaiveDate> {
    let is_digits = |s: &str| !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit());

    match raw.split('-').collect::<Vec<_>>().as_slice() {
        [year] if year.len() == 4 && is_digits(year) => {
            NaiveDate::from_ymd_opt(year.parse().ok()?, 1, 1)
        }
        [year, month] if year.len() == 4 && month.len() == 2 && is_digits(year) && is_digits(month) => {
            NaiveDate::from_ymd_opt(year.parse().ok()?, month.parse().ok()?, 1)
        }
        _ => NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok(),
    }
}

/// Current time as RFC 3339 UTC with millisecond precision.
pub fn now_iso() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Milliseconds since the Unix epoch.
pub fn now_ms() -> i64 {
    Utc::now().timestamp_millis()
}
