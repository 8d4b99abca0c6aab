use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

/// Offset-carrying layouts beyond RFC 3339 / RFC 2822.
const ZONED_FORMATS: &[&str] = &[
    "%a %b %d %H:%M:%S %z %Y", // X/Twitter API export
    "%Y-%m-%d %H:%M:%S %z",
    "%Y-%m-%d %H:%M %z",
];

/// Offset-less layouts, read as UTC.
const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%m/%d/%Y"];

/// Parses a CSV timestamp cell into an instant. `None` means the row's
/// createdAt is not a valid instant and the row is skipped.
pub fn parse_instant(raw: &str) -> Option<DateTime<Utc>> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(s) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Some(dt) = ZONED_FORMATS
        .iter()
        .find_map(|fmt| DateTime::parse_from_str(s, fmt).ok())
    {
        return Some(dt.with_timezone(&Utc));
    }
    if let Some(naive) = NAIVE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
    {
        return Some(naive.and_utc());
    }
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn utc(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, mo, d, h, mi, s).unwrap()
    }

    #[test]
    fn test_rfc3339_with_offset() {
        assert_eq!(
            parse_instant("2024-03-01T12:30:00+02:00"),
            Some(utc(2024, 3, 1, 10, 30, 0))
        );
        assert_eq!(
            parse_instant("2024-03-01T12:30:00.250Z").map(|d| d.timestamp_millis() % 1000),
            Some(250)
        );
    }

    #[test]
    fn test_twitter_export_format() {
        assert_eq!(
            parse_instant("Wed Oct 10 20:19:24 +0000 2018"),
            Some(utc(2018, 10, 10, 20, 19, 24))
        );
    }

    #[test]
    fn test_naive_layouts_are_utc() {
        assert_eq!(parse_instant("2024-01-02 10:00"), Some(utc(2024, 1, 2, 10, 0, 0)));
        assert_eq!(parse_instant("2024-01-02T10:00:05"), Some(utc(2024, 1, 2, 10, 0, 5)));
        assert_eq!(parse_instant("01/02/2024 09:15"), Some(utc(2024, 1, 2, 9, 15, 0)));
    }

    #[test]
    fn test_bare_date_is_midnight() {
        assert_eq!(parse_instant(" 2024-02-29 "), Some(utc(2024, 2, 29, 0, 0, 0)));
    }

    #[test]
    fn test_garbage_is_rejected() {
        assert_eq!(parse_instant(""), None);
        assert_eq!(parse_instant("yesterday"), None);
        assert_eq!(parse_instant("2023-02-30"), None);
        assert_eq!(parse_instant("12345"), None);
    }
}
