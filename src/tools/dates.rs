use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

const DATETIME_FORMATS: [&str; 5] = [
    "%Y-%m-%dT%H:%M:%S%.fZ",
    "%Y-%m-%d %H:%M:%S",
    "%b %d %H:%M:%S %Y GMT",
    "%b %e %H:%M:%S %Y GMT",
    "%Y-%m-%dT%H:%M:%S",
];

const DATE_FORMATS: [&str; 2] = ["%Y-%m-%d", "%d-%b-%Y"];

/// Parses the timestamp shapes WHOIS and certificate data come in.
pub fn parse(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(value) {
        return Some(dt.with_timezone(&Utc));
    }

    for format in &DATETIME_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(value, format) {
            return Some(DateTime::<Utc>::from_naive_utc_and_offset(naive, Utc));
        }
    }

    for format in &DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(value, format) {
            let naive = date.and_hms_opt(0, 0, 0)?;
            return Some(DateTime::<Utc>::from_naive_utc_and_offset(naive, Utc));
        }
    }

    None
}

/// Whole days from `value` until `now`; negative for future dates.
pub fn days_since(value: &str, now: DateTime<Utc>) -> Option<i64> {
    parse(value).map(|then| now.signed_duration_since(then).num_days())
}

/// Whole days from `now` until `value`; negative once it has passed.
pub fn days_until(value: &str, now: DateTime<Utc>) -> Option<i64> {
    parse(value).map(|then| then.signed_duration_since(now).num_days())
}

/// Normalized display form, falling back to the raw text.
pub fn display(value: &str) -> String {
    match parse(value) {
        Some(dt) => dt.format("%Y-%m-%d %H:%M:%S UTC").to_string(),
        None => value.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn parse_formats_variety_test() {
        assert!(parse("1995-08-14T04:00:00Z").is_some());
        assert!(parse("2024-08-14T07:01:34.000Z").is_some());
        assert!(parse("2024-08-14T07:01:34+02:00").is_some());
        assert!(parse("2020-01-01 12:30:45").is_some());
        assert!(parse("Jan  1 12:00:00 2030 GMT").is_some());
        assert!(parse("Jan 15 12:00:00 2030 GMT").is_some());
        assert!(parse("Tue, 1 Jul 2003 10:52:37 +0200").is_some());
        assert!(parse("2020-01-01").is_some());
        assert!(parse("15-Sep-1997").is_some());
    }

    #[test]
    fn parse_invalid_test() {
        assert!(parse("").is_none());
        assert!(parse("invalid date").is_none());
        assert!(parse("2024-99-99").is_none());
    }

    #[test]
    fn days_since_test() {
        let week_ago = (now() - Duration::days(7)).format("%Y-%m-%d %H:%M:%S").to_string();
        assert_eq!(days_since(&week_ago, now()), Some(7));

        assert_eq!(days_since("2025-01-02T12:00:00Z", now()), Some(-1));
        assert!(days_since("1997-09-15T04:00:00Z", now()).unwrap() > 9000);
    }

    #[test]
    fn days_until_test() {
        assert_eq!(days_until("Jan 31 12:00:00 2025 GMT", now()), Some(30));
        assert!(days_until("Jan  1 12:00:00 2020 GMT", now()).unwrap() < 0);
        assert_eq!(days_until("not a date", now()), None);
    }

    #[test]
    fn display_test() {
        assert_eq!(display("2024-08-14T07:01:34Z"), "2024-08-14 07:01:34 UTC");
        assert_eq!(display("sometime"), "sometime");
    }
}
