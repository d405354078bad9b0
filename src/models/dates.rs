use chrono::{DateTime, NaiveDate, NaiveTime, TimeZone, Utc};

/// Parse either a bare `YYYY-MM-DD` date (taken as midnight UTC) or a full
/// RFC 3339 timestamp.
pub fn parse_timestamp(input: &str) -> Option<DateTime<Utc>> {
    let input = input.trim();
    if let Ok(date) = NaiveDate::parse_from_str(input, "%Y-%m-%d") {
        return Some(at_midnight(date));
    }
    DateTime::parse_from_rfc3339(input)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

pub fn at_midnight(date: NaiveDate) -> DateTime<Utc> {
    Utc.from_utc_datetime(&date.and_time(NaiveTime::MIN))
}

/// Drop the time-of-day component of a UTC instant.
pub fn midnight_utc(instant: DateTime<Utc>) -> DateTime<Utc> {
    at_midnight(instant.date_naive())
}

/// Day/month/year, the way dates are shown across the dashboard.
pub fn format_day(instant: DateTime<Utc>) -> String {
    instant.format("%d/%m/%Y").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;

    #[test]
    fn bare_date_is_midnight_utc() {
        let ts = parse_timestamp("2023-01-15").unwrap();
        assert_eq!(ts.to_rfc3339(), "2023-01-15T00:00:00+00:00");
    }

    #[test]
    fn rfc3339_is_converted_to_utc() {
        let ts = parse_timestamp("2023-01-15T22:30:00-03:00").unwrap();
        assert_eq!(ts.to_rfc3339(), "2023-01-16T01:30:00+00:00");
    }

    #[test]
    fn garbage_is_rejected() {
        assert!(parse_timestamp("15/01/2023").is_none());
        assert!(parse_timestamp("").is_none());
    }

    #[test]
    fn midnight_strips_time_of_day() {
        let ts = parse_timestamp("2024-06-01T17:45:12Z").unwrap();
        let day = midnight_utc(ts);
        assert_eq!(day.hour(), 0);
        assert_eq!(day.minute(), 0);
        assert_eq!(day.date_naive(), ts.date_naive());
    }

    #[test]
    fn formats_day_first() {
        assert_eq!(format_day(parse_timestamp("2023-04-30").unwrap()), "30/04/2023");
    }
}
