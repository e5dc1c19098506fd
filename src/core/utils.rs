use chrono::{DateTime, FixedOffset, NaiveDate, SecondsFormat, Utc};

pub fn datetime_to_string(datetime: DateTime<FixedOffset>) -> String {
    datetime
        .with_timezone(&Utc)
        .to_rfc3339_opts(SecondsFormat::Secs, true)
}

pub fn datetime_to_string_opt(datetime: Option<DateTime<FixedOffset>>) -> Option<String> {
    datetime.map(datetime_to_string)
}

pub fn date_to_string_opt(date: Option<NaiveDate>) -> Option<String> {
    date.map(|x| x.format("%Y-%m-%d").to_string())
}

/// Accepts `YYYY-MM-DD`, `YYYY-MM` (first day of the month) or an RFC 3339
/// timestamp (its calendar date).
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return Some(date);
    }
    if let Ok(date) = NaiveDate::parse_from_str(&format!("{value}-01"), "%Y-%m-%d") {
        return Some(date);
    }
    DateTime::parse_from_rfc3339(value)
        .ok()
        .map(|x| x.date_naive())
}
