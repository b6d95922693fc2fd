use chrono::{DateTime, NaiveDate, NaiveDateTime};

const DATETIME_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// Calendar date written in a timestamp string.
///
/// The date is read literally: a timestamp carrying an offset keeps its own
/// local date and is never shifted to UTC. Returns `None` for anything that
/// is not one of the supported layouts.
///
/// # Examples
///
/// ```
/// use aquawatch::calendar_date;
/// use chrono::NaiveDate;
///
/// let expected = NaiveDate::from_ymd_opt(2024, 4, 23);
/// assert_eq!(calendar_date("2024-04-23 23:00:00"), expected);
/// assert_eq!(calendar_date("2024-04-23T23:30:00+05:00"), expected);
/// assert_eq!(calendar_date("23/04/2024"), None);
/// ```
pub fn calendar_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    for format in DATETIME_FORMATS {
        if let Ok(datetime) = NaiveDateTime::parse_from_str(value, format) {
            return Some(datetime.date());
        }
    }
    if let Ok(datetime) = DateTime::parse_from_rfc3339(value) {
        return Some(datetime.naive_local().date());
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d").ok()
}
