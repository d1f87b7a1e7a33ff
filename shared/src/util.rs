use chrono::{DateTime, Local, NaiveDate, Utc};

/// Current UTC timestamp
pub fn now() -> DateTime<Utc> {
    Utc::now()
}

/// Today's calendar date in the server's local time zone.
///
/// Schedules are stored as local calendar days, so "today" is local too.
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Random resource ID (UUID v4, hyphenated)
pub fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}
