//! Schedule Model

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

use super::location::Location;

/// One day's service window at a location
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Schedule {
    pub id: String,
    pub location_id: String,
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Schedule row with its location joined in at read time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleWithLocation {
    #[serde(flatten)]
    pub schedule: Schedule,
    pub location: Option<Location>,
}

/// Create schedule payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleCreate {
    pub location_id: String,
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
}

/// Update schedule payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScheduleUpdate {
    pub location_id: Option<String>,
    pub date: Option<NaiveDate>,
    pub start_time: Option<NaiveTime>,
    pub end_time: Option<NaiveTime>,
}

/// Filters for schedule listings (all optional, combined with AND)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScheduleQuery {
    /// Only dates on or after this day
    pub from: Option<NaiveDate>,
    /// Only this exact day
    pub date: Option<NaiveDate>,
    pub location_id: Option<String>,
    pub limit: Option<usize>,
}

impl ScheduleQuery {
    pub fn upcoming(from: NaiveDate) -> Self {
        Self {
            from: Some(from),
            ..Default::default()
        }
    }

    pub fn on(date: NaiveDate) -> Self {
        Self {
            date: Some(date),
            ..Default::default()
        }
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn matches(&self, schedule: &Schedule) -> bool {
        self.from.is_none_or(|from| schedule.date >= from)
            && self.date.is_none_or(|d| schedule.date == d)
            && self
                .location_id
                .as_deref()
                .is_none_or(|id| schedule.location_id == id)
    }
}
