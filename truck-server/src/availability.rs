//! Pickup slot availability
//!
//! Slots are derived from a location's schedule window for one day: start at
//! the opening time, step in 30-minute increments while before closing, and
//! include the closing time itself when a step lands exactly on it.
//! Everything here is pure; the same inputs always give the same slots.

use std::fmt;

use chrono::{Duration, NaiveDate, NaiveTime, Timelike};
use shared::models::Schedule;

/// Distance between two bookable pickup times
pub const SLOT_MINUTES: i64 = 30;

/// One bookable pickup time
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimeSlot(NaiveTime);

impl TimeSlot {
    pub fn new(time: NaiveTime) -> Self {
        Self(time)
    }

    pub fn time(&self) -> NaiveTime {
        self.0
    }

    /// 12-hour label, e.g. `11:00 AM`, `1:30 PM`, `12:00 AM`
    pub fn label(&self) -> String {
        let (h, m) = (self.0.hour(), self.0.minute());
        let (h12, ampm) = match h {
            0 => (12, "AM"),
            1..=11 => (h, "AM"),
            12 => (12, "PM"),
            _ => (h - 12, "PM"),
        };
        format!("{h12}:{m:02} {ampm}")
    }

    /// Parse a 12-hour label (`h:mm AM` / `h:mm PM`, case-insensitive)
    pub fn parse_label(label: &str) -> Option<Self> {
        let (clock, meridiem) = label.trim().rsplit_once(' ')?;
        let (h, m) = clock.trim().split_once(':')?;
        let h: u32 = h.parse().ok()?;
        let m: u32 = m.parse().ok()?;
        if !(1..=12).contains(&h) || m > 59 || clock.trim().len() > 5 {
            return None;
        }
        let hour = match meridiem.to_ascii_uppercase().as_str() {
            "AM" => h % 12,
            "PM" => h % 12 + 12,
            _ => return None,
        };
        NaiveTime::from_hms_opt(hour, m, 0).map(Self)
    }
}

impl fmt::Display for TimeSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label())
    }
}

/// First schedule row for this date and location
pub fn find_schedule<'a>(
    schedules: &'a [Schedule],
    date: NaiveDate,
    location_id: &str,
) -> Option<&'a Schedule> {
    schedules
        .iter()
        .find(|s| s.date == date && s.location_id == location_id)
}

/// Slots between `start` and `end`; empty when `start >= end`
pub fn time_slots(start: NaiveTime, end: NaiveTime) -> Vec<TimeSlot> {
    if start >= end {
        return Vec::new();
    }

    let step = Duration::minutes(SLOT_MINUTES);
    let mut slots = Vec::new();
    let mut current = start;
    while current < end {
        slots.push(TimeSlot(current));
        let (next, wrapped) = current.overflowing_add_signed(step);
        if wrapped != 0 {
            // stepped past midnight, nothing later in this day
            return slots;
        }
        current = next;
    }
    if current == end {
        slots.push(TimeSlot(end));
    }
    slots
}

/// Slot labels for `location_id` on `date`; no schedule means no slots
pub fn available_times(schedules: &[Schedule], date: NaiveDate, location_id: &str) -> Vec<String> {
    find_schedule(schedules, date, location_id)
        .map(|s| labels(&time_slots(s.start_time, s.end_time)))
        .unwrap_or_default()
}

/// Slot labels from raw `HH:MM` / `HH:MM:SS` strings.
///
/// Unparsable input is logged and yields no slots.
pub fn available_times_raw(start: &str, end: &str) -> Vec<String> {
    match (parse_time_of_day(start), parse_time_of_day(end)) {
        (Some(s), Some(e)) => labels(&time_slots(s, e)),
        _ => {
            tracing::warn!(start, end, "Unparsable schedule window, no slots offered");
            Vec::new()
        }
    }
}

/// Distinct schedule dates, ascending
pub fn available_dates(schedules: &[Schedule]) -> Vec<NaiveDate> {
    let mut dates: Vec<NaiveDate> = schedules.iter().map(|s| s.date).collect();
    dates.sort_unstable();
    dates.dedup();
    dates
}

/// Parse `HH:MM` or `HH:MM:SS`
pub fn parse_time_of_day(raw: &str) -> Option<NaiveTime> {
    let raw = raw.trim();
    NaiveTime::parse_from_str(raw, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M"))
        .ok()
}

fn labels(slots: &[TimeSlot]) -> Vec<String> {
    slots.iter().map(TimeSlot::label).collect()
}
