use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::resource::ResourceId;
use crate::error::{Result, TimelineError};

pub type EventId = Uuid;

/// Date format used for every date string crossing the engine boundary.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Parse a `YYYY-MM-DD` date, reporting the offending input on failure.
pub fn parse_date(value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), DATE_FORMAT).map_err(|source| {
        TimelineError::InvalidDate {
            value: value.to_string(),
            source,
        }
    })
}

/// A scheduled block of days on one resource row. Both ends are inclusive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub id: EventId,
    pub resource_id: ResourceId,
    pub name: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

impl Event {
    /// Create an event, rejecting ranges whose end precedes the start.
    pub fn new(
        resource_id: ResourceId,
        name: impl Into<String>,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Self> {
        check_range(start_date, end_date)?;
        Ok(Self {
            id: Uuid::new_v4(),
            resource_id,
            name: name.into(),
            start_date,
            end_date,
        })
    }

    /// Same as [`Event::new`] but from `YYYY-MM-DD` strings.
    pub fn parse(
        resource_id: ResourceId,
        name: impl Into<String>,
        start_date: &str,
        end_date: &str,
    ) -> Result<Self> {
        Self::new(resource_id, name, parse_date(start_date)?, parse_date(end_date)?)
    }

    /// Length in days, counting both ends.
    pub fn duration_days(&self) -> i64 {
        (self.end_date - self.start_date).num_days() + 1
    }

    /// Move the event so it starts on `new_start`, keeping its duration.
    /// Leaves the event untouched when the shifted end is not a valid date.
    pub fn shift_to(&mut self, new_start: NaiveDate) -> Result<()> {
        let delta = new_start - self.start_date;
        let end = self
            .end_date
            .checked_add_signed(delta)
            .ok_or(TimelineError::InvalidRange {
                start: new_start,
                end: self.end_date,
            })?;
        self.start_date = new_start;
        self.end_date = end;
        Ok(())
    }

    /// Set both ends directly.
    pub fn set_range(&mut self, start: NaiveDate, end: NaiveDate) -> Result<()> {
        check_range(start, end)?;
        self.start_date = start;
        self.end_date = end;
        Ok(())
    }

    /// Half-open overlap test used for stacking: `self` starts before `previous` ends.
    pub fn starts_before_end_of(&self, previous: &Event) -> bool {
        previous.end_date > self.start_date
    }
}

fn check_range(start: NaiveDate, end: NaiveDate) -> Result<()> {
    if end < start {
        return Err(TimelineError::InvalidRange { start, end });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        parse_date(s).unwrap()
    }

    #[test]
    fn parse_date_accepts_iso_dates() {
        assert_eq!(
            parse_date(" 2024-01-10 ").unwrap(),
            NaiveDate::from_ymd_opt(2024, 1, 10).unwrap()
        );
    }

    #[test]
    fn parse_date_reports_bad_input() {
        let err = parse_date("10/01/2024").unwrap_err();
        match err {
            TimelineError::InvalidDate { value, .. } => assert_eq!(value, "10/01/2024"),
            other => panic!("unexpected error: {other}"),
        }
        assert!(parse_date("2024-02-30").is_err());
    }

    #[test]
    fn new_rejects_inverted_range() {
        let err = Event::new(Uuid::new_v4(), "x", date("2024-01-12"), date("2024-01-10"));
        assert!(matches!(err, Err(TimelineError::InvalidRange { .. })));
    }

    #[test]
    fn single_day_event_has_duration_one() {
        let e = Event::parse(Uuid::new_v4(), "x", "2024-01-10", "2024-01-10").unwrap();
        assert_eq!(e.duration_days(), 1);
    }

    #[test]
    fn shift_to_preserves_duration() {
        let mut e = Event::parse(Uuid::new_v4(), "x", "2024-01-10", "2024-01-12").unwrap();
        e.shift_to(date("2024-01-30")).unwrap();
        assert_eq!(e.start_date, date("2024-01-30"));
        assert_eq!(e.end_date, date("2024-02-01"));

        e.shift_to(date("2024-01-01")).unwrap();
        assert_eq!(e.end_date, date("2024-01-03"));
    }

    #[test]
    fn shift_past_the_last_date_is_rejected() {
        let mut e = Event::parse(Uuid::new_v4(), "x", "2024-01-10", "2024-01-12").unwrap();
        let err = e.shift_to(NaiveDate::MAX).unwrap_err();
        assert!(matches!(err, TimelineError::InvalidRange { .. }));
        assert_eq!(e.start_date, date("2024-01-10"));
        assert_eq!(e.end_date, date("2024-01-12"));
    }

    #[test]
    fn overlap_test_is_half_open() {
        let r = Uuid::new_v4();
        let a = Event::parse(r, "a", "2024-01-10", "2024-01-12").unwrap();
        let b = Event::parse(r, "b", "2024-01-11", "2024-01-13").unwrap();
        let c = Event::parse(r, "c", "2024-01-12", "2024-01-14").unwrap();
        assert!(b.starts_before_end_of(&a));
        assert!(!c.starts_before_end_of(&a));
    }
}
