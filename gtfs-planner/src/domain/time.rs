//! Rail time handling for GTFS timetables.
//!
//! GTFS expresses stop times as "HH:MM:SS" offsets from the start of the
//! service day, and the hour may exceed 23 for trips running past midnight.
//! `RailTime` anchors those offsets to a calendar date so that times from
//! different service days compare correctly.

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use std::cmp::Ordering;
use std::fmt;

/// Error returned when parsing an invalid time string.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid time: {reason}")]
pub struct TimeError {
    reason: &'static str,
}

impl TimeError {
    fn new(reason: &'static str) -> Self {
        Self { reason }
    }
}

/// A date-aware instant in a rail timetable.
///
/// Two times at "01:30" may be on different dates when one of them comes
/// from a trip that started the evening before, so both components are kept.
///
/// # Examples
///
/// ```
/// use gtfs_planner::domain::RailTime;
/// use chrono::NaiveDate;
///
/// let date = NaiveDate::from_ymd_opt(2024, 3, 15).unwrap();
/// let time = RailTime::from_gtfs("25:10:00", date).unwrap();
/// assert_eq!(time.to_string(), "01:10");
/// assert_eq!(time.date(), NaiveDate::from_ymd_opt(2024, 3, 16).unwrap());
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct RailTime {
    date: NaiveDate,
    time: NaiveTime,
}

impl RailTime {
    /// Create a new RailTime from date and time components.
    pub fn new(date: NaiveDate, time: NaiveTime) -> Self {
        Self { date, time }
    }

    /// Create a RailTime from a full date-time.
    pub fn from_datetime(dt: NaiveDateTime) -> Self {
        Self {
            date: dt.date(),
            time: dt.time(),
        }
    }

    /// Parse a GTFS "HH:MM:SS" offset from the start of `service_date`.
    ///
    /// The hour component may be one or more digits and may exceed 23.
    pub fn from_gtfs(s: &str, service_date: NaiveDate) -> Result<Self, TimeError> {
        let mut parts = s.trim().split(':');
        let (Some(h), Some(m), Some(sec), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(TimeError::new("expected HH:MM:SS format"));
        };

        let hours = parse_digits(h).ok_or_else(|| TimeError::new("invalid hour digits"))?;
        let minutes = parse_digits(m).ok_or_else(|| TimeError::new("invalid minute digits"))?;
        let seconds = parse_digits(sec).ok_or_else(|| TimeError::new("invalid second digits"))?;
        if m.len() != 2 || sec.len() != 2 {
            return Err(TimeError::new("minutes and seconds must be two digits"));
        }
        if minutes > 59 || seconds > 59 {
            return Err(TimeError::new("minute and second must be 0-59"));
        }

        let offset = Duration::hours(i64::from(hours))
            + Duration::minutes(i64::from(minutes))
            + Duration::seconds(i64::from(seconds));
        let dt = service_date
            .and_time(NaiveTime::MIN)
            .checked_add_signed(offset)
            .ok_or_else(|| TimeError::new("time overflow"))?;

        Ok(Self::from_datetime(dt))
    }

    /// Parse a time from "HH:MM" format with a given date.
    pub fn parse_hhmm(s: &str, date: NaiveDate) -> Result<Self, TimeError> {
        if s.len() != 5 || s.as_bytes()[2] != b':' {
            return Err(TimeError::new("expected HH:MM format"));
        }
        let time = NaiveTime::parse_from_str(s, "%H:%M")
            .map_err(|_| TimeError::new("invalid time of day"))?;
        Ok(Self { date, time })
    }

    /// Returns the date component.
    pub fn date(&self) -> NaiveDate {
        self.date
    }

    /// Returns the time component.
    pub fn time(&self) -> NaiveTime {
        self.time
    }

    /// Returns the hour (0-23).
    pub fn hour(&self) -> u32 {
        self.time.hour()
    }

    /// Returns the minute (0-59).
    pub fn minute(&self) -> u32 {
        self.time.minute()
    }

    /// Converts to a NaiveDateTime.
    pub fn to_datetime(&self) -> NaiveDateTime {
        self.date.and_time(self.time)
    }

    /// Add a duration to this time, advancing the date past midnight.
    pub fn checked_add(&self, duration: Duration) -> Option<Self> {
        self.to_datetime()
            .checked_add_signed(duration)
            .map(Self::from_datetime)
    }

    /// Subtract a duration from this time.
    pub fn checked_sub(&self, duration: Duration) -> Option<Self> {
        self.to_datetime()
            .checked_sub_signed(duration)
            .map(Self::from_datetime)
    }

    /// Returns the duration between two times.
    ///
    /// Returns a negative duration if `other` is after `self`.
    pub fn signed_duration_since(&self, other: Self) -> Duration {
        self.to_datetime()
            .signed_duration_since(other.to_datetime())
    }
}

impl Ord for RailTime {
    fn cmp(&self, other: &Self) -> Ordering {
        self.to_datetime().cmp(&other.to_datetime())
    }
}

impl PartialOrd for RailTime {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Debug for RailTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "RailTime({} {:02}:{:02}:{:02})",
            self.date,
            self.hour(),
            self.minute(),
            self.time.second()
        )
    }
}

impl fmt::Display for RailTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour(), self.minute())
    }
}

/// Parse a non-empty run of ASCII digits.
fn parse_digits(s: &str) -> Option<u32> {
    if s.is_empty() || s.len() > 3 || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}
