//! Activity blocks and time-of-day interval arithmetic.
//!
//! A timetable is a flat list of [`ActivityBlock`]s. Each block is either
//! pinned to one civil date or repeats weekly on a weekday, optionally up to
//! an inclusive end date. [`resolve_for_date`] turns that list into the
//! blocks that actually happen on a given day; everything downstream only
//! ever sees one resolved day.

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::ValidationError;

const MINUTES_PER_DAY: i64 = 24 * 60;

/// Wall-clock time within a civil day, minute precision, no timezone.
///
/// Serialized as `"HH:MM"`. Deserialization is lenient: a malformed hour or
/// minute component reads as `0`, and a `null` or non-string value reads as
/// midnight, rather than failing the whole timetable.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(into = "String")]
pub struct TimeOfDay {
    minutes: u16,
}

impl TimeOfDay {
    pub const MIDNIGHT: TimeOfDay = TimeOfDay { minutes: 0 };

    /// Create a time from hour and minute, `None` if out of range.
    pub fn new(hour: u32, minute: u32) -> Option<Self> {
        if hour > 23 || minute > 59 {
            return None;
        }
        Some(Self {
            minutes: (hour * 60 + minute) as u16,
        })
    }

    /// Create a time from minutes since midnight, clamped into the day.
    pub fn from_minutes(minutes: i64) -> Self {
        Self {
            minutes: minutes.clamp(0, MINUTES_PER_DAY - 1) as u16,
        }
    }

    pub fn hour(&self) -> u32 {
        u32::from(self.minutes / 60)
    }

    pub fn minute(&self) -> u32 {
        u32::from(self.minutes % 60)
    }

    /// Minutes since midnight.
    pub fn minutes_of_day(&self) -> i64 {
        i64::from(self.minutes)
    }

    /// Shift by a number of minutes, clamped to the same civil day.
    pub fn add_minutes(self, minutes: i64) -> Self {
        Self::from_minutes(self.minutes_of_day() + minutes)
    }

    /// Parse `HH:MM`, treating any unparseable or out-of-range component as 0.
    pub fn parse_lenient(s: &str) -> Self {
        let mut parts = s.trim().splitn(2, ':');
        let hour = parts
            .next()
            .and_then(|h| h.trim().parse::<u32>().ok())
            .filter(|h| *h <= 23)
            .unwrap_or(0);
        let minute = parts
            .next()
            .and_then(|m| m.trim().parse::<u32>().ok())
            .filter(|m| *m <= 59)
            .unwrap_or(0);
        Self {
            minutes: (hour * 60 + minute) as u16,
        }
    }
}

impl FromStr for TimeOfDay {
    type Err = ValidationError;

    /// Strict `HH:MM` parsing, used for user-entered values.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ValidationError::InvalidTime(s.to_string());
        let (h, m) = s.trim().split_once(':').ok_or_else(invalid)?;
        let hour = h.parse::<u32>().map_err(|_| invalid())?;
        let minute = m.parse::<u32>().map_err(|_| invalid())?;
        TimeOfDay::new(hour, minute).ok_or_else(invalid)
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour(), self.minute())
    }
}

impl From<TimeOfDay> for String {
    fn from(t: TimeOfDay) -> Self {
        t.to_string()
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawTime {
    Text(String),
    Other(serde::de::IgnoredAny),
}

impl<'de> Deserialize<'de> for TimeOfDay {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(match RawTime::deserialize(deserializer)? {
            RawTime::Text(s) => TimeOfDay::parse_lenient(&s),
            RawTime::Other(_) => TimeOfDay::MIDNIGHT,
        })
    }
}

/// What kind of commitment a block represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityKind {
    Class,
    Study,
    Work,
    Break,
    #[serde(other)]
    Other,
}

impl ActivityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Class => "class",
            Self::Study => "study",
            Self::Work => "work",
            Self::Break => "break",
            Self::Other => "other",
        }
    }
}

impl fmt::Display for ActivityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// When a block happens: on exactly one date, or weekly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "repeat", rename_all = "snake_case")]
pub enum Occurrence {
    Dated {
        date: NaiveDate,
    },
    Recurring {
        weekday: Weekday,
        /// Last date (inclusive) the block still applies; open-ended if absent.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        end_date: Option<NaiveDate>,
    },
}

impl Occurrence {
    /// Whether this occurrence applies on `date`.
    pub fn applies_on(&self, date: NaiveDate) -> bool {
        match *self {
            Occurrence::Dated { date: d } => d == date,
            Occurrence::Recurring { weekday, end_date } => {
                weekday == date.weekday() && end_date.map_or(true, |end| date <= end)
            }
        }
    }
}

/// One scheduled commitment on the timetable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityBlock {
    #[serde(default)]
    pub title: String,
    pub kind: ActivityKind,
    #[serde(default)]
    pub start: TimeOfDay,
    #[serde(default)]
    pub end: TimeOfDay,
    #[serde(flatten)]
    pub occurrence: Occurrence,
}

impl ActivityBlock {
    pub fn dated(
        title: impl Into<String>,
        kind: ActivityKind,
        start: TimeOfDay,
        end: TimeOfDay,
        date: NaiveDate,
    ) -> Self {
        Self {
            title: title.into(),
            kind,
            start,
            end,
            occurrence: Occurrence::Dated { date },
        }
    }

    pub fn recurring(
        title: impl Into<String>,
        kind: ActivityKind,
        start: TimeOfDay,
        end: TimeOfDay,
        weekday: Weekday,
        end_date: Option<NaiveDate>,
    ) -> Self {
        Self {
            title: title.into(),
            kind,
            start,
            end,
            occurrence: Occurrence::Recurring { weekday, end_date },
        }
    }

    /// Duration in minutes; 0 for empty or inverted blocks.
    pub fn duration_minutes(&self) -> i64 {
        minutes_between(self.start, self.end)
    }

    pub fn is_break(&self) -> bool {
        self.kind == ActivityKind::Break
    }

    pub fn occurs_on(&self, date: NaiveDate) -> bool {
        self.occurrence.applies_on(date)
    }
}

/// Blocks from `blocks` that apply on `date`, in input order.
pub fn resolve_for_date(blocks: &[ActivityBlock], date: NaiveDate) -> Vec<ActivityBlock> {
    blocks.iter().filter(|b| b.occurs_on(date)).cloned().collect()
}

/// Half-open overlap: touching endpoints do not overlap.
pub fn overlaps(a_start: TimeOfDay, a_end: TimeOfDay, b_start: TimeOfDay, b_end: TimeOfDay) -> bool {
    a_start < b_end && b_start < a_end
}

/// Clock minutes from `start` to `end`, never negative.
pub fn minutes_between(start: TimeOfDay, end: TimeOfDay) -> i64 {
    (end.minutes_of_day() - start.minutes_of_day()).max(0)
}
