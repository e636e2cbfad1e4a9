//! Overlap checks for a proposed block or break.
//!
//! Conflicts are reported, never enforced: the caller decides whether to
//! refuse the insertion or warn and allow it.

use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

use crate::breaks::SuggestedBreak;
use crate::error::ValidationError;
use crate::interval::{overlaps, ActivityBlock, Occurrence, TimeOfDay};

/// Anything that occupies a time interval on the timetable.
pub trait Scheduled {
    fn label(&self) -> &str;
    fn start(&self) -> TimeOfDay;
    fn end(&self) -> TimeOfDay;
    fn occurrence(&self) -> Occurrence;
}

impl Scheduled for ActivityBlock {
    fn label(&self) -> &str {
        &self.title
    }

    fn start(&self) -> TimeOfDay {
        self.start
    }

    fn end(&self) -> TimeOfDay {
        self.end
    }

    fn occurrence(&self) -> Occurrence {
        self.occurrence
    }
}

impl Scheduled for SuggestedBreak {
    fn label(&self) -> &str {
        &self.title
    }

    fn start(&self) -> TimeOfDay {
        self.start
    }

    fn end(&self) -> TimeOfDay {
        self.end
    }

    fn occurrence(&self) -> Occurrence {
        Occurrence::Dated { date: self.date }
    }
}

/// An interval someone wants to add.
///
/// With `weekday` set the proposal repeats weekly from `date` onwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProposedInterval {
    pub start: TimeOfDay,
    pub end: TimeOfDay,
    pub date: NaiveDate,
    #[serde(default)]
    pub weekday: Option<Weekday>,
}

impl ProposedInterval {
    pub fn dated(date: NaiveDate, start: TimeOfDay, end: TimeOfDay) -> Self {
        Self {
            start,
            end,
            date,
            weekday: None,
        }
    }

    /// A weekly proposal on `weekday`, first applying on `from`.
    pub fn weekly(weekday: Weekday, from: NaiveDate, start: TimeOfDay, end: TimeOfDay) -> Self {
        Self {
            start,
            end,
            date: from,
            weekday: Some(weekday),
        }
    }

    /// Reject empty or inverted intervals.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.end <= self.start {
            return Err(ValidationError::InvalidTimeRange {
                start: self.start.to_string(),
                end: self.end.to_string(),
            });
        }
        Ok(())
    }

    /// Whether a candidate with this occurrence shares a day with the proposal.
    fn shares_day_with(&self, occurrence: Occurrence) -> bool {
        let Some(weekday) = self.weekday else {
            return occurrence.applies_on(self.date);
        };
        match occurrence {
            Occurrence::Dated { date } => date >= self.date && date.weekday() == weekday,
            Occurrence::Recurring {
                weekday: other,
                end_date,
            } => other == weekday && end_date.map_or(true, |end| end >= self.date),
        }
    }
}

/// Every candidate that overlaps `proposed` on a shared day, in input order.
pub fn find_conflicts<'a, T: Scheduled>(proposed: &ProposedInterval, candidates: &'a [T]) -> Vec<&'a T> {
    candidates
        .iter()
        .filter(|c| proposed.shares_day_with(c.occurrence()))
        .filter(|c| overlaps(proposed.start, proposed.end, c.start(), c.end()))
        .collect()
}

/// Whether anything in `candidates` overlaps `proposed`.
///
/// Use [`find_conflicts`] to get the conflicting entities themselves, for
/// example to name them back to the user.
pub fn has_conflict<T: Scheduled>(proposed: &ProposedInterval, candidates: &[T]) -> bool {
    !find_conflicts(proposed, candidates).is_empty()
}
