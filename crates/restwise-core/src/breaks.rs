//! Recovery break suggestions for one day.
//!
//! Two independent passes over the day's load blocks:
//!
//! - **Mid-block**: long blocks get a short pause centred on their midpoint.
//! - **Gap**: a usable gap between two blocks gets a break sized by how much
//!   continuous load precedes it, starting a few minutes after the earlier
//!   block ends.
//!
//! The passes do not see each other's output and suggestions are not
//! deduplicated. Everything is dated to the day being planned.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::analysis::{continuous_load_ending_at, gap_minutes, load_blocks};
use crate::interval::{ActivityBlock, ActivityKind, TimeOfDay};

/// Blocks at least this long get a mid-block pause.
pub const MID_BLOCK_MIN_MINUTES: i64 = 90;
/// Blocks at least this long get the longer mid-block pause.
pub const LONG_BLOCK_MINUTES: i64 = 150;
/// Gaps (minutes) eligible for a gap break, inclusive on both ends.
pub const GAP_BREAK_RANGE: std::ops::RangeInclusive<i64> = 15..=120;
/// Gap breaks start this many minutes after the previous block ends.
pub const GAP_BREAK_OFFSET: i64 = 5;
/// Shorter breaks are not worth suggesting.
pub const MIN_BREAK_MINUTES: i64 = 10;

pub const RECHARGE_TITLE: &str = "Recharge Break";
pub const STRETCH_TITLE: &str = "Quick Stretch";
pub const SHORT_TITLE: &str = "Short Break";

/// A proposed break, always pinned to a single date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuggestedBreak {
    pub title: String,
    pub kind: ActivityKind,
    pub start: TimeOfDay,
    pub end: TimeOfDay,
    pub date: NaiveDate,
}

impl SuggestedBreak {
    fn new(title: &str, start: TimeOfDay, minutes: i64, date: NaiveDate) -> Self {
        Self {
            title: title.to_string(),
            kind: ActivityKind::Break,
            start,
            end: start.add_minutes(minutes),
            date,
        }
    }

    pub fn duration_minutes(&self) -> i64 {
        crate::interval::minutes_between(self.start, self.end)
    }

    /// Convert an accepted suggestion into a dated timetable block.
    pub fn into_block(self) -> ActivityBlock {
        ActivityBlock::dated(self.title, ActivityKind::Break, self.start, self.end, self.date)
    }
}

/// Plans breaks for a single resolved day.
#[derive(Debug, Clone, Copy)]
pub struct BreakPlanner {
    date: NaiveDate,
}

impl BreakPlanner {
    pub fn new(date: NaiveDate) -> Self {
        Self { date }
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    /// Suggest breaks for blocks already resolved to this planner's date.
    ///
    /// Break blocks and empty blocks in the input are ignored. Mid-block
    /// suggestions come first, then gap suggestions, each in start order.
    pub fn plan(&self, blocks: &[ActivityBlock]) -> Vec<SuggestedBreak> {
        let sorted = load_blocks(blocks);
        let mut suggestions = self.mid_block_breaks(&sorted);
        suggestions.extend(self.gap_breaks(&sorted));
        tracing::debug!(
            date = %self.date,
            blocks = sorted.len(),
            suggestions = suggestions.len(),
            "planned breaks"
        );
        suggestions
    }

    fn mid_block_breaks(&self, sorted: &[&ActivityBlock]) -> Vec<SuggestedBreak> {
        sorted
            .iter()
            .filter(|b| b.duration_minutes() >= MID_BLOCK_MIN_MINUTES)
            .map(|b| {
                let duration = b.duration_minutes();
                let (length, title) = if duration >= LONG_BLOCK_MINUTES {
                    (15, RECHARGE_TITLE)
                } else {
                    (10, STRETCH_TITLE)
                };
                let start = b.start.add_minutes(centred_offset(duration, length));
                SuggestedBreak::new(title, start, length, self.date)
            })
            .collect()
    }

    fn gap_breaks(&self, sorted: &[&ActivityBlock]) -> Vec<SuggestedBreak> {
        let mut breaks = Vec::new();
        for i in 1..sorted.len() {
            let (prev, next) = (sorted[i - 1], sorted[i]);
            let gap = gap_minutes(prev, next);
            if !GAP_BREAK_RANGE.contains(&gap) {
                continue;
            }

            let load = continuous_load_ending_at(sorted, i - 1);
            let length = gap_break_length(load, gap);
            if length < MIN_BREAK_MINUTES {
                continue;
            }

            let title = if load >= 120 { RECHARGE_TITLE } else { SHORT_TITLE };
            breaks.push(SuggestedBreak::new(
                title,
                prev.end.add_minutes(GAP_BREAK_OFFSET),
                length,
                self.date,
            ));
        }
        breaks
    }
}

/// Minutes from a block's start to a break of `length` centred inside it.
///
/// Whole minutes only: when block and break lengths differ by an odd number
/// of minutes, the break sits half a minute early, rounded toward the
/// block's start.
pub fn centred_offset(block_minutes: i64, length: i64) -> i64 {
    (block_minutes - length).div_euclid(2)
}

/// Break length for a gap of `gap` minutes after `load` minutes of
/// continuous work.
pub fn gap_break_length(load: i64, gap: i64) -> i64 {
    if load >= 120 {
        25_i64.min(gap * 6 / 10)
    } else if load >= 60 {
        15_i64.min(gap / 2)
    } else {
        10
    }
}

/// Resolve the timetable for `date` and plan breaks for it.
pub fn plan_breaks_for_date(blocks: &[ActivityBlock], date: NaiveDate) -> Vec<SuggestedBreak> {
    let resolved = crate::interval::resolve_for_date(blocks, date);
    BreakPlanner::new(date).plan(&resolved)
}
