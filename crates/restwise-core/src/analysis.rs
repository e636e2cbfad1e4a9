//! Daily load analysis.
//!
//! Reduces one resolved day to three numbers: committed minutes, the longest
//! effectively-continuous run of work, and whether anything runs late into
//! the evening. Blocks separated by less than [`STREAK_GAP_TOLERANCE`]
//! minutes count as one run, since a short gap is not real recovery.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::interval::{resolve_for_date, ActivityBlock};

/// Gaps shorter than this (minutes) do not break a continuous-load streak.
pub const STREAK_GAP_TOLERANCE: i64 = 30;

/// Blocks ending at or after this hour mark the day as running late.
pub const LATE_HOUR: u32 = 22;

/// Load summary for one civil day.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayAnalysis {
    pub total_minutes: i64,
    pub max_continuous_minutes: i64,
    pub has_late_block: bool,
}

impl DayAnalysis {
    pub fn total_hours(&self) -> f64 {
        self.total_minutes as f64 / 60.0
    }

    pub fn is_empty(&self) -> bool {
        self.total_minutes == 0
    }
}

/// Non-break blocks with a positive duration, sorted by start time.
///
/// Both the analyzer and the break planner work on this view of a day.
pub fn load_blocks(blocks: &[ActivityBlock]) -> Vec<&ActivityBlock> {
    let mut load: Vec<&ActivityBlock> = blocks
        .iter()
        .filter(|b| !b.is_break() && b.duration_minutes() > 0)
        .collect();
    load.sort_by_key(|b| (b.start, b.end));
    load
}

/// Gap in minutes from the end of `prev` to the start of `next`.
///
/// Negative when the blocks overlap.
pub(crate) fn gap_minutes(prev: &ActivityBlock, next: &ActivityBlock) -> i64 {
    next.start.minutes_of_day() - prev.end.minutes_of_day()
}

/// Continuous load of the streak that ends with `sorted[index]`.
///
/// Walks backward while the gap to the preceding block stays under the
/// streak tolerance.
pub fn continuous_load_ending_at(sorted: &[&ActivityBlock], index: usize) -> i64 {
    let Some(last) = sorted.get(index) else {
        return 0;
    };
    let mut load = last.duration_minutes();
    let mut j = index;
    while j > 0 && gap_minutes(sorted[j - 1], sorted[j]) < STREAK_GAP_TOLERANCE {
        load += sorted[j - 1].duration_minutes();
        j -= 1;
    }
    load
}

/// Analyze blocks already resolved to a single day.
///
/// Break blocks are ignored, as are blocks whose end is not after their start.
pub fn analyze_day(blocks: &[ActivityBlock]) -> DayAnalysis {
    let load = load_blocks(blocks);
    if load.is_empty() {
        return DayAnalysis::default();
    }

    let total_minutes: i64 = load.iter().map(|b| b.duration_minutes()).sum();

    let mut max_continuous: i64 = 0;
    let mut streak = load[0].duration_minutes();
    for pair in load.windows(2) {
        let (prev, current) = (pair[0], pair[1]);
        if gap_minutes(prev, current) < STREAK_GAP_TOLERANCE {
            streak += current.duration_minutes();
        } else {
            max_continuous = max_continuous.max(streak);
            streak = current.duration_minutes();
        }
    }
    max_continuous = max_continuous.max(streak);

    let has_late_block = load.iter().any(|b| b.end.hour() >= LATE_HOUR);

    let analysis = DayAnalysis {
        total_minutes,
        max_continuous_minutes: max_continuous,
        has_late_block,
    };
    tracing::debug!(
        blocks = load.len(),
        total_minutes = analysis.total_minutes,
        max_continuous_minutes = analysis.max_continuous_minutes,
        has_late_block = analysis.has_late_block,
        "analyzed day"
    );
    analysis
}

/// Resolve the timetable for `date`, then analyze it.
pub fn analyze_for_date(blocks: &[ActivityBlock], date: NaiveDate) -> DayAnalysis {
    analyze_day(&resolve_for_date(blocks, date))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interval::{ActivityKind, TimeOfDay};
    use chrono::Weekday;

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 19).unwrap()
    }

    fn block(kind: ActivityKind, start: &str, end: &str) -> ActivityBlock {
        ActivityBlock::dated(
            "Block",
            kind,
            start.parse::<TimeOfDay>().unwrap(),
            end.parse::<TimeOfDay>().unwrap(),
            day(),
        )
    }

    #[test]
    fn test_empty_day() {
        assert_eq!(analyze_day(&[]), DayAnalysis::default());
        let only_breaks = vec![block(ActivityKind::Break, "10:00", "10:15")];
        assert!(analyze_day(&only_breaks).is_empty());
    }

    #[test]
    fn test_short_gap_merges_streak() {
        let blocks = vec![
            block(ActivityKind::Class, "09:00", "11:00"),
            block(ActivityKind::Study, "11:10", "13:00"),
        ];
        let a = analyze_day(&blocks);
        assert_eq!(a.total_minutes, 230);
        assert_eq!(a.max_continuous_minutes, 230);
        assert!(!a.has_late_block);
    }

    #[test]
    fn test_gap_of_thirty_breaks_streak() {
        let blocks = vec![
            block(ActivityKind::Work, "09:00", "10:00"),
            block(ActivityKind::Work, "10:30", "12:00"),
            block(ActivityKind::Work, "12:10", "12:40"),
        ];
        let a = analyze_day(&blocks);
        assert_eq!(a.total_minutes, 180);
        assert_eq!(a.max_continuous_minutes, 120);
    }

    #[test]
    fn test_unsorted_input_is_sorted_first() {
        let blocks = vec![
            block(ActivityKind::Work, "13:00", "14:00"),
            block(ActivityKind::Work, "09:00", "10:00"),
            block(ActivityKind::Work, "10:15", "11:00"),
        ];
        assert_eq!(analyze_day(&blocks).max_continuous_minutes, 105);
    }

    #[test]
    fn test_breaks_do_not_bridge_or_count() {
        let blocks = vec![
            block(ActivityKind::Work, "09:00", "10:00"),
            block(ActivityKind::Break, "10:00", "10:45"),
            block(ActivityKind::Work, "10:45", "11:30"),
        ];
        let a = analyze_day(&blocks);
        assert_eq!(a.total_minutes, 105);
        assert_eq!(a.max_continuous_minutes, 60);
    }

    #[test]
    fn test_inverted_blocks_contribute_nothing() {
        let blocks = vec![
            block(ActivityKind::Work, "09:00", "10:00"),
            block(ActivityKind::Work, "12:00", "11:00"),
            block(ActivityKind::Work, "10:10", "10:10"),
        ];
        let a = analyze_day(&blocks);
        assert_eq!(a.total_minutes, 60);
        assert_eq!(a.max_continuous_minutes, 60);
    }

    #[test]
    fn test_late_block_flag() {
        let late = vec![block(ActivityKind::Study, "21:00", "22:00")];
        assert!(analyze_day(&late).has_late_block);
        let early = vec![block(ActivityKind::Study, "20:00", "21:59")];
        assert!(!analyze_day(&early).has_late_block);
        let late_break = vec![block(ActivityKind::Break, "22:00", "22:30")];
        assert!(!analyze_day(&late_break).has_late_block);
    }

    #[test]
    fn test_continuous_load_ending_at() {
        let blocks = vec![
            block(ActivityKind::Work, "08:00", "09:00"),
            block(ActivityKind::Work, "09:40", "10:40"),
            block(ActivityKind::Work, "10:50", "11:20"),
        ];
        let sorted = load_blocks(&blocks);
        assert_eq!(continuous_load_ending_at(&sorted, 0), 60);
        assert_eq!(continuous_load_ending_at(&sorted, 1), 60);
        assert_eq!(continuous_load_ending_at(&sorted, 2), 90);
        assert_eq!(continuous_load_ending_at(&sorted, 9), 0);
    }

    #[test]
    fn test_analyze_for_date_resolves_recurring() {
        let blocks = vec![
            ActivityBlock::recurring(
                "Lecture",
                ActivityKind::Class,
                "09:00".parse().unwrap(),
                "12:00".parse().unwrap(),
                Weekday::Mon,
                None,
            ),
            ActivityBlock::recurring(
                "Seminar",
                ActivityKind::Class,
                "09:00".parse().unwrap(),
                "12:00".parse().unwrap(),
                Weekday::Tue,
                None,
            ),
        ];
        let a = analyze_for_date(&blocks, day());
        assert_eq!(a.total_minutes, 180);
    }
}
