//! Common availability computation.
//!
//! # Invariants
//! - Every returned interval is maximal: every member is free for each hour
//!   inside it and at least one member is busy (or the day ends) on both sides.
//! - Intervals are ordered by increasing start hour and never overlap.
//! - Zero grids yield zero intervals.

use crate::model::slots::{SlotGrid, HOURS_PER_DAY};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Closed range of hours `[start, end]`, both inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct HourInterval {
    pub start: usize,
    pub end: usize,
}

impl HourInterval {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// A one-hour run has `start == end`.
    pub fn is_single_hour(&self) -> bool {
        self.start == self.end
    }

    pub fn len_hours(&self) -> usize {
        self.end - self.start + 1
    }

    pub fn contains(&self, hour: usize) -> bool {
        (self.start..=self.end).contains(&hour)
    }
}

impl Display for HourInterval {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:00 - {}:59", self.start, self.end)
    }
}

/// Returns the maximal runs of hours in which every grid is available.
///
/// Single scan over the day, O(grids x 24).
pub fn common_intervals<'a, I>(grids: I) -> Vec<HourInterval>
where
    I: IntoIterator<Item = &'a SlotGrid>,
{
    let grids: Vec<&SlotGrid> = grids.into_iter().collect();
    if grids.is_empty() {
        return Vec::new();
    }

    let mut intervals = Vec::new();
    let mut open_run: Option<usize> = None;
    for hour in 0..HOURS_PER_DAY {
        let everyone_free = grids.iter().all(|grid| grid.get(hour) == Some(true));
        match (everyone_free, open_run) {
            (true, None) => open_run = Some(hour),
            (false, Some(start)) => {
                intervals.push(HourInterval::new(start, hour - 1));
                open_run = None;
            }
            _ => {}
        }
    }
    if let Some(start) = open_run {
        intervals.push(HourInterval::new(start, HOURS_PER_DAY - 1));
    }
    intervals
}

/// Presentation-level view of common availability.
///
/// Separates "nobody registered yet" from "registered, but no shared hour",
/// which `common_intervals` reports identically as an empty list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "intervals", rename_all = "snake_case")]
pub enum AvailabilitySummary {
    NoMembers,
    NoCommonTime,
    Common(Vec<HourInterval>),
}

impl AvailabilitySummary {
    pub fn from_grids<'a, I>(grids: I) -> Self
    where
        I: IntoIterator<Item = &'a SlotGrid>,
    {
        let grids: Vec<&SlotGrid> = grids.into_iter().collect();
        if grids.is_empty() {
            return Self::NoMembers;
        }
        let intervals = common_intervals(grids);
        if intervals.is_empty() {
            Self::NoCommonTime
        } else {
            Self::Common(intervals)
        }
    }

    pub fn intervals(&self) -> &[HourInterval] {
        match self {
            Self::Common(intervals) => intervals,
            Self::NoMembers | Self::NoCommonTime => &[],
        }
    }
}

impl Display for AvailabilitySummary {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoMembers => write!(f, "no participants yet"),
            Self::NoCommonTime => write!(f, "no common time"),
            Self::Common(intervals) => {
                let labels: Vec<String> = intervals.iter().map(ToString::to_string).collect();
                write!(f, "common time: {}", labels.join(", "))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{common_intervals, AvailabilitySummary, HourInterval};
    use crate::model::slots::SlotGrid;

    fn grid(hours: &[usize]) -> SlotGrid {
        SlotGrid::from_hours(hours.iter().copied()).expect("hours in range")
    }

    #[test]
    fn no_members_yields_no_intervals() {
        assert!(common_intervals(std::iter::empty::<&SlotGrid>()).is_empty());
        assert_eq!(
            AvailabilitySummary::from_grids(std::iter::empty::<&SlotGrid>()),
            AvailabilitySummary::NoMembers
        );
    }

    #[test]
    fn overlapping_prefix_yields_single_hour() {
        let first = grid(&[0, 1]);
        let second = grid(&[0]);
        let intervals = common_intervals([&first, &second]);
        assert_eq!(intervals, vec![HourInterval::new(0, 0)]);
        assert!(intervals[0].is_single_hour());
    }

    #[test]
    fn all_day_availability_is_one_interval() {
        let grids = [SlotGrid::full(), SlotGrid::full(), SlotGrid::full()];
        assert_eq!(common_intervals(&grids), vec![HourInterval::new(0, 23)]);
    }

    #[test]
    fn finds_multiple_maximal_runs_in_order() {
        let first = grid(&[2, 3, 4, 5, 9, 10, 22, 23]);
        let second = grid(&[3, 4, 5, 6, 10, 11, 23]);
        assert_eq!(
            common_intervals([&first, &second]),
            vec![
                HourInterval::new(3, 5),
                HourInterval::new(10, 10),
                HourInterval::new(23, 23),
            ]
        );
    }

    #[test]
    fn member_order_does_not_matter() {
        let first = grid(&[1, 2, 3, 8]);
        let second = grid(&[2, 3, 8, 9]);
        assert_eq!(
            common_intervals([&first, &second]),
            common_intervals([&second, &first])
        );
    }

    #[test]
    fn members_without_shared_hour_report_no_common_time() {
        let first = grid(&[1]);
        let second = grid(&[2]);
        assert!(common_intervals([&first, &second]).is_empty());
        assert_eq!(
            AvailabilitySummary::from_grids([&first, &second]),
            AvailabilitySummary::NoCommonTime
        );
    }

    #[test]
    fn single_and_multi_hour_runs_format_differently() {
        let single = HourInterval::new(9, 9);
        let multi = HourInterval::new(9, 11);
        assert!(single.is_single_hour());
        assert!(!multi.is_single_hour());
        assert_eq!(single.to_string(), "9:00 - 9:59");
        assert_eq!(multi.to_string(), "9:00 - 11:59");
        assert_eq!(multi.len_hours(), 3);
    }

    #[test]
    fn summary_lists_intervals() {
        let only = grid(&[7, 8, 20]);
        let summary = AvailabilitySummary::from_grids([&only]);
        assert_eq!(summary.to_string(), "common time: 7:00 - 8:59, 20:00 - 20:59");
        assert_eq!(summary.intervals().len(), 2);
    }
}
