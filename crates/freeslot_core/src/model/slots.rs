//! Fixed 24-slot hourly availability grid.
//!
//! Index `i` covers `[i:00, i:59]`. The array length is part of the type, so
//! no grid of any other length can be constructed.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Number of hourly slots in one day.
pub const HOURS_PER_DAY: usize = 24;

/// Hour index outside `0..HOURS_PER_DAY`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidHour(pub usize);

impl Display for InvalidHour {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "hour index {} is out of range 0..{}",
            self.0, HOURS_PER_DAY
        )
    }
}

impl Error for InvalidHour {}

/// Returns `Ok(hour)` when `hour` addresses a slot.
pub fn check_hour(hour: usize) -> Result<usize, InvalidHour> {
    if hour < HOURS_PER_DAY {
        Ok(hour)
    } else {
        Err(InvalidHour(hour))
    }
}

/// One participant's availability for each hour of the day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SlotGrid([bool; HOURS_PER_DAY]);

impl Default for SlotGrid {
    fn default() -> Self {
        Self::empty()
    }
}

impl SlotGrid {
    /// All hours unavailable.
    pub const fn empty() -> Self {
        Self([false; HOURS_PER_DAY])
    }

    /// All hours available.
    pub const fn full() -> Self {
        Self([true; HOURS_PER_DAY])
    }

    pub const fn from_array(slots: [bool; HOURS_PER_DAY]) -> Self {
        Self(slots)
    }

    /// Builds a grid with the given hours set; out-of-range hours are rejected.
    pub fn from_hours(hours: impl IntoIterator<Item = usize>) -> Result<Self, InvalidHour> {
        let mut grid = Self::empty();
        for hour in hours {
            grid.0[check_hour(hour)?] = true;
        }
        Ok(grid)
    }

    pub fn get(&self, hour: usize) -> Option<bool> {
        self.0.get(hour).copied()
    }

    /// Sets one hour.
    pub fn set(&mut self, hour: usize, available: bool) -> Result<(), InvalidHour> {
        self.0[check_hour(hour)?] = available;
        Ok(())
    }

    /// Flips one hour and returns its new value.
    pub fn toggle(&mut self, hour: usize) -> Result<bool, InvalidHour> {
        let slot = &mut self.0[check_hour(hour)?];
        *slot = !*slot;
        Ok(*slot)
    }

    pub fn as_array(&self) -> &[bool; HOURS_PER_DAY] {
        &self.0
    }

    pub fn iter(&self) -> impl Iterator<Item = bool> + '_ {
        self.0.iter().copied()
    }

    /// Hours currently marked available, ascending.
    pub fn available_hours(&self) -> Vec<usize> {
        self.0
            .iter()
            .enumerate()
            .filter_map(|(hour, available)| available.then_some(hour))
            .collect()
    }

    pub fn count_available(&self) -> usize {
        self.0.iter().filter(|available| **available).count()
    }
}
