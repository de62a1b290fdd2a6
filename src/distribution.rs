// Copyright (C) 2026 Michael Wilson <mike@mdwn.dev>
//
// This program is free software: you can redistribute it and/or modify it under
// the terms of the GNU General Public License as published by the Free Software
// Foundation, version 3.
//
// This program is distributed in the hope that it will be useful, but WITHOUT
// ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS
// FOR A PARTICULAR PURPOSE. See the GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License along with
// this program. If not, see <https://www.gnu.org/licenses/>.
//
use std::fmt;

use serde::{Deserialize, Serialize};

/// The lowest value on a MIDI pitch or velocity axis.
pub const MIDI_MIN: u8 = 0;

/// The highest value on a MIDI pitch or velocity axis.
pub const MIDI_MAX: u8 = 127;

/// Errors produced when a distribution can't be generated.
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum DistributionError {
    #[error("a distribution needs at least one point")]
    NoPoints,

    #[error("invalid range: min {min} is greater than max {max}")]
    InvalidRange { min: u8, max: u8 },

    #[error("{count} points don't fit between {min} and {max}")]
    TooManyPoints { min: u8, max: u8, count: u32 },
}

/// An inclusive range of MIDI values assigned to one point of a distribution.
#[derive(Deserialize, Serialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct Interval {
    pub first: u8,
    pub last: u8,
}

impl Interval {
    pub fn new(first: u8, last: u8) -> Interval {
        Interval { first, last }
    }

    /// An interval covering the whole MIDI range.
    pub fn full() -> Interval {
        Interval::new(MIDI_MIN, MIDI_MAX)
    }

    /// Returns true if the value falls inside the interval.
    pub fn contains(&self, value: u8) -> bool {
        self.first <= value && value <= self.last
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.first, self.last)
    }
}

/// Spreads `count` points evenly across `[min, max]`.
///
/// The first point sits `shift` percent of a step above `min`. Further points are added one step
/// at a time for as long as the next one still fits under `max`, so the result holds either
/// `count` or `count + 1` points. Every point is floored to an integer.
///
/// Shifts outside of 0-100 are clamped. A range with no width yields a single point at `min`.
pub fn generate_distribution(
    min: u8,
    max: u8,
    count: u32,
    shift: u32,
) -> Result<Vec<u8>, DistributionError> {
    if count == 0 {
        return Err(DistributionError::NoPoints);
    }
    if min > max {
        return Err(DistributionError::InvalidRange { min, max });
    }

    let width = u32::from(max - min);
    if width == 0 {
        return Ok(vec![min]);
    }
    // Steps narrower than one value would produce duplicate points after flooring.
    if count > width {
        return Err(DistributionError::TooManyPoints { min, max, count });
    }

    let step = f64::from(width) / f64::from(count);
    let shift = f64::from(shift.min(100));
    let max = f64::from(max);

    // The running position starts at the floored first point, not at the exact one.
    let mut position = (f64::from(min) + step * shift / 100.0).floor();
    let mut distribution = vec![position as u8];
    while (position + step).floor() <= max {
        position += step;
        distribution.push(position.floor() as u8);
    }

    Ok(distribution)
}

/// Partitions the full MIDI range into one interval per distribution point.
///
/// Boundaries sit at the floored midpoint between neighbouring points, the first interval starts
/// at 0 and the last one ends at 127. A distribution with fewer than two points maps to a single
/// interval over the whole range.
pub fn map_intervals(distribution: &[u8]) -> Vec<Interval> {
    if distribution.len() < 2 {
        return vec![Interval::full()];
    }

    let mut intervals = Vec::with_capacity(distribution.len());
    let mut first = MIDI_MIN;
    for pair in distribution.windows(2) {
        let last = ((u16::from(pair[0]) + u16::from(pair[1])) / 2) as u8;
        intervals.push(Interval::new(first, last));
        first = last.saturating_add(1);
    }
    intervals.push(Interval::new(first, MIDI_MAX));

    intervals
}

/// Returns true if the intervals are contiguous and cover exactly the full MIDI range.
pub fn covers_midi_range(intervals: &[Interval]) -> bool {
    let (Some(head), Some(tail)) = (intervals.first(), intervals.last()) else {
        return false;
    };
    if head.first != MIDI_MIN || tail.last != MIDI_MAX {
        return false;
    }

    intervals.iter().all(|interval| interval.first <= interval.last)
        && intervals
            .windows(2)
            .all(|pair| u16::from(pair[0].last) + 1 == u16::from(pair[1].first))
}
