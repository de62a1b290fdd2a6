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
use std::path::Path;

use config::{Config, File};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::error::ConfigError;

/// 21 is A0, the lowest key on an 88 key piano.
pub const DEFAULT_NOTE_MIN: i64 = 21;

/// 108 is C8, the highest key on an 88 key piano.
pub const DEFAULT_NOTE_MAX: i64 = 108;

/// Sample one note in three by default, each sample covers its neighbours.
pub const DEFAULT_NOTES_PER_LAYER: i64 = 3;

pub const DEFAULT_VELOCITY_LAYERS: i64 = 5;

pub const DEFAULT_TIME_SUSTAIN: i64 = 20;

pub const DEFAULT_TIME_RELEASE: i64 = 5;

pub const DEFAULT_VELOCITY_SHIFT: i64 = 50;

/// Longest sustain or release, in seconds.
pub const MAX_TIME: i64 = 60;

/// Unvalidated plan parameters as they arrive from a parameters file or the command line.
/// Every field is kept as text so that garbage can fall back to a default instead of failing.
#[derive(Deserialize, Clone, Debug, Default)]
pub struct RawParameters {
    pub note_min: Option<String>,
    pub note_max: Option<String>,
    pub note_layers: Option<String>,
    pub velocity_layers: Option<String>,
    pub time_sustain: Option<String>,
    pub time_release: Option<String>,
    pub velocity_shift: Option<String>,
}

impl RawParameters {
    /// Reads raw parameters from a YAML, TOML or JSON file.
    pub fn deserialize(path: &Path) -> Result<RawParameters, ConfigError> {
        Ok(Config::builder()
            .add_source(File::from(path))
            .build()?
            .try_deserialize::<RawParameters>()?)
    }

    /// Returns these parameters with every field set in `other` replacing ours.
    pub fn overridden_by(self, other: RawParameters) -> RawParameters {
        RawParameters {
            note_min: other.note_min.or(self.note_min),
            note_max: other.note_max.or(self.note_max),
            note_layers: other.note_layers.or(self.note_layers),
            velocity_layers: other.velocity_layers.or(self.velocity_layers),
            time_sustain: other.time_sustain.or(self.time_sustain),
            time_release: other.time_release.or(self.time_release),
            velocity_shift: other.velocity_shift.or(self.velocity_shift),
        }
    }
}

/// What validation did to a raw value.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Adjustment {
    /// The requested value was in range and used as is.
    Requested,
    /// Nothing was given, the default was used.
    Empty,
    /// The value wasn't a number, the default was used.
    Invalid,
    /// The value was below the minimum and was raised to it.
    TooLow,
    /// The value was above the maximum and was lowered to it.
    TooHigh,
}

/// A validated value along with how it was arrived at.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Validated {
    pub value: i64,
    pub adjustment: Adjustment,
}

/// Validates a single bounded integer. Never fails: missing or non-numeric input yields the
/// default and out of range input is clamped.
pub fn validate(raw: Option<&str>, min: i64, max: i64, default: i64) -> Validated {
    let raw = raw.map(str::trim).unwrap_or_default();
    if raw.is_empty() {
        return Validated {
            value: default,
            adjustment: Adjustment::Empty,
        };
    }

    match raw.parse::<i64>() {
        Err(_) => Validated {
            value: default,
            adjustment: Adjustment::Invalid,
        },
        Ok(value) if value < min => Validated {
            value: min,
            adjustment: Adjustment::TooLow,
        },
        Ok(value) if value > max => Validated {
            value: max,
            adjustment: Adjustment::TooHigh,
        },
        Ok(value) => Validated {
            value,
            adjustment: Adjustment::Requested,
        },
    }
}

/// Validates one named field and logs what happened to it.
fn validate_field(name: &str, raw: Option<&str>, min: i64, max: i64, default: i64) -> i64 {
    let validated = validate(raw, min, max, default);
    match validated.adjustment {
        Adjustment::Requested => info!(
            field = name,
            value = validated.value,
            "Using requested value."
        ),
        Adjustment::Empty => info!(
            field = name,
            value = validated.value,
            "No value given, using default."
        ),
        Adjustment::Invalid => warn!(
            field = name,
            ?raw,
            value = validated.value,
            "Invalid value, using default."
        ),
        Adjustment::TooLow => warn!(
            field = name,
            ?raw,
            value = validated.value,
            "Value too low, using minimum."
        ),
        Adjustment::TooHigh => warn!(
            field = name,
            ?raw,
            value = validated.value,
            "Value too high, using maximum."
        ),
    }
    validated.value
}

/// The validated parameters of a recording plan.
#[derive(Deserialize, Serialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct PlanParameters {
    /// The lowest note to sample.
    pub note_min: u8,
    /// The highest note to sample.
    pub note_max: u8,
    /// How many notes to spread across the note range.
    pub note_layers: u32,
    /// How many velocities to spread across the velocity range.
    pub velocity_layers: u32,
    /// Where the first velocity sits within its step, as a percentage.
    pub velocity_shift: u32,
    /// How long each note is held, in seconds.
    pub time_sustain: u32,
    /// The silence after each note, in seconds.
    pub time_release: u32,
}

impl Default for PlanParameters {
    fn default() -> Self {
        PlanParameters::from_raw(&RawParameters::default())
    }
}

impl PlanParameters {
    /// Validates every field in turn. Later bounds depend on earlier values, so the note range is
    /// settled before the number of note layers.
    pub fn from_raw(raw: &RawParameters) -> PlanParameters {
        let note_min = validate_field(
            "note_min",
            raw.note_min.as_deref(),
            0,
            127,
            DEFAULT_NOTE_MIN,
        );
        let note_max = validate_field(
            "note_max",
            raw.note_max.as_deref(),
            note_min,
            127,
            DEFAULT_NOTE_MAX.max(note_min),
        );
        let width = (note_max - note_min).max(1);
        let note_layers = validate_field(
            "note_layers",
            raw.note_layers.as_deref(),
            1,
            width,
            (width / DEFAULT_NOTES_PER_LAYER).max(1),
        );
        let velocity_layers = validate_field(
            "velocity_layers",
            raw.velocity_layers.as_deref(),
            1,
            127,
            DEFAULT_VELOCITY_LAYERS,
        );
        let time_sustain = validate_field(
            "time_sustain",
            raw.time_sustain.as_deref(),
            1,
            MAX_TIME,
            DEFAULT_TIME_SUSTAIN,
        );
        let time_release = validate_field(
            "time_release",
            raw.time_release.as_deref(),
            1,
            MAX_TIME,
            DEFAULT_TIME_RELEASE,
        );
        let velocity_shift = validate_field(
            "velocity_shift",
            raw.velocity_shift.as_deref(),
            0,
            100,
            DEFAULT_VELOCITY_SHIFT,
        );

        // Every value is clamped to a range that fits its target type.
        PlanParameters {
            note_min: note_min as u8,
            note_max: note_max as u8,
            note_layers: note_layers as u32,
            velocity_layers: velocity_layers as u32,
            velocity_shift: velocity_shift as u32,
            time_sustain: time_sustain as u32,
            time_release: time_release as u32,
        }
    }
}

#[cfg(test)]
mod test {
    use std::error::Error;
    use std::fs;

    use super::*;

    fn raw(value: &str) -> Option<String> {
        Some(value.to_string())
    }

    #[test]
    fn validate_bounded_integers() {
        assert_eq!(
            Validated { value: 7, adjustment: Adjustment::Empty },
            validate(None, 1, 10, 7)
        );
        assert_eq!(
            Validated { value: 7, adjustment: Adjustment::Empty },
            validate(Some("  "), 1, 10, 7)
        );
        assert_eq!(
            Validated { value: 7, adjustment: Adjustment::Invalid },
            validate(Some("seven"), 1, 10, 7)
        );
        assert_eq!(
            Validated { value: 1, adjustment: Adjustment::TooLow },
            validate(Some("-3"), 1, 10, 7)
        );
        assert_eq!(
            Validated { value: 10, adjustment: Adjustment::TooHigh },
            validate(Some("200"), 1, 10, 7)
        );
        assert_eq!(
            Validated { value: 4, adjustment: Adjustment::Requested },
            validate(Some(" 4 "), 1, 10, 7)
        );
    }

    #[test]
    fn defaults() {
        assert_eq!(
            PlanParameters {
                note_min: 21,
                note_max: 108,
                note_layers: 29,
                velocity_layers: 5,
                velocity_shift: 50,
                time_sustain: 20,
                time_release: 5,
            },
            PlanParameters::default()
        );
    }

    #[test]
    fn later_bounds_follow_earlier_values() {
        let parameters = PlanParameters::from_raw(&RawParameters {
            note_min: raw("60"),
            note_max: raw("40"),
            note_layers: raw("9"),
            ..Default::default()
        });
        assert_eq!(60, parameters.note_min);
        // Raised to note_min.
        assert_eq!(60, parameters.note_max);
        // A single note still gets one layer.
        assert_eq!(1, parameters.note_layers);

        let parameters = PlanParameters::from_raw(&RawParameters {
            note_min: raw("60"),
            note_max: raw("72"),
            note_layers: raw("50"),
            ..Default::default()
        });
        assert_eq!(12, parameters.note_layers);
    }

    #[test]
    fn default_note_max_follows_high_note_min() {
        let parameters = PlanParameters::from_raw(&RawParameters {
            note_min: raw("120"),
            ..Default::default()
        });
        assert_eq!(120, parameters.note_min);
        assert_eq!(120, parameters.note_max);
    }

    #[test]
    fn overrides() {
        let file = RawParameters {
            note_min: raw("30"),
            velocity_layers: raw("3"),
            ..Default::default()
        };
        let cli = RawParameters {
            velocity_layers: raw("8"),
            ..Default::default()
        };
        let merged = file.overridden_by(cli);
        assert_eq!(raw("30"), merged.note_min);
        assert_eq!(raw("8"), merged.velocity_layers);
        assert_eq!(None, merged.time_release);
    }

    #[test]
    fn parameters_from_yaml() -> Result<(), Box<dyn Error>> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("parameters.yaml");
        fs::write(
            &path,
            "note_min: 48\nnote_max: 72\nnote_layers: 8\nvelocity_shift: nope\n",
        )?;

        let parameters = PlanParameters::from_raw(&RawParameters::deserialize(&path)?);
        assert_eq!(48, parameters.note_min);
        assert_eq!(72, parameters.note_max);
        assert_eq!(8, parameters.note_layers);
        assert_eq!(DEFAULT_VELOCITY_SHIFT as u32, parameters.velocity_shift);
        Ok(())
    }
}
