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
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use super::error::ConfigError;
use super::parameters::PlanParameters;
use crate::distribution::Interval;
use crate::util;

/// A single planned sample: one note at one velocity, and the window of the recording it lives in.
#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
pub struct SampleRecord {
    /// The name of the sample, also used for its audio file.
    pub sample_name: String,
    /// The note that was played.
    pub note_number: u8,
    /// The velocity it was played at.
    pub velocity: u8,
    /// When the note starts in the recording, in seconds.
    pub time_start: f64,
    /// When the release of the note ends in the recording, in seconds.
    pub time_end: f64,
    /// The keys this sample will answer to.
    pub note_interval: Interval,
    /// The velocities this sample will answer to.
    pub velocity_interval: Interval,
}

impl SampleRecord {
    /// The length of the window to cut out of the recording.
    pub fn duration(&self) -> f64 {
        self.time_end - self.time_start
    }
}

/// The configuration written when planning and read back when slicing. Holds everything needed to
/// slice a recording without recomputing the plan.
#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
pub struct Configuration {
    #[serde(flatten)]
    pub parameters: PlanParameters,
    pub notes_distribution: Vec<u8>,
    pub velocity_distribution: Vec<u8>,
    pub samples: Vec<SampleRecord>,
}

impl Configuration {
    /// Reads a configuration from a JSON file.
    pub fn load(path: &Path) -> Result<Configuration, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Writes the configuration to a JSON file, replacing any previous one.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let serialized = serde_json::to_string_pretty(self)?;
        util::write_atomically(path, serialized.as_bytes())?;
        info!(
            file = util::filename_display(path),
            samples = self.samples.len(),
            "Saved configuration."
        );
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use std::error::Error;
    use std::fs;

    use super::*;

    #[test]
    fn reads_configurations_with_integer_times() -> Result<(), Box<dyn Error>> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("configuration.json");
        fs::write(
            &path,
            r#"{"note_min": 60, "note_max": 72, "note_layers": 1, "velocity_layers": 1,
                "velocity_shift": 50, "time_sustain": 2, "time_release": 1,
                "notes_distribution": [66], "velocity_distribution": [63],
                "samples": [{"sample_name": "F#4v63", "note_number": 66, "velocity": 63,
                    "time_start": 1, "time_end": 4,
                    "note_interval": {"first": 0, "last": 127},
                    "velocity_interval": {"first": 0, "last": 127}}]}"#,
        )?;

        let configuration = Configuration::load(&path)?;
        assert_eq!(60, configuration.parameters.note_min);
        assert_eq!(2, configuration.parameters.time_sustain);
        assert_eq!(1, configuration.samples.len());

        let sample = &configuration.samples[0];
        assert_eq!("F#4v63", sample.sample_name);
        assert_eq!(1.0, sample.time_start);
        assert_eq!(3.0, sample.duration());
        assert_eq!(Interval::full(), sample.velocity_interval);
        Ok(())
    }

    #[test]
    fn saved_configuration_has_flat_keys() -> Result<(), Box<dyn Error>> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("configuration.json");
        let configuration = Configuration {
            parameters: PlanParameters::default(),
            notes_distribution: vec![35, 64, 93],
            velocity_distribution: vec![12, 37, 62, 88, 113],
            samples: Vec::new(),
        };
        configuration.save(&path)?;

        let value: serde_json::Value = serde_json::from_str(&fs::read_to_string(&path)?)?;
        for key in [
            "note_min",
            "note_max",
            "note_layers",
            "velocity_layers",
            "velocity_shift",
            "time_sustain",
            "time_release",
            "notes_distribution",
            "velocity_distribution",
            "samples",
        ] {
            assert!(value.get(key).is_some(), "missing key {key}");
        }
        assert_eq!(configuration, Configuration::load(&path)?);
        Ok(())
    }

    #[test]
    fn malformed_configuration() -> Result<(), Box<dyn Error>> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("configuration.json");
        fs::write(&path, "{ not json")?;

        assert!(matches!(
            Configuration::load(&path),
            Err(ConfigError::Parse { .. })
        ));
        assert!(matches!(
            Configuration::load(&dir.path().join("missing.json")),
            Err(ConfigError::Read { .. })
        ));
        Ok(())
    }
}
