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
use std::error::Error;
use std::path::Path;

use tracing::{error, info, span, warn, Level};

use crate::config::Configuration;
use crate::extract::Extractor;
use crate::project::Project;
use crate::sfz::{self, Region};
use crate::util;

/// The default format of sliced samples.
pub const DEFAULT_EXTENSION: &str = "flac";

/// How slicing is carried out.
#[derive(Clone, Debug)]
pub struct SliceOptions {
    /// The extension of the sliced samples, which picks their format.
    pub extension: String,
    /// Leave samples that couldn't be extracted out of the instrument. When false the region
    /// stays, pointing at a file that may be missing.
    pub omit_failed: bool,
}

impl Default for SliceOptions {
    fn default() -> Self {
        SliceOptions {
            extension: DEFAULT_EXTENSION.to_string(),
            omit_failed: false,
        }
    }
}

/// A sample that couldn't be extracted.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Failure {
    pub sample_name: String,
    pub message: String,
}

/// The outcome of slicing a recording.
#[derive(Clone, Debug)]
pub struct SliceReport {
    /// The regions of the instrument, in the order of the configuration.
    pub regions: Vec<Region>,
    /// The samples whose extraction failed.
    pub failures: Vec<Failure>,
}

impl SliceReport {
    /// Renders the instrument definition for the regions.
    pub fn document(&self) -> String {
        sfz::render(&self.regions)
    }
}

/// Cuts every planned sample out of the recording, one after the other. A failed extraction is
/// logged and slicing carries on with the next sample.
pub fn slice(
    configuration: &Configuration,
    recording: &Path,
    samples_dir: &Path,
    extractor: &dyn Extractor,
    options: &SliceOptions,
) -> SliceReport {
    let total = configuration.samples.len();
    let mut regions = Vec::with_capacity(total);
    let mut failures = Vec::new();

    for (index, sample) in configuration.samples.iter().enumerate() {
        let region = Region::from_sample(sample, &options.extension);
        let output = samples_dir.join(&region.sample_path);
        info!(
            progress = format!("{:.1}%", (index + 1) as f64 / total as f64 * 100.0),
            sample = sample.sample_name,
            start = sample.time_start,
            duration = sample.duration(),
            "Extracting sample."
        );

        match extractor.extract(recording, sample.time_start, sample.duration(), &output) {
            Ok(()) => regions.push(region),
            Err(e) => {
                error!(
                    sample = sample.sample_name,
                    err = %e,
                    "Error while extracting sample"
                );
                failures.push(Failure {
                    sample_name: sample.sample_name.clone(),
                    message: e.to_string(),
                });
                if !options.omit_failed {
                    regions.push(region);
                }
            }
        }
    }

    SliceReport { regions, failures }
}

/// Slices the project's recording and writes its instrument definition.
pub fn run(
    project: &Project,
    extractor: &dyn Extractor,
    options: &SliceOptions,
) -> Result<SliceReport, Box<dyn Error>> {
    let span = span!(Level::INFO, "slice", project = project.name());
    let _enter = span.enter();

    // Check everything up front so that nothing is written for a project that can't be sliced.
    let recording = project.find_recording()?;
    let configuration = Configuration::load(&project.existing_configuration()?)?;
    let samples_dir = project.create_samples_dir()?;
    info!(
        recording = util::filename_display(&recording),
        samples = configuration.samples.len(),
        extractor = %extractor,
        "Slicing recording."
    );

    let report = slice(&configuration, &recording, &samples_dir, extractor, options);

    let sfz_path = project.sfz_path();
    util::write_atomically(&sfz_path, report.document().as_bytes())?;
    info!(
        file = util::filename_display(&sfz_path),
        regions = report.regions.len(),
        "Saved instrument."
    );
    if !report.failures.is_empty() {
        warn!(
            failures = report.failures.len(),
            omitted = options.omit_failed,
            "Some samples could not be extracted."
        );
    }

    Ok(report)
}

#[cfg(test)]
mod test {
    use std::error::Error;
    use std::fs;
    use std::path::Path;

    use hound::{SampleFormat, WavSpec, WavWriter};

    use super::*;
    use crate::config::PlanParameters;
    use crate::extract::test::Extractor;
    use crate::planner;
    use crate::project::ProjectError;

    fn two_sample_configuration() -> Result<Configuration, Box<dyn Error>> {
        Ok(planner::plan(PlanParameters {
            note_min: 60,
            note_max: 72,
            note_layers: 1,
            velocity_layers: 2,
            velocity_shift: 50,
            time_sustain: 2,
            time_release: 1,
        })?
        .configuration)
    }

    /// Writes a short silent recording.
    fn write_recording(path: &Path) -> Result<(), Box<dyn Error>> {
        let spec = WavSpec {
            channels: 1,
            sample_rate: 8000,
            bits_per_sample: 16,
            sample_format: SampleFormat::Int,
        };
        let mut writer = WavWriter::create(path, spec)?;
        for _ in 0..8000 * 7 {
            writer.write_sample(0i16)?;
        }
        writer.finalize()?;
        Ok(())
    }

    #[test]
    fn two_samples() -> Result<(), Box<dyn Error>> {
        let dir = tempfile::tempdir()?;
        let configuration = two_sample_configuration()?;
        assert_eq!(2, configuration.samples.len());

        let extractor = Extractor::default();
        let report = slice(
            &configuration,
            Path::new("recording.wav"),
            dir.path(),
            &extractor,
            &SliceOptions::default(),
        );

        let extractions = extractor.extractions();
        assert_eq!(2, extractions.len());
        assert_eq!(1.0, extractions[0].start);
        assert_eq!(3.0, extractions[0].duration);
        assert_eq!(4.0, extractions[1].start);
        assert!(extractions[0].start + extractions[0].duration <= extractions[1].start);
        assert_eq!(dir.path().join("F#4v31.flac"), extractions[0].output);
        assert_eq!(dir.path().join("F#4v94.flac"), extractions[1].output);

        assert!(report.failures.is_empty());
        let document = report.document();
        let regions: Vec<&str> = document
            .lines()
            .filter(|line| line.starts_with("<region>"))
            .collect();
        assert_eq!(
            vec![
                "<region> sample=F#4v31.flac key=66 lokey=0 hikey=127 lovel=0 hivel=62",
                "<region> sample=F#4v94.flac key=66 lokey=0 hikey=127 lovel=63 hivel=127",
            ],
            regions
        );
        for region in report.regions.iter() {
            assert!(region.keys.first <= region.keys.last);
            assert!(region.velocities.first <= region.velocities.last);
        }
        Ok(())
    }

    #[test]
    fn failures_keep_their_region_by_default() -> Result<(), Box<dyn Error>> {
        let dir = tempfile::tempdir()?;
        let configuration = two_sample_configuration()?;

        let extractor = Extractor::failing(&["F#4v31.flac"]);
        let report = slice(
            &configuration,
            Path::new("recording.wav"),
            dir.path(),
            &extractor,
            &SliceOptions::default(),
        );

        // The batch carries on after the failure.
        assert_eq!(2, extractor.extractions().len());
        assert_eq!(1, report.failures.len());
        assert_eq!("F#4v31", report.failures[0].sample_name);
        assert!(report.failures[0].message.contains("Invalid argument"));
        assert_eq!(2, report.regions.len());
        assert!(!dir.path().join("F#4v31.flac").exists());
        Ok(())
    }

    #[test]
    fn failures_can_be_omitted() -> Result<(), Box<dyn Error>> {
        let dir = tempfile::tempdir()?;
        let configuration = two_sample_configuration()?;

        let extractor = Extractor::failing(&["F#4v31.flac"]);
        let report = slice(
            &configuration,
            Path::new("recording.wav"),
            dir.path(),
            &extractor,
            &SliceOptions {
                omit_failed: true,
                ..Default::default()
            },
        );

        assert_eq!(1, report.failures.len());
        assert_eq!(1, report.regions.len());
        assert_eq!("F#4v94.flac", report.regions[0].sample_path);
        Ok(())
    }

    #[test]
    fn run_writes_instrument() -> Result<(), Box<dyn Error>> {
        let dir = tempfile::tempdir()?;
        let project = Project::create(dir.path(), "keys")?;
        planner::run(
            &project,
            PlanParameters {
                note_min: 60,
                note_max: 72,
                note_layers: 1,
                velocity_layers: 2,
                velocity_shift: 50,
                time_sustain: 2,
                time_release: 1,
            },
        )?;
        write_recording(&project.path().join("recording.wav"))?;

        let extractor = Extractor::default();
        let report = run(
            &project,
            &extractor,
            &SliceOptions {
                extension: "wav".to_string(),
                omit_failed: false,
            },
        )?;

        assert_eq!(2, report.regions.len());
        assert_eq!(
            project.path().join("recording.wav"),
            extractor.extractions()[0].input
        );
        assert!(project.samples_dir().join("F#4v31.wav").is_file());
        assert!(project.samples_dir().join("F#4v94.wav").is_file());

        let document = fs::read_to_string(project.sfz_path())?;
        assert_eq!(report.document(), document);
        assert!(document.contains("sample=F#4v94.wav"));
        Ok(())
    }

    #[test]
    fn run_checks_preconditions_first() -> Result<(), Box<dyn Error>> {
        let dir = tempfile::tempdir()?;
        let project = Project::create(dir.path(), "keys")?;
        let extractor = Extractor::default();

        let err = run(&project, &extractor, &SliceOptions::default())
            .err()
            .ok_or("expected slicing to fail without a recording")?;
        assert!(matches!(
            err.downcast_ref::<ProjectError>(),
            Some(ProjectError::NoRecording(_))
        ));

        write_recording(&project.path().join("recording.wav"))?;
        let err = run(&project, &extractor, &SliceOptions::default())
            .err()
            .ok_or("expected slicing to fail without a configuration")?;
        assert!(matches!(
            err.downcast_ref::<ProjectError>(),
            Some(ProjectError::NoConfiguration(_))
        ));

        assert!(extractor.extractions().is_empty());
        assert!(!project.samples_dir().exists());
        assert!(!project.sfz_path().exists());
        Ok(())
    }
}
