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
use std::time::Duration;

use tracing::{info, span, Level};

use crate::config::{Configuration, PlanParameters, SampleRecord};
use crate::distribution::{self, DistributionError, MIDI_MAX, MIDI_MIN};
use crate::midi::{self, MidiError};
use crate::naming::format_sample_name;
use crate::project::Project;
use crate::util;

/// Sample notes sit in the middle of their step.
pub const NOTE_SHIFT: u32 = 50;

/// The tempo of the file before the first note, a beat is half a second.
pub const INITIAL_BPM: u32 = 120;

/// The tempo from the first note on, a beat is one second.
pub const RECORDING_BPM: u32 = 60;

const TRACK: usize = 0;
const CHANNEL: u8 = 0;

/// A tempo change on the recording timeline.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TempoChange {
    pub time: f64,
    pub bpm: u32,
}

/// A note to be played for recording.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NoteEvent {
    pub pitch: u8,
    pub velocity: u8,
    pub start_time: f64,
    pub duration: f64,
}

/// Everything needed to record and later slice an instrument. The notes and the samples are built
/// from the same time cursor, so the n-th note always lines up with the n-th sample.
#[derive(Clone, Debug, PartialEq)]
pub struct Plan {
    pub tempo_changes: Vec<TempoChange>,
    pub notes: Vec<NoteEvent>,
    pub configuration: Configuration,
}

/// Plans one note per pitch and velocity of the two distributions, pitch by pitch.
///
/// The timeline opens with one release worth of silence. Each note is then held for the sustain
/// time and followed by a release worth of silence before the next one starts.
pub fn plan(parameters: PlanParameters) -> Result<Plan, DistributionError> {
    let notes_distribution = distribution::generate_distribution(
        parameters.note_min,
        parameters.note_max,
        parameters.note_layers,
        NOTE_SHIFT,
    )?;
    let notes_intervals = distribution::map_intervals(&notes_distribution);
    let velocity_distribution = distribution::generate_distribution(
        MIDI_MIN,
        MIDI_MAX,
        parameters.velocity_layers,
        parameters.velocity_shift,
    )?;
    let velocity_intervals = distribution::map_intervals(&velocity_distribution);

    let sustain = f64::from(parameters.time_sustain);
    let release = f64::from(parameters.time_release);

    let mut time = 0.0;
    let mut tempo_changes = vec![TempoChange {
        time,
        bpm: INITIAL_BPM,
    }];
    time += release;
    tempo_changes.push(TempoChange {
        time,
        bpm: RECORDING_BPM,
    });

    let count = notes_distribution.len() * velocity_distribution.len();
    let mut notes = Vec::with_capacity(count);
    let mut samples = Vec::with_capacity(count);
    for (&pitch, note_interval) in notes_distribution.iter().zip(notes_intervals.iter()) {
        for (&velocity, velocity_interval) in
            velocity_distribution.iter().zip(velocity_intervals.iter())
        {
            notes.push(NoteEvent {
                pitch,
                velocity,
                start_time: time,
                duration: sustain,
            });
            samples.push(SampleRecord {
                sample_name: format_sample_name(pitch, velocity),
                note_number: pitch,
                velocity,
                time_start: time,
                time_end: time + sustain + release,
                note_interval: *note_interval,
                velocity_interval: *velocity_interval,
            });
            time += sustain + release;
        }
    }

    Ok(Plan {
        tempo_changes,
        notes,
        configuration: Configuration {
            parameters,
            notes_distribution,
            velocity_distribution,
            samples,
        },
    })
}

impl Plan {
    /// Feeds the tempo changes and notes to the writer and returns the serialized file.
    pub fn emit(&self, writer: &mut dyn midi::Writer) -> Result<Vec<u8>, MidiError> {
        for change in self.tempo_changes.iter() {
            writer.set_tempo(TRACK, change.time, change.bpm)?;
        }
        for note in self.notes.iter() {
            writer.add_note(
                TRACK,
                CHANNEL,
                note.pitch,
                note.start_time,
                note.duration,
                note.velocity,
            )?;
        }
        writer.finish()
    }

    /// The length of the whole recording.
    pub fn duration(&self) -> Duration {
        let end = self
            .configuration
            .samples
            .last()
            .map_or(0.0, |sample| sample.time_end);
        Duration::from_secs_f64(end)
    }
}

/// Plans the project and writes its MIDI file and configuration.
pub fn run(project: &Project, parameters: PlanParameters) -> Result<Plan, Box<dyn Error>> {
    let span = span!(Level::INFO, "plan", project = project.name());
    let _enter = span.enter();

    let plan = plan(parameters)?;
    info!(
        notes = ?plan.configuration.notes_distribution,
        velocities = ?plan.configuration.velocity_distribution,
        samples = plan.configuration.samples.len(),
        duration = util::duration_minutes_seconds(plan.duration()),
        "Planned recording."
    );

    let mut writer = midi::smf_writer(1);
    let midi_file = project.midi_path();
    util::write_atomically(&midi_file, &plan.emit(writer.as_mut())?)?;
    info!(file = %midi_file.display(), "Saved MIDI file.");

    plan.configuration.save(&project.configuration_path())?;

    Ok(plan)
}
