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
use midly::num::{u15, u24, u28, u4, u7};
use midly::{Format, Header, MetaMessage, MidiMessage, Smf, Timing, TrackEvent, TrackEventKind};
use tracing::debug;

use super::{check_time, check_u7, MidiError};

/// The resolution of written files.
pub const TICKS_PER_BEAT: u16 = 480;

/// The tempo a file plays at until the first tempo event.
const DEFAULT_BPM: u32 = 120;

const MICROSECONDS_PER_MINUTE: u32 = 60_000_000;

/// The largest delta time a track event can carry.
const MAX_DELTA: u64 = (1 << 28) - 1;

struct TempoChange {
    track: usize,
    time: f64,
    bpm: u32,
}

struct Note {
    track: usize,
    channel: u8,
    pitch: u8,
    start_time: f64,
    duration: f64,
    velocity: u8,
}

/// A point in the tempo map from which a tempo holds.
struct Segment {
    seconds: f64,
    ticks: f64,
    bpm: u32,
}

impl Segment {
    fn ticks_at(&self, seconds: f64) -> f64 {
        self.ticks
            + (seconds - self.seconds) * f64::from(self.bpm) / 60.0 * f64::from(TICKS_PER_BEAT)
    }
}

/// Converts seconds into ticks, following tempo changes.
struct TempoMap {
    segments: Vec<Segment>,
}

impl TempoMap {
    fn new(changes: &[TempoChange]) -> TempoMap {
        let mut sorted: Vec<(f64, u32)> = changes.iter().map(|c| (c.time, c.bpm)).collect();
        sorted.sort_by(|a, b| a.0.total_cmp(&b.0));

        let mut segments = vec![Segment {
            seconds: 0.0,
            ticks: 0.0,
            bpm: DEFAULT_BPM,
        }];
        for (time, bpm) in sorted {
            let Some(last) = segments.last_mut() else {
                continue;
            };
            // A later change at the same instant wins.
            if last.seconds == time {
                last.bpm = bpm;
                continue;
            }
            let ticks = last.ticks_at(time);
            segments.push(Segment {
                seconds: time,
                ticks,
                bpm,
            });
        }

        TempoMap { segments }
    }

    fn ticks(&self, seconds: f64) -> u64 {
        self.segments
            .iter()
            .rev()
            .find(|segment| segment.seconds <= seconds)
            .map_or(0.0, |segment| segment.ticks_at(seconds))
            .round() as u64
    }
}

/// Writes notes and tempo changes into a Standard MIDI File.
pub struct Writer {
    tracks: usize,
    tempo_changes: Vec<TempoChange>,
    notes: Vec<Note>,
}

impl Writer {
    pub fn new(tracks: usize) -> Writer {
        Writer {
            tracks: tracks.max(1),
            tempo_changes: Vec::new(),
            notes: Vec::new(),
        }
    }

    fn check_track(&self, track: usize) -> Result<(), MidiError> {
        if track >= self.tracks {
            return Err(MidiError::TrackOutOfRange {
                track,
                tracks: self.tracks,
            });
        }
        Ok(())
    }
}

/// Sort order for events on the same tick: tempo first, then note offs, then note ons, so a
/// retriggered key is released before it's struck again.
fn order(kind: &TrackEventKind) -> u8 {
    match kind {
        TrackEventKind::Meta(_) => 0,
        TrackEventKind::Midi {
            message: MidiMessage::NoteOff { .. },
            ..
        } => 1,
        _ => 2,
    }
}

impl super::Writer for Writer {
    fn set_tempo(&mut self, track: usize, time: f64, bpm: u32) -> Result<(), MidiError> {
        self.check_track(track)?;
        let time = check_time(time)?;
        if bpm == 0 || MICROSECONDS_PER_MINUTE / bpm > 0xFF_FFFF {
            return Err(MidiError::ValueOutOfRange {
                name: "tempo",
                value: bpm,
            });
        }

        self.tempo_changes.push(TempoChange { track, time, bpm });
        Ok(())
    }

    fn add_note(
        &mut self,
        track: usize,
        channel: u8,
        pitch: u8,
        start_time: f64,
        duration: f64,
        velocity: u8,
    ) -> Result<(), MidiError> {
        self.check_track(track)?;
        if channel > 15 {
            return Err(MidiError::ValueOutOfRange {
                name: "channel",
                value: u32::from(channel),
            });
        }

        self.notes.push(Note {
            track,
            channel,
            pitch: check_u7("pitch", pitch)?,
            start_time: check_time(start_time)?,
            duration: check_time(duration)?,
            velocity: check_u7("velocity", velocity)?,
        });
        Ok(())
    }

    fn finish(&mut self) -> Result<Vec<u8>, MidiError> {
        let tempo_map = TempoMap::new(&self.tempo_changes);

        let mut timed: Vec<Vec<(u64, TrackEventKind<'static>)>> = vec![Vec::new(); self.tracks];
        for change in self.tempo_changes.iter() {
            timed[change.track].push((
                tempo_map.ticks(change.time),
                TrackEventKind::Meta(MetaMessage::Tempo(u24::from(
                    MICROSECONDS_PER_MINUTE / change.bpm,
                ))),
            ));
        }
        for note in self.notes.iter() {
            let channel = u4::from(note.channel);
            let key = u7::from(note.pitch);
            timed[note.track].push((
                tempo_map.ticks(note.start_time),
                TrackEventKind::Midi {
                    channel,
                    message: MidiMessage::NoteOn {
                        key,
                        vel: u7::from(note.velocity),
                    },
                },
            ));
            timed[note.track].push((
                tempo_map.ticks(note.start_time + note.duration),
                TrackEventKind::Midi {
                    channel,
                    message: MidiMessage::NoteOff {
                        key,
                        vel: u7::from(0),
                    },
                },
            ));
        }

        let mut tracks = Vec::with_capacity(self.tracks);
        for mut events in timed {
            events.sort_by_key(|(tick, kind)| (*tick, order(kind)));

            let mut track = Vec::with_capacity(events.len() + 1);
            let mut last_tick = 0;
            for (tick, kind) in events {
                let delta = tick - last_tick;
                if delta > MAX_DELTA {
                    return Err(MidiError::TooLong);
                }
                track.push(TrackEvent {
                    delta: u28::from(delta as u32),
                    kind,
                });
                last_tick = tick;
            }
            track.push(TrackEvent {
                delta: u28::from(0),
                kind: TrackEventKind::Meta(MetaMessage::EndOfTrack),
            });
            tracks.push(track);
        }

        let format = if tracks.len() == 1 {
            Format::SingleTrack
        } else {
            Format::Parallel
        };
        let smf = Smf {
            header: Header::new(format, Timing::Metrical(u15::from(TICKS_PER_BEAT))),
            tracks,
        };

        let mut bytes = Vec::new();
        smf.write_std(&mut bytes)?;
        debug!(
            notes = self.notes.len(),
            tempo_changes = self.tempo_changes.len(),
            bytes = bytes.len(),
            "Serialized MIDI file."
        );
        Ok(bytes)
    }
}
