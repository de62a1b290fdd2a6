// Copyright (C) 2024 Michael Wilson <mike@mdwn.dev>
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
mod mock;
mod smf;

pub use self::smf::TICKS_PER_BEAT;

/// Errors raised while building a MIDI file.
#[derive(Debug, thiserror::Error)]
pub enum MidiError {
    #[error("track {track} doesn't exist, the file has {tracks} track(s)")]
    TrackOutOfRange { track: usize, tracks: usize },

    #[error("{name} {value} is out of range")]
    ValueOutOfRange { name: &'static str, value: u32 },

    #[error("invalid time {0}, times must be finite and not negative")]
    InvalidTime(f64),

    #[error("the file is too long to be encoded")]
    TooLong,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Something that collects timed MIDI events and serializes them. All times are in seconds.
pub trait Writer {
    /// Changes the tempo at the given time.
    fn set_tempo(&mut self, track: usize, time: f64, bpm: u32) -> Result<(), MidiError>;

    /// Adds a note that starts at `start_time` and is held for `duration`.
    fn add_note(
        &mut self,
        track: usize,
        channel: u8,
        pitch: u8,
        start_time: f64,
        duration: f64,
        velocity: u8,
    ) -> Result<(), MidiError>;

    /// Serializes everything added so far.
    fn finish(&mut self) -> Result<Vec<u8>, MidiError>;
}

/// Creates a writer for a Standard MIDI File with the given number of tracks.
pub fn smf_writer(tracks: usize) -> Box<dyn Writer> {
    Box::new(smf::Writer::new(tracks))
}

/// Checks that a value fits in a 7 bit MIDI data byte.
fn check_u7(name: &'static str, value: u8) -> Result<u8, MidiError> {
    if value > 127 {
        return Err(MidiError::ValueOutOfRange {
            name,
            value: u32::from(value),
        });
    }
    Ok(value)
}

/// Checks that a time can be placed on a timeline.
fn check_time(time: f64) -> Result<f64, MidiError> {
    if !time.is_finite() || time < 0.0 {
        return Err(MidiError::InvalidTime(time));
    }
    Ok(time)
}

#[cfg(test)]
pub mod test {
    pub use super::mock::{Call, Writer};
}
