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
#![cfg(test)]

use super::MidiError;

/// A call made against the mock writer.
#[derive(Clone, Debug, PartialEq)]
pub enum Call {
    Tempo {
        track: usize,
        time: f64,
        bpm: u32,
    },
    Note {
        track: usize,
        channel: u8,
        pitch: u8,
        start_time: f64,
        duration: f64,
        velocity: u8,
    },
}

/// A mock writer. Records every call and serializes them as text.
#[derive(Default)]
pub struct Writer {
    calls: Vec<Call>,
}

impl Writer {
    /// Gets the calls made so far.
    pub fn calls(&self) -> &[Call] {
        &self.calls
    }
}

impl super::Writer for Writer {
    fn set_tempo(&mut self, track: usize, time: f64, bpm: u32) -> Result<(), MidiError> {
        self.calls.push(Call::Tempo { track, time, bpm });
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
        self.calls.push(Call::Note {
            track,
            channel,
            pitch,
            start_time,
            duration,
            velocity,
        });
        Ok(())
    }

    fn finish(&mut self) -> Result<Vec<u8>, MidiError> {
        Ok(self
            .calls
            .iter()
            .map(|call| format!("{:?}\n", call))
            .collect::<String>()
            .into_bytes())
    }
}
