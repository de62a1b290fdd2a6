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

const PITCH_CLASSES: [&str; 12] = [
    "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
];

/// Formats a MIDI pitch in scientific pitch notation, e.g. 60 is C4.
pub fn pitch_name(pitch: u8) -> String {
    let octave = i16::from(pitch / 12) - 1;
    format!("{}{}", PITCH_CLASSES[usize::from(pitch % 12)], octave)
}

/// Names a sample after its pitch and velocity, e.g. C4v80.
pub fn format_sample_name(pitch: u8, velocity: u8) -> String {
    format!("{}v{}", pitch_name(pitch), velocity)
}

#[cfg(test)]
mod test {
    use super::{format_sample_name, pitch_name};

    #[test]
    fn sample_names() {
        assert_eq!("C4v80", format_sample_name(60, 80));
        assert_eq!("A0v1", format_sample_name(21, 1));
        assert_eq!("C8v127", format_sample_name(108, 127));
        assert_eq!("C-1v0", format_sample_name(0, 0));
        assert_eq!("G9v64", format_sample_name(127, 64));
    }

    #[test]
    fn sharps() {
        assert_eq!("C#4", pitch_name(61));
        assert_eq!("A#3", pitch_name(58));
        assert_eq!("B-1", pitch_name(11));
    }
}
