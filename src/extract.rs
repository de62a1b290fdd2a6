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
use std::path::Path;

mod ffmpeg;
mod mock;

/// Errors raised when a section of a recording couldn't be extracted.
#[derive(Debug, thiserror::Error)]
pub enum ExtractError {
    #[error("unable to run {program}: {source}")]
    Spawn {
        program: String,
        source: std::io::Error,
    },

    #[error("{program} exited with {status}: {diagnostic}")]
    Failed {
        program: String,
        status: String,
        diagnostic: String,
    },
}

/// Cuts sections out of a recording into their own audio files.
pub trait Extractor: fmt::Display {
    /// Extracts `duration` seconds starting `start` seconds into `input` and writes them to
    /// `output`, replacing it if it exists.
    fn extract(
        &self,
        input: &Path,
        start: f64,
        duration: f64,
        output: &Path,
    ) -> Result<(), ExtractError>;
}

/// Gets an extractor that runs the given ffmpeg binary.
pub fn ffmpeg(program: &str) -> Box<dyn Extractor> {
    Box::new(ffmpeg::Ffmpeg::new(program))
}

#[cfg(test)]
pub mod test {
    pub use super::mock::{Extraction, Extractor};
}
