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
use std::ffi::OsString;
use std::fmt;
use std::path::Path;
use std::process::{Command, Stdio};

use tracing::debug;

use super::ExtractError;

/// Extracts sections by running ffmpeg, one process per section.
pub struct Ffmpeg {
    program: String,
}

impl Ffmpeg {
    pub fn new(program: &str) -> Ffmpeg {
        Ffmpeg {
            program: program.to_string(),
        }
    }

    /// The arguments for one extraction. Outputs are overwritten without asking.
    fn args(input: &Path, start: f64, duration: f64, output: &Path) -> Vec<OsString> {
        vec![
            "-y".into(),
            "-hide_banner".into(),
            "-loglevel".into(),
            "error".into(),
            "-i".into(),
            input.into(),
            "-ss".into(),
            start.to_string().into(),
            "-t".into(),
            duration.to_string().into(),
            output.into(),
        ]
    }
}

impl super::Extractor for Ffmpeg {
    fn extract(
        &self,
        input: &Path,
        start: f64,
        duration: f64,
        output: &Path,
    ) -> Result<(), ExtractError> {
        let args = Self::args(input, start, duration, output);
        debug!(program = self.program, ?args, "Running extraction.");

        let result = Command::new(&self.program)
            .args(&args)
            .stdin(Stdio::null())
            .output()
            .map_err(|source| ExtractError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        if !result.status.success() {
            return Err(ExtractError::Failed {
                program: self.program.clone(),
                status: result.status.to_string(),
                diagnostic: String::from_utf8_lossy(&result.stderr).trim().to_string(),
            });
        }

        Ok(())
    }
}

impl fmt::Display for Ffmpeg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (ffmpeg)", self.program)
    }
}
