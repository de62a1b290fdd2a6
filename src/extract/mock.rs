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

use std::collections::HashSet;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use super::ExtractError;

/// An extraction requested from the mock.
#[derive(Clone, Debug, PartialEq)]
pub struct Extraction {
    pub input: PathBuf,
    pub start: f64,
    pub duration: f64,
    pub output: PathBuf,
}

/// A mock extractor. Writes a placeholder file for every extraction and fails the ones whose
/// output file name is in the failing set.
#[derive(Default)]
pub struct Extractor {
    failing: HashSet<String>,
    extractions: Mutex<Vec<Extraction>>,
}

impl Extractor {
    /// Gets a mock that fails extractions into the given file names.
    pub fn failing(file_names: &[&str]) -> Extractor {
        Extractor {
            failing: file_names.iter().map(|name| name.to_string()).collect(),
            extractions: Mutex::new(Vec::new()),
        }
    }

    /// Gets every extraction requested so far.
    pub fn extractions(&self) -> Vec<Extraction> {
        self.extractions
            .lock()
            .expect("unable to get extractions lock")
            .clone()
    }
}

impl super::Extractor for Extractor {
    fn extract(
        &self,
        input: &Path,
        start: f64,
        duration: f64,
        output: &Path,
    ) -> Result<(), ExtractError> {
        self.extractions
            .lock()
            .expect("unable to get extractions lock")
            .push(Extraction {
                input: input.to_path_buf(),
                start,
                duration,
                output: output.to_path_buf(),
            });

        let file_name = crate::util::filename_display(output);
        if self.failing.contains(file_name) {
            return Err(ExtractError::Failed {
                program: "mock".to_string(),
                status: "exit status: 1".to_string(),
                diagnostic: format!("{}: Invalid argument", file_name),
            });
        }

        fs::write(output, b"mock sample").map_err(|source| ExtractError::Spawn {
            program: "mock".to_string(),
            source,
        })
    }
}

impl fmt::Display for Extractor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "mock")
    }
}
