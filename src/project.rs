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
use std::path::{Path, PathBuf};

use tracing::{debug, info};

/// The name given to projects created without one.
pub const DEFAULT_PROJECT_NAME: &str = "untitled";

const MIDI_FILE: &str = "midi_notes.mid";
const CONFIGURATION_FILE: &str = "configuration.json";
const SAMPLES_DIR: &str = "samples";
const RECORDING_STEM: &str = "recording";
const RECORDING_EXTENSIONS: &[&str] = &["wav", "flac"];

/// Missing pieces that stop a project from being worked on.
#[derive(Debug, thiserror::Error)]
pub enum ProjectError {
    #[error("Projects folder {} does not exist", .0.display())]
    NoProjectsDir(PathBuf),

    #[error("No projects found in {}", .0.display())]
    NoProjects(PathBuf),

    #[error("Project {0} does not exist")]
    NoProject(String),

    #[error("Configuration {} not found, plan the project first", .0.display())]
    NoConfiguration(PathBuf),

    #[error("No recording file (recording.wav or recording.flac) found in {}", .0.display())]
    NoRecording(PathBuf),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// A project directory holding the plan, the recording and the resulting instrument.
#[derive(Clone, Debug)]
pub struct Project {
    name: String,
    path: PathBuf,
}

impl Project {
    /// Creates the project directory, and the projects directory if needed. An existing project
    /// is reused.
    pub fn create(projects_dir: &Path, name: &str) -> Result<Project, ProjectError> {
        let name = match name.trim() {
            "" => DEFAULT_PROJECT_NAME,
            name => name,
        };
        let path = projects_dir.join(name);
        fs::create_dir_all(&path)?;
        info!(project = name, path = %path.display(), "Using project.");

        Ok(Project {
            name: name.to_string(),
            path,
        })
    }

    /// Opens an existing project.
    pub fn open(projects_dir: &Path, name: &str) -> Result<Project, ProjectError> {
        if !projects_dir.is_dir() {
            return Err(ProjectError::NoProjectsDir(projects_dir.to_path_buf()));
        }
        let path = projects_dir.join(name);
        if name.is_empty() || !path.is_dir() {
            return Err(ProjectError::NoProject(name.to_string()));
        }

        Ok(Project {
            name: name.to_string(),
            path,
        })
    }

    /// Lists the names of all projects, sorted.
    pub fn list(projects_dir: &Path) -> Result<Vec<String>, ProjectError> {
        if !projects_dir.is_dir() {
            return Err(ProjectError::NoProjectsDir(projects_dir.to_path_buf()));
        }

        let mut names = Vec::new();
        for entry in fs::read_dir(projects_dir)? {
            let entry = entry?;
            if !entry.file_type()?.is_dir() {
                continue;
            }
            names.push(entry.file_name().to_string_lossy().to_string());
        }
        if names.is_empty() {
            return Err(ProjectError::NoProjects(projects_dir.to_path_buf()));
        }

        names.sort();
        Ok(names)
    }

    /// Gets the name of the project.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Gets the project directory.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The MIDI file to record against.
    pub fn midi_path(&self) -> PathBuf {
        self.path.join(MIDI_FILE)
    }

    /// The configuration written by the planner.
    pub fn configuration_path(&self) -> PathBuf {
        self.path.join(CONFIGURATION_FILE)
    }

    /// The directory the sliced samples are written to.
    pub fn samples_dir(&self) -> PathBuf {
        self.path.join(SAMPLES_DIR)
    }

    /// The instrument definition, named after the project.
    pub fn sfz_path(&self) -> PathBuf {
        self.path.join(format!("{}.sfz", self.name))
    }

    /// Gets the configuration path, failing if the project hasn't been planned.
    pub fn existing_configuration(&self) -> Result<PathBuf, ProjectError> {
        let path = self.configuration_path();
        if !path.is_file() {
            return Err(ProjectError::NoConfiguration(path));
        }
        Ok(path)
    }

    /// Finds the recording, preferring WAV over FLAC.
    pub fn find_recording(&self) -> Result<PathBuf, ProjectError> {
        for extension in RECORDING_EXTENSIONS {
            let path = self
                .path
                .join(format!("{}.{}", RECORDING_STEM, extension));
            if path.is_file() {
                debug!(path = %path.display(), "Found recording.");
                return Ok(path);
            }
        }
        Err(ProjectError::NoRecording(self.path.clone()))
    }

    /// Creates the samples directory if needed and returns it.
    pub fn create_samples_dir(&self) -> Result<PathBuf, ProjectError> {
        let path = self.samples_dir();
        fs::create_dir_all(&path)?;
        Ok(path)
    }
}
