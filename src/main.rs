// Copyright (C) 2025 Michael Wilson <mike@mdwn.dev>
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
use std::path::PathBuf;

use clap::{crate_version, Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use gridsampler::config::{Configuration, PlanParameters, RawParameters};
use gridsampler::project::Project;
use gridsampler::slicer::{self, SliceOptions};
use gridsampler::{extract, planner, verify};

const DEFAULT_PROJECTS_DIR: &str = "projects";

#[derive(Parser)]
#[clap(
    author = "Michael Wilson",
    version = crate_version!(),
    about = "Plans multisample recordings and slices them into SFZ instruments."
)]
struct Cli {
    #[clap(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct PlanArgs {
    /// The lowest note to sample (0-127, default 21).
    #[arg(long)]
    note_min: Option<String>,
    /// The highest note to sample (note_min-127, default 108).
    #[arg(long)]
    note_max: Option<String>,
    /// The number of notes to sample (default: one every three notes).
    #[arg(long)]
    note_layers: Option<String>,
    /// The number of velocities to sample (1-127, default 5).
    #[arg(long)]
    velocity_layers: Option<String>,
    /// How long each note is held, in seconds (1-60, default 20).
    #[arg(long)]
    time_sustain: Option<String>,
    /// The silence after each note, in seconds (1-60, default 5).
    #[arg(long)]
    time_release: Option<String>,
    /// Where the first velocity sits within its step, in percent (0-100, default 50).
    #[arg(long)]
    velocity_shift: Option<String>,
}

impl From<PlanArgs> for RawParameters {
    fn from(args: PlanArgs) -> Self {
        RawParameters {
            note_min: args.note_min,
            note_max: args.note_max,
            note_layers: args.note_layers,
            velocity_layers: args.velocity_layers,
            time_sustain: args.time_sustain,
            time_release: args.time_release,
            velocity_shift: args.velocity_shift,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Plans a recording: writes the MIDI file to record and the project configuration.
    Plan {
        /// The name of the project to create.
        #[arg(default_value = "")]
        project_name: String,
        /// The directory holding all projects.
        #[arg(short, long, default_value = DEFAULT_PROJECTS_DIR)]
        projects_dir: PathBuf,
        /// A YAML, TOML or JSON file with plan parameters. Flags override its values.
        #[arg(long)]
        parameters: Option<PathBuf>,
        #[command(flatten)]
        plan_args: PlanArgs,
    },
    /// Slices a project's recording into samples and writes its SFZ instrument.
    Slice {
        /// The name of the project to slice.
        project_name: String,
        /// The directory holding all projects.
        #[arg(short, long, default_value = DEFAULT_PROJECTS_DIR)]
        projects_dir: PathBuf,
        /// The ffmpeg binary to extract samples with.
        #[arg(long, default_value = "ffmpeg")]
        ffmpeg: String,
        /// The extension, and so the format, of the extracted samples.
        #[arg(long, default_value = slicer::DEFAULT_EXTENSION)]
        extension: String,
        /// Leave samples that failed to extract out of the instrument.
        #[arg(long)]
        omit_failed: bool,
    },
    /// Lists all projects.
    Projects {
        /// The directory holding all projects.
        #[arg(short, long, default_value = DEFAULT_PROJECTS_DIR)]
        projects_dir: PathBuf,
    },
    /// Verifies a project's configuration.
    Verify {
        /// The name of the project to verify.
        project_name: String,
        /// The directory holding all projects.
        #[arg(short, long, default_value = DEFAULT_PROJECTS_DIR)]
        projects_dir: PathBuf,
    },
}

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Plan {
            project_name,
            projects_dir,
            parameters,
            plan_args,
        } => {
            let raw = match parameters {
                Some(path) => RawParameters::deserialize(&path)?,
                None => RawParameters::default(),
            }
            .overridden_by(plan_args.into());
            let parameters = PlanParameters::from_raw(&raw);

            let project = Project::create(&projects_dir, &project_name)?;
            let plan = planner::run(&project, parameters)?;

            println!("Project {} planned.", project.name());
            println!("- Notes: {:?}", plan.configuration.notes_distribution);
            println!(
                "- Velocities: {:?}",
                plan.configuration.velocity_distribution
            );
            println!("- Samples: {}", plan.configuration.samples.len());
            println!(
                "Record {} into {}/recording.wav (or .flac), then slice it.",
                project.midi_path().display(),
                project.path().display()
            );
        }
        Commands::Slice {
            project_name,
            projects_dir,
            ffmpeg,
            extension,
            omit_failed,
        } => {
            let project = Project::open(&projects_dir, &project_name)?;
            let extractor = extract::ffmpeg(&ffmpeg);
            let report = slicer::run(
                &project,
                extractor.as_ref(),
                &SliceOptions {
                    extension,
                    omit_failed,
                },
            )?;

            println!(
                "Wrote {} region(s) to {}.",
                report.regions.len(),
                project.sfz_path().display()
            );
            if !report.failures.is_empty() {
                println!("Failed samples (count: {}):", report.failures.len());
                for failure in report.failures.iter() {
                    println!("- {}: {}", failure.sample_name, failure.message);
                }
            }
        }
        Commands::Projects { projects_dir } => {
            let projects = Project::list(&projects_dir)?;

            println!("Projects (count: {}):", projects.len());
            for project in projects {
                println!("- {}", project);
            }
        }
        Commands::Verify {
            project_name,
            projects_dir,
        } => {
            let project = Project::open(&projects_dir, &project_name)?;
            let configuration = Configuration::load(&project.existing_configuration()?)?;
            let report = verify::check_configuration(&configuration);
            verify::print_report(&report, &configuration);

            if report.has_errors() {
                return Err(format!("project {} failed verification", project.name()).into());
            }
        }
    }

    Ok(())
}
