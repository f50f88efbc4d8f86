//! Convert a lammps dump with velocities to a trr file.
//!
//! By Marieke Westendorp, 2024.
//! <ma3ke.cyber@gmail.com>
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use lammps2trr::{run, Config, Error, MatchPolicy, TrrReader};
use log::LevelFilter;

/// Convert a lammps dump with velocities to a trr file.
///
/// Assumes an orthorhombic box. The time of each frame is its step multiplied by `dt`.
/// Assumes lammps 'real' units (Å and Å/fs) and converts them to gromacs units (nm and nm/ps).
#[derive(Parser)]
#[command(version)]
struct Args {
    /// Produce verbose output.
    #[arg(short, long)]
    verbose: bool,

    /// Input lammps trajectory file with columns xu yu zu vx vy vz.
    #[arg(short = 'f', long = "lammpstrj", value_name = "FILE", default_value = "traj.dump")]
    input: PathBuf,

    /// Output trr trajectory file.
    #[arg(short = 'o', long = "trr", value_name = "FILE", default_value = "traj.trr")]
    output: PathBuf,

    /// Timestep of the lammps file in ps, used for the time of each trr frame.
    #[arg(short, long, default_value_t = 0.001)]
    dt: f32,

    /// Match columns by their first two characters, rather than by their exact names.
    ///
    /// If several columns match, the last one is used.
    #[arg(long)]
    prefix_columns: bool,

    /// Read the trr file back after writing it and print its number of frames.
    #[arg(long)]
    check: bool,
}

impl From<Args> for Config {
    fn from(args: Args) -> Self {
        Self {
            verbose: args.verbose,
            input_path: args.input,
            output_path: args.output,
            timestep: args.dt,
            match_policy: if args.prefix_columns {
                MatchPolicy::Prefix
            } else {
                MatchPolicy::Exact
            },
        }
    }
}

fn main() -> ExitCode {
    let args = Args::parse();
    let check = args.check;
    let config = Config::from(args);

    let level = if config.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Warn
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();

    match convert(&config, check) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::error!("{err}");
            ExitCode::FAILURE
        }
    }
}

fn convert(config: &Config, check: bool) -> Result<(), Error> {
    let summary = run(config)?;
    if summary.skipped > 0 {
        println!(
            "wrote {} frames, skipped {} malformed frames",
            summary.written, summary.skipped
        );
    }

    if check {
        let mut reader = TrrReader::open(&config.output_path).map_err(|source| Error::Open {
            path: config.output_path.clone(),
            source,
        })?;
        let frames = reader.read_all_frames()?;
        let natoms = frames.first().map(|frame| frame.natoms()).unwrap_or_default();
        println!(
            "{}\t{} frames\t{natoms} atoms",
            config.output_path.display(),
            frames.len()
        );
    }

    Ok(())
}
