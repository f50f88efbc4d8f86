use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::PathBuf;

use crate::convert::Converter;
use crate::dump::{Discovery, DumpReader};
use crate::error::{Error, Result};
use crate::schema::MatchPolicy;
use crate::trr::{TrajectorySink, TrrWriter};
use crate::{Frame, RawFrame};

/// Everything needed to run a conversion.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub verbose: bool,
    /// The lammps dump to read.
    pub input_path: PathBuf,
    /// The trr trajectory to write.
    pub output_path: PathBuf,
    /// The time between two lammps steps, in picoseconds.
    pub timestep: f32,
    pub match_policy: MatchPolicy,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            verbose: false,
            input_path: PathBuf::from("traj.dump"),
            output_path: PathBuf::from("traj.trr"),
            timestep: 0.001,
            match_policy: MatchPolicy::default(),
        }
    }
}

/// The outcome of a successful conversion.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Summary {
    pub natoms: usize,
    pub written: usize,
    /// Frames that were malformed and left out of the output.
    pub skipped: usize,
}

/// The frame storage that is reused from one frame to the next.
struct FrameBuffer {
    natoms: usize,
    raw: RawFrame,
    frame: Frame,
}

impl FrameBuffer {
    fn with_natoms(natoms: usize) -> Self {
        let mut buffer = Self {
            natoms,
            raw: RawFrame::default(),
            frame: Frame::default(),
        };
        buffer.raw.values.reserve(natoms);
        buffer.frame.positions.reserve(natoms);
        buffer.frame.velocities.reserve(natoms);
        buffer
    }

    /// Verify that the frame that was just read has the number of atoms we started out with.
    fn check(&self) -> Result<()> {
        let found = self.raw.natoms();
        if found != self.natoms {
            return Err(Error::AtomCountMismatch {
                step: self.raw.step,
                expected: self.natoms,
                found,
            });
        }
        Ok(())
    }
}

/// Convert the lammps dump at `config.input_path` into a trr file at `config.output_path`.
///
/// The output file is only created once the first frame of the input has been understood.
pub fn run(config: &Config) -> Result<Summary> {
    log::info!("opening file {}", config.input_path.display());
    let file = File::open(&config.input_path).map_err(|source| Error::Open {
        path: config.input_path.clone(),
        source,
    })?;
    let mut reader = DumpReader::new(BufReader::new(file));

    log::info!("read first frame from lammps file");
    let discovery = reader.discover(config.match_policy)?;
    log::debug!("found {} atoms", discovery.natoms);

    log::info!("starting writing file {}", config.output_path.display());
    let sink = TrrWriter::create(&config.output_path).map_err(|source| Error::Open {
        path: config.output_path.clone(),
        source,
    })?;

    let summary = stream(reader, &discovery, sink, config.timestep)?;
    log::info!(
        "wrote {} frames of {} atoms to {}",
        summary.written,
        summary.natoms,
        config.output_path.display()
    );
    Ok(summary)
}

/// Convert every frame from `reader` and append it to `sink`.
///
/// The `reader` must have gone through discovery already, which produced `discovery`. Once the
/// input is exhausted, the reader is dropped and the sink is closed.
pub fn stream<R: BufRead, S: TrajectorySink>(
    mut reader: DumpReader<R>,
    discovery: &Discovery,
    mut sink: S,
    timestep: f32,
) -> Result<Summary> {
    let converter = Converter::new(timestep);
    let mut buffer = FrameBuffer::with_natoms(discovery.natoms);

    log::info!("read frames from lammps file");
    let mut written = 0;
    while reader.read_frame(&discovery.schema, &mut buffer.raw)? {
        buffer.check()?;
        converter.convert(&buffer.raw, &mut buffer.frame);
        sink.append_frame(&buffer.frame)
            .map_err(|source| Error::SinkWrite {
                frame: written,
                source,
            })?;
        written += 1;
        log::trace!("wrote frame {written} (step {})", buffer.frame.step);
    }

    let skipped = reader.skipped();
    drop(reader);
    sink.close().map_err(|source| Error::SinkWrite {
        frame: written,
        source,
    })?;

    if skipped > 0 {
        log::warn!("skipped {skipped} malformed frames");
    }

    Ok(Summary {
        natoms: discovery.natoms,
        written,
        skipped,
    })
}
