//! Writing gromacs trr trajectories.
//!
//! A trr file is a sequence of frames. Each frame starts with a [`TrrHeader`] that states the size
//! in bytes of every block that follows it. All values are encoded as big-endian xdr, and we
//! always write single precision frames.
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use crate::Frame;

/// Something that converted frames can be written to.
pub trait TrajectorySink {
    /// Write `frame` as the next frame of the trajectory.
    fn append_frame(&mut self, frame: &Frame) -> io::Result<()>;

    /// Finish the trajectory, flushing anything that is still buffered.
    fn close(self) -> io::Result<()>
    where
        Self: Sized;
}

/// The fixed-size header preceding every trr frame.
///
/// Only the blocks that we actually write have a non-zero size here. The input record,
/// energies, virial, pressure, topology and symmetry blocks are never present.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct TrrHeader {
    pub ir_size: i32,
    pub e_size: i32,
    pub box_size: i32,
    pub vir_size: i32,
    pub pres_size: i32,
    pub top_size: i32,
    pub sym_size: i32,
    pub x_size: i32,
    pub v_size: i32,
    pub f_size: i32,
    pub natoms: i32,
    pub step: i32,
    pub nre: i32,
    pub time: f32,
    pub lambda: f32,
}

impl TrrHeader {
    pub const MAGIC: i32 = 1993;
    pub const VERSION: &'static str = "GMX_trn_file";
    /// The size in bytes of a single precision header.
    pub const SIZE: usize = 4 + 4 + 4 + Self::VERSION.len() + 13 * 4 + 2 * 4;

    const FLOAT_SIZE: i32 = std::mem::size_of::<f32>() as i32;

    /// Create the header for a single precision frame with a box, positions and velocities.
    pub fn for_frame(frame: &Frame) -> io::Result<Self> {
        let invalid = |what: &str| {
            io::Error::new(
                io::ErrorKind::InvalidData,
                format!("{what} does not fit in a trr header"),
            )
        };
        let natoms: i32 = frame
            .natoms()
            .try_into()
            .map_err(|_| invalid("number of atoms"))?;
        let step: i32 = frame.step.try_into().map_err(|_| invalid("step"))?;
        let coords_size = natoms
            .checked_mul(3 * Self::FLOAT_SIZE)
            .ok_or_else(|| invalid("number of atoms"))?;

        Ok(Self {
            box_size: 9 * Self::FLOAT_SIZE,
            x_size: coords_size,
            v_size: coords_size,
            natoms,
            step,
            time: frame.time,
            lambda: frame.lambda,
            ..Self::default()
        })
    }

    pub fn to_be_bytes(&self) -> [u8; Self::SIZE] {
        let mut bytes = [0; Self::SIZE];
        let version = Self::VERSION.as_bytes();
        let ints = [
            Self::MAGIC,
            version.len() as i32 + 1, // The string length, including a nul byte.
            version.len() as i32,     // The xdr string length, excluding that nul byte.
        ];
        let sizes = [
            self.ir_size,
            self.e_size,
            self.box_size,
            self.vir_size,
            self.pres_size,
            self.top_size,
            self.sym_size,
            self.x_size,
            self.v_size,
            self.f_size,
            self.natoms,
            self.step,
            self.nre,
        ];

        let mut chunks = bytes.chunks_exact_mut(4);
        // The values lead each zip, such that no chunk is consumed beyond the last value.
        for (value, chunk) in ints.into_iter().zip(chunks.by_ref()) {
            chunk.copy_from_slice(&value.to_be_bytes());
        }
        // The version string is a multiple of four bytes long, so no xdr padding is needed.
        for (text, chunk) in version.chunks_exact(4).zip(chunks.by_ref()) {
            chunk.copy_from_slice(text);
        }
        for (value, chunk) in sizes.into_iter().zip(chunks.by_ref()) {
            chunk.copy_from_slice(&value.to_be_bytes());
        }
        for (value, chunk) in [self.time, self.lambda].into_iter().zip(chunks) {
            chunk.copy_from_slice(&value.to_be_bytes());
        }
        bytes
    }
}

/// Writes [`Frame`]s as a single precision trr trajectory.
pub struct TrrWriter<W: Write> {
    writer: W,
    nframes: usize,
}

impl TrrWriter<BufWriter<File>> {
    /// Create or truncate the file at `path` and write a trajectory into it.
    pub fn create<P: AsRef<Path>>(path: P) -> io::Result<Self> {
        let file = File::create(path)?;
        Ok(Self::new(BufWriter::new(file)))
    }
}

impl<W: Write> TrrWriter<W> {
    pub fn new(writer: W) -> Self {
        Self { writer, nframes: 0 }
    }

    /// The number of frames that have been written so far.
    pub fn nframes(&self) -> usize {
        self.nframes
    }

    /// Returns the underlying writer, without flushing it.
    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> TrajectorySink for TrrWriter<W> {
    fn append_frame(&mut self, frame: &Frame) -> io::Result<()> {
        if frame.positions.len() != frame.velocities.len() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "a frame must have as many velocities as positions",
            ));
        }
        let header = TrrHeader::for_frame(frame)?;
        self.writer.write_all(&header.to_be_bytes())?;

        // Box vectors are written one after the other.
        write_f32s(&mut self.writer, &frame.boxvec.to_cols_array())?;
        for position in &frame.positions {
            write_f32s(&mut self.writer, &position.to_array())?;
        }
        for velocity in &frame.velocities {
            write_f32s(&mut self.writer, &velocity.to_array())?;
        }

        self.nframes += 1;
        Ok(())
    }

    fn close(mut self) -> io::Result<()> {
        self.writer.flush()
    }
}

fn write_f32s<W: Write>(writer: &mut W, values: &[f32]) -> io::Result<()> {
    for value in values {
        writer.write_all(&value.to_be_bytes())?;
    }
    Ok(())
}
