//! Convert a lammps dump with velocities into a gromacs trr trajectory.
//!
//! The lammps dump is read as a stream of `ITEM:` sections by a [`DumpReader`]. Which columns
//! hold the positions and velocities is resolved once from the first atoms header into a
//! [`ColumnSchema`]. Every complete frame is converted from lammps 'real' units (Å, Å/fs) to
//! gromacs units (nm, nm/ps), with positions shifted such that the lower box corner sits at the
//! origin, and is then written out by a [`TrrWriter`].
use glam::{Mat3, Vec3};

pub use crate::convert::Converter;
pub use crate::dump::{Discovery, DumpReader};
pub use crate::error::{Error, Result};
pub use crate::pipeline::{run, stream, Config, Summary};
pub use crate::reader::TrrReader;
pub use crate::schema::{ColumnSchema, Field, MatchPolicy};
pub use crate::trr::{TrajectorySink, TrrHeader, TrrWriter};

pub mod convert;
pub mod dump;
mod error;
pub mod pipeline;
pub mod reader;
pub mod schema;
pub mod trr;

pub type BoxVec = Mat3;

/// The extent of an orthorhombic box along each axis, in lammps units.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct BoxBounds {
    pub lo: Vec3,
    pub hi: Vec3,
}

impl BoxBounds {
    pub fn lengths(&self) -> Vec3 {
        self.hi - self.lo
    }
}

/// A frame as it was read from the dump, before any conversion.
#[derive(Debug, Default, Clone)]
pub struct RawFrame {
    pub step: u64,
    pub bounds: BoxBounds,
    /// The values of each atom, indexed by [`Field::index`].
    pub values: Vec<[f32; 6]>,
}

impl RawFrame {
    pub fn natoms(&self) -> usize {
        self.values.len()
    }

    pub fn value(&self, atom: usize, field: Field) -> f32 {
        self.values[atom][field.index()]
    }
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct Frame {
    pub step: u64,
    /// Time in picoseconds.
    pub time: f32,
    /// Free energy coupling parameter. Always zero for converted frames.
    pub lambda: f32,
    pub boxvec: BoxVec,
    /// Positions in nanometers.
    pub positions: Vec<Vec3>,
    /// Velocities in nanometers per picosecond.
    pub velocities: Vec<Vec3>,
}

impl Frame {
    pub fn natoms(&self) -> usize {
        self.positions.len()
    }
}
