use glam::{Mat3, Vec3};

use crate::schema::Field;
use crate::{Frame, RawFrame};

/// Lengths are divided by this factor to go from Å to nm.
pub const LENGTH_DIVISOR: f32 = 10.0;
/// Velocities are multiplied by this factor to go from Å/fs to nm/ps.
pub const VELOCITY_FACTOR: f32 = 100.0;

/// Converts [`RawFrame`]s in lammps 'real' units into gromacs [`Frame`]s.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Converter {
    /// The time between two lammps steps, in picoseconds.
    pub timestep: f32,
}

impl Converter {
    pub const fn new(timestep: f32) -> Self {
        Self { timestep }
    }

    /// Convert `raw` into `frame`, reusing the allocations in `frame`.
    ///
    /// The box is placed on the diagonal of the box matrix. Positions are shifted such that the
    /// lower corner of the box becomes the origin. Velocities are only rescaled.
    pub fn convert(&self, raw: &RawFrame, frame: &mut Frame) {
        let lo = raw.bounds.lo;

        frame.step = raw.step;
        frame.time = raw.step as f32 * self.timestep;
        frame.lambda = 0.0;
        frame.boxvec = Mat3::from_diagonal(raw.bounds.lengths() / LENGTH_DIVISOR);

        frame.positions.clear();
        frame.positions.extend(raw.values.iter().map(|values| {
            let position = Vec3::new(
                values[Field::PosX.index()],
                values[Field::PosY.index()],
                values[Field::PosZ.index()],
            );
            (position - lo) / LENGTH_DIVISOR
        }));

        frame.velocities.clear();
        frame.velocities.extend(raw.values.iter().map(|values| {
            let velocity = Vec3::new(
                values[Field::VelX.index()],
                values[Field::VelY.index()],
                values[Field::VelZ.index()],
            );
            velocity * VELOCITY_FACTOR
        }));
    }
}
