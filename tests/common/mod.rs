#![allow(dead_code)]

use std::path::Path;

use lammps2trr::{Config, Frame, MatchPolicy, Summary, TrrReader};

pub mod trajectories {
    pub const TWO_ATOMS: &str = "tests/trajectories/two_atoms.dump";
    pub const SHUFFLED: &str = "tests/trajectories/shuffled.dump";
    pub const MALFORMED: &str = "tests/trajectories/malformed.dump";
    pub const EMPTY: &str = "tests/trajectories/empty.dump";
    pub const NO_VELOCITIES: &str = "tests/trajectories/no_velocities.dump";
    pub const CHANGING: &str = "tests/trajectories/changing.dump";
    pub const TRICLINIC: &str = "tests/trajectories/triclinic.dump";
    pub const TRUNCATED: &str = "tests/trajectories/truncated.dump";
}

/// Convert the dump at `input` into a trr file at `output`.
pub fn convert_to(
    input: impl AsRef<Path>,
    output: impl AsRef<Path>,
    policy: MatchPolicy,
) -> lammps2trr::Result<Summary> {
    let config = Config {
        input_path: input.as_ref().to_path_buf(),
        output_path: output.as_ref().to_path_buf(),
        match_policy: policy,
        ..Config::default()
    };
    lammps2trr::run(&config)
}

/// Convert the dump at `input` in a temporary directory and read the resulting frames back.
pub fn convert(input: impl AsRef<Path>) -> lammps2trr::Result<(Summary, Box<[Frame]>)> {
    let dir = tempfile::tempdir()?;
    let output = dir.path().join("traj.trr");
    let summary = convert_to(input, &output, MatchPolicy::Exact)?;
    let frames = TrrReader::open(&output)?.read_all_frames()?;
    Ok((summary, frames))
}

#[track_caller]
pub fn assert_close(found: f32, expected: f32) {
    assert!(
        (found - expected).abs() <= 1e-6 * expected.abs().max(1.0),
        "found {found}, expected {expected}"
    );
}

#[track_caller]
pub fn assert_close3(found: glam::Vec3, expected: [f32; 3]) {
    for (f, e) in found.to_array().into_iter().zip(expected) {
        assert_close(f, e);
    }
}
