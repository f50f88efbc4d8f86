use std::path::PathBuf;

use thiserror::Error;

use crate::schema::Field;

#[derive(Debug, Error)]
pub enum Error {
    #[error("could not open '{}': {source}", .path.display())]
    Open {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("no column for {0} in the atoms header")]
    MissingColumn(Field),
    #[error("column '{name}' for {field} appears more than once in the atoms header")]
    AmbiguousColumn { field: Field, name: String },
    /// The input ended before the first frame told us enough to set up the conversion.
    #[error("input ended before the {0} was found")]
    IncompleteDiscovery(&'static str),
    #[error("unsupported input: {0}")]
    Unsupported(String),
    #[error("malformed section at line {line}: {reason}")]
    MalformedSection { line: usize, reason: String },
    #[error("number of atoms changed from {expected} to {found} at step {step}")]
    AtomCountMismatch {
        step: u64,
        expected: usize,
        found: usize,
    },
    #[error("failed to write frame {frame}: {source}")]
    SinkWrite {
        frame: usize,
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, Error>;
