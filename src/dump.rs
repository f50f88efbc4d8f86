//! Streaming reader for lammps dump files.
//!
//! A dump is a sequence of frames, each made up of `ITEM:` sections:
//!
//! ```text
//! ITEM: TIMESTEP
//! 100
//! ITEM: NUMBER OF ATOMS
//! 2
//! ITEM: BOX BOUNDS pp pp pp
//! 0.0 10.0
//! 0.0 10.0
//! 0.0 10.0
//! ITEM: ATOMS id type xu yu zu vx vy vz
//! 1 1 1.0 2.0 3.0 0.1 0.2 0.3
//! 2 1 9.0 8.0 7.0 -0.1 -0.2 -0.3
//! ```
//!
//! The reader is used in two stages. First, [`DumpReader::discover`] reads just far enough to know
//! the number of atoms and the [`ColumnSchema`]. The lines it consumed are kept and replayed, so
//! the input does not need to be seekable. Then, [`DumpReader::read_frame`] is called until it
//! reports the end of the input.
use std::collections::VecDeque;
use std::io::BufRead;

use glam::Vec3;

use crate::error::{Error, Result};
use crate::schema::{ColumnSchema, MatchPolicy};
use crate::{BoxBounds, RawFrame};

const ITEM: &str = "ITEM:";

/// The largest number of atoms a trr frame can hold, since its coordinate block size is an `i32`.
const MAX_ATOMS: usize = i32::MAX as usize / 12;

/// The kind of section an `ITEM:` marker introduces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Timestep,
    NumberOfAtoms,
    BoxBounds,
    Atoms,
    /// Sections such as `ITEM: TIME` or `ITEM: UNITS`, which we skip.
    Other,
}

impl Section {
    /// Determine the section of a marker line. Returns [`None`] if the line is not a marker.
    fn from_marker(line: &str) -> Option<Self> {
        let item = line.strip_prefix(ITEM)?.trim();
        let section = if item == "TIMESTEP" {
            Self::Timestep
        } else if item.starts_with("NUMBER OF ATOMS") {
            Self::NumberOfAtoms
        } else if item.starts_with("BOX BOUNDS") {
            Self::BoxBounds
        } else if item.starts_with("ATOMS") {
            Self::Atoms
        } else {
            Self::Other
        };
        Some(section)
    }
}

/// What the discovery stage learned from the first frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Discovery {
    pub schema: ColumnSchema,
    pub natoms: usize,
}

pub struct DumpReader<R> {
    reader: R,
    /// Bytes of the line that is being read.
    buf: Vec<u8>,
    /// Lines that were read already, but must be handed out again before reading new ones.
    replay: VecDeque<String>,
    /// The 1-based number of the last line that was handed out.
    line_number: usize,

    // Header values of the frame that is being read.
    natoms: Option<usize>,
    step: u64,
    bounds: BoxBounds,
    /// Set when a header section of the current frame could not be read. The next atoms section
    /// is skipped as a whole.
    damaged: Option<Error>,

    skipped: usize,
}

impl<R: BufRead> DumpReader<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            buf: Vec::new(),
            replay: VecDeque::new(),
            line_number: 0,
            natoms: None,
            step: 0,
            bounds: BoxBounds::default(),
            damaged: None,
            skipped: 0,
        }
    }

    /// The number of frames that were skipped because they were malformed.
    pub fn skipped(&self) -> usize {
        self.skipped
    }

    fn next_line(&mut self) -> Result<Option<String>> {
        let line = match self.replay.pop_front() {
            Some(line) => Some(line),
            None => self.read_line()?,
        };
        if line.is_some() {
            self.line_number += 1;
        }
        Ok(line)
    }

    /// Read a line from the input, without its line ending.
    ///
    /// Bytes that are not valid utf-8 are replaced, such that they end up as a token that cannot
    /// be parsed rather than as an io error.
    fn read_line(&mut self) -> Result<Option<String>> {
        self.buf.clear();
        if self.reader.read_until(b'\n', &mut self.buf)? == 0 {
            return Ok(None);
        }
        let mut line = self.buf.as_slice();
        if let Some(rest) = line.strip_suffix(b"\n") {
            line = rest.strip_suffix(b"\r").unwrap_or(rest);
        }
        Ok(Some(String::from_utf8_lossy(line).into_owned()))
    }

    /// Hand out `line` again on the next call to `next_line`.
    fn push_back(&mut self, line: String) {
        self.line_number -= 1;
        self.replay.push_front(line);
    }

    fn malformed(&self, reason: impl Into<String>) -> Error {
        Error::MalformedSection {
            line: self.line_number,
            reason: reason.into(),
        }
    }

    /// Read up to and including the first atoms header to find the number of atoms and the
    /// column layout.
    ///
    /// Everything that is read here is replayed by subsequent calls to
    /// [`DumpReader::read_frame`]. This must be called before any frames are read.
    pub fn discover(&mut self, policy: MatchPolicy) -> Result<Discovery> {
        let mut consumed = Vec::new();
        let mut natoms = None;
        let mut schema = None;
        let discovery = loop {
            if let (Some(schema), Some(natoms)) = (schema, natoms) {
                break Discovery { schema, natoms };
            }
            let Some(line) = self.next_line()? else {
                let missing = match natoms {
                    None => "number of atoms",
                    Some(_) => "atoms header",
                };
                return Err(Error::IncompleteDiscovery(missing));
            };
            match Section::from_marker(&line) {
                Some(Section::NumberOfAtoms) => {
                    consumed.push(line);
                    let Some(body) = self.next_line()? else {
                        return Err(Error::IncompleteDiscovery("number of atoms"));
                    };
                    natoms = Some(parse_natoms(&body).map_err(|reason| self.malformed(reason))?);
                    consumed.push(body);
                }
                Some(Section::BoxBounds) => {
                    check_orthorhombic(&line)?;
                    consumed.push(line);
                }
                Some(Section::Atoms) => {
                    schema = Some(ColumnSchema::from_header(&line, policy)?);
                    consumed.push(line);
                }
                _ => consumed.push(line),
            }
        };

        // Start over, as far as anyone reading frames is concerned.
        for line in consumed.into_iter().rev() {
            self.replay.push_front(line);
        }
        self.line_number = 0;

        Ok(discovery)
    }

    /// Read the next complete frame into `frame`.
    ///
    /// Returns `false` once the input is exhausted. Malformed frames are reported as a warning
    /// and skipped, such that `frame` only ever holds a complete frame after a call that returns
    /// `true`.
    pub fn read_frame(&mut self, schema: &ColumnSchema, frame: &mut RawFrame) -> Result<bool> {
        loop {
            let Some(line) = self.next_line()? else {
                return Ok(false);
            };
            let Some(section) = Section::from_marker(&line) else {
                if !line.trim().is_empty() {
                    log::warn!(
                        "unexpected data at line {} of the lammps dump: '{}'",
                        self.line_number,
                        line.trim()
                    );
                }
                continue;
            };

            match section {
                Section::Timestep => {
                    let Some(body) = self.read_body("timestep")? else {
                        continue;
                    };
                    match body.trim().parse() {
                        Ok(step) => self.step = step,
                        Err(_) => self.damage(format!("could not read timestep from '{body}'")),
                    }
                }
                Section::NumberOfAtoms => {
                    let Some(body) = self.read_body("number of atoms")? else {
                        continue;
                    };
                    match parse_natoms(&body) {
                        Ok(natoms) => self.natoms = Some(natoms),
                        Err(reason) => self.damage(reason),
                    }
                }
                Section::BoxBounds => {
                    check_orthorhombic(&line)?;
                    self.read_box_bounds()?;
                }
                Section::Atoms => {
                    if self.read_atoms(schema, frame)? {
                        return Ok(true);
                    }
                }
                Section::Other => {
                    log::debug!("skipping section '{}'", line.trim());
                    self.skip_section()?;
                }
            }
        }
    }

    /// Mark the current frame as damaged. Only the first problem is kept.
    fn damage(&mut self, reason: impl Into<String>) {
        if self.damaged.is_none() {
            self.damaged = Some(self.malformed(reason));
        }
    }

    /// Read the body line of a single-line section.
    ///
    /// If the section is cut short by the input ending or by another marker, the frame is
    /// damaged and [`None`] is returned.
    fn read_body(&mut self, what: &str) -> Result<Option<String>> {
        match self.next_line()? {
            Some(line) if Section::from_marker(&line).is_some() => {
                self.push_back(line);
                self.damage(format!("the {what} section is empty"));
                Ok(None)
            }
            Some(line) => Ok(Some(line)),
            None => {
                log::warn!("the lammps dump ended inside the {what} section");
                Ok(None)
            }
        }
    }

    fn read_box_bounds(&mut self) -> Result<()> {
        let mut lo = [0.0; 3];
        let mut hi = [0.0; 3];
        for axis in 0..3 {
            let Some(body) = self.read_body("box bounds")? else {
                return Ok(());
            };
            match parse_bounds(&body) {
                Some((min, max)) => {
                    lo[axis] = min;
                    hi[axis] = max;
                }
                None => {
                    self.damage(format!("could not read box bounds from '{}'", body.trim()));
                    return Ok(());
                }
            }
        }
        self.bounds = BoxBounds {
            lo: Vec3::from_array(lo),
            hi: Vec3::from_array(hi),
        };
        Ok(())
    }

    /// Read the atom lines following an atoms header.
    ///
    /// Returns `true` if a complete frame was read. If `false` is returned, the frame was skipped
    /// or the input ended.
    fn read_atoms(&mut self, schema: &ColumnSchema, frame: &mut RawFrame) -> Result<bool> {
        let natoms = match self.natoms {
            Some(natoms) => natoms,
            None => {
                self.damage("atoms section appears before the number of atoms");
                0
            }
        };

        frame.values.resize(natoms, [0.0; 6]);
        for atom in 0..natoms {
            let Some(line) = self.next_line()? else {
                log::warn!(
                    "the lammps dump ended after {atom} of {natoms} atoms of step {}, dropping this frame",
                    self.step
                );
                return Ok(false);
            };
            if Section::from_marker(&line).is_some() {
                self.push_back(line);
                self.damage(format!("expected {natoms} atom lines, found {atom}"));
                break;
            }
            if self.damaged.is_some() {
                continue;
            }
            match schema.extract(&line) {
                Ok(values) => frame.values[atom] = values,
                Err(reason) => self.damage(reason),
            }
        }

        if let Some(err) = self.damaged.take() {
            log::warn!("skipping frame at step {}: {err}", self.step);
            self.skipped += 1;
            return Ok(false);
        }

        frame.step = self.step;
        frame.bounds = self.bounds;
        Ok(true)
    }

    /// Skip over the body of a section we do not know, up to the next marker.
    fn skip_section(&mut self) -> Result<()> {
        while let Some(line) = self.next_line()? {
            if Section::from_marker(&line).is_some() {
                self.push_back(line);
                break;
            }
        }
        Ok(())
    }
}

/// Tilt factors in the box bounds marker mean the box is triclinic.
fn check_orthorhombic(marker: &str) -> Result<()> {
    if marker.split_whitespace().any(|flag| flag == "xy") {
        return Err(Error::Unsupported(
            "triclinic boxes are not supported, the box must be orthorhombic".to_string(),
        ));
    }
    Ok(())
}

fn parse_natoms(line: &str) -> std::result::Result<usize, String> {
    let natoms: usize = line
        .trim()
        .parse()
        .map_err(|_| format!("could not read number of atoms from '{}'", line.trim()))?;
    if natoms > MAX_ATOMS {
        return Err(format!(
            "{natoms} atoms do not fit in a trr frame, at most {MAX_ATOMS} are allowed"
        ));
    }
    Ok(natoms)
}

fn parse_bounds(line: &str) -> Option<(f32, f32)> {
    let mut tokens = line.split_whitespace();
    let min = tokens.next()?.parse().ok()?;
    let max = tokens.next()?.parse().ok()?;
    Some((min, max))
}
