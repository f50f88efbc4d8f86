//! Reading gromacs trr trajectories back in.
//!
//! This is the counterpart of [`TrrWriter`](crate::TrrWriter), used to check what was written.
//! Only single precision frames can be read. Blocks that a [`Frame`] has no place for (the
//! virial, pressure and forces) are skipped.
use std::io::{self, Read};
use std::path::Path;

use glam::Vec3;

use crate::trr::TrrHeader;
use crate::{BoxVec, Frame};

#[derive(Debug, Clone)]
pub struct TrrReader<R> {
    pub file: R,
    step: usize,
}

impl TrrReader<io::BufReader<std::fs::File>> {
    pub fn open<P: AsRef<Path>>(path: P) -> io::Result<Self> {
        let file = std::fs::File::open(path)?;
        Ok(Self::new(io::BufReader::new(file)))
    }
}

impl<R: Read> TrrReader<R> {
    pub fn new(reader: R) -> Self {
        Self {
            file: reader,
            step: 0,
        }
    }

    /// The number of frames read so far.
    pub fn nframes(&self) -> usize {
        self.step
    }

    /// A convenience function to read all frames in a trajectory.
    pub fn read_all_frames(&mut self) -> io::Result<Box<[Frame]>> {
        let mut frames = Vec::new();
        loop {
            let mut frame = Frame::default();
            if let Err(err) = self.read_frame(&mut frame) {
                match err.kind() {
                    // We have found the end of the file. No more frames, we're done.
                    io::ErrorKind::UnexpectedEof => break,
                    // Something else went wrong...
                    _ => Err(err)?,
                }
            }
            frames.push(frame);
        }
        Ok(frames.into_boxed_slice())
    }

    pub fn read_header(&mut self) -> io::Result<TrrHeader> {
        let file = &mut self.file;

        let magic = read_i32(file)?;
        if magic != TrrHeader::MAGIC {
            return Err(invalid_data(format!(
                "found invalid magic number '{magic}' ({magic:#0x})"
            )));
        }
        let _slen = read_i32(file)?;
        let version = read_string(file)?;
        if version != TrrHeader::VERSION {
            return Err(invalid_data(format!("found unknown version '{version}'")));
        }

        let mut sizes = [0; 13];
        for size in &mut sizes {
            *size = read_i32(file)?;
        }
        let [ir_size, e_size, box_size, vir_size, pres_size, top_size, sym_size, x_size, v_size, f_size, natoms, step, nre] =
            sizes;

        let header = TrrHeader {
            ir_size,
            e_size,
            box_size,
            vir_size,
            pres_size,
            top_size,
            sym_size,
            x_size,
            v_size,
            f_size,
            natoms,
            step,
            nre,
            ..TrrHeader::default()
        };
        if float_size(&header)? != 4 {
            return Err(invalid_data(
                "only single precision trr files can be read".to_string(),
            ));
        }

        Ok(TrrHeader {
            time: read_f32(file)?,
            lambda: read_f32(file)?,
            ..header
        })
    }

    /// Reads a [`Frame`] and advances one step.
    pub fn read_frame(&mut self, frame: &mut Frame) -> io::Result<()> {
        let header = self.read_header()?;
        let natoms: usize = header
            .natoms
            .try_into()
            .map_err(|_| invalid_data(format!("invalid number of atoms {}", header.natoms)))?;
        let file = &mut self.file;

        frame.boxvec = if header.box_size != 0 {
            read_boxvec(file)?
        } else {
            BoxVec::ZERO
        };
        skip(file, header.vir_size)?;
        skip(file, header.pres_size)?;
        read_vecs(file, header.x_size, natoms, &mut frame.positions)?;
        read_vecs(file, header.v_size, natoms, &mut frame.velocities)?;
        skip(file, header.f_size)?;

        self.step += 1;

        frame.step = header
            .step
            .try_into()
            .map_err(|_| invalid_data(format!("invalid step {}", header.step)))?;
        frame.time = header.time;
        frame.lambda = header.lambda;

        Ok(())
    }
}

/// Determine the size of the floats in a frame from the sizes of its blocks.
fn float_size(header: &TrrHeader) -> io::Result<i32> {
    let size = if header.box_size != 0 {
        header.box_size / 9
    } else if header.natoms == 0 {
        // Nothing to go on, and nothing to read either.
        4
    } else if header.x_size != 0 {
        header.x_size / header.natoms.saturating_mul(3)
    } else if header.v_size != 0 {
        header.v_size / header.natoms.saturating_mul(3)
    } else if header.f_size != 0 {
        header.f_size / header.natoms.saturating_mul(3)
    } else {
        4
    };
    match size {
        4 | 8 => Ok(size),
        weird => Err(invalid_data(format!("found invalid float size {weird}"))),
    }
}

fn invalid_data(msg: String) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidData, msg)
}

#[inline]
fn read_boxvec<R: Read>(file: &mut R) -> io::Result<BoxVec> {
    let mut boxvec = [0.0; 9];
    read_f32s(file, &mut boxvec)?;
    let cols = [
        [boxvec[0], boxvec[1], boxvec[2]],
        [boxvec[3], boxvec[4], boxvec[5]],
        [boxvec[6], boxvec[7], boxvec[8]],
    ];
    Ok(BoxVec::from_cols_array_2d(&cols))
}

/// Read a block of `natoms` vectors, or clear `vecs` if the block is absent.
fn read_vecs<R: Read>(file: &mut R, size: i32, natoms: usize, vecs: &mut Vec<Vec3>) -> io::Result<()> {
    vecs.clear();
    if size == 0 {
        return Ok(());
    }
    let mut buf = [0.0; 3];
    for _ in 0..natoms {
        read_f32s(file, &mut buf)?;
        vecs.push(Vec3::from_array(buf));
    }
    Ok(())
}

fn skip<R: Read>(file: &mut R, size: i32) -> io::Result<()> {
    let size: u64 = size
        .try_into()
        .map_err(|_| invalid_data(format!("invalid block size {size}")))?;
    let skipped = io::copy(&mut file.take(size), &mut io::sink())?;
    if skipped < size {
        return Err(io::ErrorKind::UnexpectedEof.into());
    }
    Ok(())
}

/// The only string in a trr header is its version, so anything longer than that is rejected
/// before it is read.
fn read_string<R: Read>(file: &mut R) -> io::Result<String> {
    let len: usize = read_i32(file)?
        .try_into()
        .map_err(|_| invalid_data("invalid string length".to_string()))?;
    if len > TrrHeader::VERSION.len() {
        return Err(invalid_data(format!("found invalid version string length {len}")));
    }
    let padding = (4 - (len % 4)) % 4;
    let mut buf = vec![0; len + padding];
    file.read_exact(&mut buf)?;
    buf.truncate(len);
    String::from_utf8(buf).map_err(|err| invalid_data(err.to_string()))
}

pub(crate) fn read_f32s<R: Read>(file: &mut R, buf: &mut [f32]) -> io::Result<()> {
    for value in buf {
        *value = read_f32(file)?
    }
    Ok(())
}

pub(crate) fn read_f32<R: Read>(file: &mut R) -> io::Result<f32> {
    let mut buf: [u8; 4] = Default::default();
    file.read_exact(&mut buf)?;
    Ok(f32::from_be_bytes(buf))
}

pub(crate) fn read_i32<R: Read>(file: &mut R) -> io::Result<i32> {
    let mut buf: [u8; 4] = Default::default();
    file.read_exact(&mut buf)?;
    Ok(i32::from_be_bytes(buf))
}
