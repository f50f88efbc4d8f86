use std::fmt::Write;
use std::io::Cursor;

use bencher::{benchmark_group, benchmark_main, Bencher};
use lammps2trr::{stream, Converter, DumpReader, Frame, MatchPolicy, RawFrame, TrrWriter};

benchmark_main!(reading, converting);
benchmark_group!(reading, read_frames, convert_and_write);
benchmark_group!(converting, convert_frame);

const NATOMS: usize = 5000;
const NFRAMES: usize = 10;

/// Generate a dump of `nframes` frames of `natoms` atoms each.
fn dump(natoms: usize, nframes: usize) -> String {
    let mut text = String::new();
    for step in 0..nframes {
        writeln!(text, "ITEM: TIMESTEP\n{}", step * 1000).unwrap();
        writeln!(text, "ITEM: NUMBER OF ATOMS\n{natoms}").unwrap();
        writeln!(text, "ITEM: BOX BOUNDS pp pp pp\n-20 20\n-20 20\n-20 20").unwrap();
        writeln!(text, "ITEM: ATOMS id type xu yu zu vx vy vz").unwrap();
        for atom in 0..natoms {
            let x = (atom % 40) as f32 - 19.5;
            let y = ((atom / 40) % 40) as f32 - 19.5;
            let z = (atom / 1600) as f32 - 19.5;
            writeln!(text, "{} 1 {x} {y} {z} 0.001 -0.002 0.003", atom + 1).unwrap();
        }
    }
    text
}

fn read_frames(b: &mut Bencher) {
    let text = dump(NATOMS, NFRAMES);
    let mut frame = RawFrame::default();
    b.iter(|| {
        let mut reader = DumpReader::new(Cursor::new(text.as_bytes()));
        let discovery = reader.discover(MatchPolicy::Exact).unwrap();
        while reader.read_frame(&discovery.schema, &mut frame).unwrap() {}
    });
}

fn convert_and_write(b: &mut Bencher) {
    let text = dump(NATOMS, NFRAMES);
    let mut output = Vec::new();
    b.iter(|| {
        output.clear();
        let mut reader = DumpReader::new(Cursor::new(text.as_bytes()));
        let discovery = reader.discover(MatchPolicy::Exact).unwrap();
        stream(reader, &discovery, TrrWriter::new(&mut output), 0.001).unwrap()
    });
}

fn convert_frame(b: &mut Bencher) {
    let text = dump(NATOMS, 1);
    let mut reader = DumpReader::new(Cursor::new(text.as_bytes()));
    let discovery = reader.discover(MatchPolicy::Exact).unwrap();
    let mut raw = RawFrame::default();
    reader.read_frame(&discovery.schema, &mut raw).unwrap();

    let converter = Converter::new(0.001);
    let mut frame = Frame::default();
    b.iter(|| converter.convert(&raw, &mut frame));
}
