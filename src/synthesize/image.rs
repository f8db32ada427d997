use std::{
    fs::File,
    io::{self, BufWriter, Write},
    path::Path,
};

use crate::synthesize::arch::Program;

/// A way of persisting a [Program] image as a flat sequence of 32-bit words in program order.
pub trait ImageFormat {
    fn write(&self, program: &Program, out: &mut impl Write) -> io::Result<()>;

    fn save(&self, program: &Program, path: impl AsRef<Path>) -> io::Result<()> {
        let mut out = BufWriter::new(File::create(path)?);
        self.write(program, &mut out)?;
        out.flush()
    }
}

/// Words written back to back in host byte order.
#[derive(Debug, Default, Clone, Copy)]
pub struct RawImage;

impl ImageFormat for RawImage {
    fn write(&self, program: &Program, out: &mut impl Write) -> io::Result<()> {
        out.write_all(bytemuck::cast_slice(program.words()))
    }
}

/// One `0x%08x` word per line.
#[derive(Debug, Default, Clone, Copy)]
pub struct HexImage;

impl ImageFormat for HexImage {
    fn write(&self, program: &Program, out: &mut impl Write) -> io::Result<()> {
        for word in program.words() {
            writeln!(out, "{word:#010x}")?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::synthesize::arch::Address;

    fn program() -> Program {
        Program::new(vec![0x2008_0005, 0, 0x1528_fffe], Address(0x0040_0000))
    }

    #[test]
    fn raw_image_is_four_bytes_per_word() {
        let mut out = Vec::new();
        RawImage.write(&program(), &mut out).unwrap();

        assert_eq!(out.len(), 12);
        let words: Vec<u32> = out
            .chunks_exact(4)
            .map(|b| u32::from_ne_bytes([b[0], b[1], b[2], b[3]]))
            .collect();
        assert_eq!(words, program().words());
    }

    #[test]
    fn hex_image_is_one_word_per_line() {
        let mut out = Vec::new();
        HexImage.write(&program(), &mut out).unwrap();

        assert_eq!(
            String::from_utf8(out).unwrap(),
            "0x20080005\n0x00000000\n0x1528fffe\n"
        );
    }

    #[test]
    fn empty_program_writes_nothing() {
        let empty = Program::new(Vec::new(), Address(0));
        let mut out = Vec::new();
        RawImage.write(&empty, &mut out).unwrap();
        HexImage.write(&empty, &mut out).unwrap();
        assert!(out.is_empty());
    }
}
