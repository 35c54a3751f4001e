// Copyright 2025-2026 CEMAXECUTER LLC

use std::io::{self, Write};

use byteorder::{LittleEndian, WriteBytesExt};
use num_complex::Complex32;

/// Raw binary capture of a sample stream for offline inspection.
///
/// Items are written back to back, little-endian, with no framing:
/// complex-float items as interleaved f32 I/Q pairs (8 bytes), short items
/// as single i16 words (2 bytes). The layout matches what the front end
/// consumes, so a capture can be replayed as an input file.
pub struct SampleDump<W: Write> {
    writer: W,
    item_size: usize,
    items_written: u64,
}

impl<W: Write> SampleDump<W> {
    pub fn new(writer: W, item_size: usize) -> Self {
        Self {
            writer,
            item_size,
            items_written: 0,
        }
    }

    /// Append complex-float items (8 bytes each).
    pub fn write_complex(&mut self, samples: &[Complex32]) -> io::Result<()> {
        for s in samples {
            self.writer.write_f32::<LittleEndian>(s.re)?;
            self.writer.write_f32::<LittleEndian>(s.im)?;
        }
        self.items_written += samples.len() as u64;
        Ok(())
    }

    /// Append short items (2 bytes each).
    pub fn write_short(&mut self, samples: &[i16]) -> io::Result<()> {
        for &s in samples {
            self.writer.write_i16::<LittleEndian>(s)?;
        }
        self.items_written += samples.len() as u64;
        Ok(())
    }

    pub fn flush(&mut self) -> io::Result<()> {
        self.writer.flush()
    }

    pub fn item_size(&self) -> usize {
        self.item_size
    }

    pub fn items_written(&self) -> u64 {
        self.items_written
    }

    pub fn bytes_written(&self) -> u64 {
        self.items_written * self.item_size as u64
    }
}
