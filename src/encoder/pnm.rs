use std::io::{self, Write};

use super::{BitWriter, ImageEncoder};
use crate::decoder::{BitOrder, PnmKind};
use crate::raster::{channels, Raster};

/// Writes PBM, PGM or PPM files with 8 bit samples.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PnmEncoder {
    kind: PnmKind,
    raw: bool,
}

impl PnmEncoder {
    /// `raw` selects binary samples, otherwise samples are written as ASCII numbers.
    pub fn new(kind: PnmKind, raw: bool) -> Self {
        PnmEncoder { kind, raw }
    }

    pub fn kind(&self) -> PnmKind {
        self.kind
    }

    fn write_header<W: Write>(&self, raster: &Raster, writer: &mut W) -> io::Result<()> {
        write!(
            writer,
            "P{} {} {} ",
            self.kind.magic(self.raw) as char,
            raster.width(),
            raster.height()
        )?;
        if self.kind != PnmKind::Bitmap {
            writer.write_all(b"255 ")?;
        }
        Ok(())
    }
}

fn gray(pixel: u32) -> u8 {
    let [_, r, g, b] = channels(pixel);
    ((u32::from(r) + u32::from(g) + u32::from(b)) / 3) as u8
}

/// A set bit is black.
fn black_bit(pixel: u32) -> u32 {
    u32::from(gray(pixel) <= 127)
}

impl ImageEncoder for PnmEncoder {
    fn encode<W: Write>(&self, raster: &Raster, writer: &mut W) -> io::Result<()> {
        self.write_header(raster, writer)?;

        for row in raster.rows() {
            match (self.kind, self.raw) {
                (PnmKind::Bitmap, true) => {
                    let mut bits = BitWriter::new(&mut *writer, BitOrder::Msb);
                    for &pixel in row {
                        bits.write_bits(black_bit(pixel), 1)?;
                    }
                    bits.flush()?;
                }
                (PnmKind::Bitmap, false) => {
                    for &pixel in row {
                        write!(writer, "{} ", black_bit(pixel))?;
                    }
                }
                (PnmKind::Graymap, true) => {
                    let samples: Vec<u8> = row.iter().map(|&p| gray(p)).collect();
                    writer.write_all(&samples)?;
                }
                (PnmKind::Graymap, false) => {
                    for &pixel in row {
                        write!(writer, "{} ", gray(pixel))?;
                    }
                }
                (PnmKind::Pixmap, true) => {
                    let samples: Vec<u8> = row
                        .iter()
                        .flat_map(|&p| {
                            let [_, r, g, b] = channels(p);
                            [r, g, b]
                        })
                        .collect();
                    writer.write_all(&samples)?;
                }
                (PnmKind::Pixmap, false) => {
                    for &pixel in row {
                        let [_, r, g, b] = channels(pixel);
                        write!(writer, "{} {} {} ", r, g, b)?;
                    }
                }
            }
        }
        Ok(())
    }
}
