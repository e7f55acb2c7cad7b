//! Writing rasters and strips
//!
//! The encoders here mirror the decoder: [`BitWriter`] packs samples with the same bit order
//! conventions [`BitReader`](crate::decoder::BitReader) reads them with, [`encode_strips`]
//! produces strips [`decompress`](crate::decoder::decompress) accepts and
//! [`difference_row`] is the inverse of the horizontal predictor.

use std::io::{self, Write};

use crate::decoder::{BitOrder, StripDescriptor};
use crate::raster::Raster;

mod bmp;
pub mod compression;
mod pnm;

pub use self::bmp::BmpEncoder;
pub use self::compression::{Compression, CompressionAlgorithm, Compressor};
pub use self::pnm::PnmEncoder;
pub use crate::decoder::PnmKind;

/// Serializes a whole raster into one image file.
pub trait ImageEncoder {
    fn encode<W: Write>(&self, raster: &Raster, writer: &mut W) -> io::Result<()>;

    /// Encode into a freshly allocated buffer.
    fn encode_to_vec(&self, raster: &Raster) -> io::Result<Vec<u8>> {
        let mut buffer = Vec::new();
        self.encode(raster, &mut buffer)?;
        Ok(buffer)
    }
}

/// Writes unsigned values of 0 to 32 bits into a byte sink.
#[derive(Debug)]
pub struct BitWriter<W: Write> {
    writer: W,
    order: BitOrder,
    cache: u64,
    bits_in_cache: u8,
}

impl<W: Write> BitWriter<W> {
    pub fn new(writer: W, order: BitOrder) -> Self {
        BitWriter {
            writer,
            order,
            cache: 0,
            bits_in_cache: 0,
        }
    }

    /// Append the low `count` bits of `value`.
    pub fn write_bits(&mut self, value: u32, count: u8) -> io::Result<()> {
        if count > 32 {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("can not write {} bits from one sample", count),
            ));
        }
        let value = u64::from(value) & ((1u64 << count) - 1);

        match self.order {
            BitOrder::Msb => self.cache = (self.cache << count) | value,
            BitOrder::Lsb => self.cache |= value << self.bits_in_cache,
        }
        self.bits_in_cache += count;

        while self.bits_in_cache >= 8 {
            let byte = match self.order {
                BitOrder::Msb => (self.cache >> (self.bits_in_cache - 8)) as u8,
                BitOrder::Lsb => {
                    let byte = self.cache as u8;
                    self.cache >>= 8;
                    byte
                }
            };
            self.writer.write_all(&[byte])?;
            self.bits_in_cache -= 8;
            self.cache &= (1u64 << self.bits_in_cache) - 1;
        }
        Ok(())
    }

    /// Complete a partially written byte with zero bits.
    pub fn flush(&mut self) -> io::Result<()> {
        if self.bits_in_cache > 0 {
            let padding = 8 - self.bits_in_cache;
            self.write_bits(0, padding)?;
        }
        Ok(())
    }

    /// Flush and hand back the sink.
    pub fn into_inner(mut self) -> io::Result<W> {
        self.flush()?;
        Ok(self.writer)
    }
}

/// Pack one row of interleaved samples, padding the row to a whole byte.
///
/// Fails with [`io::ErrorKind::InvalidInput`] for depths above 32 bits.
pub fn pack_row(samples: &[u32], bits_per_sample: &[u8], order: BitOrder) -> io::Result<Vec<u8>> {
    let mut writer = BitWriter::new(Vec::new(), order);
    for (&sample, &depth) in samples.iter().zip(bits_per_sample.iter().cycle()) {
        writer.write_bits(sample, depth)?;
    }
    writer.into_inner()
}

/// Replace each sample of a row by its difference to the same channel of the previous pixel.
///
/// `samples` holds whole pixels of `bits_per_sample.len()` interleaved channels.
pub fn difference_row(samples: &mut [u32], bits_per_sample: &[u8]) {
    let channels = bits_per_sample.len();
    if channels == 0 {
        return;
    }

    for index in (channels..samples.len()).rev() {
        let depth = bits_per_sample[index % channels];
        let mask = ((1u64 << depth.min(32)) - 1) as u32;
        samples[index] = samples[index].wrapping_sub(samples[index - channels]) & mask;
    }
}

/// Split byte aligned rows into compressed strips of `rows_per_strip` rows each.
///
/// Returns the concatenated strip payloads and a descriptor per strip. Offsets are relative to
/// the start of the payload, see [`StripDescriptor::shifted`].
pub fn encode_strips(
    rows: &[u8],
    row_bytes: usize,
    rows_per_strip: u32,
    compressor: &mut Compressor,
) -> io::Result<(Vec<u8>, Vec<StripDescriptor>)> {
    if row_bytes == 0 || rows.len() % row_bytes != 0 {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!(
                "{} bytes do not make up rows of {} bytes",
                rows.len(),
                row_bytes
            ),
        ));
    }

    let strip_bytes = row_bytes * rows_per_strip.max(1) as usize;
    let mut payload = Vec::new();
    let mut strips = Vec::new();

    for strip in rows.chunks(strip_bytes) {
        let offset = payload.len() as u64;
        let byte_count = compressor.write_to(&mut payload, strip)?;
        strips.push(StripDescriptor {
            offset,
            byte_count,
            uncompressed_len: strip.len(),
            rows: (strip.len() / row_bytes) as u32,
        });
    }

    Ok((payload, strips))
}
