//! Windows bitmaps with a `BITMAPINFOHEADER` or one of its extensions.
//!
//! The pixel data is described as a single strip with rows padded to four bytes, stored
//! bottom-up unless the header height is negative, and goes through the strip pipeline.
//! Palette images may be uncompressed or use `BI_RLE8`/`BI_RLE4`.

use std::io::{Read, Seek, SeekFrom};

use log::debug;

use super::image::ImageLayout;
use super::scan::StripScanDecoder;
use super::Limits;
use crate::raster::{argb, channels, Raster};
use crate::tags::{CompressionMethod, PhotometricInterpretation};
use crate::{DecodeError, DecodeResult};

const FILE_HEADER_SIZE: usize = 14;
const INFO_HEADER_SIZE: u32 = 40;

const BI_RGB: u32 = 0;
const BI_RLE8: u32 = 1;
const BI_RLE4: u32 = 2;

/// The fields of the file and info headers the decoder uses.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BmpHeader {
    pub width: u32,
    pub height: u32,
    /// The top row is stored first, written as a negative height.
    pub top_down: bool,
    pub bits_per_pixel: u16,
    /// The `biCompression` value.
    pub compression: u32,
    /// Start of the pixel data, counted from the `BM` signature.
    pub data_offset: u32,
    /// Size of the pixel data. Writers may leave it 0 for uncompressed images.
    pub image_size: u32,
    /// The colour table as packed ARGB, empty above 8 bits per pixel.
    pub palette: Vec<u32>,
}

/// Read a whole bitmap from `reader` with the default [`Limits`].
pub fn read_bmp<R: Read + Seek>(reader: &mut R) -> DecodeResult<Raster> {
    read_bmp_with_limits(reader, &Limits::default())
}

pub(crate) fn read_bmp_with_limits<R: Read + Seek>(
    reader: &mut R,
    limits: &Limits,
) -> DecodeResult<Raster> {
    let start = reader.stream_position()?;
    let header = read_header(reader)?;
    debug!(
        "bmp {}x{}, {} bits per pixel, compression {}, {} palette entries",
        header.width,
        header.height,
        header.bits_per_pixel,
        header.compression,
        header.palette.len()
    );

    let pixels = (header.width as usize).saturating_mul(header.height as usize);
    if pixels.saturating_mul(4) > limits.decoding_buffer_size {
        return Err(DecodeError::LimitsExceeded);
    }
    let mut raster = Raster::new(header.width, header.height);

    let layout = pixel_layout(&header, reader, start)?;
    StripScanDecoder::new(&layout)?
        .with_limits(limits.clone())
        .decode(reader, &mut raster)?;

    if layout.photometric_interpretation == PhotometricInterpretation::RGB {
        // Stored as blue, green, red.
        for pixel in raster.as_mut_slice() {
            let [alpha, red, green, blue] = channels(*pixel);
            *pixel = argb(alpha, blue, green, red);
        }
    }

    Ok(raster)
}

fn pixel_layout<R: Seek>(
    header: &BmpHeader,
    reader: &mut R,
    start: u64,
) -> DecodeResult<ImageLayout> {
    let depth = header.bits_per_pixel;
    let (bits, photometric, compression) = match (header.compression, depth) {
        (BI_RGB, 1 | 4 | 8) => (
            vec![depth as u8],
            PhotometricInterpretation::RGBPalette,
            CompressionMethod::None,
        ),
        (BI_RGB, 24) => (
            vec![8; 3],
            PhotometricInterpretation::RGB,
            CompressionMethod::None,
        ),
        (BI_RLE8, 8) => (
            vec![8],
            PhotometricInterpretation::RGBPalette,
            CompressionMethod::BmpRle8,
        ),
        (BI_RLE4, 4) => (
            vec![4],
            PhotometricInterpretation::RGBPalette,
            CompressionMethod::BmpRle4,
        ),
        (BI_RGB | BI_RLE8 | BI_RLE4, _) => {
            let photometric = if depth > 8 {
                PhotometricInterpretation::RGB
            } else {
                PhotometricInterpretation::RGBPalette
            };
            return Err(DecodeError::UnsupportedPixelEncoding {
                photometric: photometric.to_u16(),
                bits_per_sample: vec![u8::try_from(depth).unwrap_or(u8::MAX)],
            });
        }
        (other, _) => {
            return Err(DecodeError::UnsupportedCompression(
                u16::try_from(other).unwrap_or(u16::MAX),
            ))
        }
    };

    let mut layout = ImageLayout::new(header.width, header.height, bits, photometric)
        .with_compression(compression)
        .with_row_alignment(4)
        .with_bottom_up(!header.top_down);
    if photometric == PhotometricInterpretation::RGBPalette {
        layout = layout.with_palette(header.palette.clone());
    }

    let offset = start + u64::from(header.data_offset);
    let byte_count = match compression {
        CompressionMethod::None => (layout.row_bytes() as u64).saturating_mul(u64::from(header.height)),
        _ if header.image_size > 0 => u64::from(header.image_size),
        _ => reader.seek(SeekFrom::End(0))?.saturating_sub(offset),
    };

    Ok(layout.with_strip_ranges(header.height, &[(offset, byte_count)]))
}

fn read_header<R: Read + Seek>(reader: &mut R) -> DecodeResult<BmpHeader> {
    let mut file_header = [0u8; FILE_HEADER_SIZE];
    reader.read_exact(&mut file_header)?;
    if &file_header[..2] != b"BM" {
        return Err(DecodeError::CorruptStream("missing BM signature".into()));
    }
    let data_offset = le_u32(&file_header, 10);

    let mut info = [0u8; INFO_HEADER_SIZE as usize];
    reader.read_exact(&mut info)?;
    let info_size = le_u32(&info, 0);
    if info_size < INFO_HEADER_SIZE {
        return Err(DecodeError::CorruptStream(format!(
            "info header of {} bytes is too short",
            info_size
        )));
    }

    let width = le_u32(&info, 4) as i32;
    let height = le_u32(&info, 8) as i32;
    let bits_per_pixel = u16::from_le_bytes([info[14], info[15]]);
    let compression = le_u32(&info, 16);
    let image_size = le_u32(&info, 20);
    let colors_used = le_u32(&info, 32);

    let width = u32::try_from(width)
        .map_err(|_| DecodeError::CorruptStream(format!("negative width {}", width)))?;

    // The colour table follows the info header and any of its extensions.
    reader.seek(SeekFrom::Current(i64::from(info_size - INFO_HEADER_SIZE)))?;
    let palette = if bits_per_pixel <= 8 {
        let capacity = 1u32 << bits_per_pixel;
        let entries = if colors_used == 0 {
            capacity
        } else {
            colors_used
        };
        if entries > capacity {
            return Err(DecodeError::CorruptStream(format!(
                "{} colours do not fit {} bits per pixel",
                entries, bits_per_pixel
            )));
        }
        let mut table = vec![0u8; entries as usize * 4];
        reader.read_exact(&mut table)?;
        table
            .chunks_exact(4)
            .map(|bgr| argb(0xFF, bgr[2], bgr[1], bgr[0]))
            .collect()
    } else {
        Vec::new()
    };

    Ok(BmpHeader {
        width,
        height: height.unsigned_abs(),
        top_down: height < 0,
        bits_per_pixel,
        compression,
        data_offset,
        image_size,
        palette,
    })
}

fn le_u32(bytes: &[u8], at: usize) -> u32 {
    u32::from_le_bytes([bytes[at], bytes[at + 1], bytes[at + 2], bytes[at + 3]])
}
