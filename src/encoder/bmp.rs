use std::collections::HashMap;
use std::io::{self, Write};

use super::{BitWriter, ImageEncoder};
use crate::decoder::BitOrder;
use crate::raster::{channels, Raster};

const FILE_HEADER_SIZE: u32 = 14;
const INFO_HEADER_SIZE: u32 = 40;
const BI_RGB: u32 = 0;
const MAX_PALETTE: usize = 256;

/// Writes uncompressed Windows bitmaps.
///
/// Images with at most 256 distinct colours are stored with a palette at 1, 4 or 8 bits per
/// pixel, everything else as 24 bit BGR. Alpha is dropped.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BmpEncoder;

impl BmpEncoder {
    pub fn new() -> Self {
        BmpEncoder
    }
}

/// Distinct RGB values in order of first appearance, `None` if there are too many.
fn palette(raster: &Raster) -> Option<(Vec<u32>, HashMap<u32, u32>)> {
    let mut colors = Vec::new();
    let mut indices = HashMap::new();
    for &pixel in raster.as_slice() {
        let rgb = pixel & 0x00FF_FFFF;
        if !indices.contains_key(&rgb) {
            if colors.len() == MAX_PALETTE {
                return None;
            }
            indices.insert(rgb, colors.len() as u32);
            colors.push(rgb);
        }
    }
    Some((colors, indices))
}

fn bits_per_pixel(colors: usize) -> u8 {
    match colors {
        0..=2 => 1,
        3..=16 => 4,
        _ => 8,
    }
}

/// Rows are padded to a multiple of four bytes.
fn stride(width: u32, bits_per_pixel: u8) -> usize {
    (width as usize * bits_per_pixel as usize + 31) / 32 * 4
}

fn pad_row(row: &mut Vec<u8>, stride: usize) {
    row.resize(stride, 0);
}

fn too_large(field: &str) -> io::Error {
    io::Error::new(
        io::ErrorKind::InvalidInput,
        format!("the image {} does not fit a bitmap header", field),
    )
}

impl ImageEncoder for BmpEncoder {
    fn encode<W: Write>(&self, raster: &Raster, writer: &mut W) -> io::Result<()> {
        let palette = palette(raster);
        let bits_per_pixel = palette
            .as_ref()
            .map_or(24, |(colors, _)| bits_per_pixel(colors.len()));
        let stride = stride(raster.width(), bits_per_pixel);

        let width = i32::try_from(raster.width()).map_err(|_| too_large("width"))?;
        let height = i32::try_from(raster.height()).map_err(|_| too_large("height"))?;
        let palette_len = palette.as_ref().map_or(0, |(colors, _)| colors.len() as u32);
        let data_offset = FILE_HEADER_SIZE + INFO_HEADER_SIZE + 4 * palette_len;
        let image_size = stride
            .checked_mul(raster.height() as usize)
            .and_then(|size| u32::try_from(size).ok())
            .ok_or_else(|| too_large("image size"))?;
        let file_size = data_offset
            .checked_add(image_size)
            .ok_or_else(|| too_large("file size"))?;

        // Bottom-up row order.
        let mut image_data = Vec::with_capacity(image_size as usize);
        for row in raster.rows().collect::<Vec<_>>().into_iter().rev() {
            let mut bytes = match &palette {
                Some((_, indices)) => {
                    let mut bits = BitWriter::new(Vec::with_capacity(stride), BitOrder::Msb);
                    for pixel in row {
                        let index = indices.get(&(pixel & 0x00FF_FFFF)).copied().unwrap_or(0);
                        bits.write_bits(index, bits_per_pixel)?;
                    }
                    bits.into_inner()?
                }
                None => row
                    .iter()
                    .flat_map(|&pixel| {
                        let [_, r, g, b] = channels(pixel);
                        [b, g, r]
                    })
                    .collect(),
            };
            pad_row(&mut bytes, stride);
            image_data.extend_from_slice(&bytes);
        }

        // BITMAPFILEHEADER
        writer.write_all(b"BM")?;
        writer.write_all(&file_size.to_le_bytes())?;
        writer.write_all(&0u32.to_le_bytes())?;
        writer.write_all(&data_offset.to_le_bytes())?;

        // BITMAPINFOHEADER
        writer.write_all(&INFO_HEADER_SIZE.to_le_bytes())?;
        writer.write_all(&width.to_le_bytes())?;
        writer.write_all(&height.to_le_bytes())?;
        writer.write_all(&1u16.to_le_bytes())?;
        writer.write_all(&u16::from(bits_per_pixel).to_le_bytes())?;
        writer.write_all(&BI_RGB.to_le_bytes())?;
        writer.write_all(&image_size.to_le_bytes())?;
        writer.write_all(&0u32.to_le_bytes())?;
        writer.write_all(&0u32.to_le_bytes())?;
        writer.write_all(&palette_len.to_le_bytes())?;
        writer.write_all(&0u32.to_le_bytes())?;

        if let Some((colors, _)) = &palette {
            for &rgb in colors {
                let [_, r, g, b] = channels(rgb);
                writer.write_all(&[b, g, r, 0])?;
            }
        }

        writer.write_all(&image_data)
    }
}
