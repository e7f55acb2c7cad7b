//! Netpbm files: PBM, PGM and PPM in their plain and raw flavours.
//!
//! Raw files are described as a single uncompressed strip and go through the regular strip
//! pipeline. Plain files are sequences of ASCII numbers and are converted directly.

use std::io::{self, Read, Seek};

use log::{debug, warn};

use super::image::{row_bytes, ImageLayout};
use super::scan::StripScanDecoder;
use super::Limits;
use crate::raster::{argb, Raster};
use crate::tags::PhotometricInterpretation;
use crate::{DecodeError, DecodeResult};

/// The image kinds of the Netpbm family.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PnmKind {
    /// PBM, one bit per pixel.
    Bitmap,
    /// PGM, gray levels.
    Graymap,
    /// PPM, RGB triples.
    Pixmap,
}

impl PnmKind {
    /// The digit following `P` in the magic number.
    pub fn magic(self, raw: bool) -> u8 {
        match (self, raw) {
            (PnmKind::Bitmap, false) => b'1',
            (PnmKind::Graymap, false) => b'2',
            (PnmKind::Pixmap, false) => b'3',
            (PnmKind::Bitmap, true) => b'4',
            (PnmKind::Graymap, true) => b'5',
            (PnmKind::Pixmap, true) => b'6',
        }
    }

    fn from_magic(digit: u8) -> Option<(PnmKind, bool)> {
        Some(match digit {
            b'1' => (PnmKind::Bitmap, false),
            b'2' => (PnmKind::Graymap, false),
            b'3' => (PnmKind::Pixmap, false),
            b'4' => (PnmKind::Bitmap, true),
            b'5' => (PnmKind::Graymap, true),
            b'6' => (PnmKind::Pixmap, true),
            _ => return None,
        })
    }

    fn channels(self) -> usize {
        match self {
            PnmKind::Bitmap | PnmKind::Graymap => 1,
            PnmKind::Pixmap => 3,
        }
    }
}

/// The values of a Netpbm header.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PnmHeader {
    pub kind: PnmKind,
    /// Samples are binary rather than ASCII.
    pub raw: bool,
    pub width: u32,
    pub height: u32,
    /// The largest sample value, always 1 for bitmaps.
    pub max_value: u32,
}

/// Read a whole Netpbm image from `reader` with the default [`Limits`].
pub fn read_pnm<R: Read + Seek>(reader: &mut R) -> DecodeResult<Raster> {
    read_pnm_with_limits(reader, &Limits::default())
}

pub(crate) fn read_pnm_with_limits<R: Read + Seek>(
    reader: &mut R,
    limits: &Limits,
) -> DecodeResult<Raster> {
    let mut bytes = HeaderReader::new(&mut *reader);
    let header = bytes.read_header()?;
    debug!("pnm header {:?}", header);

    let pixels = header.width as usize * header.height as usize;
    if pixels.saturating_mul(4) > limits.decoding_buffer_size {
        return Err(DecodeError::LimitsExceeded);
    }
    let mut raster = Raster::new(header.width, header.height);
    if pixels == 0 {
        return Ok(raster);
    }

    if header.raw {
        let layout = raw_layout(&header, reader.stream_position()?)?;
        StripScanDecoder::new(&layout)?
            .with_limits(limits.clone())
            .decode(reader, &mut raster)?;
    } else {
        read_plain(&mut bytes, &header, &mut raster)?;
    }

    Ok(raster)
}

/// Describe the binary body of a raw file starting at `offset`.
fn raw_layout(header: &PnmHeader, offset: u64) -> DecodeResult<ImageLayout> {
    let photometric = match header.kind {
        PnmKind::Bitmap => PhotometricInterpretation::WhiteIsZero,
        PnmKind::Graymap => PhotometricInterpretation::BlackIsZero,
        PnmKind::Pixmap => PhotometricInterpretation::RGB,
    };
    let depth = match (header.kind, header.max_value) {
        (PnmKind::Bitmap, _) => 1,
        (_, 255) => 8,
        (_, 65535) => 16,
        _ => {
            return Err(DecodeError::UnsupportedPixelEncoding {
                photometric: photometric.to_u16(),
                bits_per_sample: Vec::new(),
            })
        }
    };
    let bits = vec![depth; header.kind.channels()];

    let length = row_bytes(header.width, &bits) as u64 * u64::from(header.height);
    Ok(
        ImageLayout::new(header.width, header.height, bits, photometric)
            .with_strip_ranges(header.height, &[(offset, length)]),
    )
}

fn read_plain<R: Read>(
    bytes: &mut HeaderReader<R>,
    header: &PnmHeader,
    raster: &mut Raster,
) -> DecodeResult<()> {
    let channels = header.kind.channels();
    let mut samples = [0u8; 3];

    for y in 0..header.height {
        for x in 0..header.width {
            for sample in samples.iter_mut().take(channels) {
                let value = match header.kind {
                    PnmKind::Bitmap => bytes.read_bit()?,
                    _ => bytes.read_number()?.ok_or(DecodeError::UnexpectedEndOfStream)?,
                };
                if value > header.max_value {
                    return Err(DecodeError::CorruptStream(format!(
                        "sample {} exceeds the maximum value {}",
                        value, header.max_value
                    )));
                }
                *sample = (u64::from(value) * 255 / u64::from(header.max_value)) as u8;
            }

            let pixel = match header.kind {
                // A set bit is black.
                PnmKind::Bitmap => {
                    let level = 255 - samples[0];
                    argb(0xFF, level, level, level)
                }
                PnmKind::Graymap => argb(0xFF, samples[0], samples[0], samples[0]),
                PnmKind::Pixmap => argb(0xFF, samples[0], samples[1], samples[2]),
            };
            raster.put_pixel(x, y, pixel)?;
        }
    }

    if bytes.has_more_tokens()? {
        warn!("plain pnm data continues after the last pixel");
    }
    Ok(())
}

/// Byte wise access to the ASCII parts of a Netpbm file.
///
/// Reads one byte at a time so that the underlying stream is positioned exactly at the start of
/// the binary body once the header is parsed.
struct HeaderReader<R> {
    inner: R,
    peeked: Option<u8>,
}

impl<R: Read> HeaderReader<R> {
    fn new(inner: R) -> Self {
        HeaderReader {
            inner,
            peeked: None,
        }
    }

    fn next_byte(&mut self) -> io::Result<Option<u8>> {
        if let Some(byte) = self.peeked.take() {
            return Ok(Some(byte));
        }
        let mut byte = [0u8; 1];
        loop {
            match self.inner.read(&mut byte) {
                Ok(0) => return Ok(None),
                Ok(_) => return Ok(Some(byte[0])),
                Err(ref e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
        }
    }

    fn read_header(&mut self) -> DecodeResult<PnmHeader> {
        let magic = [self.next_byte()?, self.next_byte()?];
        let (kind, raw) = match magic {
            [Some(b'P'), Some(digit)] => PnmKind::from_magic(digit),
            _ => None,
        }
        .ok_or_else(|| DecodeError::CorruptStream("not a pnm file".into()))?;

        let mut field = |name: &str| -> DecodeResult<u32> {
            self.read_number()?
                .ok_or_else(|| DecodeError::CorruptStream(format!("pnm header lacks the {}", name)))
        };
        let width = field("width")?;
        let height = field("height")?;
        let max_value = match kind {
            PnmKind::Bitmap => 1,
            _ => field("maximum value")?,
        };
        if max_value == 0 || max_value > 65535 {
            return Err(DecodeError::CorruptStream(format!(
                "invalid pnm maximum value {}",
                max_value
            )));
        }

        // A single whitespace byte separates the header from a binary body.
        if raw {
            match self.next_byte()? {
                Some(b) if b.is_ascii_whitespace() => {}
                _ => {
                    return Err(DecodeError::CorruptStream(
                        "pnm header is not terminated by whitespace".into(),
                    ))
                }
            }
        }

        Ok(PnmHeader {
            kind,
            raw,
            width,
            height,
            max_value,
        })
    }

    /// Skip whitespace and `#` comments, leaving the next significant byte peeked.
    fn skip_separators(&mut self) -> io::Result<Option<u8>> {
        loop {
            match self.next_byte()? {
                Some(b'#') => loop {
                    match self.next_byte()? {
                        Some(b'\n') | Some(b'\r') => break,
                        Some(_) => {}
                        None => return Ok(None),
                    }
                },
                Some(b) if b.is_ascii_whitespace() => {}
                Some(b) => {
                    self.peeked = Some(b);
                    return Ok(Some(b));
                }
                None => return Ok(None),
            }
        }
    }

    /// The next unsigned decimal number, `None` at the end of the input.
    ///
    /// The byte terminating the number stays peeked.
    fn read_number(&mut self) -> DecodeResult<Option<u32>> {
        if self.skip_separators()?.is_none() {
            return Ok(None);
        }

        let mut value: u32 = 0;
        let mut digits = 0;
        while let Some(byte) = self.next_byte()? {
            if byte.is_ascii_digit() {
                value = value
                    .checked_mul(10)
                    .and_then(|v| v.checked_add(u32::from(byte - b'0')))
                    .ok_or_else(|| DecodeError::CorruptStream("pnm number overflows".into()))?;
                digits += 1;
            } else if byte.is_ascii_whitespace() || byte == b'#' {
                self.peeked = Some(byte);
                break;
            } else {
                return Err(DecodeError::CorruptStream(format!(
                    "unexpected byte {:#04x} in pnm number",
                    byte
                )));
            }
        }

        if digits == 0 {
            return Err(DecodeError::CorruptStream("empty pnm number".into()));
        }
        Ok(Some(value))
    }

    /// One plain PBM sample. Bits may be separated by whitespace or packed together.
    fn read_bit(&mut self) -> DecodeResult<u32> {
        match self.skip_separators()? {
            None => Err(DecodeError::UnexpectedEndOfStream),
            Some(_) => match self.next_byte()? {
                Some(b'0') => Ok(0),
                Some(b'1') => Ok(1),
                Some(other) => Err(DecodeError::CorruptStream(format!(
                    "unexpected byte {:#04x} in plain pbm data",
                    other
                ))),
                None => Err(DecodeError::UnexpectedEndOfStream),
            },
        }
    }

    fn has_more_tokens(&mut self) -> io::Result<bool> {
        Ok(self.skip_separators()?.is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn read(data: &[u8]) -> DecodeResult<Raster> {
        read_pnm(&mut Cursor::new(data.to_vec()))
    }

    const BLACK: u32 = 0xFF000000;
    const WHITE: u32 = 0xFFFFFFFF;

    #[test]
    fn raw_bitmap() {
        let raster = read(b"P4\n# two by two\n2 2\n\x80\x40").unwrap();
        assert_eq!(raster.as_slice(), &[BLACK, WHITE, WHITE, BLACK]);
    }

    #[test]
    fn plain_bitmap_packed_and_spaced() {
        let raster = read(b"P1 3 2\n101\n0 1 0\n").unwrap();
        assert_eq!(raster.as_slice(), &[BLACK, WHITE, BLACK, WHITE, BLACK, WHITE]);
    }

    #[test]
    fn plain_graymap_is_scaled() {
        let raster = read(b"P2 2 1 15 0 15").unwrap();
        assert_eq!(raster.as_slice(), &[BLACK, WHITE]);
        let raster = read(b"P2 1 1 4 2").unwrap();
        assert_eq!(raster.as_slice(), &[0xFF7F7F7F]);
    }

    #[test]
    fn raw_pixmap_sixteen_bit() {
        let raster = read(b"P6 1 1 65535\n\x12\x34\xAB\xCD\xFF\x00").unwrap();
        assert_eq!(raster.as_slice(), &[0xFF12ABFF]);
    }

    #[test]
    fn raw_graymap_with_odd_maximum() {
        assert!(matches!(
            read(b"P5 1 1 100\n\x10"),
            Err(DecodeError::UnsupportedPixelEncoding { .. })
        ));
    }

    #[test]
    fn bad_headers() {
        assert!(matches!(read(b"P7 1 1"), Err(DecodeError::CorruptStream(_))));
        assert!(matches!(read(b"BM"), Err(DecodeError::CorruptStream(_))));
        assert!(matches!(read(b"P2 1"), Err(DecodeError::CorruptStream(_))));
        assert!(matches!(read(b"P2 1 x 255"), Err(DecodeError::CorruptStream(_))));
    }

    #[test]
    fn truncated_bodies() {
        assert!(matches!(
            read(b"P5 2 2 255\n\x01\x02\x03"),
            Err(DecodeError::UnexpectedEndOfStream)
        ));
        assert!(matches!(
            read(b"P3 1 1 255 1 2"),
            Err(DecodeError::UnexpectedEndOfStream)
        ));
    }

    #[test]
    fn empty_images_with_extreme_dimensions() {
        let raster = read(b"P4 0 4294967295\n").unwrap();
        assert_eq!(raster.dimensions(), (0, u32::MAX));
        assert!(raster.as_slice().is_empty());

        let raster = read(b"P1 4294967295 0").unwrap();
        assert_eq!(raster.dimensions(), (u32::MAX, 0));
        let raster = read(b"P5 0 4294967295 255\n").unwrap();
        assert_eq!(raster.height(), u32::MAX);
    }

    #[test]
    fn sample_above_maximum() {
        assert!(matches!(
            read(b"P2 1 1 10 11"),
            Err(DecodeError::CorruptStream(_))
        ));
    }
}
