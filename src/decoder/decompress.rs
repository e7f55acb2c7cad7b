//! Turning a compressed strip into exactly the number of bytes it declares.

use std::io::{self, Read};

use log::trace;

use super::rle;
use super::stream::PackBitsReader;
#[cfg(feature = "deflate")]
use super::stream::DeflateReader;
#[cfg(feature = "lzw")]
use super::stream::LZWReader;
use crate::tags::CompressionMethod;
use crate::{DecodeError, DecodeResult};

/// Decompress `input` with `method`, yielding exactly `expected_len` bytes.
///
/// Output that is shorter or longer than `expected_len`, as well as malformed input, is reported
/// as [`DecodeError::CorruptStream`]. The BMP run length methods address pixels by row, here
/// the whole output is one row; see [`decompress_rows`].
pub fn decompress(
    input: &[u8],
    method: CompressionMethod,
    expected_len: usize,
) -> DecodeResult<Vec<u8>> {
    decompress_rows(input, method, expected_len, expected_len)
}

/// Like [`decompress`], for output made of rows of `row_len` bytes.
pub fn decompress_rows(
    input: &[u8],
    method: CompressionMethod,
    expected_len: usize,
    row_len: usize,
) -> DecodeResult<Vec<u8>> {
    trace!(
        "decompressing {} bytes with {:?}, expecting {} in rows of {}",
        input.len(),
        method,
        expected_len,
        row_len
    );

    match method {
        CompressionMethod::None => {
            if input.len() != expected_len {
                return Err(length_mismatch(input.len(), expected_len));
            }
            Ok(input.to_vec())
        }
        CompressionMethod::PackBits => read_expected(
            PackBitsReader::new(input, input.len() as u64),
            expected_len,
            false,
        ),
        // Some writers omit the end code once the declared data is complete.
        #[cfg(feature = "lzw")]
        CompressionMethod::LZW => {
            read_expected(LZWReader::new(input, input.len()), expected_len, true)
        }
        #[cfg(feature = "deflate")]
        CompressionMethod::Deflate | CompressionMethod::OldDeflate => {
            read_expected(DeflateReader::new(input), expected_len, false)
        }
        CompressionMethod::BmpRle8 => rle::expand(input, false, row_len, expected_len),
        CompressionMethod::BmpRle4 => rle::expand(input, true, row_len, expected_len),
        other => Err(DecodeError::UnsupportedCompression(other.to_u16())),
    }
}

fn length_mismatch(actual: usize, expected: usize) -> DecodeError {
    DecodeError::CorruptStream(format!(
        "strip decompressed to {} bytes, expected {}",
        actual, expected
    ))
}

/// Fill a buffer of `expected_len` bytes from `reader` and make sure nothing follows.
///
/// With `open_ended` the stream may stop with an unexpected end once the buffer is full.
fn read_expected<R: Read>(
    mut reader: R,
    expected_len: usize,
    open_ended: bool,
) -> DecodeResult<Vec<u8>> {
    let mut buffer = vec![0u8; expected_len];
    let mut filled = 0;

    while filled < expected_len {
        match reader.read(&mut buffer[filled..]) {
            Ok(0) => return Err(length_mismatch(filled, expected_len)),
            Ok(n) => filled += n,
            Err(ref e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(DecodeError::CorruptStream(e.to_string())),
        }
    }

    let mut trailing = [0u8; 1];
    loop {
        match reader.read(&mut trailing) {
            Ok(0) => return Ok(buffer),
            Ok(_) => {
                return Err(DecodeError::CorruptStream(format!(
                    "strip decompressed to more than the expected {} bytes",
                    expected_len
                )))
            }
            Err(ref e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(ref e) if open_ended && e.kind() == io::ErrorKind::UnexpectedEof => {
                return Ok(buffer)
            }
            Err(e) => return Err(DecodeError::CorruptStream(e.to_string())),
        }
    }
}
