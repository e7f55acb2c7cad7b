//! The run length schemes of Windows bitmaps, `BI_RLE8` and `BI_RLE4`.
//!
//! Both encode palette indices as pairs of bytes. A non-zero first byte repeats the second
//! byte (or its two nibbles, alternately) that many times. A zero first byte is an escape:
//! `0` ends the row, `1` ends the image, `2` is followed by a horizontal and a vertical skip,
//! and any larger value introduces that many literal pixels padded to an even byte count.
//! Skipped pixels keep index 0.

use crate::{DecodeError, DecodeResult};

const END_OF_ROW: u8 = 0;
const END_OF_IMAGE: u8 = 1;
const DELTA: u8 = 2;

/// Expand run length data into packed rows of `row_len` bytes, `expected_len` bytes in total.
///
/// With `nibbles` every pixel is four bits wide, high nibble first, otherwise one byte.
/// Data that ends without an end-of-image marker is accepted.
pub(crate) fn expand(
    input: &[u8],
    nibbles: bool,
    row_len: usize,
    expected_len: usize,
) -> DecodeResult<Vec<u8>> {
    let mut canvas = Canvas {
        data: vec![0; expected_len],
        row_len,
        nibbles,
        x: 0,
        y: 0,
    };
    let mut bytes = input.iter().copied();

    while let Some(count) = bytes.next() {
        let value = next(&mut bytes)?;
        match (count, value) {
            (0, END_OF_ROW) => {
                canvas.x = 0;
                canvas.y += 1;
            }
            (0, END_OF_IMAGE) => break,
            (0, DELTA) => {
                canvas.x += usize::from(next(&mut bytes)?);
                canvas.y += usize::from(next(&mut bytes)?);
            }
            (0, literal) => {
                let literal = usize::from(literal);
                let stored = if nibbles { (literal + 1) / 2 } else { literal };
                let mut packed = Vec::with_capacity(stored);
                for _ in 0..stored {
                    packed.push(next(&mut bytes)?);
                }
                for pixel in 0..literal {
                    canvas.put(select(&packed, pixel, nibbles))?;
                }
                // Literal runs are padded to a 16 bit boundary.
                if stored % 2 == 1 {
                    bytes.next();
                }
            }
            (run, value) => {
                let repeated = [value];
                for pixel in 0..usize::from(run) {
                    let pixel = if nibbles { pixel % 2 } else { 0 };
                    canvas.put(select(&repeated, pixel, nibbles))?;
                }
            }
        }
    }

    Ok(canvas.data)
}

fn next(bytes: &mut impl Iterator<Item = u8>) -> DecodeResult<u8> {
    bytes
        .next()
        .ok_or_else(|| DecodeError::CorruptStream("run length data ends inside a command".into()))
}

/// The `pixel`th index of `packed`, counted in nibbles when `nibbles` is set.
fn select(packed: &[u8], pixel: usize, nibbles: bool) -> u8 {
    if nibbles {
        let byte = packed[pixel / 2];
        if pixel % 2 == 0 {
            byte >> 4
        } else {
            byte & 0x0F
        }
    } else {
        packed[pixel]
    }
}

struct Canvas {
    data: Vec<u8>,
    row_len: usize,
    nibbles: bool,
    x: usize,
    y: usize,
}

impl Canvas {
    fn put(&mut self, index: u8) -> DecodeResult<()> {
        let pixels_per_row = if self.nibbles {
            self.row_len * 2
        } else {
            self.row_len
        };
        let byte = self
            .y
            .checked_mul(self.row_len)
            .and_then(|start| start.checked_add(if self.nibbles { self.x / 2 } else { self.x }));

        match byte {
            Some(byte) if self.x < pixels_per_row && byte < self.data.len() => {
                if !self.nibbles {
                    self.data[byte] = index;
                } else if self.x % 2 == 0 {
                    self.data[byte] |= index << 4;
                } else {
                    self.data[byte] |= index & 0x0F;
                }
                self.x += 1;
                Ok(())
            }
            _ => Err(DecodeError::CorruptStream(format!(
                "run length pixel ({}, {}) lies outside of the image",
                self.x, self.y
            ))),
        }
    }
}
