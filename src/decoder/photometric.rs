//! Conversion of channel samples to packed ARGB pixels.

use super::samples::ChannelSampleSet;
use crate::raster::{argb, Raster};
use crate::tags::PhotometricInterpretation;
use crate::{DecodeError, DecodeResult};

/// Whether an interpreter expects samples scaled to 8 bits or as stored.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SampleScale {
    /// Every channel was normalized to 8 bits.
    Canonical,
    /// Samples arrive exactly as stored, e.g. palette indices.
    Raw,
}

/// Maps the samples of one pixel onto a packed ARGB value.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PhotometricInterpreter {
    /// One bit per pixel. A set bit is black when `white_is_zero`, white otherwise.
    Bilevel { white_is_zero: bool },
    /// A gray ramp, dark to light unless `inverted`.
    Grayscale { inverted: bool, alpha: bool },
    Rgb { alpha: bool },
    /// Indices into a table of packed ARGB colours.
    Palette { colors: Vec<u32> },
    /// Subtractive colour. With `stored_inverted`, the default, every stored value is
    /// complemented (`255 - stored`) before conversion, as Adobe applications write CMYK.
    Cmyk { stored_inverted: bool, alpha: bool },
    YCbCr { alpha: bool },
}

impl PhotometricInterpreter {
    /// Choose the interpreter for a photometric interpretation and sample layout.
    pub fn new(
        photometric: PhotometricInterpretation,
        bits_per_sample: &[u8],
        palette: Option<&[u32]>,
    ) -> DecodeResult<Self> {
        let unsupported = || DecodeError::UnsupportedPixelEncoding {
            photometric: photometric.to_u16(),
            bits_per_sample: bits_per_sample.to_vec(),
        };

        let samples = bits_per_sample.len();
        let eight_bit_or_more = bits_per_sample.iter().all(|b| (8..=32).contains(b));

        let interpreter = match photometric {
            PhotometricInterpretation::WhiteIsZero | PhotometricInterpretation::BlackIsZero => {
                let white_is_zero = photometric == PhotometricInterpretation::WhiteIsZero;
                match bits_per_sample {
                    [1] => PhotometricInterpreter::Bilevel { white_is_zero },
                    [b] if (2..=32).contains(b) => PhotometricInterpreter::Grayscale {
                        inverted: white_is_zero,
                        alpha: false,
                    },
                    [b, a] if (2..=32).contains(b) && (1..=32).contains(a) => {
                        PhotometricInterpreter::Grayscale {
                            inverted: white_is_zero,
                            alpha: true,
                        }
                    }
                    _ => return Err(unsupported()),
                }
            }
            PhotometricInterpretation::RGB => match samples {
                3 | 4 if bits_per_sample.iter().all(|&b| (1..=32).contains(&b)) => {
                    PhotometricInterpreter::Rgb { alpha: samples == 4 }
                }
                _ => return Err(unsupported()),
            },
            PhotometricInterpretation::RGBPalette => match (bits_per_sample, palette) {
                ([b], Some(colors)) if (1..=16).contains(b) && !colors.is_empty() => {
                    PhotometricInterpreter::Palette {
                        colors: colors.to_vec(),
                    }
                }
                _ => return Err(unsupported()),
            },
            PhotometricInterpretation::CMYK => match samples {
                4 | 5 if eight_bit_or_more => PhotometricInterpreter::Cmyk {
                    stored_inverted: true,
                    alpha: samples == 5,
                },
                _ => return Err(unsupported()),
            },
            PhotometricInterpretation::YCbCr => match samples {
                3 | 4 if eight_bit_or_more => PhotometricInterpreter::YCbCr { alpha: samples == 4 },
                _ => return Err(unsupported()),
            },
            _ => return Err(unsupported()),
        };

        Ok(interpreter)
    }

    /// CMYK as written by Photoshop: every stored channel value is complemented.
    pub fn adobe_cmyk(alpha: bool) -> Self {
        PhotometricInterpreter::Cmyk {
            stored_inverted: true,
            alpha,
        }
    }

    /// CMYK whose stored values are ink coverage, 0 meaning no ink.
    pub fn plain_cmyk(alpha: bool) -> Self {
        PhotometricInterpreter::Cmyk {
            stored_inverted: false,
            alpha,
        }
    }

    /// Number of channels each pixel must provide.
    pub fn channels(&self) -> usize {
        match *self {
            PhotometricInterpreter::Bilevel { .. } | PhotometricInterpreter::Palette { .. } => 1,
            PhotometricInterpreter::Grayscale { alpha, .. } => 1 + alpha as usize,
            PhotometricInterpreter::Rgb { alpha } | PhotometricInterpreter::YCbCr { alpha } => {
                3 + alpha as usize
            }
            PhotometricInterpreter::Cmyk { alpha, .. } => 4 + alpha as usize,
        }
    }

    pub fn sample_scale(&self) -> SampleScale {
        match self {
            PhotometricInterpreter::Bilevel { .. } | PhotometricInterpreter::Palette { .. } => {
                SampleScale::Raw
            }
            _ => SampleScale::Canonical,
        }
    }

    /// Convert one pixel to packed ARGB.
    pub fn to_argb(&self, samples: &ChannelSampleSet) -> DecodeResult<u32> {
        if samples.len() != self.channels() {
            return Err(DecodeError::CorruptStream(format!(
                "pixel has {} samples, the interpretation needs {}",
                samples.len(),
                self.channels()
            )));
        }

        let byte = |channel: usize| (samples[channel] & 0xFF) as u8;
        let alpha_at = |channel: usize, present: bool| if present { byte(channel) } else { 0xFF };

        let pixel = match *self {
            PhotometricInterpreter::Bilevel { white_is_zero } => {
                let set = samples[0] != 0;
                if set == white_is_zero {
                    argb(0xFF, 0, 0, 0)
                } else {
                    argb(0xFF, 0xFF, 0xFF, 0xFF)
                }
            }
            PhotometricInterpreter::Grayscale { inverted, alpha } => {
                let mut gray = byte(0);
                if inverted {
                    gray = 255 - gray;
                }
                argb(alpha_at(1, alpha), gray, gray, gray)
            }
            PhotometricInterpreter::Rgb { alpha } => {
                argb(alpha_at(3, alpha), byte(0), byte(1), byte(2))
            }
            PhotometricInterpreter::Palette { ref colors } => {
                let index = samples[0] as usize;
                *colors.get(index).ok_or_else(|| {
                    DecodeError::CorruptStream(format!(
                        "palette index {} outside of a palette with {} entries",
                        index,
                        colors.len()
                    ))
                })?
            }
            PhotometricInterpreter::Cmyk {
                stored_inverted,
                alpha,
            } => {
                let mut cmyk = [byte(0), byte(1), byte(2), byte(3)];
                if stored_inverted {
                    for channel in cmyk.iter_mut() {
                        *channel = 255 - *channel;
                    }
                }
                let [r, g, b] = cmyk_to_rgb(cmyk);
                argb(alpha_at(4, alpha), r, g, b)
            }
            PhotometricInterpreter::YCbCr { alpha } => {
                let [r, g, b] = ycbcr_to_rgb(byte(0), byte(1), byte(2));
                argb(alpha_at(3, alpha), r, g, b)
            }
        };

        Ok(pixel)
    }

    /// Convert one pixel and store it at `(x, y)`.
    pub fn interpret_pixel(
        &self,
        raster: &mut Raster,
        samples: &ChannelSampleSet,
        x: u32,
        y: u32,
    ) -> DecodeResult<()> {
        let pixel = self.to_argb(samples)?;
        raster.put_pixel(x, y, pixel)
    }
}

/// Convert ink coverage (0 = no ink, 255 = full ink) to RGB.
pub fn cmyk_to_rgb([c, m, y, k]: [u8; 4]) -> [u8; 3] {
    // CMYK -> CMY: every channel gains the black ink, then CMY -> RGB.
    let k = u32::from(k);
    let add_black = |ink: u8| {
        let ink = u32::from(ink);
        ink * (255 - k) / 255 + k
    };
    [
        (255 - add_black(c)) as u8,
        (255 - add_black(m)) as u8,
        (255 - add_black(y)) as u8,
    ]
}

/// JFIF YCbCr to RGB.
pub fn ycbcr_to_rgb(y: u8, cb: u8, cr: u8) -> [u8; 3] {
    let y = f32::from(y);
    let cb = f32::from(cb) - 128.0;
    let cr = f32::from(cr) - 128.0;

    let clamp = |v: f32| v.round().clamp(0.0, 255.0) as u8;
    [
        clamp(y + 1.402 * cr),
        clamp(y - 0.344_136 * cb - 0.714_136 * cr),
        clamp(y + 1.772 * cb),
    ]
}

/// Build a palette from a TIFF `ColorMap`: all red values, then all green, then all blue, each
/// 16 bits wide.
pub fn palette_from_color_map(color_map: &[u16]) -> DecodeResult<Vec<u32>> {
    if color_map.is_empty() || color_map.len() % 3 != 0 {
        return Err(DecodeError::CorruptStream(format!(
            "color map with {} entries is not made of three equal parts",
            color_map.len()
        )));
    }

    let entries = color_map.len() / 3;
    let (reds, rest) = color_map.split_at(entries);
    let (greens, blues) = rest.split_at(entries);

    Ok(reds
        .iter()
        .zip(greens)
        .zip(blues)
        .map(|((&r, &g), &b)| argb(0xFF, (r >> 8) as u8, (g >> 8) as u8, (b >> 8) as u8))
        .collect())
}
