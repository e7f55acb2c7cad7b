//! Per pixel sample extraction and depth normalization.

use std::io::Read;
use std::ops::{Deref, DerefMut};

use super::bits::BitReader;
use crate::{DecodeError, DecodeResult};

/// The maximum number of channels a single pixel may carry.
pub const MAX_CHANNELS: usize = 8;

/// Width of a normalized sample in bits.
pub const CANONICAL_DEPTH: u8 = 8;

/// The samples of one pixel, one value per channel.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ChannelSampleSet {
    values: [u32; MAX_CHANNELS],
    len: usize,
}

impl ChannelSampleSet {
    /// Create a set from a slice of at most [`MAX_CHANNELS`] values.
    ///
    /// # Panics
    ///
    /// If `values` holds more than [`MAX_CHANNELS`] entries.
    pub fn from_slice(values: &[u32]) -> Self {
        assert!(values.len() <= MAX_CHANNELS, "too many channels for one pixel");
        let mut set = ChannelSampleSet::zeroed(values.len());
        set.values[..values.len()].copy_from_slice(values);
        set
    }

    fn zeroed(len: usize) -> Self {
        ChannelSampleSet {
            values: [0; MAX_CHANNELS],
            len,
        }
    }
}

impl Deref for ChannelSampleSet {
    type Target = [u32];

    fn deref(&self) -> &[u32] {
        &self.values[..self.len]
    }
}

impl DerefMut for ChannelSampleSet {
    fn deref_mut(&mut self) -> &mut [u32] {
        &mut self.values[..self.len]
    }
}

/// Scale a sample of `depth` bits to [`CANONICAL_DEPTH`] bits.
///
/// Wider samples lose their low order bits, narrower samples are shifted up without filling the
/// vacated low bits. A 1 bit sample of `1` therefore becomes `0x80`, not `0xFF`.
#[inline]
pub fn normalize_sample(sample: u32, depth: u8) -> u32 {
    if depth > CANONICAL_DEPTH {
        sample >> (depth - CANONICAL_DEPTH)
    } else if depth < CANONICAL_DEPTH {
        sample << (CANONICAL_DEPTH - depth)
    } else {
        sample
    }
}

/// Reads the channel samples of consecutive pixels.
#[derive(Clone, Debug)]
pub struct SampleExtractor {
    bits_per_sample: Vec<u8>,
}

impl SampleExtractor {
    /// Create an extractor for pixels with one entry of `bits_per_sample` per channel.
    ///
    /// `photometric` is only used to tag the error if the layout is unsupported.
    pub fn new(bits_per_sample: &[u8], photometric: u16) -> DecodeResult<Self> {
        let valid = !bits_per_sample.is_empty()
            && bits_per_sample.len() <= MAX_CHANNELS
            && bits_per_sample.iter().all(|&b| (1..=32).contains(&b));

        if !valid {
            return Err(DecodeError::UnsupportedPixelEncoding {
                photometric,
                bits_per_sample: bits_per_sample.to_vec(),
            });
        }

        Ok(SampleExtractor {
            bits_per_sample: bits_per_sample.to_vec(),
        })
    }

    pub fn channels(&self) -> usize {
        self.bits_per_sample.len()
    }

    pub fn bits_per_sample(&self) -> &[u8] {
        &self.bits_per_sample
    }

    /// Bits occupied by one pixel.
    pub fn bits_per_pixel(&self) -> u32 {
        self.bits_per_sample.iter().map(|&b| u32::from(b)).sum()
    }

    /// Read the raw samples of the next pixel.
    pub fn next_pixel<R: Read>(&self, reader: &mut BitReader<R>) -> DecodeResult<ChannelSampleSet> {
        let mut samples = ChannelSampleSet::zeroed(self.channels());
        for (value, &depth) in samples.iter_mut().zip(&self.bits_per_sample) {
            *value = reader.read_bits(depth)?;
        }
        Ok(samples)
    }

    /// Apply the depth adaptation rule to every channel of `samples`.
    pub fn normalize(&self, samples: &mut ChannelSampleSet) {
        for (value, &depth) in samples.iter_mut().zip(&self.bits_per_sample) {
            *value = normalize_sample(*value, depth);
        }
    }

    /// Read the next pixel and normalize it to [`CANONICAL_DEPTH`] bits per channel.
    pub fn read_normalized<R: Read>(
        &self,
        reader: &mut BitReader<R>,
    ) -> DecodeResult<ChannelSampleSet> {
        let mut samples = self.next_pixel(reader)?;
        self.normalize(&mut samples);
        Ok(samples)
    }
}
