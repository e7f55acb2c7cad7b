use super::samples::{ChannelSampleSet, MAX_CHANNELS};
use crate::tags::Predictor;
use crate::{DecodeError, DecodeResult};

/// Undoes the horizontal differencing of one row at a time.
///
/// The previous value of every channel is kept between pixels of a row and replaced wholesale
/// by the first pixel of the next row.
#[derive(Clone, Debug)]
pub struct PredictorState {
    predictor: Predictor,
    masks: [u32; MAX_CHANNELS],
    previous: [u32; MAX_CHANNELS],
}

impl PredictorState {
    pub fn new(predictor: Predictor, bits_per_sample: &[u8]) -> DecodeResult<Self> {
        match predictor {
            Predictor::None | Predictor::Horizontal => {}
            other => return Err(DecodeError::UnsupportedPredictor(other.to_u16())),
        }

        let mut masks = [0; MAX_CHANNELS];
        for (mask, &depth) in masks.iter_mut().zip(bits_per_sample) {
            *mask = ((1u64 << depth) - 1) as u32;
        }

        Ok(PredictorState {
            predictor,
            masks,
            previous: [0; MAX_CHANNELS],
        })
    }

    pub fn predictor(&self) -> Predictor {
        self.predictor
    }

    /// Forget the values of the previous row.
    pub fn reset(&mut self) {
        self.previous = [0; MAX_CHANNELS];
    }

    /// Reconstruct the samples of the pixel at column `x` in place.
    pub fn apply(&mut self, samples: &mut ChannelSampleSet, x: u32) {
        if self.predictor != Predictor::Horizontal {
            return;
        }

        if x == 0 {
            self.previous[..samples.len()].copy_from_slice(&samples[..]);
            return;
        }

        for (channel, sample) in samples.iter_mut().enumerate() {
            let value = self.previous[channel].wrapping_add(*sample) & self.masks[channel];
            *sample = value;
            self.previous[channel] = value;
        }
    }
}
