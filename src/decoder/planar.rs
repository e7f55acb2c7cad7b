//! Images whose channels are stored one after another, each in its own set of strips.

use std::io::{Read, Seek};

use log::debug;

use super::bits::BitReader;
use super::image::ImageLayout;
use super::photometric::{PhotometricInterpreter, SampleScale};
use super::predictor::PredictorState;
use super::samples::{ChannelSampleSet, SampleExtractor};
use super::scan::read_strip;
use super::Limits;
use crate::raster::Raster;
use crate::{DecodeError, DecodeResult};

/// Decode every plane of `layout` and write the assembled pixels into `raster`.
pub(crate) fn decode_planes<R: Read + Seek>(
    layout: &ImageLayout,
    limits: &Limits,
    extractor: &SampleExtractor,
    interpreter: &PhotometricInterpreter,
    reader: &mut R,
    raster: &mut Raster,
) -> DecodeResult<()> {
    let channels = extractor.channels();
    if layout.strips.is_empty() || layout.strips.len() % channels != 0 {
        return Err(DecodeError::CorruptStream(format!(
            "{} strips cannot be split into {} planes",
            layout.strips.len(),
            channels
        )));
    }
    let strips_per_plane = layout.strips.len() / channels;

    let pixel_count = layout.width as usize * layout.height as usize;
    let buffer_len = pixel_count
        .checked_mul(channels)
        .ok_or(DecodeError::LimitsExceeded)?;
    if buffer_len.saturating_mul(std::mem::size_of::<u32>()) > limits.decoding_buffer_size {
        return Err(DecodeError::LimitsExceeded);
    }
    let mut samples = vec![0u32; buffer_len];

    for (channel, strips) in layout.strips.chunks_exact(strips_per_plane).enumerate() {
        let depth = &extractor.bits_per_sample()[channel..=channel];
        let plane = SampleExtractor::new(depth, layout.photometric_interpretation.to_u16())?;
        let mut predictor = PredictorState::new(layout.predictor, depth)?;
        let mut y = 0;

        let row_len = layout.plane_row_bytes(depth);

        for (index, strip) in strips.iter().enumerate() {
            let data = read_strip(reader, strip, layout, row_len, limits)?;
            debug!(
                "plane {} strip {}: {} compressed bytes, {} rows",
                channel, index, strip.byte_count, strip.rows
            );

            for row in data.chunks(row_len.max(1)).take(strip.rows as usize) {
                if y >= layout.height {
                    break;
                }
                let mut bits = BitReader::new(row, layout.bit_order);
                let target = layout.raster_row(y) as usize;
                for x in 0..layout.width {
                    let mut sample = plane.next_pixel(&mut bits)?;
                    predictor.apply(&mut sample, x);
                    let pixel = target * layout.width as usize + x as usize;
                    samples[pixel * channels + channel] = sample[0];
                }
                predictor.reset();
                y += 1;
            }
        }

        if y < layout.height {
            debug!("plane {} ended after {} of {} rows", channel, y, layout.height);
            return Err(DecodeError::UnexpectedEndOfStream);
        }
    }

    let normalize = interpreter.sample_scale() == SampleScale::Canonical;
    let width = layout.width.max(1) as usize;
    for (pixel, values) in samples.chunks_exact(channels).enumerate() {
        let mut set = ChannelSampleSet::from_slice(values);
        if normalize {
            extractor.normalize(&mut set);
        }
        let x = (pixel % width) as u32;
        let y = (pixel / width) as u32;
        interpreter.interpret_pixel(raster, &set, x, y)?;
    }

    Ok(())
}
