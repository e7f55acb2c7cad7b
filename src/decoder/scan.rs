use std::io::{Read, Seek, SeekFrom};

use log::{debug, trace};

use super::bits::BitReader;
use super::decompress::decompress_rows;
use super::image::{ImageLayout, StripDescriptor};
use super::photometric::{PhotometricInterpreter, SampleScale};
use super::planar;
use super::predictor::PredictorState;
use super::samples::SampleExtractor;
use super::Limits;
use crate::raster::Raster;
use crate::tags::PlanarConfiguration;
use crate::{DecodeError, DecodeResult};

/// Progress of a [`StripScanDecoder`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScanState {
    NotStarted,
    InStrip,
    RowComplete,
    StripComplete,
    /// Every row of the image was written.
    Done,
    /// Decoding stopped with an error. Pixels written before the error stay in the raster.
    Failed,
}

/// Walks the strips of one image and writes every pixel into a raster.
#[derive(Debug)]
pub struct StripScanDecoder<'a> {
    layout: &'a ImageLayout,
    limits: Limits,
    extractor: SampleExtractor,
    predictor: PredictorState,
    interpreter: PhotometricInterpreter,
    state: ScanState,
    x: u32,
    y: u32,
}

impl<'a> StripScanDecoder<'a> {
    /// Prepare the decoding stages for `layout`, failing early on unsupported encodings.
    pub fn new(layout: &'a ImageLayout) -> DecodeResult<Self> {
        let photometric = layout.photometric_interpretation.to_u16();
        let extractor = SampleExtractor::new(&layout.bits_per_sample, photometric)?;
        let predictor_bits = match layout.planar_configuration {
            PlanarConfiguration::Chunky => &layout.bits_per_sample[..],
            PlanarConfiguration::Planar => &layout.bits_per_sample[..1],
        };
        let predictor = PredictorState::new(layout.predictor, predictor_bits)?;

        let mut interpreter = PhotometricInterpreter::new(
            layout.photometric_interpretation,
            &layout.bits_per_sample,
            layout.palette.as_deref(),
        )?;
        if let PhotometricInterpreter::Cmyk {
            ref mut stored_inverted,
            ..
        } = interpreter
        {
            *stored_inverted = layout.inverted_cmyk;
        }

        Ok(StripScanDecoder {
            layout,
            limits: Limits::default(),
            extractor,
            predictor,
            interpreter,
            state: ScanState::NotStarted,
            x: 0,
            y: 0,
        })
    }

    pub fn with_limits(mut self, limits: Limits) -> Self {
        self.limits = limits;
        self
    }

    pub fn state(&self) -> ScanState {
        self.state
    }

    /// The next pixel that will be written.
    pub fn position(&self) -> (u32, u32) {
        (self.x, self.y)
    }

    /// Decode every strip of the layout from `reader` into `raster`.
    ///
    /// Calling this again restarts the scan from the first strip.
    pub fn decode<R: Read + Seek>(&mut self, reader: &mut R, raster: &mut Raster) -> DecodeResult<()> {
        self.state = ScanState::NotStarted;
        self.x = 0;
        self.y = 0;
        self.predictor.reset();

        match self.run(reader, raster) {
            Ok(()) => Ok(()),
            Err(err) => {
                debug!("decode failed at ({}, {}): {}", self.x, self.y, err);
                self.transition(ScanState::Failed);
                Err(err)
            }
        }
    }

    fn run<R: Read + Seek>(&mut self, reader: &mut R, raster: &mut Raster) -> DecodeResult<()> {
        let (width, height) = (self.layout.width, self.layout.height);
        if raster.width() < width || raster.height() < height {
            return Err(DecodeError::BoundsViolation {
                x: width,
                y: height,
                width: raster.width(),
                height: raster.height(),
            });
        }

        if width == 0 || height == 0 {
            self.transition(ScanState::Done);
            return Ok(());
        }

        if self.layout.planar_configuration == PlanarConfiguration::Planar {
            self.transition(ScanState::InStrip);
            planar::decode_planes(
                self.layout,
                &self.limits,
                &self.extractor,
                &self.interpreter,
                reader,
                raster,
            )?;
            self.y = height;
            self.transition(ScanState::Done);
            return Ok(());
        }

        for (index, strip) in self.layout.strips.iter().enumerate() {
            self.transition(ScanState::InStrip);
            let row_len = self.layout.row_bytes();
            let data = read_strip(reader, strip, self.layout, row_len, &self.limits)?;
            debug!(
                "strip {}: {} compressed bytes, {} bytes for {} rows",
                index,
                strip.byte_count,
                data.len(),
                strip.rows
            );

            self.scan_strip(&data, strip.rows, raster)?;
            if self.state == ScanState::Done {
                let skipped = self.layout.strips.len() - index - 1;
                if skipped > 0 {
                    debug!("image complete, {} trailing strips not read", skipped);
                }
                return Ok(());
            }
            self.transition(ScanState::StripComplete);
        }

        debug!(
            "strips ended after {} of {} rows",
            self.y, self.layout.height
        );
        Err(DecodeError::UnexpectedEndOfStream)
    }

    fn scan_strip(&mut self, data: &[u8], rows: u32, raster: &mut Raster) -> DecodeResult<()> {
        let layout = self.layout;
        let row_len = layout.row_bytes();
        let normalize = self.interpreter.sample_scale() == SampleScale::Canonical;

        for row in 0..rows as usize {
            // Each row starts at its own offset, which skips any row padding.
            let start = row.saturating_mul(row_len).min(data.len());
            let mut bits = BitReader::new(&data[start..], layout.bit_order);
            let target = layout.raster_row(self.y);

            for x in 0..layout.width {
                self.x = x;
                let mut samples = self.extractor.next_pixel(&mut bits)?;
                self.predictor.apply(&mut samples, x);
                if normalize {
                    self.extractor.normalize(&mut samples);
                }
                self.interpreter
                    .interpret_pixel(raster, &samples, x, target)?;
            }

            self.x = 0;
            self.transition(ScanState::RowComplete);
            self.predictor.reset();
            self.y += 1;

            if self.y >= layout.height {
                let unread = (data.len() - start) as u64 - bits.bytes_consumed();
                if unread > 0 {
                    debug!(
                        "declared height reached, ignoring {} bytes left in the strip",
                        unread
                    );
                }
                self.transition(ScanState::Done);
                return Ok(());
            }
            self.transition(ScanState::InStrip);
        }

        Ok(())
    }

    fn transition(&mut self, next: ScanState) {
        trace!("{:?} -> {:?} at ({}, {})", self.state, next, self.x, self.y);
        self.state = next;
    }
}

/// Fetch the compressed bytes of `strip` and decompress them into rows of `row_len` bytes.
pub(crate) fn read_strip<R: Read + Seek>(
    reader: &mut R,
    strip: &StripDescriptor,
    layout: &ImageLayout,
    row_len: usize,
    limits: &Limits,
) -> DecodeResult<Vec<u8>> {
    let byte_count = usize::try_from(strip.byte_count).map_err(|_| DecodeError::LimitsExceeded)?;
    if byte_count > limits.intermediate_buffer_size
        || strip.uncompressed_len > limits.intermediate_buffer_size
    {
        return Err(DecodeError::LimitsExceeded);
    }

    reader.seek(SeekFrom::Start(strip.offset))?;
    let mut compressed = vec![0u8; byte_count];
    reader.read_exact(&mut compressed)?;

    decompress_rows(
        &compressed,
        layout.compression_method,
        strip.uncompressed_len,
        row_len,
    )
}
