use std::io::{Read, Seek};

use crate::raster::Raster;
use crate::{DecodeError, DecodeResult};

pub mod bits;
pub mod bmp;
mod decompress;
pub(crate) mod image;
pub mod photometric;
mod planar;
pub mod pnm;
pub mod predictor;
mod rle;
pub mod samples;
mod scan;
mod stream;

pub use self::bits::{BitOrder, BitReader};
pub use self::bmp::{read_bmp, BmpHeader};
pub use self::decompress::{decompress, decompress_rows};
pub use self::image::{ImageLayout, StripDescriptor};
pub use self::photometric::{PhotometricInterpreter, SampleScale};
pub use self::pnm::{read_pnm, PnmHeader, PnmKind};
pub use self::predictor::PredictorState;
pub use self::samples::{ChannelSampleSet, SampleExtractor};
pub use self::scan::{ScanState, StripScanDecoder};
pub use self::stream::ByteOrder;

/// Decoding limits
#[derive(Clone, Debug)]
pub struct Limits {
    /// The maximum size of a decoded raster or of the sample planes of a planar image, in
    /// bytes. The default is 256MiB.
    pub decoding_buffer_size: usize,
    /// The maximum size of a single strip, compressed or decompressed, in bytes. The default
    /// is 128MiB.
    pub intermediate_buffer_size: usize,
    /// The purpose of this is to prevent all the fields of the struct from
    /// being public, as this would make adding new fields a major version
    /// bump.
    _non_exhaustive: (),
}

impl Limits {
    /// A configuration that does not impose any limits.
    ///
    /// This is a good start if the caller only wants to impose selective limits, contrary to the
    /// default limits which allows selectively disabling limits.
    ///
    /// Note that this configuration is likely to crash on excessively large images since,
    /// naturally, the machine running the program does not have infinite memory.
    pub fn unlimited() -> Limits {
        Limits {
            decoding_buffer_size: usize::MAX,
            intermediate_buffer_size: usize::MAX,
            _non_exhaustive: (),
        }
    }
}

impl Default for Limits {
    fn default() -> Limits {
        Limits {
            decoding_buffer_size: 256 * 1024 * 1024,
            intermediate_buffer_size: 128 * 1024 * 1024,
            _non_exhaustive: (),
        }
    }
}

/// Decodes pixel data from a seekable source.
///
/// The source holds the strips described by an [`ImageLayout`], strip offsets are
/// absolute positions in it.
#[derive(Debug)]
pub struct Decoder<R>
where
    R: Read + Seek,
{
    reader: R,
    limits: Limits,
}

impl<R: Read + Seek> Decoder<R> {
    /// Create a new decoder that decodes from the stream ```r```
    pub fn new(r: R) -> Decoder<R> {
        Decoder {
            reader: r,
            limits: Default::default(),
        }
    }

    pub fn with_limits(mut self, limits: Limits) -> Decoder<R> {
        self.limits = limits;
        self
    }

    pub fn limits(&self) -> &Limits {
        &self.limits
    }

    /// Decode the image described by `layout` into an existing raster.
    pub fn decode(&mut self, layout: &ImageLayout, raster: &mut Raster) -> DecodeResult<()> {
        StripScanDecoder::new(layout)?
            .with_limits(self.limits.clone())
            .decode(&mut self.reader, raster)
    }

    /// Decode the image described by `layout` into a newly allocated raster.
    pub fn read_raster(&mut self, layout: &ImageLayout) -> DecodeResult<Raster> {
        let pixels = (layout.width as usize)
            .checked_mul(layout.height as usize)
            .and_then(|n| n.checked_mul(std::mem::size_of::<u32>()))
            .ok_or(DecodeError::LimitsExceeded)?;
        if pixels > self.limits.decoding_buffer_size {
            return Err(DecodeError::LimitsExceeded);
        }

        let mut raster = Raster::new(layout.width, layout.height);
        self.decode(layout, &mut raster)?;
        Ok(raster)
    }

    /// Read a complete Netpbm file from the current position of the source.
    pub fn read_pnm(&mut self) -> DecodeResult<Raster> {
        pnm::read_pnm_with_limits(&mut self.reader, &self.limits)
    }

    /// Read a complete Windows bitmap from the current position of the source.
    pub fn read_bmp(&mut self) -> DecodeResult<Raster> {
        bmp::read_bmp_with_limits(&mut self.reader, &self.limits)
    }

    pub fn into_inner(self) -> R {
        self.reader
    }
}

/// Decode the image described by `layout` from `source` into `raster` with default limits.
pub fn decode<R: Read + Seek>(
    source: &mut R,
    layout: &ImageLayout,
    raster: &mut Raster,
) -> DecodeResult<()> {
    StripScanDecoder::new(layout)?.decode(source, raster)
}
