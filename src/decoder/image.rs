use super::bits::BitOrder;
use crate::tags::{CompressionMethod, PhotometricInterpretation, PlanarConfiguration, Predictor};

/// One independently compressed block of rows.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StripDescriptor {
    /// Position of the compressed bytes in the source.
    pub offset: u64,
    /// Number of compressed bytes.
    pub byte_count: u64,
    /// Number of bytes the strip must decompress to.
    pub uncompressed_len: usize,
    /// Number of rows the strip covers.
    pub rows: u32,
}

impl StripDescriptor {
    /// The same strip located `delta` bytes further into the source.
    pub fn shifted(self, delta: u64) -> StripDescriptor {
        StripDescriptor {
            offset: self.offset + delta,
            ..self
        }
    }
}

/// Everything the decoder needs to know about the pixel data of one image.
///
/// The values are supplied by a container parser, see [`ImageLayout::new`] for the defaults.
#[derive(Clone, Debug)]
pub struct ImageLayout {
    pub width: u32,
    pub height: u32,
    /// Bit depth of each channel, in storage order.
    pub bits_per_sample: Vec<u8>,
    pub photometric_interpretation: PhotometricInterpretation,
    pub compression_method: CompressionMethod,
    pub predictor: Predictor,
    pub planar_configuration: PlanarConfiguration,
    pub bit_order: BitOrder,
    /// Rows are padded to a multiple of this many bytes. BMP uses 4.
    pub row_alignment: u32,
    /// The first stored row is the bottom row of the image.
    pub bottom_up: bool,
    /// Stored CMYK values are complemented before conversion, as Photoshop writes them.
    /// Cleared for CMYK that stores ink coverage directly.
    pub inverted_cmyk: bool,
    pub strips: Vec<StripDescriptor>,
    /// Packed ARGB colours for palette images.
    pub palette: Option<Vec<u32>>,
}

impl ImageLayout {
    /// An uncompressed, chunky, MSB-first, top-down layout without strips or row padding.
    pub fn new(
        width: u32,
        height: u32,
        bits_per_sample: Vec<u8>,
        photometric_interpretation: PhotometricInterpretation,
    ) -> ImageLayout {
        ImageLayout {
            width,
            height,
            bits_per_sample,
            photometric_interpretation,
            compression_method: CompressionMethod::None,
            predictor: Predictor::None,
            planar_configuration: PlanarConfiguration::Chunky,
            bit_order: BitOrder::Msb,
            row_alignment: 1,
            bottom_up: false,
            inverted_cmyk: true,
            strips: Vec::new(),
            palette: None,
        }
    }

    pub fn with_compression(mut self, method: CompressionMethod) -> Self {
        self.compression_method = method;
        self
    }

    pub fn with_predictor(mut self, predictor: Predictor) -> Self {
        self.predictor = predictor;
        self
    }

    pub fn with_bit_order(mut self, order: BitOrder) -> Self {
        self.bit_order = order;
        self
    }

    pub fn with_planar_configuration(mut self, config: PlanarConfiguration) -> Self {
        self.planar_configuration = config;
        self
    }

    pub fn with_row_alignment(mut self, alignment: u32) -> Self {
        self.row_alignment = alignment.max(1);
        self
    }

    pub fn with_bottom_up(mut self, bottom_up: bool) -> Self {
        self.bottom_up = bottom_up;
        self
    }

    pub fn with_inverted_cmyk(mut self, inverted: bool) -> Self {
        self.inverted_cmyk = inverted;
        self
    }

    pub fn with_palette(mut self, palette: Vec<u32>) -> Self {
        self.palette = Some(palette);
        self
    }

    pub fn with_strips(mut self, strips: Vec<StripDescriptor>) -> Self {
        self.strips = strips;
        self
    }

    /// Describe strips from their byte ranges, computing rows and uncompressed sizes.
    ///
    /// Every strip except the last of a plane covers `rows_per_strip` rows. With a planar
    /// configuration the ranges of each plane follow each other, one plane per channel.
    pub fn with_strip_ranges(mut self, rows_per_strip: u32, ranges: &[(u64, u64)]) -> Self {
        let rows_per_strip = rows_per_strip.clamp(1, self.height.max(1));
        let strips_per_plane = self.strips_per_plane(rows_per_strip).max(1);

        let strips = ranges
            .iter()
            .enumerate()
            .map(|(index, &(offset, byte_count))| {
                let strip = (index % strips_per_plane) as u64;
                let first_row = strip.saturating_mul(u64::from(rows_per_strip));
                let rows = u64::from(self.height)
                    .saturating_sub(first_row)
                    .min(u64::from(rows_per_strip)) as u32;
                let row_bytes = match self.planar_configuration {
                    PlanarConfiguration::Chunky => self.row_bytes(),
                    PlanarConfiguration::Planar => {
                        let plane = index / strips_per_plane;
                        let bits = self.bits_per_sample.get(plane..=plane).unwrap_or(&[]);
                        self.plane_row_bytes(bits)
                    }
                };
                StripDescriptor {
                    offset,
                    byte_count,
                    uncompressed_len: (rows as usize).saturating_mul(row_bytes),
                    rows,
                }
            })
            .collect();
        self.strips = strips;
        self
    }

    pub fn samples_per_pixel(&self) -> usize {
        self.bits_per_sample.len()
    }

    /// Bytes in one stored row of interleaved samples, including the row padding.
    pub fn row_bytes(&self) -> usize {
        self.plane_row_bytes(&self.bits_per_sample)
    }

    /// Bytes in one stored row of a single plane made of `bits_per_sample`.
    pub(crate) fn plane_row_bytes(&self, bits_per_sample: &[u8]) -> usize {
        let alignment = self.row_alignment.max(1) as usize;
        let unpadded = row_bytes(self.width, bits_per_sample);
        (unpadded.saturating_add(alignment - 1) / alignment).saturating_mul(alignment)
    }

    /// Raster row that receives the `row`th stored row.
    pub(crate) fn raster_row(&self, row: u32) -> u32 {
        if self.bottom_up {
            self.height.saturating_sub(1).saturating_sub(row)
        } else {
            row
        }
    }

    fn strips_per_plane(&self, rows_per_strip: u32) -> usize {
        let (height, rows_per_strip) = (u64::from(self.height), u64::from(rows_per_strip.max(1)));
        ((height + rows_per_strip - 1) / rows_per_strip) as usize
    }
}

/// Bytes needed for `width` pixels made of `bits_per_sample`, rounded up to a whole byte.
pub(crate) fn row_bytes(width: u32, bits_per_sample: &[u8]) -> usize {
    let bits_per_pixel: usize = bits_per_sample.iter().map(|&b| b as usize).sum();
    (width as usize).saturating_mul(bits_per_pixel).saturating_add(7) / 8
}
