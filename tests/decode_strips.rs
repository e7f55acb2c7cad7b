extern crate pixel_strips;

use pixel_strips::decoder::{
    self, BitOrder, Decoder, ImageLayout, Limits, ScanState, StripDescriptor, StripScanDecoder,
};
use pixel_strips::encoder::compression::Compression;
use pixel_strips::encoder::{encode_strips, pack_row, Compressor};
use pixel_strips::tags::{CompressionMethod, PhotometricInterpretation, PlanarConfiguration};
use pixel_strips::{DecodeError, Raster};

use std::io::Cursor;

const BLACK: u32 = 0xFF000000;
const WHITE: u32 = 0xFFFFFFFF;

fn decode_bytes(data: Vec<u8>, layout: &ImageLayout) -> Result<Raster, DecodeError> {
    Decoder::new(Cursor::new(data)).read_raster(layout)
}

/// Deterministic noise that defeats any dictionary for long stretches.
fn noise(len: usize, seed: u32) -> Vec<u8> {
    let mut state = seed;
    (0..len)
        .map(|_| {
            state = state.wrapping_mul(1_103_515_245).wrapping_add(12_345);
            (state >> 16) as u8
        })
        .collect()
}

#[test]
fn raw_bitmap_scenario() {
    let layout = ImageLayout::new(2, 2, vec![1], PhotometricInterpretation::WhiteIsZero)
        .with_strip_ranges(2, &[(0, 2)]);
    let raster = decode_bytes(vec![0b1000_0000, 0b0100_0000], &layout).unwrap();

    let rows: Vec<&[u32]> = raster.rows().collect();
    assert_eq!(rows, vec![&[BLACK, WHITE][..], &[WHITE, BLACK][..]]);
}

#[test]
fn black_is_zero_bitmap() {
    let layout = ImageLayout::new(2, 1, vec![1], PhotometricInterpretation::BlackIsZero)
        .with_strip_ranges(1, &[(0, 1)]);
    let raster = decode_bytes(vec![0b1000_0000], &layout).unwrap();
    assert_eq!(raster.as_slice(), &[WHITE, BLACK]);
}

#[test]
fn short_strip_is_corrupt() {
    let layout = ImageLayout::new(10, 10, vec![8], PhotometricInterpretation::BlackIsZero)
        .with_strips(vec![StripDescriptor {
            offset: 0,
            byte_count: 99,
            uncompressed_len: 100,
            rows: 10,
        }]);
    let result = decode_bytes(vec![0; 99], &layout);
    assert!(matches!(result, Err(DecodeError::CorruptStream(_))));
}

#[test]
fn short_packbits_strip_is_corrupt() {
    // 99 literal bytes where 100 are declared.
    let mut data = vec![98u8];
    data.extend(std::iter::repeat(7).take(99));
    let layout = ImageLayout::new(10, 10, vec![8], PhotometricInterpretation::BlackIsZero)
        .with_compression(CompressionMethod::PackBits)
        .with_strip_ranges(10, &[(0, 100)]);
    let result = decode_bytes(data, &layout);
    assert!(matches!(result, Err(DecodeError::CorruptStream(_))));
}

#[test]
fn declared_height_reached_mid_strip() {
    // The strip claims four rows, the image only has two.
    let layout = ImageLayout::new(2, 2, vec![8], PhotometricInterpretation::BlackIsZero)
        .with_strips(vec![
            StripDescriptor {
                offset: 0,
                byte_count: 8,
                uncompressed_len: 8,
                rows: 4,
            },
            StripDescriptor {
                offset: 1000,
                byte_count: 8,
                uncompressed_len: 8,
                rows: 4,
            },
        ]);
    let data = vec![0, 255, 255, 0, 1, 2, 3, 4];
    let mut raster = Raster::new(2, 2);

    let mut scan = StripScanDecoder::new(&layout).unwrap();
    scan.decode(&mut Cursor::new(data), &mut raster).unwrap();
    assert_eq!(scan.state(), ScanState::Done);
    assert_eq!(raster.as_slice(), &[BLACK, WHITE, WHITE, BLACK]);
}

#[test]
fn decode_restarts() {
    let layout = ImageLayout::new(1, 1, vec![8], PhotometricInterpretation::BlackIsZero)
        .with_strip_ranges(1, &[(0, 1)]);
    let mut raster = Raster::new(1, 1);
    let mut source = Cursor::new(vec![0x40]);

    let mut scan = StripScanDecoder::new(&layout).unwrap();
    scan.decode(&mut source, &mut raster).unwrap();
    scan.decode(&mut source, &mut raster).unwrap();
    assert_eq!(scan.state(), ScanState::Done);
    assert_eq!(raster.pixel(0, 0), Some(0xFF404040));
}

#[cfg(feature = "lzw")]
#[test]
fn lzw_round_trip_with_table_resets() {
    // Far more codes than a 12 bit table holds, so the encoder has to clear it several times.
    let width = 256;
    let height = 256;
    let pixels = noise(width * height, 0x5EED);

    let mut compressor = pixel_strips::encoder::compression::Lzw.get_algorithm();
    let (payload, strips) = encode_strips(&pixels, width, 128, &mut compressor).unwrap();
    assert_eq!(strips.len(), 2);

    let layout = ImageLayout::new(
        width as u32,
        height as u32,
        vec![8],
        PhotometricInterpretation::BlackIsZero,
    )
    .with_compression(CompressionMethod::LZW)
    .with_strips(strips.clone());

    let raster = decode_bytes(payload.clone(), &layout).unwrap();
    let gray: Vec<u8> = raster.as_slice().iter().map(|p| *p as u8).collect();
    assert_eq!(gray, pixels);

    let first = &payload[..strips[0].byte_count as usize];
    assert_eq!(
        decoder::decompress(first, CompressionMethod::LZW, width * 128).unwrap(),
        &pixels[..width * 128]
    );
}

#[cfg(feature = "deflate")]
#[test]
fn deflate_strips_at_an_offset() {
    let rows: Vec<u8> = (0..48u8).collect();
    let mut compressor = pixel_strips::encoder::compression::Deflate::default().get_algorithm();
    let (payload, strips) = encode_strips(&rows, 12, 2, &mut compressor).unwrap();

    // Put a fake container header in front of the strips.
    let mut file = vec![0xAAu8; 16];
    file.extend_from_slice(&payload);
    let strips: Vec<StripDescriptor> = strips.into_iter().map(|s| s.shifted(16)).collect();

    let layout = ImageLayout::new(4, 4, vec![8, 8, 8], PhotometricInterpretation::RGB)
        .with_compression(CompressionMethod::Deflate)
        .with_strips(strips);
    let raster = decode_bytes(file, &layout).unwrap();
    assert_eq!(raster.pixel(0, 0), Some(0xFF000102));
    assert_eq!(raster.pixel(3, 3), Some(0xFF2D2E2F));
}

#[test]
fn cmyk_zeroes_are_black() {
    let layout = ImageLayout::new(2, 1, vec![8; 4], PhotometricInterpretation::CMYK)
        .with_strip_ranges(1, &[(0, 8)]);
    let raster = decode_bytes(vec![0, 0, 0, 0, 255, 255, 255, 255], &layout).unwrap();
    assert_eq!(raster.as_slice(), &[BLACK, WHITE]);

    let plain = ImageLayout::new(1, 1, vec![8; 4], PhotometricInterpretation::CMYK)
        .with_inverted_cmyk(false)
        .with_strip_ranges(1, &[(0, 4)]);
    let raster = decode_bytes(vec![0, 0, 0, 0], &plain).unwrap();
    assert_eq!(raster.as_slice(), &[WHITE]);
}

#[test]
fn ycbcr_neutral_gray() {
    let layout = ImageLayout::new(1, 1, vec![8; 3], PhotometricInterpretation::YCbCr)
        .with_strip_ranges(1, &[(0, 3)]);
    let raster = decode_bytes(vec![100, 128, 128], &layout).unwrap();
    assert_eq!(raster.as_slice(), &[0xFF646464]);
}

#[test]
fn palette_indices_are_raw() {
    let palette = vec![0xFF0000FF, 0xFF00FF00, 0xFFFF0000, 0x80FFFFFF];
    let layout = ImageLayout::new(4, 1, vec![2], PhotometricInterpretation::RGBPalette)
        .with_palette(palette.clone())
        .with_strip_ranges(1, &[(0, 1)]);
    let raster = decode_bytes(vec![0b00_01_10_11], &layout).unwrap();
    assert_eq!(raster.as_slice(), &palette[..]);

    let short = ImageLayout::new(4, 1, vec![2], PhotometricInterpretation::RGBPalette)
        .with_palette(palette[..2].to_vec())
        .with_strip_ranges(1, &[(0, 1)]);
    assert!(matches!(
        decode_bytes(vec![0b00_01_10_11], &short),
        Err(DecodeError::CorruptStream(_))
    ));
}

#[test]
fn palette_without_colours_is_unsupported() {
    let layout = ImageLayout::new(1, 1, vec![8], PhotometricInterpretation::RGBPalette)
        .with_strip_ranges(1, &[(0, 1)]);
    assert!(matches!(
        decode_bytes(vec![0], &layout),
        Err(DecodeError::UnsupportedPixelEncoding { photometric: 3, .. })
    ));
}

#[test]
fn lsb_sixteen_bit_gray() {
    let layout = ImageLayout::new(2, 1, vec![16], PhotometricInterpretation::BlackIsZero)
        .with_bit_order(BitOrder::Lsb)
        .with_strip_ranges(1, &[(0, 4)]);
    let raster = decode_bytes(vec![0x34, 0x12, 0xCD, 0xAB], &layout).unwrap();
    assert_eq!(raster.as_slice(), &[0xFF121212, 0xFFABABAB]);
}

#[test]
fn unsupported_tags_carry_their_value() {
    let layout = ImageLayout::new(1, 1, vec![8], PhotometricInterpretation::BlackIsZero)
        .with_compression(CompressionMethod::from_u16_exhaustive(7))
        .with_strip_ranges(1, &[(0, 1)]);
    assert!(matches!(
        decode_bytes(vec![0], &layout),
        Err(DecodeError::UnsupportedCompression(7))
    ));

    let layout = ImageLayout::new(1, 1, vec![8], PhotometricInterpretation::BlackIsZero)
        .with_predictor(pixel_strips::tags::Predictor::FloatingPoint)
        .with_strip_ranges(1, &[(0, 1)]);
    assert!(matches!(
        decode_bytes(vec![0], &layout),
        Err(DecodeError::UnsupportedPredictor(3))
    ));
}

#[test]
fn planar_matches_chunky() {
    let (width, height) = (5u32, 3u32);
    let pixels = noise((width * height * 3) as usize, 42);

    let chunky = ImageLayout::new(width, height, vec![8; 3], PhotometricInterpretation::RGB)
        .with_strip_ranges(2, &[(0, 30), (30, 15)]);

    let mut planes: Vec<u8> = Vec::new();
    for channel in 0..3 {
        planes.extend(pixels.iter().skip(channel).step_by(3));
    }
    let planar = ImageLayout::new(width, height, vec![8; 3], PhotometricInterpretation::RGB)
        .with_planar_configuration(PlanarConfiguration::Planar)
        .with_strip_ranges(2, &[(0, 10), (10, 5), (15, 10), (25, 5), (30, 10), (40, 5)]);

    let expected = decode_bytes(pixels, &chunky).unwrap();
    assert_eq!(decode_bytes(planes, &planar).unwrap(), expected);
}

#[test]
fn sub_byte_rgb_rows_are_padded() {
    // Three 4 bit channels, two pixels: 12 bits each, three bytes per row.
    let bits = [4u8, 4, 4];
    let row = pack_row(&[0xF, 0x0, 0x8, 0x1, 0x2, 0x3], &bits, BitOrder::Msb).unwrap();
    assert_eq!(row, vec![0xF0, 0x81, 0x23]);

    let mut data = row.clone();
    data.extend_from_slice(&row);
    let layout = ImageLayout::new(2, 2, bits.to_vec(), PhotometricInterpretation::RGB)
        .with_strip_ranges(2, &[(0, 6)]);
    let raster = decode_bytes(data, &layout).unwrap();
    assert_eq!(raster.pixel(0, 1), Some(0xFFF00080));
    assert_eq!(raster.pixel(1, 1), Some(0xFF102030));
}

#[test]
fn limits_apply_to_strips() {
    let layout = ImageLayout::new(4, 4, vec![8], PhotometricInterpretation::BlackIsZero)
        .with_strip_ranges(4, &[(0, 16)]);
    let mut limits = Limits::default();
    limits.intermediate_buffer_size = 15;

    let result = Decoder::new(Cursor::new(vec![0; 16]))
        .with_limits(limits)
        .read_raster(&layout);
    assert!(matches!(result, Err(DecodeError::LimitsExceeded)));
}

#[test]
fn free_decode_function() {
    let layout = ImageLayout::new(1, 2, vec![8], PhotometricInterpretation::WhiteIsZero)
        .with_strip_ranges(1, &[(1, 1), (0, 1)]);
    let mut raster = Raster::new(1, 2);
    decoder::decode(&mut Cursor::new(vec![0x00, 0xFF]), &layout, &mut raster).unwrap();
    assert_eq!(raster.as_slice(), &[BLACK, WHITE]);
}

#[test]
fn default_compressor_is_uncompressed() {
    assert_eq!(Compressor::default().tag(), CompressionMethod::None);
}

#[test]
fn bmp_run_lengths_per_strip_bottom_up() {
    const RED: u32 = 0xFFFF0000;
    let mut data = vec![
        0x03, 0x01, 0x00, 0x00, // white row
        0x03, 0x02, 0x00, 0x01, // red row, end of strip
    ];
    data.extend_from_slice(&[
        0x00, 0x03, 0x00, 0x01, 0x02, 0x00, // literal black white red
        0x00, 0x00, // end of row
        0x00, 0x02, 0x02, 0x00, 0x01, 0x01, // skip two pixels, one white
        0x00, 0x01,
    ]);
    let layout = ImageLayout::new(3, 4, vec![8], PhotometricInterpretation::RGBPalette)
        .with_palette(vec![BLACK, WHITE, RED])
        .with_compression(CompressionMethod::BmpRle8)
        .with_row_alignment(4)
        .with_bottom_up(true)
        .with_strip_ranges(2, &[(0, 8), (8, 16)]);
    let raster = decode_bytes(data, &layout).unwrap();

    let rows: Vec<&[u32]> = raster.rows().collect();
    assert_eq!(
        rows,
        vec![
            &[BLACK, BLACK, WHITE][..],
            &[BLACK, WHITE, RED][..],
            &[RED, RED, RED][..],
            &[WHITE, WHITE, WHITE][..],
        ]
    );
}

#[test]
fn packbits_must_not_end_inside_a_header() {
    // Three repeated bytes, then a literal header without its bytes.
    let layout = ImageLayout::new(3, 1, vec![8], PhotometricInterpretation::BlackIsZero)
        .with_compression(CompressionMethod::PackBits)
        .with_strip_ranges(1, &[(0, 3)]);
    let result = decode_bytes(vec![0xFE, 0x00, 0x01], &layout);
    assert!(matches!(result, Err(DecodeError::CorruptStream(_))));
}
