extern crate criterion;
extern crate pixel_strips;

use criterion::{
    black_box, measurement::Measurement, BenchmarkGroup, BenchmarkId, Criterion, Throughput,
};
use pixel_strips::decoder::{Decoder, ImageLayout};
use pixel_strips::encoder::compression::{Compression, Lzw};
use pixel_strips::encoder::encode_strips;
use pixel_strips::tags::{CompressionMethod, PhotometricInterpretation};

struct Image {
    data: Vec<u8>,
    layout: ImageLayout,
}

/// An RGB image with smooth gradients and some noise, split into LZW strips.
fn make_image(width: u32, height: u32, rows_per_strip: u32) -> Image {
    let mut state = 0x1234_5678u32;
    let mut pixels = Vec::with_capacity((width * height * 3) as usize);
    for y in 0..height {
        for x in 0..width {
            state = state.wrapping_mul(1_103_515_245).wrapping_add(12_345);
            let noise = (state >> 28) as u8;
            pixels.extend_from_slice(&[
                (x as u8).wrapping_add(noise),
                (y as u8).wrapping_add(noise),
                ((x + y) / 2) as u8,
            ]);
        }
    }

    let row_bytes = width as usize * 3;
    let (data, strips) = encode_strips(&pixels, row_bytes, rows_per_strip, &mut Lzw.get_algorithm())
        .expect("encoding into memory");
    let layout = ImageLayout::new(width, height, vec![8, 8, 8], PhotometricInterpretation::RGB)
        .with_compression(CompressionMethod::LZW)
        .with_strips(strips);
    Image { data, layout }
}

fn read_image(image: &Image) {
    let cursor = std::io::Cursor::new(&image.data[..]);
    let mut decoder = Decoder::new(black_box(cursor));
    decoder.read_raster(&image.layout).unwrap();
}

fn main() {
    struct BenchDef {
        image: Image,
        id: &'static str,
        sample_size: usize,
    }

    fn run_bench_def<M: Measurement>(group: &mut BenchmarkGroup<M>, def: BenchDef) {
        group
            .sample_size(def.sample_size)
            .throughput(Throughput::Bytes(def.image.data.len() as u64))
            .bench_with_input(
                BenchmarkId::new(def.id, def.image.data.len()),
                &def.image,
                |b, input| b.iter(|| read_image(input)),
            );
    }

    let mut c = Criterion::default().configure_from_args();
    let mut group = c.benchmark_group("strips-lzw");

    run_bench_def(
        &mut group,
        BenchDef {
            image: make_image(64, 64, 64),
            id: "small-single-strip",
            sample_size: 500,
        },
    );

    run_bench_def(
        &mut group,
        BenchDef {
            image: make_image(768, 512, 16),
            id: "kodak-sized-strips",
            sample_size: 20,
        },
    );

    group.finish();
}
