#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let mut limits = pixel_strips::decoder::Limits::default();
    limits.decoding_buffer_size = 1_000_000;
    limits.intermediate_buffer_size = 1_000_000;

    let mut decoder =
        pixel_strips::decoder::Decoder::new(std::io::Cursor::new(data)).with_limits(limits);

    let _ = decoder.read_pnm();
});
