use crate::encoder::compression::*;
use weezl::encode::Encoder as LZWEncoder;

/// LZW with the code width switch one code early, as strip readers expect it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Lzw;

impl Compression for Lzw {
    const COMPRESSION_METHOD: CompressionMethod = CompressionMethod::LZW;

    fn get_algorithm(&self) -> Compressor {
        Compressor::Lzw(*self)
    }
}

impl CompressionAlgorithm for Lzw {
    fn write_to<W: Write>(&mut self, writer: &mut W, bytes: &[u8]) -> Result<u64, io::Error> {
        let mut encoder = LZWEncoder::with_tiff_size_switch(weezl::BitOrder::Msb, 8);
        let result = encoder.into_stream(writer).encode_all(bytes);
        let byte_count = result.bytes_written as u64;
        result.status.map(|_| byte_count)
    }
}
