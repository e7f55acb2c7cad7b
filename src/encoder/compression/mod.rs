use std::io::{self, Write};

use crate::tags::CompressionMethod;

#[cfg(feature = "deflate")]
mod deflate;
#[cfg(feature = "lzw")]
mod lzw;
mod packbits;
mod uncompressed;

#[cfg(feature = "deflate")]
pub use self::deflate::{Deflate, DeflateLevel};
#[cfg(feature = "lzw")]
pub use self::lzw::Lzw;
pub use self::packbits::Packbits;
pub use self::uncompressed::Uncompressed;

/// An algorithm used for compression
pub trait CompressionAlgorithm {
    /// The function to encode a sequence of bytes into a sequence of bytes.
    fn write_to<W: Write>(&mut self, writer: &mut W, bytes: &[u8]) -> Result<u64, io::Error>;
}

/// An algorithm used for compression with associated optional buffers and/or configurations.
pub trait Compression: CompressionAlgorithm {
    /// The corresponding tag to the algorithm.
    const COMPRESSION_METHOD: CompressionMethod;

    fn tag(&self) -> CompressionMethod {
        Self::COMPRESSION_METHOD
    }

    /// Access to the compression algorithm.
    fn get_algorithm(&self) -> Compressor;
}

/// An enum to store each compression algorithm.
#[derive(Debug, Clone)]
pub enum Compressor {
    Uncompressed(Uncompressed),
    #[cfg(feature = "lzw")]
    Lzw(Lzw),
    #[cfg(feature = "deflate")]
    Deflate(Deflate),
    Packbits(Packbits),
}

impl Default for Compressor {
    /// The default compression strategy does not apply any compression.
    fn default() -> Self {
        Compressor::Uncompressed(Uncompressed)
    }
}

impl Compressor {
    /// The strip compression tag matching this compressor.
    pub fn tag(&self) -> CompressionMethod {
        match self {
            Compressor::Uncompressed(c) => c.tag(),
            #[cfg(feature = "lzw")]
            Compressor::Lzw(c) => c.tag(),
            #[cfg(feature = "deflate")]
            Compressor::Deflate(c) => c.tag(),
            Compressor::Packbits(c) => c.tag(),
        }
    }
}

impl CompressionAlgorithm for Compressor {
    fn write_to<W: Write>(&mut self, writer: &mut W, bytes: &[u8]) -> Result<u64, io::Error> {
        match self {
            Compressor::Uncompressed(algorithm) => algorithm.write_to(writer, bytes),
            #[cfg(feature = "lzw")]
            Compressor::Lzw(algorithm) => algorithm.write_to(writer, bytes),
            #[cfg(feature = "deflate")]
            Compressor::Deflate(algorithm) => algorithm.write_to(writer, bytes),
            Compressor::Packbits(algorithm) => algorithm.write_to(writer, bytes),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decoder::decompress;

    pub const TEST_DATA: &[u8] = b"This is a string for checking various compression algorithms.";

    pub fn compress(data: &[u8], mut compressor: Compressor) -> Vec<u8> {
        let mut buffer = Vec::new();
        let written = compressor.write_to(&mut buffer, data).unwrap();
        assert_eq!(written as usize, buffer.len());
        buffer
    }

    #[test]
    fn every_compressor_round_trips() {
        #[allow(unused_mut)]
        let mut compressors = vec![Compressor::default(), Packbits.get_algorithm()];
        #[cfg(feature = "lzw")]
        compressors.push(Lzw.get_algorithm());
        #[cfg(feature = "deflate")]
        compressors.push(Deflate::default().get_algorithm());

        for compressor in compressors {
            let method = compressor.tag();
            let compressed = compress(TEST_DATA, compressor);
            assert_eq!(
                decompress(&compressed, method, TEST_DATA.len()).unwrap(),
                TEST_DATA,
                "{:?}",
                method
            );
        }
    }
}
