use std::io;

use quick_error::quick_error;

quick_error! {
    /// Errors raised while turning strip data into a raster.
    #[derive(Debug)]
    pub enum DecodeError {
        /// The byte source ran out before the declared amount of data was read.
        UnexpectedEndOfStream {
            display("unexpected end of stream")
        }
        /// The data is malformed: bad compression codes, a decompressed size that does not
        /// match the declared one, a palette index out of range.
        CorruptStream(reason: String) {
            display("corrupt stream: {}", reason)
        }
        /// The compression tag is known or unknown but not implemented.
        UnsupportedCompression(tag: u16) {
            display("unsupported compression method {}", tag)
        }
        /// The predictor tag is not implemented.
        UnsupportedPredictor(tag: u16) {
            display("unsupported predictor {}", tag)
        }
        /// The combination of photometric interpretation and sample layout can not be
        /// turned into ARGB.
        UnsupportedPixelEncoding { photometric: u16, bits_per_sample: Vec<u8> } {
            display("unsupported pixel encoding: photometric interpretation {} with bits per sample {:?}",
                photometric, bits_per_sample)
        }
        /// A pixel coordinate fell outside the raster.
        BoundsViolation { x: u32, y: u32, width: u32, height: u32 } {
            display("pixel ({}, {}) is outside of the {}x{} raster", x, y, width, height)
        }
        /// A buffer required for decoding exceeds the configured [`Limits`](crate::decoder::Limits).
        LimitsExceeded {
            display("the image is too large to decode within the configured limits")
        }
        /// An I/O error other than a premature end of the source.
        Io(err: io::Error) {
            display("{}", err)
            source(err)
        }
    }
}

impl From<io::Error> for DecodeError {
    fn from(err: io::Error) -> DecodeError {
        match err.kind() {
            io::ErrorKind::UnexpectedEof => DecodeError::UnexpectedEndOfStream,
            _ => DecodeError::Io(err),
        }
    }
}

/// Result of a decoding process
pub type DecodeResult<T> = Result<T, DecodeError>;
