use crate::encoder::compression::*;

/// Compressor that uses the Packbits[^note] algorithm to compress bytes.
///
/// [^note]: PackBits is often ineffective on continuous tone images,
///          including many grayscale images. In such cases, it is better
///          to leave the image uncompressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Packbits;

/// Shortest run written as a repeat packet.
const MIN_RUN: usize = 3;
/// Most bytes a single packet can describe.
const MAX_PACKET: usize = 128;

impl Compression for Packbits {
    const COMPRESSION_METHOD: CompressionMethod = CompressionMethod::PackBits;

    fn get_algorithm(&self) -> Compressor {
        Compressor::Packbits(*self)
    }
}

impl CompressionAlgorithm for Packbits {
    fn write_to<W: Write>(&mut self, writer: &mut W, bytes: &[u8]) -> Result<u64, io::Error> {
        let mut written = 0u64;
        let mut literal_start = 0;
        let mut index = 0;

        while index < bytes.len() {
            let run = run_length(&bytes[index..]);
            if run >= MIN_RUN {
                written += write_literals(writer, &bytes[literal_start..index])?;
                // Header is 1 - n as a signed byte.
                writer.write_all(&[(1 - run as i16) as u8, bytes[index]])?;
                written += 2;
                index += run;
                literal_start = index;
            } else {
                index += run;
            }
        }

        written += write_literals(writer, &bytes[literal_start..])?;
        Ok(written)
    }
}

/// Length of the run of equal bytes at the start of `bytes`, at most one packet long.
fn run_length(bytes: &[u8]) -> usize {
    let first = bytes[0];
    bytes
        .iter()
        .take(MAX_PACKET)
        .take_while(|&&b| b == first)
        .count()
}

fn write_literals<W: Write>(writer: &mut W, literals: &[u8]) -> Result<u64, io::Error> {
    let mut written = 0;
    for packet in literals.chunks(MAX_PACKET) {
        writer.write_all(&[(packet.len() - 1) as u8])?;
        writer.write_all(packet)?;
        written += 1 + packet.len() as u64;
    }
    Ok(written)
}
