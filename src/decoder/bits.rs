//! Bit level reading of packed samples.

use std::io::Read;

use super::stream::ByteOrder;
use crate::{DecodeError, DecodeResult};

/// Order in which the bits of the stream are assembled into samples.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum BitOrder {
    /// The first bit of a sample is the most significant bit of the current byte. Samples
    /// spanning several bytes are big endian.
    #[default]
    Msb,
    /// The first bit of a sample is the least significant bit of the current byte. Samples
    /// spanning several bytes are little endian.
    Lsb,
}

impl From<ByteOrder> for BitOrder {
    fn from(order: ByteOrder) -> BitOrder {
        match order {
            ByteOrder::BigEndian => BitOrder::Msb,
            ByteOrder::LittleEndian => BitOrder::Lsb,
        }
    }
}

/// Reads unsigned integers of 0 to 32 bits from a byte source.
#[derive(Debug)]
pub struct BitReader<R> {
    reader: R,
    order: BitOrder,
    cache: u64,
    bits_in_cache: u8,
    bytes_consumed: u64,
}

impl<R: Read> BitReader<R> {
    pub fn new(reader: R, order: BitOrder) -> Self {
        BitReader {
            reader,
            order,
            cache: 0,
            bits_in_cache: 0,
            bytes_consumed: 0,
        }
    }

    /// Read the next `count` bits as an unsigned value.
    pub fn read_bits(&mut self, count: u8) -> DecodeResult<u32> {
        if count == 0 {
            return Ok(0);
        }
        if count > 32 {
            return Err(DecodeError::CorruptStream(format!(
                "can not read {} bits into one sample",
                count
            )));
        }

        while self.bits_in_cache < count {
            let mut byte = [0u8; 1];
            self.reader.read_exact(&mut byte)?;
            self.bytes_consumed += 1;

            match self.order {
                BitOrder::Msb => self.cache = (self.cache << 8) | u64::from(byte[0]),
                BitOrder::Lsb => self.cache |= u64::from(byte[0]) << self.bits_in_cache,
            }
            self.bits_in_cache += 8;
        }

        let mask = (1u64 << count) - 1;
        let sample = match self.order {
            BitOrder::Msb => (self.cache >> (self.bits_in_cache - count)) & mask,
            BitOrder::Lsb => {
                let sample = self.cache & mask;
                self.cache >>= count;
                sample
            }
        };

        self.bits_in_cache -= count;
        self.cache &= (1u64 << self.bits_in_cache) - 1;

        Ok(sample as u32)
    }

    /// Drop the bits left over from a partially consumed byte.
    pub fn flush_cache(&mut self) {
        self.cache = 0;
        self.bits_in_cache = 0;
    }

    /// Number of bits read from the source but not yet returned.
    pub fn bits_in_cache(&self) -> u8 {
        self.bits_in_cache
    }

    /// Number of bytes pulled from the source so far.
    pub fn bytes_consumed(&self) -> u64 {
        self.bytes_consumed
    }

    pub fn into_inner(self) -> R {
        self.reader
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn msb_sub_byte_samples() {
        let data = [0b1011_0010u8, 0b0111_0000];
        let mut reader = BitReader::new(&data[..], BitOrder::Msb);

        assert_eq!(reader.read_bits(1).unwrap(), 1);
        assert_eq!(reader.read_bits(2).unwrap(), 0b01);
        assert_eq!(reader.read_bits(4).unwrap(), 0b1001);
        assert_eq!(reader.read_bits(4).unwrap(), 0b0011);
        assert_eq!(reader.bits_in_cache(), 5);
        assert_eq!(reader.bytes_consumed(), 2);
    }

    #[test]
    fn lsb_sub_byte_samples() {
        let data = [0b1011_0010u8];
        let mut reader = BitReader::new(&data[..], BitOrder::Lsb);

        assert_eq!(reader.read_bits(1).unwrap(), 0);
        assert_eq!(reader.read_bits(3).unwrap(), 0b001);
        assert_eq!(reader.read_bits(4).unwrap(), 0b1011);
    }

    #[test]
    fn multi_byte_samples_follow_order() {
        let data = [0x12u8, 0x34, 0x56, 0x78];
        let mut reader = BitReader::new(&data[..], BitOrder::Msb);
        assert_eq!(reader.read_bits(16).unwrap(), 0x1234);
        assert_eq!(reader.read_bits(16).unwrap(), 0x5678);

        let mut reader = BitReader::new(&data[..], ByteOrder::LittleEndian.into());
        assert_eq!(reader.read_bits(32).unwrap(), 0x7856_3412);
    }

    #[test]
    fn unaligned_wide_samples() {
        // 4 bit prefix followed by a 24 bit value straddling four bytes.
        let data = [0xFA, 0xBC, 0xDE, 0xF0];
        let mut reader = BitReader::new(&data[..], BitOrder::Msb);
        assert_eq!(reader.read_bits(4).unwrap(), 0xF);
        assert_eq!(reader.read_bits(24).unwrap(), 0xABCDEF);
        assert_eq!(reader.read_bits(4).unwrap(), 0x0);
    }

    #[test]
    fn flush_realigns_to_next_byte() {
        let data = [0b1100_0000u8, 0b1010_0000];
        let mut reader = BitReader::new(&data[..], BitOrder::Msb);
        assert_eq!(reader.read_bits(2).unwrap(), 0b11);
        reader.flush_cache();
        assert_eq!(reader.bits_in_cache(), 0);
        assert_eq!(reader.read_bits(3).unwrap(), 0b101);
    }

    #[test]
    fn exhausted_source() {
        let data = [0xFFu8];
        let mut reader = BitReader::new(&data[..], BitOrder::Msb);
        assert!(matches!(
            reader.read_bits(16),
            Err(DecodeError::UnexpectedEndOfStream)
        ));
    }

    #[test]
    fn oversized_read_is_rejected() {
        let data = [0u8; 8];
        let mut reader = BitReader::new(&data[..], BitOrder::Msb);
        assert!(matches!(
            reader.read_bits(33),
            Err(DecodeError::CorruptStream(_))
        ));
    }
}
