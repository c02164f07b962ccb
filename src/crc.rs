use nom::{
    number::complete::{be_u16, be_u24, be_u32, be_u8},
    IResult,
};

use crate::{
    error::{Error, Result},
    source::FrameSource,
};

/// Parameters of a (non table driven) CRC algorithm.
///
/// Widths from 8 to 32 bits are supported, which covers every checksum a
/// SPARTN frame carries.
#[derive(Debug, PartialEq, Eq, Copy, Clone)]
pub struct CrcAlgorithm {
    pub width: u8,
    pub poly: u32,
    pub init: u32,
    pub xor_out: u32,
    pub reflect_in: bool,
    pub reflect_out: bool,
}

/// Checksum protecting the first two bytes after the preamble.
///
/// Unreflected CRC-8 with polynomial 0x09, compared against the 4-bit
/// header CRC field.
pub const HEADER_CRC: CrcAlgorithm = CrcAlgorithm {
    width: 8,
    poly: 0x09,
    init: 0,
    xor_out: 0,
    reflect_in: false,
    reflect_out: false,
};

/// Message CRC algorithms indexed by their 2-bit selector.
pub const MESSAGE_CRC_ALGORITHMS: [CrcAlgorithm; 4] = [
    // CRC-8 CCITT
    CrcAlgorithm {
        width: 8,
        poly: 0x07,
        init: 0,
        xor_out: 0,
        reflect_in: false,
        reflect_out: false,
    },
    // CRC-16 CCITT
    CrcAlgorithm {
        width: 16,
        poly: 0x1021,
        init: 0,
        xor_out: 0,
        reflect_in: false,
        reflect_out: false,
    },
    // CRC-24 Radix-64
    CrcAlgorithm {
        width: 24,
        poly: 0x864CFB,
        init: 0,
        xor_out: 0,
        reflect_in: false,
        reflect_out: false,
    },
    // CRC-32 CCITT
    CrcAlgorithm {
        width: 32,
        poly: 0x04C11DB7,
        init: 0xFFFFFFFF,
        xor_out: 0xFFFFFFFF,
        reflect_in: false,
        reflect_out: false,
    },
];

impl CrcAlgorithm {
    fn mask(&self) -> u32 {
        u32::MAX >> (32 - self.width as u32)
    }

    /// Number of bytes the checksum occupies on the wire
    pub const fn byte_width(&self) -> usize {
        self.width as usize / 8
    }

    /// Computes the checksum of `data`, MSB-first unless reflected.
    pub fn checksum(&self, data: &[u8]) -> u32 {
        let top = 1u32 << (self.width - 1);
        let mask = self.mask();

        let mut crc = self.init & mask;
        for &byte in data {
            let byte = if self.reflect_in {
                byte.reverse_bits()
            } else {
                byte
            };
            crc ^= (byte as u32) << (self.width - 8);
            for _bit in 0..8 {
                crc = if crc & top != 0 {
                    (crc << 1) ^ self.poly
                } else {
                    crc << 1
                };
                crc &= mask;
            }
        }

        if self.reflect_out {
            crc = crc.reverse_bits() >> (32 - self.width as u32);
        }
        (crc ^ self.xor_out) & mask
    }

    /// Consumes the encoded checksum from `source`.
    ///
    /// Reads exactly [`byte_width`][Self::byte_width] bytes, most significant first.
    /// Nothing is recomputed, the value is only parsed for later comparison.
    pub fn read_encoded<S: FrameSource + ?Sized>(&self, source: &mut S) -> Result<u32> {
        let len = self.byte_width();
        let bytes = source.peek(len)?;
        let parsed: IResult<&[u8], u32> = match len {
            1 => be_u8(bytes).map(|(i, v)| (i, v as u32)),
            2 => be_u16(bytes).map(|(i, v)| (i, v as u32)),
            3 => be_u24(bytes),
            _ => be_u32(bytes),
        };
        let (_, value) = parsed?;
        source.discard(len)?;
        Ok(value)
    }
}

/// Looks up the message CRC algorithm for a 2-bit selector.
pub fn algorithm(selector: u8) -> Result<&'static CrcAlgorithm> {
    MESSAGE_CRC_ALGORITHMS
        .get(selector as usize)
        .ok_or(Error::Protocol(selector))
}

/// Computes the message CRC selected by `selector` over `data`.
pub fn compute(selector: u8, data: &[u8]) -> Result<u32> {
    algorithm(selector).map(|algorithm| algorithm.checksum(data))
}

/// Reads the encoded message CRC selected by `selector`.
///
/// An unknown selector fails before anything is read from `source`.
pub fn read_encoded<S: FrameSource + ?Sized>(selector: u8, source: &mut S) -> Result<u32> {
    algorithm(selector)?.read_encoded(source)
}

/// Header checksum over the first two bytes following the preamble.
pub fn header_crc(data: &[u8]) -> u8 {
    HEADER_CRC.checksum(data) as u8
}
