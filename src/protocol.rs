use chrono::{DateTime, TimeZone, Utc};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{
    crc::{CrcAlgorithm, MESSAGE_CRC_ALGORITHMS},
    error::Error,
};

/// Leading byte of every frame
pub const FRAME_PREAMBLE: u8 = 0x73;

/// Unix timestamp of 2010-01-01T00:00:00Z, origin of [`TimeTag::Full`]
pub const TIME_TAG_EPOCH: i64 = 1_262_304_000;

/// Seconds in the half day a [`TimeTag::Short`] counts within
pub const HALF_DAY_SECONDS: i64 = 12 * 60 * 60;

/// Checksum algorithm protecting the whole message
///
/// | Selector | Algorithm     | Bytes |
/// |----------|---------------|-------|
/// | 0        | CRC-8 CCITT   | 1     |
/// | 1        | CRC-16 CCITT  | 2     |
/// | 2        | CRC-24 Radix64| 3     |
/// | 3        | CRC-32 CCITT  | 4     |
#[derive(Debug, PartialEq, Eq, Copy, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum MessageCrcType {
    Crc8,
    Crc16,
    Crc24,
    Crc32,
}

impl MessageCrcType {
    /// Parameters used to compute and read this checksum
    pub fn algorithm(self) -> &'static CrcAlgorithm {
        &MESSAGE_CRC_ALGORITHMS[u8::from(self) as usize]
    }
}

impl TryFrom<u8> for MessageCrcType {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Crc8),
            1 => Ok(Self::Crc16),
            2 => Ok(Self::Crc24),
            3 => Ok(Self::Crc32),
            _ => Err(Error::Protocol(value)),
        }
    }
}

impl From<MessageCrcType> for u8 {
    fn from(value: MessageCrcType) -> Self {
        match value {
            MessageCrcType::Crc8 => 0,
            MessageCrcType::Crc16 => 1,
            MessageCrcType::Crc24 => 2,
            MessageCrcType::Crc32 => 3,
        }
    }
}

/// Frame time tag
///
/// The width on the wire is chosen by the TimeTagType bit preceding it.
#[derive(Debug, PartialEq, Eq, Copy, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum TimeTag {
    /// 16 bits, seconds within the current half day
    Short(u16),
    /// 32 bits, seconds since 2010-01-01T00:00:00 (GPS time scale)
    Full(u32),
}

impl TimeTag {
    /// The TimeTagType bit, `false` for [`TimeTag::Short`]
    pub fn is_full(&self) -> bool {
        matches!(self, Self::Full(_))
    }

    pub fn seconds(&self) -> u32 {
        match *self {
            Self::Short(secs) => secs as u32,
            Self::Full(secs) => secs,
        }
    }

    /// Bytes taken by the payload description block carrying this tag
    pub fn description_len(&self) -> usize {
        match self {
            Self::Short(_) => 6,
            Self::Full(_) => 8,
        }
    }

    /// Converts a [`TimeTag::Full`] to a date.
    ///
    /// Leap seconds are not applied, the result is on the GPS time scale.
    /// Returns `None` for [`TimeTag::Short`].
    pub fn to_datetime(&self) -> Option<DateTime<Utc>> {
        match *self {
            Self::Short(_) => None,
            Self::Full(secs) => Utc.timestamp_opt(TIME_TAG_EPOCH + secs as i64, 0).single(),
        }
    }

    /// Places the tag in time, using `reference` to pick the half day a
    /// [`TimeTag::Short`] belongs to.
    ///
    /// Returns `None` if the result falls outside the range of [`DateTime`].
    pub fn resolve(&self, reference: DateTime<Utc>) -> Option<DateTime<Utc>> {
        let timestamp = match *self {
            Self::Short(secs) => {
                let half_day = reference.timestamp().div_euclid(HALF_DAY_SECONDS);
                half_day * HALF_DAY_SECONDS + secs as i64
            }
            Self::Full(secs) => TIME_TAG_EPOCH + secs as i64,
        };
        Utc.timestamp_opt(timestamp, 0).single()
    }
}

/// Fields of the 3 bytes following the preamble
#[derive(Debug, PartialEq, Eq, Copy, Clone)]
pub struct FrameStart {
    pub message_type: u8,
    pub payload_length: u16,
    pub eaf: bool,
    /// Raw 2-bit selector, see [`MessageCrcType`]
    pub message_crc_type: u8,
    pub header_crc: u8,
}

/// Fields of the variable length block following the frame start
#[derive(Debug, PartialEq, Eq, Copy, Clone)]
pub struct PayloadDescription {
    pub message_subtype: u8,
    pub time_tag: TimeTag,
    pub solution_id: u8,
    pub solution_processor_id: u8,
    pub encryption_id: u8,
    pub encryption_sequence_number: u8,
    pub authentication_indicator: u8,
    pub embedded_authentication_length: u8,
}

/// A decoded SPARTN transport frame
///
/// Only produced once both the header CRC and the message CRC matched.
#[derive(Debug, PartialEq, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Frame {
    pub preamble: u8,
    pub message_type: u8,
    pub payload_length: u16,
    /// Embedded authentication flag
    pub eaf: bool,
    pub message_crc_type: MessageCrcType,
    pub header_crc: u8,
    pub message_subtype: u8,
    pub time_tag: TimeTag,
    pub solution_id: u8,
    pub solution_processor_id: u8,
    pub encryption_id: u8,
    pub encryption_sequence_number: u8,
    pub authentication_indicator: u8,
    pub embedded_authentication_length: u8,
    /// Opaque, `payload_length` bytes
    #[cfg_attr(feature = "serde", serde(with = "serde_bytes"))]
    pub message_payload: Vec<u8>,
    /// Opaque, `embedded_authentication_length` bytes
    #[cfg_attr(feature = "serde", serde(with = "serde_bytes"))]
    pub embedded_authentication_data: Vec<u8>,
    pub message_crc: u32,
}

impl Frame {
    /// The TimeTagType bit
    pub fn time_tag_type(&self) -> bool {
        self.time_tag.is_full()
    }

    /// Number of bytes the frame occupied on the wire, preamble and CRC included
    pub fn raw_len(&self) -> usize {
        1 + crate::parser::FRAME_START_LEN
            + self.time_tag.description_len()
            + self.message_payload.len()
            + self.embedded_authentication_data.len()
            + self.message_crc_type.algorithm().byte_width()
    }
}

impl<'a> TryFrom<&'a [u8]> for Frame {
    type Error = Error;

    /// Decodes the first frame in `value`, ignoring trailing bytes.
    fn try_from(value: &'a [u8]) -> Result<Self, Self::Error> {
        let mut source = value;
        crate::read_frame(&mut source)
    }
}
