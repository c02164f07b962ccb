use std::{fmt, io};

use thiserror::Error;

/// Part of the frame covered by a failed checksum
#[derive(Debug, PartialEq, Eq, Copy, Clone)]
pub enum Segment {
    /// The 3 bytes following the preamble
    Header,
    /// Everything from the header up to the trailing message CRC
    Message,
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Header => f.write_str("header"),
            Self::Message => f.write_str("message"),
        }
    }
}

/// Failure while decoding a frame.
///
/// Each variant leaves the source in a well defined state, see
/// [`read_frame`][crate::read_frame].
#[derive(Debug, Error)]
pub enum Error {
    /// The source failed or ended before the expected number of bytes were available.
    #[error("stream error: {0}")]
    Stream(#[from] io::Error),

    /// The first byte is not the frame preamble.
    #[error("invalid preamble 0x{found:02X}, expected 0x73")]
    Framing { found: u8 },

    /// A checksum did not match the value computed over the received bytes.
    #[error("{segment} CRC mismatch: computed 0x{computed:X}, received 0x{received:X}")]
    Integrity {
        segment: Segment,
        computed: u32,
        received: u32,
    },

    /// The message CRC selector does not map to a known algorithm.
    #[error("invalid message CRC type {0}")]
    Protocol(u8),
}

impl Error {
    pub(crate) fn short_read(wanted: usize, available: usize) -> Self {
        Self::Stream(io::Error::new(
            io::ErrorKind::UnexpectedEof,
            format!("needed {wanted} bytes, only {available} available"),
        ))
    }

    /// Whether the source ran out of bytes, as opposed to any other failure.
    pub fn is_short_read(&self) -> bool {
        matches!(self, Self::Stream(e) if e.kind() == io::ErrorKind::UnexpectedEof)
    }
}

impl<I> From<nom::Err<nom::error::Error<I>>> for Error {
    fn from(value: nom::Err<nom::error::Error<I>>) -> Self {
        // Segments are always peeked at their full width before parsing,
        // so the only way a bit parser fails is by running out of input.
        let code = match value {
            nom::Err::Incomplete(_) => nom::error::ErrorKind::Eof,
            nom::Err::Error(e) | nom::Err::Failure(e) => e.code,
        };
        Self::Stream(io::Error::new(
            io::ErrorKind::UnexpectedEof,
            format!("truncated segment: {}", code.description()),
        ))
    }
}

pub type Result<T> = std::result::Result<T, Error>;
