use std::ops::{AddAssign, Shl, Shr};

use nom::{bits::bits, bits::complete::take, IResult};

use crate::protocol::*;

type BitInput<'a> = (&'a [u8], usize);
type BitResult<'a, O> = IResult<BitInput<'a>, O, nom::error::Error<BitInput<'a>>>;

/// Bytes taken by the frame start after the preamble
pub const FRAME_START_LEN: usize = 3;

/// Takes `count` bits, most significant bit first, across byte boundaries
fn field<'a, O>(count: usize) -> impl Fn(BitInput<'a>) -> BitResult<'a, O>
where
    O: From<u8> + AddAssign + Shl<usize, Output = O> + Shr<usize, Output = O>,
{
    take(count)
}

fn flag(input: BitInput) -> BitResult<bool> {
    let (input, bit): (_, u8) = field(1)(input)?;
    Ok((input, bit == 1))
}

fn frame_start_bits(input: BitInput) -> BitResult<FrameStart> {
    let (input, message_type) = field(7)(input)?;
    let (input, payload_length) = field(10)(input)?;
    let (input, eaf) = flag(input)?;
    let (input, message_crc_type) = field(2)(input)?;
    let (input, header_crc) = field(4)(input)?;

    Ok((
        input,
        FrameStart {
            message_type,
            payload_length,
            eaf,
            message_crc_type,
            header_crc,
        },
    ))
}

/// Parse the frame start
///
/// Takes the 3 bytes following the preamble:
///
/// | Field            | Bits |
/// |------------------|------|
/// | Message type     | 7    |
/// | Payload length   | 10   |
/// | EAF              | 1    |
/// | Message CRC type | 2    |
/// | Header CRC       | 4    |
///
/// The header CRC is not verified here.
pub fn frame_start(input: &[u8]) -> IResult<&[u8], FrameStart> {
    bits(frame_start_bits)(input)
}

fn time_tag(input: BitInput) -> BitResult<TimeTag> {
    let (input, full) = flag(input)?;
    if full {
        let (input, secs) = field(32)(input)?;
        Ok((input, TimeTag::Full(secs)))
    } else {
        let (input, secs) = field(16)(input)?;
        Ok((input, TimeTag::Short(secs)))
    }
}

fn payload_description_bits(input: BitInput) -> BitResult<PayloadDescription> {
    let (input, message_subtype) = field(4)(input)?;
    let (input, time_tag) = time_tag(input)?;
    let (input, solution_id) = field(7)(input)?;
    let (input, solution_processor_id) = field(4)(input)?;
    let (input, encryption_id) = field(4)(input)?;
    let (input, encryption_sequence_number) = field(6)(input)?;
    let (input, authentication_indicator) = field(3)(input)?;
    let (input, embedded_authentication_length) = field(3)(input)?;

    Ok((
        input,
        PayloadDescription {
            message_subtype,
            time_tag,
            solution_id,
            solution_processor_id,
            encryption_id,
            encryption_sequence_number,
            authentication_indicator,
            embedded_authentication_length,
        },
    ))
}

/// Parse the payload description block
///
/// 6 bytes long with a 16 bit time tag, 8 bytes with a 32 bit one.
pub fn payload_description(input: &[u8]) -> IResult<&[u8], PayloadDescription> {
    bits(payload_description_bits)(input)
}

/// Length of the payload description block announced by its first byte
pub fn payload_description_len(first: u8) -> usize {
    if first & 0x08 != 0 {
        8
    } else {
        6
    }
}
