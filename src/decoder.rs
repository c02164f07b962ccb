use log::{debug, trace, warn};

use crate::{
    crc,
    error::{Error, Result, Segment},
    parser::{self, FRAME_START_LEN},
    protocol::*,
    source::FrameSource,
};

/// Reads and validates the preamble, consuming it either way.
fn read_preamble<S: FrameSource + ?Sized>(source: &mut S) -> Result<u8> {
    let preamble = source.take(1)?[0];
    if preamble != FRAME_PREAMBLE {
        warn!("invalid preamble 0x{preamble:02X}");
        return Err(Error::Framing { found: preamble });
    }
    Ok(preamble)
}

/// Reads the frame start and checks the header CRC.
///
/// The 3 bytes are only consumed when the CRC matches, so a caller can
/// look at them again after a mismatch. Returns the parsed fields and the
/// raw bytes for the message CRC.
pub fn read_frame_start<S: FrameSource + ?Sized>(source: &mut S) -> Result<(FrameStart, Vec<u8>)> {
    let bytes = source.peek(FRAME_START_LEN)?.to_vec();
    let (_, start) = parser::frame_start(&bytes)?;

    let computed = crc::header_crc(&bytes[..2]);
    if computed != start.header_crc {
        warn!(
            "header CRC mismatch: computed 0x{computed:02X}, received 0x{:X}",
            start.header_crc
        );
        return Err(Error::Integrity {
            segment: Segment::Header,
            computed: computed as u32,
            received: start.header_crc as u32,
        });
    }

    source.discard(FRAME_START_LEN)?;
    Ok((start, bytes))
}

/// Reads the payload description block, 6 or 8 bytes depending on its time tag type.
pub fn read_payload_description<S: FrameSource + ?Sized>(
    source: &mut S,
) -> Result<(PayloadDescription, Vec<u8>)> {
    let first = source.peek(1)?[0];
    let bytes = source.take(parser::payload_description_len(first))?;
    let (_, description) = parser::payload_description(&bytes)?;
    Ok((description, bytes))
}

/// Decode a single frame from `source`
///
/// Reads, in order: preamble, frame start, payload description, payload,
/// embedded authentication data and message CRC, then checks the message
/// CRC over everything between the preamble and the CRC itself.
///
/// # Errors
///
/// What is left consumed depends on where decoding stopped:
///
/// | Failure                          | Consumed                        |
/// |----------------------------------|---------------------------------|
/// | [`Error::Stream`]                | whatever was read so far        |
/// | [`Error::Framing`]               | the preamble byte               |
/// | [`Error::Integrity`] on header   | the preamble byte only          |
/// | [`Error::Integrity`] on message  | the whole frame                 |
///
/// Nothing is retried. To resynchronize, skip forward to the next
/// [`FRAME_PREAMBLE`].
pub fn read_frame<S: FrameSource + ?Sized>(source: &mut S) -> Result<Frame> {
    trace!("reading preamble");
    let preamble = read_preamble(source)?;

    trace!("reading frame start");
    let (start, start_bytes) = read_frame_start(source)?;

    trace!("reading payload description");
    let (description, description_bytes) = read_payload_description(source)?;

    trace!("reading {} payload bytes", start.payload_length);
    let message_payload = source.take(start.payload_length as usize)?;

    trace!(
        "reading {} authentication bytes",
        description.embedded_authentication_length
    );
    let embedded_authentication_data =
        source.take(description.embedded_authentication_length as usize)?;

    trace!("reading message CRC");
    let message_crc = crc::read_encoded(start.message_crc_type, source)?;
    let message_crc_type = MessageCrcType::try_from(start.message_crc_type)?;

    let mut covered = Vec::with_capacity(
        start_bytes.len()
            + description_bytes.len()
            + message_payload.len()
            + embedded_authentication_data.len(),
    );
    covered.extend_from_slice(&start_bytes);
    covered.extend_from_slice(&description_bytes);
    covered.extend_from_slice(&message_payload);
    covered.extend_from_slice(&embedded_authentication_data);

    let computed = message_crc_type.algorithm().checksum(&covered);
    if computed != message_crc {
        warn!("message CRC mismatch: computed 0x{computed:X}, received 0x{message_crc:X}");
        return Err(Error::Integrity {
            segment: Segment::Message,
            computed,
            received: message_crc,
        });
    }

    let frame = Frame {
        preamble,
        message_type: start.message_type,
        payload_length: start.payload_length,
        eaf: start.eaf,
        message_crc_type,
        header_crc: start.header_crc,
        message_subtype: description.message_subtype,
        time_tag: description.time_tag,
        solution_id: description.solution_id,
        solution_processor_id: description.solution_processor_id,
        encryption_id: description.encryption_id,
        encryption_sequence_number: description.encryption_sequence_number,
        authentication_indicator: description.authentication_indicator,
        embedded_authentication_length: description.embedded_authentication_length,
        message_payload,
        embedded_authentication_data,
        message_crc,
    };
    debug!(
        "decoded frame type {} subtype {}, {} payload bytes",
        frame.message_type, frame.message_subtype, frame.payload_length
    );
    Ok(frame)
}
