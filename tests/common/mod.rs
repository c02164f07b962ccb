#![allow(dead_code)]

use nom_spartn::{crc, Frame, MessageCrcType, TimeTag, FRAME_PREAMBLE};

/// Writes fields MSB-first into a byte buffer
#[derive(Default)]
pub struct BitWriter {
    bytes: Vec<u8>,
    bit_len: usize,
}

impl BitWriter {
    pub fn push(&mut self, value: u32, width: usize) {
        for i in (0..width).rev() {
            if self.bit_len % 8 == 0 {
                self.bytes.push(0);
            }
            if (value >> i) & 1 == 1 {
                let last = self.bytes.len() - 1;
                self.bytes[last] |= 0x80 >> (self.bit_len % 8);
            }
            self.bit_len += 1;
        }
    }

    pub fn finish(self) -> Vec<u8> {
        assert_eq!(self.bit_len % 8, 0, "segment is not byte aligned");
        self.bytes
    }
}

/// Fields a test frame is built from, everything else is derived
#[derive(Clone)]
pub struct FrameFields {
    pub message_type: u8,
    pub eaf: bool,
    pub message_crc_type: MessageCrcType,
    pub message_subtype: u8,
    pub time_tag: TimeTag,
    pub solution_id: u8,
    pub solution_processor_id: u8,
    pub encryption_id: u8,
    pub encryption_sequence_number: u8,
    pub authentication_indicator: u8,
    pub payload: Vec<u8>,
    pub auth: Vec<u8>,
}

impl Default for FrameFields {
    fn default() -> Self {
        Self {
            message_type: 0,
            eaf: false,
            message_crc_type: MessageCrcType::Crc8,
            message_subtype: 0,
            time_tag: TimeTag::Short(0),
            solution_id: 0,
            solution_processor_id: 0,
            encryption_id: 0,
            encryption_sequence_number: 0,
            authentication_indicator: 0,
            payload: vec![],
            auth: vec![],
        }
    }
}

pub fn frame_start(fields: &FrameFields) -> Vec<u8> {
    let mut head = BitWriter::default();
    head.push(fields.message_type as u32, 7);
    head.push(fields.payload.len() as u32, 10);
    head.push(fields.eaf as u32, 1);
    head.push(u8::from(fields.message_crc_type) as u32, 2);
    head.push(0, 4);
    let mut bytes = head.finish();

    let header_crc = crc::header_crc(&bytes[..2]);
    assert!(
        header_crc <= 0x0F,
        "header CRC 0x{header_crc:02X} does not fit the 4-bit field, pick another type/length"
    );
    bytes[2] |= header_crc;
    bytes
}

pub fn payload_description(fields: &FrameFields) -> Vec<u8> {
    let mut description = BitWriter::default();
    description.push(fields.message_subtype as u32, 4);
    match fields.time_tag {
        TimeTag::Short(secs) => {
            description.push(0, 1);
            description.push(secs as u32, 16);
        }
        TimeTag::Full(secs) => {
            description.push(1, 1);
            description.push(secs, 32);
        }
    }
    description.push(fields.solution_id as u32, 7);
    description.push(fields.solution_processor_id as u32, 4);
    description.push(fields.encryption_id as u32, 4);
    description.push(fields.encryption_sequence_number as u32, 6);
    description.push(fields.authentication_indicator as u32, 3);
    description.push(fields.auth.len() as u32, 3);
    description.finish()
}

/// Encodes a complete frame, CRCs included
pub fn encode(fields: &FrameFields) -> Vec<u8> {
    let mut covered = frame_start(fields);
    covered.extend(payload_description(fields));
    covered.extend(&fields.payload);
    covered.extend(&fields.auth);

    let algorithm = fields.message_crc_type.algorithm();
    let message_crc = algorithm.checksum(&covered);

    let mut frame = vec![FRAME_PREAMBLE];
    frame.extend(&covered);
    frame.extend(&message_crc.to_be_bytes()[4 - algorithm.byte_width()..]);
    frame
}

/// The frame [`encode`] is expected to decode back to
pub fn expected(fields: &FrameFields) -> Frame {
    let bytes = encode(fields);
    let width = fields.message_crc_type.algorithm().byte_width();
    let message_crc = bytes[bytes.len() - width..]
        .iter()
        .fold(0u32, |acc, &b| (acc << 8) | b as u32);

    Frame {
        preamble: FRAME_PREAMBLE,
        message_type: fields.message_type,
        payload_length: fields.payload.len() as u16,
        eaf: fields.eaf,
        message_crc_type: fields.message_crc_type,
        header_crc: bytes[3] & 0x0F,
        message_subtype: fields.message_subtype,
        time_tag: fields.time_tag,
        solution_id: fields.solution_id,
        solution_processor_id: fields.solution_processor_id,
        encryption_id: fields.encryption_id,
        encryption_sequence_number: fields.encryption_sequence_number,
        authentication_indicator: fields.authentication_indicator,
        embedded_authentication_length: fields.auth.len() as u8,
        message_payload: fields.payload.clone(),
        embedded_authentication_data: fields.auth.clone(),
        message_crc,
    }
}

/// Message type 1 with 37 payload bytes has a header CRC of 0
pub fn sample_fields() -> FrameFields {
    FrameFields {
        message_type: 1,
        eaf: false,
        message_crc_type: MessageCrcType::Crc16,
        message_subtype: 2,
        time_tag: TimeTag::Short(0xABCD),
        solution_id: 5,
        solution_processor_id: 3,
        encryption_id: 9,
        encryption_sequence_number: 33,
        authentication_indicator: 4,
        payload: (0..37).collect(),
        auth: vec![],
    }
}

/// Message type 4 with 5 payload bytes, header CRC 8, authenticated
pub fn authenticated_fields() -> FrameFields {
    FrameFields {
        message_type: 4,
        eaf: true,
        message_crc_type: MessageCrcType::Crc32,
        message_subtype: 15,
        time_tag: TimeTag::Full(0x12345678),
        solution_id: 127,
        solution_processor_id: 15,
        encryption_id: 15,
        encryption_sequence_number: 63,
        authentication_indicator: 7,
        payload: vec![0xDE, 0xAD, 0xBE, 0xEF, 0x01],
        auth: vec![0xA5; 7],
    }
}
