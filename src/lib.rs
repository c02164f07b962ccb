#![doc = include_str!("../README.md")]
pub mod crc;
mod decoder;
mod error;
pub mod parser;
mod protocol;
mod source;
mod stream;

pub use decoder::{read_frame, read_frame_start, read_payload_description};
pub use error::{Error, Result, Segment};
pub use protocol::*;
pub use source::FrameSource;
pub use stream::{Frames, SpartnStream};
