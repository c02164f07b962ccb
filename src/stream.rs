use std::io::{self, Read};

use log::debug;
#[cfg(feature = "tokio")]
use tokio::io::{AsyncRead, AsyncReadExt};

use crate::{
    decoder,
    error::{Error, Result},
    source::FrameSource,
    Frame, FRAME_PREAMBLE,
};

const DEFAULT_READ_CHUNK: usize = 1024;

/// A buffered wrapper around a byte stream carrying SPARTN frames.
///
/// Bytes are pulled from the inner stream only as far as the decoder needs
/// to look ahead, anything past that stays buffered for the next frame.
pub struct SpartnStream<S> {
    inner: S,
    buf: Vec<u8>,
    read_chunk: usize,
}

impl<S> SpartnStream<S> {
    /// Creates a new [`SpartnStream`] from an existing stream.
    pub fn new(inner: S) -> Self {
        Self::with_capacity(inner, DEFAULT_READ_CHUNK)
    }

    /// Creates a new [`SpartnStream`] reading at most `read_chunk` bytes per call to the inner stream.
    pub fn with_capacity(inner: S, read_chunk: usize) -> Self {
        Self {
            inner,
            buf: Vec::with_capacity(read_chunk),
            read_chunk: read_chunk.max(1),
        }
    }

    /// Bytes read from the inner stream but not yet consumed
    pub fn buffered(&self) -> &[u8] {
        &self.buf
    }

    pub fn into_inner(self) -> S {
        self.inner
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }

    pub fn inner_mut(&mut self) -> &mut S {
        &mut self.inner
    }
}

impl<S: Read> SpartnStream<S> {
    /// Reads once from the inner stream, returning the number of new bytes.
    fn fill(&mut self) -> io::Result<usize> {
        let mut recv_buf = vec![0u8; self.read_chunk];
        loop {
            match self.inner.read(&mut recv_buf) {
                Ok(bytes_read) => {
                    self.buf.extend_from_slice(&recv_buf[..bytes_read]);
                    return Ok(bytes_read);
                }
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
        }
    }

    /// Reads a frame from the stream.
    ///
    /// # Errors
    ///
    /// See [`read_frame`][crate::read_frame] for what is left consumed on each error.
    pub fn read_frame(&mut self) -> Result<Frame> {
        decoder::read_frame(self)
    }

    /// Discards bytes up to the next preamble.
    ///
    /// Returns the number of bytes skipped. The preamble itself is left in
    /// place for [`read_frame`][Self::read_frame].
    pub fn seek_preamble(&mut self) -> Result<usize> {
        let mut skipped = 0;
        loop {
            if let Some(pos) = self.buf.iter().position(|&b| b == FRAME_PREAMBLE) {
                self.buf.drain(..pos);
                skipped += pos;
                break;
            }
            skipped += self.buf.len();
            self.buf.clear();
            if self.fill()? == 0 {
                return Err(Error::short_read(1, 0));
            }
        }
        if skipped > 0 {
            debug!("skipped {skipped} bytes looking for a preamble");
        }
        Ok(skipped)
    }

    /// Iterates over the frames in the stream.
    ///
    /// Decoding errors are yielded as they occur and iteration carries on
    /// from wherever the failed frame left the stream. Iteration stops at
    /// the first I/O error or once the stream ends.
    pub fn frames(&mut self) -> Frames<'_, S> {
        Frames {
            stream: self,
            done: false,
        }
    }
}

impl<S: Read> FrameSource for SpartnStream<S> {
    fn peek(&mut self, len: usize) -> Result<&[u8]> {
        while self.buf.len() < len {
            if self.fill()? == 0 {
                return Err(Error::short_read(len, self.buf.len()));
            }
        }
        Ok(&self.buf[..len])
    }

    fn discard(&mut self, len: usize) -> Result<()> {
        self.peek(len)?;
        self.buf.drain(..len);
        Ok(())
    }
}

/// Iterator returned by [`SpartnStream::frames`]
pub struct Frames<'a, S> {
    stream: &'a mut SpartnStream<S>,
    done: bool,
}

impl<S: Read> Iterator for Frames<'_, S> {
    type Item = Result<Frame>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.stream.peek(1) {
            Ok(_) => {}
            Err(e) => {
                self.done = true;
                return if e.is_short_read() { None } else { Some(Err(e)) };
            }
        }
        let result = self.stream.read_frame();
        if matches!(result, Err(Error::Stream(_))) {
            self.done = true;
        }
        Some(result)
    }
}

#[cfg(feature = "tokio")]
impl<S: AsyncRead + Unpin> SpartnStream<S> {
    /// Reads a frame from the stream.
    ///
    /// Leaves the stream consumed exactly as [`SpartnStream::read_frame`] does.
    pub async fn read_frame_async(&mut self) -> Result<Frame> {
        loop {
            // The decoder restarts from the front of the buffer after each
            // partial read, so its trace output repeats on a slow stream.
            let (result, remaining) = {
                let mut window = &self.buf[..];
                let result = decoder::read_frame(&mut window);
                (result, window.len())
            };

            match result {
                Err(e) if e.is_short_read() => {
                    let mut recv_buf = vec![0u8; self.read_chunk];
                    let bytes_read = self.inner.read(&mut recv_buf).await?;
                    if bytes_read == 0 {
                        let consumed = self.buf.len() - remaining;
                        self.buf.drain(..consumed);
                        return Err(e);
                    }
                    self.buf.extend_from_slice(&recv_buf[..bytes_read]);
                }
                result => {
                    let consumed = self.buf.len() - remaining;
                    self.buf.drain(..consumed);
                    return result;
                }
            }
        }
    }
}
