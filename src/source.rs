use crate::error::{Error, Result};

/// A byte source the frame decoder reads from.
///
/// Implementors must be able to look ahead without consuming, so that a
/// failed header check leaves the bytes in place for the caller to inspect.
pub trait FrameSource {
    /// Returns exactly the next `len` bytes without consuming them.
    ///
    /// # Errors
    ///
    /// Fails with [`Error::Stream`] if fewer than `len` bytes can be made
    /// available. A short read uses [`std::io::ErrorKind::UnexpectedEof`].
    fn peek(&mut self, len: usize) -> Result<&[u8]>;

    /// Consumes exactly `len` bytes.
    fn discard(&mut self, len: usize) -> Result<()>;

    /// Consumes `len` bytes and returns them as an owned buffer.
    fn take(&mut self, len: usize) -> Result<Vec<u8>> {
        let bytes = self.peek(len)?.to_vec();
        self.discard(len)?;
        Ok(bytes)
    }
}

impl FrameSource for &[u8] {
    fn peek(&mut self, len: usize) -> Result<&[u8]> {
        if self.len() < len {
            return Err(Error::short_read(len, self.len()));
        }
        Ok(&self[..len])
    }

    fn discard(&mut self, len: usize) -> Result<()> {
        if self.len() < len {
            return Err(Error::short_read(len, self.len()));
        }
        let (_, rest) = self.split_at(len);
        *self = rest;
        Ok(())
    }
}
