// Output sinks
//
// A sink accepts the complete rendering of one vector in a single write.
// Writes are all-or-nothing, so a failed call never leaves partial output.

use crate::FormatError;

pub trait Sink {
    /// Append `bytes`, or fail without writing anything
    fn write_all_or_nothing(&mut self, bytes: &[u8]) -> Result<(), FormatError>;
}

impl Sink for Vec<u8> {
    fn write_all_or_nothing(&mut self, bytes: &[u8]) -> Result<(), FormatError> {
        self.extend_from_slice(bytes);
        Ok(())
    }
}

/// Writer over a fixed caller-provided buffer.
///
/// Tracks the remaining capacity and reports an overflow instead of writing
/// past the end of the buffer.
#[derive(Debug)]
pub struct SizedWriter<'a> {
    buf: &'a mut [u8],
    len: usize,
}

impl<'a> SizedWriter<'a> {
    pub fn new(buf: &'a mut [u8]) -> Self {
        Self { buf, len: 0 }
    }

    pub fn capacity(&self) -> usize {
        self.buf.len()
    }

    pub fn remaining(&self) -> usize {
        self.buf.len() - self.len
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Bytes written so far
    pub fn written(&self) -> &[u8] {
        self.buf.get(..self.len).unwrap_or_default()
    }
}

impl Sink for SizedWriter<'_> {
    fn write_all_or_nothing(&mut self, bytes: &[u8]) -> Result<(), FormatError> {
        let end = self.len + bytes.len();
        let capacity = self.buf.len();
        let dst = self
            .buf
            .get_mut(self.len..end)
            .ok_or(FormatError::OutputOverflow {
                needed: end,
                capacity,
            })?;
        dst.copy_from_slice(bytes);
        self.len = end;
        Ok(())
    }
}
