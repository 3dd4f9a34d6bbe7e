// SPDX-License-Identifier: MIT

use crate::{XvIO, XvIOError, XvIOResult, XvIOWrite};

/// In-memory implementation of `XvIO`.
///
/// Useful for tests and for building images before they hit the disk.
#[derive(Debug)]
pub struct MemXvIO<'a> {
    buffer: &'a mut [u8],
}

impl<'a> MemXvIO<'a> {
    #[inline]
    pub fn new(buffer: &'a mut [u8]) -> Self {
        Self { buffer }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    #[inline]
    fn range(&self, offset: u64, len: usize) -> XvIOResult<core::ops::Range<usize>> {
        let start = usize::try_from(offset).map_err(|_| XvIOError::OutOfBounds)?;
        let end = start.checked_add(len).ok_or(XvIOError::OutOfBounds)?;
        if end > self.buffer.len() {
            return Err(XvIOError::OutOfBounds);
        }
        Ok(start..end)
    }
}

impl<'a> XvIO for MemXvIO<'a> {
    #[inline(always)]
    fn read_at(&mut self, offset: u64, buf: &mut [u8]) -> XvIOResult {
        let range = self.range(offset, buf.len())?;
        buf.copy_from_slice(&self.buffer[range]);
        Ok(())
    }
}

impl<'a> XvIOWrite for MemXvIO<'a> {
    #[inline(always)]
    fn write_at(&mut self, offset: u64, data: &[u8]) -> XvIOResult {
        let range = self.range(offset, data.len())?;
        self.buffer[range].copy_from_slice(data);
        Ok(())
    }

    #[inline]
    fn flush(&mut self) -> XvIOResult {
        Ok(())
    }
}
