// SPDX-License-Identifier: MIT

use std::io::{Read, Seek, SeekFrom, Write};

use crate::{XvIO, XvIOResult, XvIOWrite};

/// `XvIO` over any seekable reader, typically a `std::fs::File`.
///
/// A read-only handle is enough for `XvIO`; `XvIOWrite` is only available
/// when the inner type is also `Write`.
#[derive(Debug)]
pub struct StdXvIO<'a, T: Read + Seek> {
    io: &'a mut T,
}

impl<'a, T: Read + Seek> StdXvIO<'a, T> {
    #[inline]
    pub fn new(io: &'a mut T) -> Self {
        Self { io }
    }

    /// Total length of the underlying stream in bytes.
    pub fn stream_len(&mut self) -> XvIOResult<u64> {
        let len = self.io.seek(SeekFrom::End(0))?;
        Ok(len)
    }
}

impl<'a, T: Read + Seek> XvIO for StdXvIO<'a, T> {
    fn read_at(&mut self, offset: u64, buf: &mut [u8]) -> XvIOResult {
        self.io.seek(SeekFrom::Start(offset))?;
        self.io.read_exact(buf)?;
        Ok(())
    }
}

impl<'a, T: Read + Write + Seek> XvIOWrite for StdXvIO<'a, T> {
    fn write_at(&mut self, offset: u64, data: &[u8]) -> XvIOResult {
        self.io.seek(SeekFrom::Start(offset))?;
        self.io.write_all(data)?;
        Ok(())
    }

    fn flush(&mut self) -> XvIOResult {
        self.io.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::prelude::*;
    use tempfile::tempfile;

    #[test]
    fn test_rw() {
        let mut file = tempfile().unwrap();
        let mut io = StdXvIO::new(&mut file);
        io.write_at(10, &[1, 2, 3, 4]).unwrap();

        let mut output = [0u8; 4];
        io.read_at(10, &mut output).unwrap();
        assert_eq!(output, [1, 2, 3, 4]);
        assert_eq!(io.stream_len().unwrap(), 14);
    }

    #[test]
    fn test_short_read_is_truncation() {
        let mut file = tempfile().unwrap();
        let mut io = StdXvIO::new(&mut file);
        io.write_at(0, &[0xAA; 8]).unwrap();

        let mut output = [0u8; 16];
        let err = io.read_at(0, &mut output).unwrap_err();
        assert_eq!(err, XvIOError::Io(std::io::ErrorKind::UnexpectedEof));
    }

    #[test]
    fn test_read_only_cursor() {
        let mut cursor = std::io::Cursor::new(vec![0u8, 1, 2, 3, 4, 5, 6, 7]);
        let mut io = StdXvIO::new(&mut cursor);
        assert_eq!(io.read_u32_at(4).unwrap(), u32::from_le_bytes([4, 5, 6, 7]));
    }

    #[test]
    fn test_zero_fill() {
        let mut file = tempfile().unwrap();
        let mut io = StdXvIO::new(&mut file);

        io.write_at(42, &[0xFF; 8]).unwrap();
        io.zero_fill(42, 8).unwrap();

        let mut buf = [0xAA; 8];
        io.read_at(42, &mut buf).unwrap();

        assert_eq!(buf, [0u8; 8]);
    }
}
