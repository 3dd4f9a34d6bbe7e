// SPDX-License-Identifier: MIT

// Core modules
pub mod errors;
mod macros;
pub mod stats;

// Backend modules
#[cfg(feature = "mem")]
mod mem;
mod std;

// Prelude re-exports (central entrypoint)
pub mod prelude {
    pub use super::XvIO;
    pub use super::XvIOExt;
    pub use super::XvIOStructExt;
    pub use super::XvIOWrite;
    pub use super::XvIOWriteExt;
    pub use super::errors::*;
    pub use super::stats::*;

    #[cfg(feature = "mem")]
    pub use super::mem::MemXvIO;

    pub use super::std::StdXvIO;
}

// Internal use
use errors::*;

/// Size of the scratch buffer used by chunked and struct helpers.
pub const BLOCK_BUF_SIZE: usize = 4096;

// Traits

/// Read side of the IO abstraction.
///
/// Reads are absolute and exact: a short read is an error.
/// Implementations may target RAM or files.
pub trait XvIO {
    /// Reads `buf.len()` bytes into `buf` from `offset` (absolute).
    fn read_at(&mut self, offset: u64, buf: &mut [u8]) -> XvIOResult;
}

/// Write side of the IO abstraction.
///
/// The checker never needs it; image builders do.
pub trait XvIOWrite: XvIO {
    /// Writes `data` at `offset` (absolute).
    fn write_at(&mut self, offset: u64, data: &[u8]) -> XvIOResult;

    /// Flushes any buffered data (may be a no-op).
    fn flush(&mut self) -> XvIOResult;
}

/// Read helpers for XvIO.
pub trait XvIOExt: XvIO {
    /// Reads `buf.len()` bytes from `offset` in chunks of `chunk_size` or less.
    #[inline(always)]
    fn read_in_chunks(&mut self, offset: u64, buf: &mut [u8], chunk_size: usize) -> XvIOResult {
        if chunk_size == 0 {
            return Err(XvIOError::Other("read_in_chunks: chunk size is zero"));
        }
        let mut off = offset;
        for chunk in buf.chunks_mut(chunk_size) {
            self.read_at(off, chunk)?;
            off += chunk.len() as u64;
        }
        Ok(())
    }

    // Read helpers for primitive types (u16, u32, u64)
    xvio_impl_primitive_read!(u16, u32, u64);
}

impl<T: XvIO + ?Sized> XvIOExt for T {}

/// Write helpers for XvIOWrite.
pub trait XvIOWriteExt: XvIOWrite {
    /// Fills a region with zeroes.
    #[inline(always)]
    fn zero_fill(&mut self, offset: u64, len: usize) -> XvIOResult {
        const ZERO_BUF: [u8; BLOCK_BUF_SIZE] = [0u8; BLOCK_BUF_SIZE];
        let mut remaining = len;
        let mut off = offset;
        while remaining > 0 {
            let chunk = remaining.min(ZERO_BUF.len());
            self.write_at(off, &ZERO_BUF[..chunk])?;
            off += chunk as u64;
            remaining -= chunk;
        }
        Ok(())
    }

    /// Writes a struct of type `T` at the given offset.
    fn write_struct<T: zerocopy::IntoBytes + zerocopy::Immutable>(
        &mut self,
        offset: u64,
        val: &T,
    ) -> XvIOResult {
        self.write_at(offset, val.as_bytes())
    }

    // Write helpers for primitive types (u16, u32, u64)
    xvio_impl_primitive_write!(u16, u32, u64);
}

impl<T: XvIOWrite + ?Sized> XvIOWriteExt for T {}

/// Reads structs through zerocopy.
///
/// The struct's own field types define the on-disk byte order; nothing here
/// relies on host layout.
pub trait XvIOStructExt: XvIO {
    /// Reads a struct of type `T` from the given offset.
    fn read_struct<T: zerocopy::FromBytes + zerocopy::KnownLayout + zerocopy::Immutable>(
        &mut self,
        offset: u64,
    ) -> XvIOResult<T> {
        let size = core::mem::size_of::<T>();
        if size > BLOCK_BUF_SIZE {
            return Err(XvIOError::Other("read_struct: type too large"));
        }
        let mut buf = [0u8; BLOCK_BUF_SIZE];
        self.read_at(offset, &mut buf[..size])?;
        T::read_from_bytes(&buf[..size]).map_err(|_| XvIOError::Other("read_struct failed"))
    }
}

impl<T: XvIO + ?Sized> XvIOStructExt for T {}
