// SPDX-License-Identifier: MIT

//! Block-granular access to an xv6 image.
//!
//! This is the only place where block numbers become byte offsets.

use xvio::prelude::*;

use crate::fs::xv6::{constant::*, types::Xv6Superblock};

pub type Block = [u8; XV6_BLOCK_SIZE];

#[inline]
pub const fn block_offset(blockno: u32) -> u64 {
    blockno as u64 * XV6_BLOCK_SIZE as u64
}

pub struct Xv6BlockDevice<'a, IO: XvIO + ?Sized> {
    io: &'a mut IO,
    /// Declared image size in blocks, once the superblock is known.
    limit: Option<u32>,
}

impl<'a, IO: XvIO + ?Sized> Xv6BlockDevice<'a, IO> {
    pub fn new(io: &'a mut IO) -> Self {
        Self { io, limit: None }
    }

    /// Bounds every later access to `[0, size)`.
    pub fn set_limit(&mut self, size: u32) {
        self.limit = Some(size);
    }

    #[inline]
    fn check_bounds(&self, blockno: u32) -> XvIOResult {
        match self.limit {
            Some(size) if blockno >= size => Err(XvIOError::OutOfBounds),
            _ => Ok(()),
        }
    }

    pub fn read_block(&mut self, blockno: u32) -> XvIOResult<Block> {
        self.check_bounds(blockno)?;
        let mut buf = [0u8; XV6_BLOCK_SIZE];
        self.io.read_at(block_offset(blockno), &mut buf)?;
        Ok(buf)
    }

    pub fn read_superblock(&mut self) -> XvIOResult<Xv6Superblock> {
        self.io.read_struct(block_offset(XV6_SUPERBLOCK_BLOCK))
    }
}

impl<'a, IO: XvIOWrite + ?Sized> Xv6BlockDevice<'a, IO> {
    pub fn write_block(&mut self, blockno: u32, data: &Block) -> XvIOResult {
        self.check_bounds(blockno)?;
        self.io.write_at(block_offset(blockno), data)
    }

    pub fn zero_blocks(&mut self, first: u32, count: u32) -> XvIOResult {
        if count == 0 {
            return Ok(());
        }
        self.check_bounds(first + count - 1)?;
        self.io
            .zero_fill(block_offset(first), count as usize * XV6_BLOCK_SIZE)
    }

    pub fn write_superblock(&mut self, sb: &Xv6Superblock) -> XvIOResult {
        let mut block = [0u8; XV6_BLOCK_SIZE];
        let raw = zerocopy::IntoBytes::as_bytes(sb);
        block[..raw.len()].copy_from_slice(raw);
        self.write_block(XV6_SUPERBLOCK_BLOCK, &block)
    }

    pub fn flush(&mut self) -> XvIOResult {
        self.io.flush()
    }
}
