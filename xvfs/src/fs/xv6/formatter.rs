// SPDX-License-Identifier: MIT

use xvio::prelude::*;
use zerocopy::IntoBytes;

pub use crate::core::formatter::*;

use crate::core::utils::bitmap::BitmapOps;
use crate::ensure;
use crate::fs::xv6::{
    constant::*,
    device::{Block, Xv6BlockDevice},
    meta::*,
    types::*,
};

/// Xv6Formatter:
/// - Lays down what `mkfs` writes before copying user files.
/// - Superblock, zeroed log and inode table, bitmap, root directory.
/// - The root owns the first data block; `.` and `..` both name inode 1.
pub struct Xv6Formatter<'a, IO: XvIOWrite + ?Sized> {
    dev: Xv6BlockDevice<'a, IO>,
    meta: &'a Xv6Meta,
}

impl<'a, IO: XvIOWrite + ?Sized> Xv6Formatter<'a, IO> {
    pub fn new(io: &'a mut IO, meta: &'a Xv6Meta) -> Self {
        let mut dev = Xv6BlockDevice::new(io);
        dev.set_limit(meta.size);
        Self { dev, meta }
    }

    fn write_root_inode(&mut self, root_block: u32) -> FsFormatterResult {
        let mut root = Xv6Dinode::new(InodeType::Dir);
        root.set_nlink(1);
        root.set_size(XV6_BLOCK_SIZE as u32);
        root.set_addr(0, root_block);

        let bn = self.meta.inode_block(XV6_ROOT_INO);
        let mut block = self.dev.read_block(bn)?;
        let off = (XV6_ROOT_INO % XV6_IPB) as usize * XV6_DINODE_SIZE;
        block[off..off + XV6_DINODE_SIZE].copy_from_slice(root.as_bytes());
        self.dev.write_block(bn, &block)?;
        Ok(())
    }

    fn write_root_dir(&mut self, root_block: u32) -> FsFormatterResult {
        let mut block: Block = [0u8; XV6_BLOCK_SIZE];
        for (slot, name) in [XV6_DOT, XV6_DOTDOT].into_iter().enumerate() {
            let entry = Xv6Dirent::new(XV6_ROOT_INO as u16, name)
                .ok_or(FsFormatterError::Invalid("bad root entry name"))?;
            let off = slot * XV6_DIRENT_SIZE;
            block[off..off + XV6_DIRENT_SIZE].copy_from_slice(entry.as_bytes());
        }
        self.dev.write_block(root_block, &block)?;
        Ok(())
    }

    /// Marks every block below `first_free` in use, like `mkfs` `balloc`.
    fn write_bitmap(&mut self, first_free: u32) -> FsFormatterResult {
        let mut bits = vec![0u8; self.meta.nbitmap as usize * XV6_BLOCK_SIZE];
        bits.set_range(0..first_free as usize);
        for (i, chunk) in bits.chunks_exact(XV6_BLOCK_SIZE).enumerate() {
            let mut block: Block = [0u8; XV6_BLOCK_SIZE];
            block.copy_from_slice(chunk);
            self.dev.write_block(self.meta.bmapstart() + i as u32, &block)?;
        }
        Ok(())
    }
}

impl<'a, IO: XvIOWrite + ?Sized> FsFormatter for Xv6Formatter<'a, IO> {
    fn format(&mut self, full_format: bool) -> FsFormatterResult {
        ensure!(
            self.meta.is_valid(),
            FsFormatterError::Invalid("image too small for its metadata")
        );

        let root_block = self.meta.nmeta;
        if full_format {
            self.dev.zero_blocks(0, self.meta.size)?;
        } else {
            self.dev.zero_blocks(0, root_block + 1)?;
        }

        self.dev.write_superblock(&self.meta.superblock())?;
        self.write_root_inode(root_block)?;
        self.write_root_dir(root_block)?;
        self.write_bitmap(root_block + 1)?;
        Ok(())
    }

    fn flush(&mut self) -> FsFormatterResult {
        self.dev.flush()?;
        Ok(())
    }
}
