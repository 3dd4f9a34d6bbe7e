// SPDX-License-Identifier: MIT

//! Adds directories, files, devices and hard links to a formatted image,
//! keeping the bitmap, link counts and directory sizes consistent.

use xvio::prelude::*;
use zerocopy::IntoBytes;

pub use crate::core::errors::{FsAllocatorError, FsInjectorError, FsInjectorResult};

use crate::core::utils::bitmap::BitmapOps;
use crate::{bail, ensure};
use crate::fs::xv6::{
    constant::*,
    device::{Block, Xv6BlockDevice},
    meta::*,
    types::*,
};

pub struct Xv6Injector<'a, IO: XvIOWrite + ?Sized> {
    dev: Xv6BlockDevice<'a, IO>,
    meta: Xv6Meta,
}

impl<'a, IO: XvIOWrite + ?Sized> Xv6Injector<'a, IO> {
    pub fn new(io: &'a mut IO, meta: &Xv6Meta) -> Self {
        let mut dev = Xv6BlockDevice::new(io);
        dev.set_limit(meta.size);
        Self { dev, meta: *meta }
    }

    pub fn meta(&self) -> &Xv6Meta {
        &self.meta
    }

    // --- Raw access ---

    pub fn read_block(&mut self, blockno: u32) -> FsInjectorResult<Block> {
        Ok(self.dev.read_block(blockno)?)
    }

    pub fn write_block(&mut self, blockno: u32, block: &Block) -> FsInjectorResult {
        Ok(self.dev.write_block(blockno, block)?)
    }

    pub fn read_inode(&mut self, inum: u32) -> FsInjectorResult<Xv6Dinode> {
        ensure!(
            inum < self.meta.ninodes,
            FsInjectorError::Invalid("inode number past the inode table")
        );
        let block = self.dev.read_block(self.meta.inode_block(inum))?;
        Ok(decode_inode_slot(&block, (inum % XV6_IPB) as usize))
    }

    pub fn write_inode(&mut self, inum: u32, inode: &Xv6Dinode) -> FsInjectorResult {
        ensure!(
            inum < self.meta.ninodes,
            FsInjectorError::Invalid("inode number past the inode table")
        );
        let bn = self.meta.inode_block(inum);
        let mut block = self.dev.read_block(bn)?;
        let off = (inum % XV6_IPB) as usize * XV6_DINODE_SIZE;
        block[off..off + XV6_DINODE_SIZE].copy_from_slice(inode.as_bytes());
        self.write_block(bn, &block)
    }

    /// Overwrites entry `slot` of directory block `blockno`.
    pub fn write_dirent(&mut self, blockno: u32, slot: usize, entry: &Xv6Dirent) -> FsInjectorResult {
        ensure!(slot < XV6_DPB, FsInjectorError::Invalid("directory slot out of range"));
        let mut block = self.dev.read_block(blockno)?;
        let off = slot * XV6_DIRENT_SIZE;
        block[off..off + XV6_DIRENT_SIZE].copy_from_slice(entry.as_bytes());
        self.write_block(blockno, &block)
    }

    /// Sets or clears the bitmap bit of `block`.
    pub fn set_bitmap(&mut self, block: u32, used: bool) -> FsInjectorResult {
        let bn = self.meta.bmapstart() + block / XV6_BPB;
        let mut bits = self.dev.read_block(bn)?;
        bits.set_bit((block % XV6_BPB) as usize, used);
        self.write_block(bn, &bits)
    }

    // --- Allocation ---

    /// Claims the first free inode and writes it with type `kind`, no links.
    pub fn alloc_inode(&mut self, kind: InodeType) -> FsInjectorResult<u32> {
        for inum in XV6_ROOT_INO..self.meta.ninodes {
            if self.read_inode(inum)?.is_free() {
                self.write_inode(inum, &Xv6Dinode::new(kind))?;
                return Ok(inum);
            }
        }
        Err(FsAllocatorError::OutOfInodes.into())
    }

    /// Claims the first free data block, zeroed.
    pub fn alloc_block(&mut self) -> FsInjectorResult<u32> {
        let mut bits = Vec::with_capacity(self.meta.nbitmap as usize * XV6_BLOCK_SIZE);
        for i in 0..self.meta.nbitmap {
            bits.extend_from_slice(&self.dev.read_block(self.meta.bmapstart() + i)?);
        }
        let block = match bits.find_first_zero(self.meta.nmeta as usize) {
            Some(b) if b < self.meta.size as usize => b as u32,
            _ => bail!(FsAllocatorError::OutOfBlocks),
        };
        self.set_bitmap(block, true)?;
        self.write_block(block, &[0u8; XV6_BLOCK_SIZE])?;
        Ok(block)
    }

    // --- Tree operations ---

    /// Appends `name -> inum` to directory `dir`, growing it by one block
    /// when every slot is taken.
    pub fn add_entry(&mut self, dir: u32, name: &[u8], inum: u32) -> FsInjectorResult {
        let ino = u16::try_from(inum)
            .map_err(|_| FsInjectorError::Invalid("inode number does not fit an entry"))?;
        let entry = Xv6Dirent::new(ino, name).ok_or(FsInjectorError::NameTooLong)?;
        let mut d = self.read_inode(dir)?;
        ensure!(
            d.kind() == Some(InodeType::Dir),
            FsInjectorError::Invalid("parent is not a directory")
        );

        for i in 0..XV6_NDIRECT {
            let (bp, slot) = match d.addr(i) {
                0 => {
                    let bp = self.alloc_block()?;
                    d.set_addr(i, bp);
                    (bp, 0)
                }
                bp => {
                    let block = self.dev.read_block(bp)?;
                    match (0..XV6_DPB).find(|&s| !decode_dirent(&block, s).is_used()) {
                        Some(slot) => (bp, slot),
                        None => continue,
                    }
                }
            };
            self.write_dirent(bp, slot, &entry)?;
            let end = ((i * XV6_DPB + slot + 1) * XV6_DIRENT_SIZE) as u32;
            d.set_size(d.size().max(end));
            return self.write_inode(dir, &d);
        }
        Err(FsInjectorError::DirectoryFull(dir))
    }

    /// Creates directory `name` in `parent` with `.` and `..` in place.
    pub fn mkdir(&mut self, parent: u32, name: &[u8]) -> FsInjectorResult<u32> {
        self.expect_dir(parent)?;
        let inum = self.alloc_inode(InodeType::Dir)?;
        let bp = self.alloc_block()?;

        let mut block: Block = [0u8; XV6_BLOCK_SIZE];
        for (slot, (target, n)) in [(inum, XV6_DOT), (parent, XV6_DOTDOT)].into_iter().enumerate() {
            let e = Xv6Dirent::new(target as u16, n).ok_or(FsInjectorError::NameTooLong)?;
            let off = slot * XV6_DIRENT_SIZE;
            block[off..off + XV6_DIRENT_SIZE].copy_from_slice(e.as_bytes());
        }
        self.write_block(bp, &block)?;

        let mut d = Xv6Dinode::new(InodeType::Dir);
        d.set_nlink(1);
        d.set_size(2 * XV6_DIRENT_SIZE as u32);
        d.set_addr(0, bp);
        self.write_inode(inum, &d)?;

        self.add_entry(parent, name, inum)?;
        Ok(inum)
    }

    /// Creates regular file `name` in `parent` holding `data`. Files past
    /// `XV6_NDIRECT` blocks get an indirect block.
    pub fn create_file(&mut self, parent: u32, name: &[u8], data: &[u8]) -> FsInjectorResult<u32> {
        ensure!(
            data.len() <= XV6_MAXFILE * XV6_BLOCK_SIZE,
            FsInjectorError::FileTooLarge
        );
        self.expect_dir(parent)?;
        let inum = self.alloc_inode(InodeType::File)?;

        let mut f = Xv6Dinode::new(InodeType::File);
        f.set_nlink(1);
        f.set_size(data.len() as u32);

        let mut indirect: Option<(u32, Block)> = None;
        for (i, chunk) in data.chunks(XV6_BLOCK_SIZE).enumerate() {
            let bp = self.alloc_block()?;
            let mut block: Block = [0u8; XV6_BLOCK_SIZE];
            block[..chunk.len()].copy_from_slice(chunk);
            self.write_block(bp, &block)?;

            if i < XV6_NDIRECT {
                f.set_addr(i, bp);
                continue;
            }
            if indirect.is_none() {
                let ibp = self.alloc_block()?;
                f.set_addr(XV6_NDIRECT, ibp);
                indirect = Some((ibp, [0u8; XV6_BLOCK_SIZE]));
            }
            if let Some((_, ind)) = indirect.as_mut() {
                let off = (i - XV6_NDIRECT) * 4;
                ind[off..off + 4].copy_from_slice(&bp.to_le_bytes());
            }
        }
        if let Some((ibp, ind)) = indirect {
            self.write_block(ibp, &ind)?;
        }

        self.write_inode(inum, &f)?;
        self.add_entry(parent, name, inum)?;
        Ok(inum)
    }

    /// Creates device node `name` in `parent`.
    pub fn mknod(&mut self, parent: u32, name: &[u8], major: i16, minor: i16) -> FsInjectorResult<u32> {
        self.expect_dir(parent)?;
        let inum = self.alloc_inode(InodeType::Dev)?;
        let mut d = Xv6Dinode::new(InodeType::Dev);
        d.set_nlink(1);
        d.set_device(major, minor);
        self.write_inode(inum, &d)?;
        self.add_entry(parent, name, inum)?;
        Ok(inum)
    }

    /// Adds a hard link to a file or device and bumps its link count.
    pub fn link(&mut self, parent: u32, name: &[u8], inum: u32) -> FsInjectorResult {
        let mut target = self.read_inode(inum)?;
        ensure!(
            matches!(target.kind(), Some(InodeType::File | InodeType::Dev)),
            FsInjectorError::Invalid("hard links only name files or devices")
        );
        self.add_entry(parent, name, inum)?;
        target.set_nlink(target.nlink() + 1);
        self.write_inode(inum, &target)
    }

    pub fn flush(&mut self) -> FsInjectorResult {
        Ok(self.dev.flush()?)
    }

    fn expect_dir(&mut self, inum: u32) -> FsInjectorResult {
        ensure!(
            self.read_inode(inum)?.kind() == Some(InodeType::Dir),
            FsInjectorError::Invalid("parent is not a directory")
        );
        Ok(())
    }
}
