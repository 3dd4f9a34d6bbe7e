// SPDX-License-Identifier: MIT
//! xv6 superblock (block 1)

use zerocopy::little_endian::U32;
use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout};

/// On-disk superblock. Seven little-endian `u32`, the rest of block 1 unused.
#[derive(Debug, Clone, Copy, Default, IntoBytes, FromBytes, KnownLayout, Immutable)]
#[repr(C)]
pub struct Xv6Superblock {
    /// Size of the file system image (blocks)
    pub size: U32,
    /// Number of data blocks
    pub nblocks: U32,
    /// Number of inodes
    pub ninodes: U32,
    /// Number of log blocks
    pub nlog: U32,
    /// Block number of the first log block
    pub logstart: U32,
    /// Block number of the first inode block
    pub inodestart: U32,
    /// Block number of the first free map block
    pub bmapstart: U32,
}

const _: () = assert!(core::mem::size_of::<Xv6Superblock>() == 28);

impl Xv6Superblock {
    pub fn size(&self) -> u32 {
        self.size.get()
    }
    pub fn nblocks(&self) -> u32 {
        self.nblocks.get()
    }
    pub fn ninodes(&self) -> u32 {
        self.ninodes.get()
    }
    pub fn nlog(&self) -> u32 {
        self.nlog.get()
    }
    pub fn logstart(&self) -> u32 {
        self.logstart.get()
    }
    pub fn inodestart(&self) -> u32 {
        self.inodestart.get()
    }
    pub fn bmapstart(&self) -> u32 {
        self.bmapstart.get()
    }
}
