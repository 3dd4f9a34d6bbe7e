// SPDX-License-Identifier: MIT

pub use crate::core::meta::*;

use zerocopy::little_endian::U32;

use crate::fs::xv6::{constant::*, types::Xv6Superblock};

/// Geometry of an image to be written, computed the way xv6 `mkfs` does.
///
/// `mkfs` reserves one block more than needed for the inode table and the
/// bitmap (`n / per_block + 1`); the checker tolerates that slack.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Xv6Meta {
    pub size: u32,
    pub ninodes: u32,
    pub nlog: u32,
    pub ninodeblocks: u32,
    pub nbitmap: u32,
    pub nmeta: u32,
}

impl Default for Xv6Meta {
    fn default() -> Self {
        Self::new(XV6_DEFAULT_FSSIZE, XV6_DEFAULT_NINODES, XV6_DEFAULT_LOGSIZE)
    }
}

impl Xv6Meta {
    pub fn new(size: u32, ninodes: u32, nlog: u32) -> Self {
        let nbitmap = size / XV6_BPB + 1;
        let ninodeblocks = ninodes / XV6_IPB + 1;
        let nmeta = XV6_FIXED_META_BLOCKS + nlog + ninodeblocks + nbitmap;
        Self {
            size,
            ninodes,
            nlog,
            ninodeblocks,
            nbitmap,
            nmeta,
        }
    }

    /// At least the root directory block must fit after the metadata.
    pub fn is_valid(&self) -> bool {
        self.ninodes > XV6_ROOT_INO && self.nmeta < self.size
    }

    pub fn logstart(&self) -> u32 {
        XV6_FIXED_META_BLOCKS
    }

    pub fn inodestart(&self) -> u32 {
        self.logstart() + self.nlog
    }

    pub fn bmapstart(&self) -> u32 {
        self.inodestart() + self.ninodeblocks
    }

    pub fn nblocks(&self) -> u32 {
        self.size - self.nmeta
    }

    pub fn inode_block(&self, inum: u32) -> u32 {
        inum / XV6_IPB + self.inodestart()
    }

    pub fn superblock(&self) -> Xv6Superblock {
        Xv6Superblock {
            size: U32::new(self.size),
            nblocks: U32::new(self.nblocks()),
            ninodes: U32::new(self.ninodes),
            nlog: U32::new(self.nlog),
            logstart: U32::new(self.logstart()),
            inodestart: U32::new(self.inodestart()),
            bmapstart: U32::new(self.bmapstart()),
        }
    }
}

impl FsMeta<u32> for Xv6Meta {
    fn unit_size(&self) -> usize {
        XV6_BLOCK_SIZE
    }

    fn first_data_unit(&self) -> u32 {
        self.nmeta
    }

    fn last_data_unit(&self) -> u32 {
        self.size - 1
    }

    fn total_units(&self) -> usize {
        self.size as usize
    }
}
