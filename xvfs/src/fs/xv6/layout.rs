// SPDX-License-Identifier: MIT

//! Geometry derived from the superblock.

pub use crate::core::meta::*;

use crate::core::errors::{FsCheckerError, FsCheckerResult};
use crate::ensure;
use crate::fs::xv6::{constant::*, types::Xv6Superblock};

/// Region boundaries of an xv6 image. Every range check in the checker is
/// made against this.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Xv6Layout {
    pub size: u32,
    pub nblocks: u32,
    pub ninodes: u32,
    pub nlog: u32,
    pub logstart: u32,
    pub inodestart: u32,
    pub bmapstart: u32,
    pub inode_blocks: u32,
    pub bitmap_blocks: u32,
    /// Metadata blocks as counted from the header sizes.
    pub nmeta: u32,
    /// First data block; the data region is `[data_start, size)`.
    pub data_start: u32,
}

impl Xv6Layout {
    pub fn compute(sb: &Xv6Superblock) -> FsCheckerResult<Self> {
        let size = sb.size();
        let ninodes = sb.ninodes();
        let inodestart = sb.inodestart();
        let bmapstart = sb.bmapstart();

        ensure!(size != 0, FsCheckerError::Layout("image size is zero"));
        ensure!(ninodes != 0, FsCheckerError::Layout("inode count is zero"));
        ensure!(
            inodestart >= XV6_FIXED_META_BLOCKS,
            FsCheckerError::Layout("inode table overlaps boot or superblock")
        );

        let inode_blocks = ninodes.div_ceil(XV6_IPB);
        let bitmap_blocks = size.div_ceil(XV6_BPB);
        let overflow = FsCheckerError::Layout("metadata region overflows");

        let inode_end = inodestart.checked_add(inode_blocks).ok_or(overflow)?;
        ensure!(
            inode_end <= bmapstart,
            FsCheckerError::Layout("inode table overlaps bitmap")
        );

        let bitmap_end = bmapstart.checked_add(bitmap_blocks).ok_or(overflow)?;
        ensure!(
            bitmap_end <= size,
            FsCheckerError::Layout("bitmap extends past end of image")
        );

        let nmeta = XV6_FIXED_META_BLOCKS
            .checked_add(sb.nlog())
            .and_then(|n| n.checked_add(inode_blocks))
            .and_then(|n| n.checked_add(bitmap_blocks))
            .ok_or(overflow)?;
        // mkfs may reserve slack between the header-derived count and the bitmap
        let derived = nmeta.max(bitmap_end);
        // and one more bitmap block than needed when size is a multiple of BPB
        let data_start = match size.checked_sub(sb.nblocks()) {
            Some(declared) if derived.checked_add(1) == Some(declared) => declared,
            _ => derived,
        };
        ensure!(
            data_start < size,
            FsCheckerError::Layout("no data region")
        );

        Ok(Self {
            size,
            nblocks: sb.nblocks(),
            ninodes,
            nlog: sb.nlog(),
            logstart: sb.logstart(),
            inodestart,
            bmapstart,
            inode_blocks,
            bitmap_blocks,
            nmeta,
            data_start,
        })
    }

    /// Block holding inode `inum`.
    #[inline]
    pub fn inode_block(&self, inum: u32) -> u32 {
        inum / XV6_IPB + self.inodestart
    }

    #[inline]
    pub fn inode_slot(&self, inum: u32) -> usize {
        (inum % XV6_IPB) as usize
    }

    #[inline]
    pub fn is_data_block(&self, block: u32) -> bool {
        block >= self.data_start && block < self.size
    }

    pub fn data_blocks(&self) -> u32 {
        self.size - self.data_start
    }

    /// Whether `nblocks` agrees with the derived data region.
    pub fn nblocks_consistent(&self) -> bool {
        self.nblocks == self.data_blocks()
    }
}

impl FsMeta<u32> for Xv6Layout {
    fn unit_size(&self) -> usize {
        XV6_BLOCK_SIZE
    }

    fn first_data_unit(&self) -> u32 {
        self.data_start
    }

    fn last_data_unit(&self) -> u32 {
        self.size - 1
    }

    fn total_units(&self) -> usize {
        self.size as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use zerocopy::little_endian::U32;

    fn sb(size: u32, ninodes: u32, nlog: u32, inodestart: u32, bmapstart: u32) -> Xv6Superblock {
        Xv6Superblock {
            size: U32::new(size),
            nblocks: U32::new(0),
            ninodes: U32::new(ninodes),
            nlog: U32::new(nlog),
            logstart: U32::new(2),
            inodestart: U32::new(inodestart),
            bmapstart: U32::new(bmapstart),
        }
    }

    #[test]
    fn test_mkfs_defaults() {
        // mkfs: 26 inode blocks, 1 bitmap block, bitmap at 58
        let l = Xv6Layout::compute(&sb(1000, 200, 30, 32, 58)).unwrap();
        assert_eq!(l.inode_blocks, 25);
        assert_eq!(l.bitmap_blocks, 1);
        assert_eq!(l.nmeta, 58);
        assert_eq!(l.data_start, 59);
        assert_eq!(l.data_blocks(), 941);
        assert!(l.is_data_block(59));
        assert!(!l.is_data_block(58));
        assert!(!l.is_data_block(1000));
        assert_eq!(l.inode_block(17), 34);
        assert_eq!(l.inode_slot(17), 1);
        assert!(l.is_valid_unit(999));
        assert_eq!(l.size_bytes(), 512_000);
    }

    #[test]
    fn test_mkfs_bitmap_slack() {
        // 8192 blocks: mkfs writes 3 bitmap blocks where 2 suffice
        let mut s = sb(8192, 512, 30, 32, 97);
        s.nblocks = U32::new(8192 - 100);
        let l = Xv6Layout::compute(&s).unwrap();
        assert_eq!(l.bitmap_blocks, 2);
        assert_eq!(l.data_start, 100);
        assert!(l.nblocks_consistent());

        // anything further off is not slack
        s.nblocks = U32::new(8192 - 101);
        let l = Xv6Layout::compute(&s).unwrap();
        assert_eq!(l.data_start, 99);
        assert!(!l.nblocks_consistent());
    }

    #[test]
    fn test_rejects_bad_geometry() {
        let cases = [
            sb(0, 200, 30, 32, 58),
            sb(1000, 0, 30, 32, 58),
            sb(1000, 200, 30, 1, 58),
            sb(1000, 200, 30, 40, 58),
            sb(59, 200, 30, 32, 58),
            sb(1000, 200, 30, 32, 1000),
        ];
        for c in cases {
            assert!(matches!(
                Xv6Layout::compute(&c),
                Err(FsCheckerError::Layout(_))
            ));
        }
    }
}
