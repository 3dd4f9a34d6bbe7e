// SPDX-License-Identifier: MIT

pub use crate::core::checker::*;
use crate::core::utils::bitmap::BitmapOps;
use crate::ensure;
use crate::fs::xv6::{
    constant::*,
    device::{Block, Xv6BlockDevice},
    layout::Xv6Layout,
    types::{Xv6Dinode, decode_inode_slot},
};
use xvio::prelude::*;

mod file;
mod scan;
mod walker;

use walker::DirWalker;

#[derive(Clone, Debug)]
pub struct Xv6CheckOptions {
    /// Deepest directory level the walk may reach; the root is level 0.
    pub max_depth: usize,
    /// Also require the root directory's blocks to be marked in the bitmap.
    pub check_root_bitmap: bool,
}

impl Default for Xv6CheckOptions {
    fn default() -> Self {
        Self {
            max_depth: XV6_DEFAULT_MAX_DEPTH,
            check_root_bitmap: true,
        }
    }
}

/// Last inode-table block read, so sequential inode lookups hit the image once
/// per block.
struct InodeCache {
    blockno: Option<u32>,
    data: Block,
}

/// Everything one check run owns: the device, the derived layout, the
/// on-disk bitmap and the two reference tables built by the walkers.
pub(crate) struct CheckContext<'a, IO: XvIO + ?Sized> {
    pub(crate) dev: Xv6BlockDevice<'a, IO>,
    pub(crate) layout: Xv6Layout,
    /// Directory entries naming each inode, `.` and `..` excluded.
    pub(crate) inode_refs: RefTracker,
    /// Inode pointers to each data block.
    pub(crate) block_refs: RefTracker,
    pub(crate) bitmap: Vec<u8>,
    pub(crate) stats: WalkerStats,
    cache: InodeCache,
}

impl<'a, IO: XvIO + ?Sized> CheckContext<'a, IO> {
    fn load(io: &'a mut IO) -> FsCheckerResult<Self> {
        let mut dev = Xv6BlockDevice::new(io);
        let sb = dev.read_superblock()?;
        let layout = Xv6Layout::compute(&sb)?;
        dev.set_limit(layout.size);

        let mut bitmap = Vec::with_capacity(layout.bitmap_blocks as usize * XV6_BLOCK_SIZE);
        for b in 0..layout.bitmap_blocks {
            bitmap.extend_from_slice(&dev.read_block(layout.bmapstart + b)?);
        }

        Ok(Self {
            dev,
            inode_refs: RefTracker::new(0, layout.ninodes as usize),
            block_refs: RefTracker::new(layout.data_start, layout.data_blocks() as usize),
            bitmap,
            stats: WalkerStats::new(),
            cache: InodeCache {
                blockno: None,
                data: [0u8; XV6_BLOCK_SIZE],
            },
            layout,
        })
    }

    /// Reads inode `inum`, rejecting numbers past the inode table.
    pub(crate) fn read_inode(&mut self, inum: u32) -> FsCheckerResult<Xv6Dinode> {
        ensure!(
            inum < self.layout.ninodes,
            FsCheckerError::InodeOutOfRange {
                inum,
                ninodes: self.layout.ninodes,
            }
        );
        let bn = self.layout.inode_block(inum);
        if self.cache.blockno != Some(bn) {
            self.cache.data = self.dev.read_block(bn)?;
            self.cache.blockno = Some(bn);
        }
        Ok(decode_inode_slot(&self.cache.data, self.layout.inode_slot(inum)))
    }

    /// Range-checks `block` and records one more reference to it. A second
    /// reference to the same block is a violation.
    pub(crate) fn claim_block(&mut self, inum: u32, block: u32, indirect: bool) -> FsCheckerResult {
        ensure!(
            self.layout.is_data_block(block),
            FsCheckerError::BadBlockPointer {
                inum,
                block,
                indirect
            }
        );
        match self.block_refs.bump(block) {
            Some(1) => {
                self.stats.blocks_referenced += 1;
                Ok(())
            }
            _ => Err(FsCheckerError::DuplicateBlockUse {
                inum,
                block,
                indirect,
            }),
        }
    }

    /// Bitmap bits, like both reference tables, are addressed by absolute
    /// block number.
    #[inline]
    pub(crate) fn bitmap_marked(&self, block: u32) -> bool {
        self.bitmap.get_bit(block as usize)
    }
}

pub struct Xv6Checker<'a, IO: XvIO + ?Sized> {
    ctx: CheckContext<'a, IO>,
}

impl<'a, IO: XvIO + ?Sized> Xv6Checker<'a, IO> {
    /// Reads the superblock and bitmap and sizes the reference tables.
    ///
    /// Fails with `Layout` on impossible geometry and `IO` on a short image.
    pub fn open(io: &'a mut IO) -> FsCheckerResult<Self> {
        Ok(Self {
            ctx: CheckContext::load(io)?,
        })
    }

    pub fn layout(&self) -> &Xv6Layout {
        &self.ctx.layout
    }

    pub fn stats(&self) -> WalkerStats {
        self.ctx.stats
    }

    /// References counted so far for `inum`.
    pub fn inode_refs(&self, inum: u32) -> u32 {
        self.ctx.inode_refs.get(inum)
    }

    /// References counted so far for data block `block`.
    pub fn block_refs(&self, block: u32) -> u32 {
        self.ctx.block_refs.get(block)
    }
}

impl<'a, IO: XvIO + ?Sized> FsChecker for Xv6Checker<'a, IO> {
    type Options = Xv6CheckOptions;

    fn check_geometry(&mut self, _opt: &Self::Options, rep: &mut CheckReport) -> FsCheckerResult {
        let l = self.ctx.layout;
        rep.push(Finding::info(
            "SB.GEOM",
            format!(
                "{} blocks, {} inodes, inodes at {}, bitmap at {}, data {}..{}",
                l.size, l.ninodes, l.inodestart, l.bmapstart, l.data_start, l.size
            ),
        ));
        if !l.nblocks_consistent() {
            rep.push(Finding::warn(
                "SB.NBLK",
                format!(
                    "superblock declares {} data blocks, layout gives {}",
                    l.nblocks,
                    l.data_blocks()
                ),
            ));
        }
        Ok(())
    }

    fn check_root(&mut self, _opt: &Self::Options, rep: &mut CheckReport) -> FsCheckerResult {
        scan::check_root(&mut self.ctx)?;
        rep.push(Finding::info("ROOT", "root directory is its own parent"));
        Ok(())
    }

    fn check_tree(&mut self, opt: &Self::Options, rep: &mut CheckReport) -> FsCheckerResult {
        DirWalker::new(&mut self.ctx, opt.max_depth).walk_from_root()?;
        let s = self.ctx.stats;
        rep.push(Finding::info(
            "DIR.WALK",
            format!(
                "walked {} dirs, {} files, {} entries, depth {}",
                s.dirs_visited, s.files_found, s.entries_scanned, s.max_depth
            ),
        ));
        Ok(())
    }

    fn check_inodes(&mut self, opt: &Self::Options, rep: &mut CheckReport) -> FsCheckerResult {
        scan::scan_inodes(&mut self.ctx, opt.check_root_bitmap)?;
        rep.push(Finding::info(
            "INODE.SCAN",
            format!("{} inodes consistent", self.ctx.stats.inodes_checked),
        ));
        Ok(())
    }

    fn check_bitmap(&mut self, _opt: &Self::Options, rep: &mut CheckReport) -> FsCheckerResult {
        scan::scan_bitmap(&self.ctx)?;
        let l = self.ctx.layout;
        let marked = self
            .ctx
            .bitmap
            .count_ones_in_range(l.data_start as usize..l.size as usize);
        rep.push(Finding::info(
            "BITMAP",
            format!(
                "{marked} data blocks marked, {} referenced",
                self.ctx.block_refs.referenced()
            ),
        ));
        Ok(())
    }
}
