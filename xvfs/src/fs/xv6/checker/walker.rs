// SPDX-License-Identifier: MIT

use crate::core::errors::*;
use crate::fs::xv6::{
    constant::*,
    device::Block,
    types::{InodeType, Xv6Dinode, Xv6Dirent, decode_dirent},
};
use crate::{bail, ensure};
use xvio::prelude::*;

use super::{CheckContext, file};

/// Position inside one directory: which direct pointer, which slot of the
/// block it points to.
struct DirCursor {
    inum: u32,
    inode: Xv6Dinode,
    depth: usize,
    addr_idx: usize,
    block: Option<Block>,
    slot: usize,
}

impl DirCursor {
    fn open(inum: u32, inode: Xv6Dinode, depth: usize) -> FsCheckerResult<Self> {
        if inode.kind() != Some(InodeType::Dir) {
            bail!(FsCheckerError::Application(
                "directory walker handed a non-directory inode"
            ));
        }
        Ok(Self {
            inum,
            inode,
            depth,
            addr_idx: 0,
            block: None,
            slot: 0,
        })
    }

    /// Next live entry of this directory, `.` and `..` excluded.
    ///
    /// Blocks are claimed as they are entered. An entry with inode number 0
    /// ends its block; the walk resumes at the next direct pointer.
    fn next_entry<IO: XvIO + ?Sized>(
        &mut self,
        ctx: &mut CheckContext<'_, IO>,
    ) -> FsCheckerResult<Option<Xv6Dirent>> {
        loop {
            if self.block.is_none() {
                if self.addr_idx >= XV6_NDIRECT {
                    return Ok(None);
                }
                let bp = self.inode.addr(self.addr_idx);
                if bp == 0 {
                    return Ok(None);
                }
                ctx.claim_block(self.inum, bp, false)?;
                let block = ctx.dev.read_block(bp)?;
                self.slot = 0;
                if self.addr_idx == 0 {
                    self.check_dots(&block)?;
                    self.slot = 2;
                }
                self.block = Some(block);
            }

            if let Some(block) = &self.block
                && self.slot < XV6_DPB
            {
                let entry = decode_dirent(block, self.slot);
                self.slot += 1;
                if entry.is_used() {
                    return Ok(Some(entry));
                }
            }

            self.block = None;
            self.addr_idx += 1;
        }
    }

    fn check_dots(&self, block: &Block) -> FsCheckerResult {
        let dot = decode_dirent(block, 0);
        ensure!(
            dot.is_named(XV6_DOT) && dot.inum() == self.inum,
            FsCheckerError::MalformedDirectory {
                inum: self.inum,
                reason: "first entry is not '.' naming the directory",
            }
        );
        let dotdot = decode_dirent(block, 1);
        ensure!(
            dotdot.is_named(XV6_DOTDOT),
            FsCheckerError::MalformedDirectory {
                inum: self.inum,
                reason: "second entry is not '..'",
            }
        );
        Ok(())
    }
}

/// Depth-first, pre-order walk of the directory tree.
///
/// Fills the inode and block reference tables. A directory reached a second
/// time is rejected before it is entered, so cycles cannot loop.
pub(crate) struct DirWalker<'c, 'a, IO: XvIO + ?Sized> {
    ctx: &'c mut CheckContext<'a, IO>,
    max_depth: usize,
}

impl<'c, 'a, IO: XvIO + ?Sized> DirWalker<'c, 'a, IO> {
    pub(crate) fn new(ctx: &'c mut CheckContext<'a, IO>, max_depth: usize) -> Self {
        Self { ctx, max_depth }
    }

    pub(crate) fn walk_from_root(&mut self) -> FsCheckerResult {
        let root = self.ctx.read_inode(XV6_ROOT_INO)?;
        self.walk(XV6_ROOT_INO, root)
    }

    pub(crate) fn walk(&mut self, inum: u32, dir: Xv6Dinode) -> FsCheckerResult {
        let mut stack = vec![self.enter(inum, dir, 0)?];

        while let Some(top) = stack.last_mut() {
            let Some(entry) = top.next_entry(self.ctx)? else {
                stack.pop();
                continue;
            };
            let depth = top.depth + 1;
            let child_ino = entry.inum();
            self.ctx.stats.entries_scanned += 1;

            let child = self.ctx.read_inode(child_ino)?;
            let kind = match child.kind() {
                Some(InodeType::Free) | None => {
                    bail!(FsCheckerError::InvalidInodeType {
                        inum: child_ino,
                        raw: child.raw_kind(),
                    })
                }
                Some(kind) => kind,
            };
            let refs = self.ctx.inode_refs.bump(child_ino).unwrap_or(u32::MAX);

            if kind == InodeType::Dir {
                // the root is only ever reached as the walk origin
                ensure!(
                    refs <= 1 && child_ino != XV6_ROOT_INO,
                    FsCheckerError::DuplicateDirectoryLink { inum: child_ino }
                );
                stack.push(self.enter(child_ino, child, depth)?);
            } else if refs == 1 {
                // further hard links name blocks already claimed
                file::walk_file(self.ctx, child_ino, &child)?;
                self.ctx.stats.files_found += 1;
            }
        }
        Ok(())
    }

    fn enter(&mut self, inum: u32, dir: Xv6Dinode, depth: usize) -> FsCheckerResult<DirCursor> {
        ensure!(
            depth <= self.max_depth,
            FsCheckerError::DirectoryTooDeep {
                inum,
                limit: self.max_depth,
            }
        );
        let cur = DirCursor::open(inum, dir, depth)?;
        let stats = &mut self.ctx.stats;
        stats.dirs_visited += 1;
        stats.max_depth = stats.max_depth.max(depth);
        Ok(cur)
    }
}
