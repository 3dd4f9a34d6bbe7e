// SPDX-License-Identifier: MIT

//! Passes that run around the tree walk: the root precheck before it, the
//! inode and bitmap scans after it.

use crate::core::errors::*;
use crate::fs::xv6::{
    constant::*,
    types::{InodeType, Xv6Dinode, decode_dirent, indirect_entries},
};
use crate::{bail, ensure};
use xvio::prelude::*;

use super::CheckContext;

/// Inode 1 must be a directory whose `..` names itself.
pub(crate) fn check_root<IO: XvIO + ?Sized>(ctx: &mut CheckContext<'_, IO>) -> FsCheckerResult {
    let root = ctx.read_inode(XV6_ROOT_INO)?;
    ensure!(
        root.kind() == Some(InodeType::Dir),
        FsCheckerError::MalformedDirectory {
            inum: XV6_ROOT_INO,
            reason: "root directory does not exist",
        }
    );

    let first = root.addr(0);
    ensure!(
        first != 0,
        FsCheckerError::MalformedDirectory {
            inum: XV6_ROOT_INO,
            reason: "root directory has no data block",
        }
    );
    ensure!(
        ctx.layout.is_data_block(first),
        FsCheckerError::BadBlockPointer {
            inum: XV6_ROOT_INO,
            block: first,
            indirect: false,
        }
    );

    let block = ctx.dev.read_block(first)?;
    ensure!(
        decode_dirent(&block, 1).inum() == XV6_ROOT_INO,
        FsCheckerError::MalformedDirectory {
            inum: XV6_ROOT_INO,
            reason: "root directory is not its own parent",
        }
    );
    Ok(())
}

/// Compares every inode against the reference counts of the walk.
pub(crate) fn scan_inodes<IO: XvIO + ?Sized>(
    ctx: &mut CheckContext<'_, IO>,
    check_root_bitmap: bool,
) -> FsCheckerResult {
    if check_root_bitmap {
        let root = ctx.read_inode(XV6_ROOT_INO)?;
        check_in_bitmap(ctx, XV6_ROOT_INO, &root)?;
    }

    for inum in 2..ctx.layout.ninodes {
        let inode = ctx.read_inode(inum)?;
        let refs = ctx.inode_refs.get(inum);
        ctx.stats.inodes_checked += 1;

        if inode.is_free() {
            ensure!(
                refs == 0,
                FsCheckerError::OrphanedLiveReference { inum, refs }
            );
            continue;
        }
        let Some(kind) = inode.kind() else {
            bail!(FsCheckerError::InvalidInodeType {
                inum,
                raw: inode.raw_kind(),
            });
        };
        ensure!(refs != 0, FsCheckerError::UnreferencedLiveInode { inum });
        if kind == InodeType::Dir {
            ensure!(
                refs == 1,
                FsCheckerError::DuplicateDirectoryLink { inum }
            );
        }
        ensure!(
            i64::from(inode.nlink()) == i64::from(refs),
            FsCheckerError::LinkCountMismatch {
                inum,
                nlink: inode.nlink(),
                refs,
            }
        );
        check_in_bitmap(ctx, inum, &inode)?;
    }
    Ok(())
}

/// Every block the inode declares must be marked in use.
fn check_in_bitmap<IO: XvIO + ?Sized>(
    ctx: &mut CheckContext<'_, IO>,
    inum: u32,
    inode: &Xv6Dinode,
) -> FsCheckerResult {
    let mut declared: Vec<u32> = inode.direct_addrs().collect();

    // directories never use the indirect pointer
    let full = declared.len() == XV6_NDIRECT;
    if full && inode.kind() != Some(InodeType::Dir) && inode.indirect() != 0 {
        let ibp = inode.indirect();
        declared.push(ibp);
        if ctx.layout.is_data_block(ibp) {
            let block = ctx.dev.read_block(ibp)?;
            declared.extend(indirect_entries(&block));
        }
    }

    match declared.into_iter().find(|&b| !ctx.bitmap_marked(b)) {
        Some(block) => Err(FsCheckerError::BitmapBlockFreedButUsed { inum, block }),
        None => Ok(()),
    }
}

/// Every data block marked in use must be referenced by some inode.
pub(crate) fn scan_bitmap<IO: XvIO + ?Sized>(ctx: &CheckContext<'_, IO>) -> FsCheckerResult {
    let l = &ctx.layout;
    for block in l.data_start..l.size {
        ensure!(
            !ctx.bitmap_marked(block) || ctx.block_refs.get(block) != 0,
            FsCheckerError::BitmapBlockUsedButFree { block }
        );
    }
    Ok(())
}
