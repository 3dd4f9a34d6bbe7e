// SPDX-License-Identifier: MIT

use crate::bail;
use crate::core::errors::*;
use crate::fs::xv6::{
    constant::*,
    types::{InodeType, Xv6Dinode, indirect_entries},
};
use xvio::prelude::*;

use super::CheckContext;

/// Claims every block of a file or device inode.
///
/// Direct pointers are taken in order up to the first zero; a zero direct
/// pointer ends the list and the indirect pointer is then ignored. Otherwise
/// a non-zero indirect pointer is claimed itself before its entries are
/// claimed up to the first zero.
pub(crate) fn walk_file<IO: XvIO + ?Sized>(
    ctx: &mut CheckContext<'_, IO>,
    inum: u32,
    inode: &Xv6Dinode,
) -> FsCheckerResult {
    if !matches!(inode.kind(), Some(InodeType::File | InodeType::Dev)) {
        bail!(FsCheckerError::Application(
            "file walker handed a non-file inode"
        ));
    }

    for i in 0..XV6_NDIRECT {
        let bp = inode.addr(i);
        if bp == 0 {
            return Ok(());
        }
        ctx.claim_block(inum, bp, false)?;
    }

    let ibp = inode.indirect();
    if ibp == 0 {
        return Ok(());
    }
    ctx.claim_block(inum, ibp, true)?;

    let block = ctx.dev.read_block(ibp)?;
    for bp in indirect_entries(&block) {
        ctx.claim_block(inum, bp, true)?;
    }
    Ok(())
}
