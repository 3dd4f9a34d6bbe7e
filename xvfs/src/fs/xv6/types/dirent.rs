// SPDX-License-Identifier: MIT
//! xv6 directory entry

use zerocopy::little_endian::U16;
use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout};

use crate::fs::xv6::constant::*;

/// On-disk directory entry, 16 bytes. `inum == 0` marks an unused slot.
#[derive(Debug, Clone, Copy, Default, IntoBytes, FromBytes, KnownLayout, Immutable)]
#[repr(C)]
pub struct Xv6Dirent {
    pub inum: U16,
    /// NUL-padded name
    pub name: [u8; XV6_DIRSIZ],
}

const _: () = assert!(core::mem::size_of::<Xv6Dirent>() == XV6_DIRENT_SIZE);

impl Xv6Dirent {
    /// Returns `None` when `name` is empty or longer than `XV6_DIRSIZ`.
    pub fn new(inum: u16, name: &[u8]) -> Option<Self> {
        if name.is_empty() || name.len() > XV6_DIRSIZ {
            return None;
        }
        let mut raw = [0u8; XV6_DIRSIZ];
        raw[..name.len()].copy_from_slice(name);
        Some(Self {
            inum: U16::new(inum),
            name: raw,
        })
    }

    pub fn inum(&self) -> u32 {
        self.inum.get() as u32
    }

    pub fn is_used(&self) -> bool {
        self.inum.get() != 0
    }

    /// Name bytes up to the first NUL.
    pub fn name(&self) -> &[u8] {
        let end = self
            .name
            .iter()
            .position(|&b| b == 0)
            .unwrap_or(XV6_DIRSIZ);
        &self.name[..end]
    }

    pub fn is_named(&self, name: &[u8]) -> bool {
        self.name() == name
    }
}

/// Decodes entry `slot` of a directory block.
pub fn decode_dirent(block: &[u8; XV6_BLOCK_SIZE], slot: usize) -> Xv6Dirent {
    assert!(slot < XV6_DPB, "directory slot {slot} out of range");
    let off = slot * XV6_DIRENT_SIZE;
    Xv6Dirent::read_from_bytes(&block[off..off + XV6_DIRENT_SIZE]).unwrap_or_default()
}
