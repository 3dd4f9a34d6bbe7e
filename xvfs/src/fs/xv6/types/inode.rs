// SPDX-License-Identifier: MIT
//! xv6 on-disk inode (dinode)

use zerocopy::little_endian::{I16, U32};
use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout};

use crate::fs::xv6::constant::*;

/// Decoded inode type tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InodeType {
    Free,
    Dir,
    File,
    Dev,
}

impl InodeType {
    /// `None` for tags outside `0..=3`.
    pub fn from_raw(raw: i16) -> Option<Self> {
        match raw {
            XV6_T_FREE => Some(InodeType::Free),
            XV6_T_DIR => Some(InodeType::Dir),
            XV6_T_FILE => Some(InodeType::File),
            XV6_T_DEV => Some(InodeType::Dev),
            _ => None,
        }
    }

    pub fn raw(self) -> i16 {
        match self {
            InodeType::Free => XV6_T_FREE,
            InodeType::Dir => XV6_T_DIR,
            InodeType::File => XV6_T_FILE,
            InodeType::Dev => XV6_T_DEV,
        }
    }
}

/// On-disk inode, 64 bytes.
#[derive(Debug, Clone, Copy, Default, IntoBytes, FromBytes, KnownLayout, Immutable)]
#[repr(C)]
pub struct Xv6Dinode {
    /// File type (0 = free)
    pub kind: I16,
    /// Major device number (T_DEV only)
    pub major: I16,
    /// Minor device number (T_DEV only)
    pub minor: I16,
    /// Number of links to inode in file system
    pub nlink: I16,
    /// Size of file (bytes)
    pub size: U32,
    /// Data block addresses: `XV6_NDIRECT` direct, then one indirect
    pub addrs: [U32; XV6_NDIRECT + 1],
}

const _: () = assert!(core::mem::size_of::<Xv6Dinode>() == XV6_DINODE_SIZE);

impl Xv6Dinode {
    pub fn new(kind: InodeType) -> Self {
        Self {
            kind: I16::new(kind.raw()),
            ..Default::default()
        }
    }

    pub fn raw_kind(&self) -> i16 {
        self.kind.get()
    }

    /// `None` when the tag is not a known type.
    pub fn kind(&self) -> Option<InodeType> {
        InodeType::from_raw(self.raw_kind())
    }

    pub fn is_free(&self) -> bool {
        self.raw_kind() == XV6_T_FREE
    }

    pub fn nlink(&self) -> i16 {
        self.nlink.get()
    }

    pub fn size(&self) -> u32 {
        self.size.get()
    }

    /// Direct address `i`.
    pub fn addr(&self, i: usize) -> u32 {
        assert!(i < XV6_NDIRECT, "direct slot {i} out of range");
        self.addrs[i].get()
    }

    pub fn indirect(&self) -> u32 {
        self.addrs[XV6_NDIRECT].get()
    }

    /// Direct addresses up to (excluding) the first zero.
    pub fn direct_addrs(&self) -> impl Iterator<Item = u32> + '_ {
        self.addrs[..XV6_NDIRECT]
            .iter()
            .map(|a| a.get())
            .take_while(|&a| a != 0)
    }

    pub fn set_nlink(&mut self, nlink: i16) {
        self.nlink = I16::new(nlink);
    }

    pub fn set_size(&mut self, size: u32) {
        self.size = U32::new(size);
    }

    pub fn set_addr(&mut self, i: usize, block: u32) {
        assert!(i <= XV6_NDIRECT, "address slot {i} out of range");
        self.addrs[i] = U32::new(block);
    }

    pub fn set_device(&mut self, major: i16, minor: i16) {
        self.major = I16::new(major);
        self.minor = I16::new(minor);
    }
}

/// Decodes the inode in `slot` of an inode-table block.
pub fn decode_inode_slot(block: &[u8; XV6_BLOCK_SIZE], slot: usize) -> Xv6Dinode {
    assert!(slot < XV6_IPB as usize, "inode slot {slot} out of range");
    let off = slot * XV6_DINODE_SIZE;
    // the slice is exactly one record long
    Xv6Dinode::read_from_bytes(&block[off..off + XV6_DINODE_SIZE]).unwrap_or_default()
}

/// Entries of an indirect block up to (excluding) the first zero.
pub fn indirect_entries(block: &[u8; XV6_BLOCK_SIZE]) -> impl Iterator<Item = u32> + '_ {
    block
        .chunks_exact(4)
        .map(|c| u32::from_le_bytes([c[0], c[1], c[2], c[3]]))
        .take_while(|&a| a != 0)
}
