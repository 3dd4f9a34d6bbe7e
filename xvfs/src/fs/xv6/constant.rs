// SPDX-License-Identifier: MIT

// === Blocks ===

// Block size in bytes
pub const XV6_BLOCK_SIZE: usize = 512;

// Block 0 is the boot block, block 1 the superblock
pub const XV6_BOOT_BLOCK: u32 = 0;
pub const XV6_SUPERBLOCK_BLOCK: u32 = 1;

// Boot + superblock, always present before the log
pub const XV6_FIXED_META_BLOCKS: u32 = 2;

// === Inodes ===

pub const XV6_NDIRECT: usize = 12;
pub const XV6_NINDIRECT: usize = XV6_BLOCK_SIZE / core::mem::size_of::<u32>();
pub const XV6_MAXFILE: usize = XV6_NDIRECT + XV6_NINDIRECT;

pub const XV6_DINODE_SIZE: usize = 64;

// Inodes per block
pub const XV6_IPB: u32 = (XV6_BLOCK_SIZE / XV6_DINODE_SIZE) as u32;

pub const XV6_ROOT_INO: u32 = 1;

// Inode type tags
pub const XV6_T_FREE: i16 = 0;
pub const XV6_T_DIR: i16 = 1;
pub const XV6_T_FILE: i16 = 2;
pub const XV6_T_DEV: i16 = 3;

// === Directories ===

pub const XV6_DIRSIZ: usize = 14;
pub const XV6_DIRENT_SIZE: usize = 16;

// Directory entries per block
pub const XV6_DPB: usize = XV6_BLOCK_SIZE / XV6_DIRENT_SIZE;

pub const XV6_DOT: &[u8] = b".";
pub const XV6_DOTDOT: &[u8] = b"..";

// === Bitmap ===

// Bitmap bits per block
pub const XV6_BPB: u32 = (XV6_BLOCK_SIZE * 8) as u32;

// === mkfs defaults ===

pub const XV6_DEFAULT_FSSIZE: u32 = 1000;
pub const XV6_DEFAULT_NINODES: u32 = 200;
pub const XV6_DEFAULT_LOGSIZE: u32 = 30;

// === Checker ===

pub const XV6_DEFAULT_MAX_DEPTH: usize = 1024;
