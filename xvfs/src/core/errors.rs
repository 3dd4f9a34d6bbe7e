// SPDX-License-Identifier: MIT

use core::fmt;

pub use xvio::errors::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FsAllocatorError {
    OutOfBlocks,
    OutOfInodes,
    Other(&'static str),
}

impl FsAllocatorError {
    pub fn msg(&self) -> &'static str {
        match self {
            FsAllocatorError::OutOfBlocks => "Out of blocks",
            FsAllocatorError::OutOfInodes => "Out of inodes",
            FsAllocatorError::Other(msg) => msg,
        }
    }
}

impl fmt::Display for FsAllocatorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.msg())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FsFormatterError {
    IO(XvIOError),
    Invalid(&'static str),
    Other(&'static str),
}

impl FsFormatterError {
    pub fn msg(&self) -> &'static str {
        match self {
            FsFormatterError::IO(_) => "IO error",
            FsFormatterError::Invalid(msg) => msg,
            FsFormatterError::Other(msg) => msg,
        }
    }

    pub fn source(&self) -> Option<FsError> {
        match self {
            FsFormatterError::IO(e) => Some(FsError::IO(*e)),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FsInjectorError {
    IO(XvIOError),
    Allocator(FsAllocatorError),
    NameTooLong,
    DirectoryFull(u32),
    FileTooLarge,
    Invalid(&'static str),
    Other(&'static str),
}

impl FsInjectorError {
    pub fn msg(&self) -> &'static str {
        match self {
            FsInjectorError::IO(_) => "IO error",
            FsInjectorError::Allocator(_) => "Allocator error",
            FsInjectorError::NameTooLong => "Name longer than a directory entry",
            FsInjectorError::DirectoryFull(_) => "Directory has no free entry slot",
            FsInjectorError::FileTooLarge => "File exceeds the maximum file size",
            FsInjectorError::Invalid(msg) => msg,
            FsInjectorError::Other(msg) => msg,
        }
    }

    pub fn source(&self) -> Option<FsError> {
        match self {
            FsInjectorError::IO(e) => Some(FsError::IO(*e)),
            FsInjectorError::Allocator(e) => Some(FsError::Allocator(*e)),
            _ => None,
        }
    }
}

/// Consistency violations and failures raised while checking an image.
///
/// Every variant is terminal: the checker stops at the first one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FsCheckerError {
    /// Seek/read failure on the image.
    IO(XvIOError),
    /// Malformed superblock or impossible geometry.
    Layout(&'static str),
    /// Block address outside the data region.
    BadBlockPointer { inum: u32, block: u32, indirect: bool },
    /// Data block claimed more than once.
    DuplicateBlockUse { inum: u32, block: u32, indirect: bool },
    /// Directory named by more than one entry.
    DuplicateDirectoryLink { inum: u32 },
    /// Missing or wrong `.`/`..` entries.
    MalformedDirectory { inum: u32, reason: &'static str },
    InvalidInodeType { inum: u32, raw: i16 },
    UnreferencedLiveInode { inum: u32 },
    OrphanedLiveReference { inum: u32, refs: u32 },
    LinkCountMismatch { inum: u32, nlink: i16, refs: u32 },
    BitmapBlockFreedButUsed { inum: u32, block: u32 },
    BitmapBlockUsedButFree { block: u32 },
    /// Directory chain deeper than the configured limit.
    DirectoryTooDeep { inum: u32, limit: usize },
    /// Directory entry naming an inode past the inode table.
    InodeOutOfRange { inum: u32, ninodes: u32 },
    /// Internal precondition violated (wrong inode kind handed to a walker).
    Application(&'static str),
    Other(&'static str),
}

impl FsCheckerError {
    pub fn msg(&self) -> &'static str {
        match self {
            FsCheckerError::IO(_) => "image I/O failed",
            FsCheckerError::Layout(_) => "malformed superblock",
            FsCheckerError::BadBlockPointer { indirect: false, .. } => {
                "bad direct address in inode"
            }
            FsCheckerError::BadBlockPointer { indirect: true, .. } => {
                "bad indirect address in inode"
            }
            FsCheckerError::DuplicateBlockUse { indirect: false, .. } => {
                "direct address used more than once"
            }
            FsCheckerError::DuplicateBlockUse { indirect: true, .. } => {
                "indirect address used more than once"
            }
            FsCheckerError::DuplicateDirectoryLink { .. } => {
                "directory appears more than once in file system"
            }
            FsCheckerError::MalformedDirectory { .. } => "directory not properly formatted",
            FsCheckerError::InvalidInodeType { .. } => "bad inode",
            FsCheckerError::UnreferencedLiveInode { .. } => {
                "inode marked use but not found in a directory"
            }
            FsCheckerError::OrphanedLiveReference { .. } => {
                "inode referred to in directory but marked free"
            }
            FsCheckerError::LinkCountMismatch { .. } => "bad reference count for file",
            FsCheckerError::BitmapBlockFreedButUsed { .. } => {
                "address used by inode but marked free in bitmap"
            }
            FsCheckerError::BitmapBlockUsedButFree { .. } => {
                "bitmap marks block in use but it is not in use"
            }
            FsCheckerError::DirectoryTooDeep { .. } => "directory tree exceeds depth limit",
            FsCheckerError::InodeOutOfRange { .. } => {
                "directory entry names an inode outside the inode table"
            }
            FsCheckerError::Application(_) => "application error",
            FsCheckerError::Other(msg) => msg,
        }
    }

    pub fn source(&self) -> Option<FsError> {
        match self {
            FsCheckerError::IO(e) => Some(FsError::IO(*e)),
            _ => None,
        }
    }

    fn detail(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            FsCheckerError::Layout(why) | FsCheckerError::Application(why) => {
                write!(f, " ({why})")
            }
            FsCheckerError::BadBlockPointer { inum, block, .. }
            | FsCheckerError::DuplicateBlockUse { inum, block, .. }
            | FsCheckerError::BitmapBlockFreedButUsed { inum, block } => {
                write!(f, " (inode {inum}, block {block})")
            }
            FsCheckerError::DuplicateDirectoryLink { inum }
            | FsCheckerError::UnreferencedLiveInode { inum } => write!(f, " (inode {inum})"),
            FsCheckerError::MalformedDirectory { inum, reason } => {
                write!(f, " (inode {inum}: {reason})")
            }
            FsCheckerError::InvalidInodeType { inum, raw } => {
                write!(f, " (inode {inum}, type {raw})")
            }
            FsCheckerError::OrphanedLiveReference { inum, refs } => {
                write!(f, " (inode {inum}, {refs} references)")
            }
            FsCheckerError::LinkCountMismatch { inum, nlink, refs } => {
                write!(f, " (inode {inum}, nlink {nlink}, {refs} references)")
            }
            FsCheckerError::BitmapBlockUsedButFree { block } => write!(f, " (block {block})"),
            FsCheckerError::DirectoryTooDeep { inum, limit } => {
                write!(f, " (inode {inum}, limit {limit})")
            }
            FsCheckerError::InodeOutOfRange { inum, ninodes } => {
                write!(f, " (inode {inum}, ninodes {ninodes})")
            }
            FsCheckerError::IO(_) | FsCheckerError::Other(_) => Ok(()),
        }
    }
}

impl fmt::Display for FsCheckerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.msg())?;
        self.detail(f)?;
        write_chain(f, self.source())
    }
}

/// Top-level error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FsError {
    IO(XvIOError),
    Allocator(FsAllocatorError),
    Formatter(FsFormatterError),
    Injector(FsInjectorError),
    Checker(FsCheckerError),
    Other(&'static str),
}

impl FsError {
    pub fn msg(&self) -> &'static str {
        match self {
            FsError::IO(e) => e.msg(),
            FsError::Allocator(e) => e.msg(),
            FsError::Formatter(e) => e.msg(),
            FsError::Injector(e) => e.msg(),
            FsError::Checker(e) => e.msg(),
            FsError::Other(msg) => msg,
        }
    }

    pub fn source(&self) -> Option<FsError> {
        match self {
            FsError::Formatter(e) => e.source(),
            FsError::Injector(e) => e.source(),
            FsError::Checker(e) => e.source(),
            FsError::IO(_) | FsError::Allocator(_) | FsError::Other(_) => None,
        }
    }
}

/// Renders the cause chain on the same line; diagnostics are single-line.
fn write_chain(f: &mut fmt::Formatter<'_>, mut current: Option<FsError>) -> fmt::Result {
    while let Some(src) = current {
        match src {
            FsError::IO(e) => write!(f, ": caused by: {e}")?,
            other => write!(f, ": caused by: {}", other.msg())?,
        }
        current = src.source();
    }
    Ok(())
}

impl fmt::Display for FsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FsError::Checker(e) => write!(f, "{e}"),
            FsError::IO(e) => write!(f, "{e}"),
            other => {
                write!(f, "{}", other.msg())?;
                write_chain(f, other.source())
            }
        }
    }
}

impl fmt::Display for FsFormatterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.msg())?;
        write_chain(f, self.source())
    }
}

impl fmt::Display for FsInjectorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.msg())?;
        if let FsInjectorError::DirectoryFull(inum) = self {
            write!(f, " (inode {inum})")?;
        }
        write_chain(f, self.source())
    }
}

impl core::error::Error for FsError {}
impl core::error::Error for FsCheckerError {}
impl core::error::Error for FsFormatterError {}
impl core::error::Error for FsInjectorError {}
impl core::error::Error for FsAllocatorError {}

// === type Fs*Result ===

pub type FsResult<T = ()> = Result<T, FsError>;
pub type FsAllocatorResult<T = ()> = Result<T, FsAllocatorError>;
pub type FsFormatterResult<T = ()> = Result<T, FsFormatterError>;
pub type FsInjectorResult<T = ()> = Result<T, FsInjectorError>;
pub type FsCheckerResult<T = ()> = Result<T, FsCheckerError>;

crate::fs_error_wiring! {
    top => FsError {
        XvIOError        : IO,
        FsAllocatorError : Allocator,
        FsFormatterError : Formatter,
        FsInjectorError  : Injector,
        FsCheckerError   : Checker,
    },
    str_into => [
        FsAllocatorError,
        FsFormatterError,
        FsInjectorError,
        FsCheckerError,
    ],
    sub => {
        XvIOError        => [ FsFormatterError::IO, FsInjectorError::IO, FsCheckerError::IO ],
        FsAllocatorError => [ FsInjectorError::Allocator ],
    },
}
