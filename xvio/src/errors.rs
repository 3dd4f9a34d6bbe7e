// SPDX-License-Identifier: MIT

use core::fmt;

/// Result type for XvIO operations.
pub type XvIOResult<T = ()> = core::result::Result<T, XvIOError>;

/// Error type for XvIO operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum XvIOError {
    /// Failure reported by the host OS.
    Io(std::io::ErrorKind),
    OutOfBounds,
    Unsupported,
    Other(&'static str),
}

impl XvIOError {
    pub fn msg(&self) -> &'static str {
        match self {
            XvIOError::Io(std::io::ErrorKind::UnexpectedEof) => "Truncated image",
            XvIOError::Io(std::io::ErrorKind::NotFound) => "No such file",
            XvIOError::Io(std::io::ErrorKind::PermissionDenied) => "Permission denied",
            XvIOError::Io(_) => "Host I/O failure",
            XvIOError::OutOfBounds => "Out of bounds",
            XvIOError::Unsupported => "Unsupported operation",
            XvIOError::Other(msg) => msg,
        }
    }
}

impl From<&'static str> for XvIOError {
    #[inline]
    fn from(msg: &'static str) -> Self {
        XvIOError::Other(msg)
    }
}

impl From<std::io::Error> for XvIOError {
    #[cold]
    #[inline(never)]
    fn from(e: std::io::Error) -> Self {
        XvIOError::Io(e.kind())
    }
}

impl fmt::Display for XvIOError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.msg())?;
        if let XvIOError::Io(kind) = self {
            write!(f, " ({kind:?})")?;
        }
        Ok(())
    }
}
