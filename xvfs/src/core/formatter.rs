// SPDX-License-Identifier: MIT

pub use crate::core::errors::{FsFormatterError, FsFormatterResult};

/// A Formatter for a filesystem type.
///
/// Implementations encapsulate all required state (I/O backend, metadata)
/// and lay down an empty, consistent filesystem.
pub trait FsFormatter {
    /// Format the filesystem.
    ///
    /// - `full_format`: if `true`, zero the whole volume first, else only
    ///   the metadata region and the blocks the format itself uses.
    #[must_use = "format result must be checked for errors"]
    fn format(&mut self, full_format: bool) -> FsFormatterResult;

    /// Flush any buffered writes to disk.
    #[must_use = "flush result must be checked for errors"]
    fn flush(&mut self) -> FsFormatterResult<()> {
        Ok(())
    }
}
