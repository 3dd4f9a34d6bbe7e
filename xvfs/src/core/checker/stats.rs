// SPDX-License-Identifier: MIT

/// Statistics collected during a check.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct WalkerStats {
    /// Number of directories visited (root included).
    pub dirs_visited: usize,
    /// Number of file and device inodes walked.
    pub files_found: usize,
    /// Number of live directory entries scanned, `.` and `..` excluded.
    pub entries_scanned: usize,
    /// Deepest directory level reached; the root is level 0.
    pub max_depth: usize,
    /// Number of inodes examined by the final inode scan.
    pub inodes_checked: usize,
    /// Number of data blocks claimed by inode pointers.
    pub blocks_referenced: usize,
}

impl WalkerStats {
    pub fn new() -> Self {
        Self::default()
    }
}
