// SPDX-License-Identifier: MIT

//! Reference counters for filesystem tree walks.
//!
//! One counter per unit (inode or block). Walkers bump a counter each time a
//! unit is reached and compare the totals against on-disk metadata afterwards.

/// Counts how many times each unit in `[base_unit, base_unit + len)` was
/// referenced during a walk.
#[derive(Debug, Clone)]
pub struct RefTracker {
    counts: Vec<u32>,
    base_unit: u32,
}

impl RefTracker {
    /// Creates a tracker for `len` units starting at `base_unit`, all at zero.
    pub fn new(base_unit: u32, len: usize) -> Self {
        Self {
            counts: vec![0; len],
            base_unit,
        }
    }

    #[inline]
    fn index(&self, unit: u32) -> Option<usize> {
        let idx = unit.checked_sub(self.base_unit)? as usize;
        (idx < self.counts.len()).then_some(idx)
    }

    /// Increments the counter of `unit` and returns the new count, or `None`
    /// when `unit` is outside the tracked range.
    #[inline]
    pub fn bump(&mut self, unit: u32) -> Option<u32> {
        let idx = self.index(unit)?;
        let c = &mut self.counts[idx];
        *c = c.saturating_add(1);
        Some(*c)
    }

    /// Current count for `unit`; zero when untracked.
    #[inline]
    pub fn get(&self, unit: u32) -> u32 {
        self.index(unit).map_or(0, |i| self.counts[i])
    }

    /// Number of units with a non-zero count.
    pub fn referenced(&self) -> usize {
        self.counts.iter().filter(|&&c| c > 0).count()
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    pub fn base_unit(&self) -> u32 {
        self.base_unit
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bump_counts_up() {
        let mut t = RefTracker::new(59, 941);
        assert_eq!(t.bump(59), Some(1));
        assert_eq!(t.bump(59), Some(2));
        assert_eq!(t.get(59), 2);
        assert_eq!(t.get(60), 0);
        assert_eq!(t.referenced(), 1);
    }

    #[test]
    fn test_out_of_range_units() {
        let mut t = RefTracker::new(2, 10);
        assert_eq!(t.bump(1), None);
        assert_eq!(t.bump(12), None);
        assert_eq!(t.get(0), 0);
        assert_eq!(t.bump(11), Some(1));
    }
}
