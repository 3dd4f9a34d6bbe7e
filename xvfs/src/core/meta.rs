// SPDX-License-Identifier: MIT

/// Geometry shared by the layout the checker derives and the one the
/// formatter writes.
pub trait FsMeta<Unit: Ord + Copy> {
    /// Size of one allocation unit in bytes.
    fn unit_size(&self) -> usize;

    /// First unit of the data region.
    fn first_data_unit(&self) -> Unit;

    /// Last unit of the data region (inclusive).
    fn last_data_unit(&self) -> Unit;

    /// Total number of units on the volume, metadata included.
    fn total_units(&self) -> usize;

    /// Total size in bytes of the FS.
    fn size_bytes(&self) -> u64 {
        self.total_units() as u64 * self.unit_size() as u64
    }

    /// Check if a given unit lies inside the data region.
    fn is_valid_unit(&self, unit: Unit) -> bool {
        unit >= self.first_data_unit() && unit <= self.last_data_unit()
    }
}
