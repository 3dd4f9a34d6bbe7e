// SPDX-License-Identifier: MIT

//! Bit-level access to allocation bitmaps.
//!
//! Bits are LSB-first: bit `b` lives in byte `b / 8` at position `b % 8`.
//! This is the xv6 on-disk order, where bit `b` describes absolute block `b`.

use core::ops::Range;

pub trait BitmapOps {
    /// Sets or clears bit `bit`. Out-of-bounds bits are ignored.
    fn set_bit(&mut self, bit: usize, value: bool);

    /// Returns `false` for out-of-bounds bits.
    fn get_bit(&self, bit: usize) -> bool;

    /// Sets every bit in `bits`.
    fn set_range(&mut self, bits: Range<usize>) {
        for b in bits {
            self.set_bit(b, true);
        }
    }

    /// Number of set bits in `bits`.
    fn count_ones_in_range(&self, bits: Range<usize>) -> usize {
        bits.filter(|&b| self.get_bit(b)).count()
    }

    /// First clear bit at or after `start`.
    fn find_first_zero(&self, start: usize) -> Option<usize>;

    /// Number of set bits in the whole bitmap.
    fn count_ones(&self) -> usize;
}

impl BitmapOps for [u8] {
    #[inline]
    fn set_bit(&mut self, bit: usize, value: bool) {
        let mask = 1u8 << (bit % 8);
        if let Some(byte) = self.get_mut(bit / 8) {
            if value {
                *byte |= mask;
            } else {
                *byte &= !mask;
            }
        }
    }

    #[inline]
    fn get_bit(&self, bit: usize) -> bool {
        self.get(bit / 8)
            .is_some_and(|byte| byte & (1u8 << (bit % 8)) != 0)
    }

    fn find_first_zero(&self, start: usize) -> Option<usize> {
        let total = self.len() * 8;
        let mut bit = start;
        while bit < total {
            let byte = self[bit / 8];
            // whole byte in use, jump to the next boundary
            if byte == 0xFF {
                bit = (bit / 8 + 1) * 8;
                continue;
            }
            if byte & (1u8 << (bit % 8)) == 0 {
                return Some(bit);
            }
            bit += 1;
        }
        None
    }

    fn count_ones(&self) -> usize {
        self.iter().map(|b| b.count_ones() as usize).sum()
    }
}
