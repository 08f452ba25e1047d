//! Fixed-width pending vectors.
//!
//! A `PendingVector` is the software form of a unary signal bus: one bit per
//! register (or per function unit), packed into 64-bit words. Every derived
//! signal in the scoreboard (row pending, column pending, global pending,
//! readable, writable, busy, go signals) is one of these. They carry no
//! ownership of matrix state and are recomputed each tick.
//!
//! Bits beyond `len` are kept at zero so that word-wise comparisons and
//! reductions never see stale tail bits.

use std::fmt;
use std::ops::{BitAnd, BitOr, Not};

use serde::{Serialize, Serializer};

const WORD_BITS: usize = u64::BITS as usize;

/// A fixed-width bit vector.
#[derive(Clone, PartialEq, Eq, Hash, Default)]
pub struct PendingVector {
    len: usize,
    words: Vec<u64>,
}

impl PendingVector {
    /// Creates an all-zero vector of `len` bits.
    pub fn zeros(len: usize) -> Self {
        Self {
            len,
            words: vec![0; len.div_ceil(WORD_BITS)],
        }
    }

    /// Creates an all-one vector of `len` bits.
    pub fn ones(len: usize) -> Self {
        let mut v = Self {
            len,
            words: vec![u64::MAX; len.div_ceil(WORD_BITS)],
        };
        v.trim();
        v
    }

    /// Creates a vector with exactly one bit set.
    ///
    /// # Panics
    ///
    /// Panics if `index >= len`.
    pub fn single(len: usize, index: usize) -> Self {
        let mut v = Self::zeros(len);
        v.set(index, true);
        v
    }

    /// Creates a vector with the given bits set (unary decode of a set of indices).
    ///
    /// # Panics
    ///
    /// Panics if any index is out of range. Callers validate indices first.
    pub fn from_indices<I: IntoIterator<Item = usize>>(len: usize, indices: I) -> Self {
        let mut v = Self::zeros(len);
        for i in indices {
            v.set(i, true);
        }
        v
    }

    /// Number of bits.
    #[inline]
    pub const fn len(&self) -> usize {
        self.len
    }

    /// True if the vector has zero width.
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Reads one bit. Out-of-range reads return `false`.
    #[inline]
    pub fn get(&self, index: usize) -> bool {
        index < self.len && (self.words[index / WORD_BITS] >> (index % WORD_BITS)) & 1 == 1
    }

    /// Writes one bit.
    ///
    /// # Panics
    ///
    /// Panics if `index >= len`.
    #[inline]
    pub fn set(&mut self, index: usize, value: bool) {
        assert!(
            index < self.len,
            "bit {index} out of range for a {}-bit vector",
            self.len
        );
        let mask = 1u64 << (index % WORD_BITS);
        let word = &mut self.words[index / WORD_BITS];
        if value {
            *word |= mask;
        } else {
            *word &= !mask;
        }
    }

    /// OR-reduction: true if any bit is set.
    #[inline]
    pub fn any(&self) -> bool {
        self.words.iter().any(|&w| w != 0)
    }

    /// True if no bit is set.
    #[inline]
    pub fn none(&self) -> bool {
        !self.any()
    }

    /// Population count.
    pub fn count_ones(&self) -> usize {
        self.words.iter().map(|w| w.count_ones() as usize).sum()
    }

    /// Index of the lowest set bit.
    pub fn first_one(&self) -> Option<usize> {
        self.words
            .iter()
            .enumerate()
            .find(|(_, w)| **w != 0)
            .map(|(i, w)| i * WORD_BITS + w.trailing_zeros() as usize)
    }

    /// True if `self & other` has any bit set.
    pub fn intersects(&self, other: &Self) -> bool {
        debug_assert_eq!(self.len, other.len, "vector width mismatch");
        self.words
            .iter()
            .zip(&other.words)
            .any(|(a, b)| a & b != 0)
    }

    /// In-place OR.
    pub fn or_assign(&mut self, other: &Self) {
        debug_assert_eq!(self.len, other.len, "vector width mismatch");
        for (a, b) in self.words.iter_mut().zip(&other.words) {
            *a |= *b;
        }
    }

    /// In-place AND.
    pub fn and_assign(&mut self, other: &Self) {
        debug_assert_eq!(self.len, other.len, "vector width mismatch");
        for (a, b) in self.words.iter_mut().zip(&other.words) {
            *a &= *b;
        }
    }

    /// In-place AND-NOT (clears every bit set in `other`).
    pub fn clear_bits(&mut self, other: &Self) {
        debug_assert_eq!(self.len, other.len, "vector width mismatch");
        for (a, b) in self.words.iter_mut().zip(&other.words) {
            *a &= !*b;
        }
    }

    /// Clears every bit.
    pub fn clear(&mut self) {
        self.words.fill(0);
    }

    /// Iterates over all bits, lowest index first.
    pub fn iter(&self) -> impl Iterator<Item = bool> + '_ {
        (0..self.len).map(|i| self.get(i))
    }

    /// Iterates over the indices of set bits, lowest first.
    pub fn iter_ones(&self) -> impl Iterator<Item = usize> + '_ {
        self.words.iter().enumerate().flat_map(|(wi, &word)| {
            let mut w = word;
            std::iter::from_fn(move || {
                if w == 0 {
                    return None;
                }
                let bit = w.trailing_zeros() as usize;
                w &= w - 1;
                Some(wi * WORD_BITS + bit)
            })
        })
    }

    fn trim(&mut self) {
        let rem = self.len % WORD_BITS;
        if rem != 0
            && let Some(last) = self.words.last_mut()
        {
            *last &= (1u64 << rem) - 1;
        }
    }
}

impl BitOr for &PendingVector {
    type Output = PendingVector;

    fn bitor(self, rhs: Self) -> PendingVector {
        let mut out = self.clone();
        out.or_assign(rhs);
        out
    }
}

impl BitAnd for &PendingVector {
    type Output = PendingVector;

    fn bitand(self, rhs: Self) -> PendingVector {
        let mut out = self.clone();
        out.and_assign(rhs);
        out
    }
}

impl Not for &PendingVector {
    type Output = PendingVector;

    fn not(self) -> PendingVector {
        let mut out = PendingVector {
            len: self.len,
            words: self.words.iter().map(|w| !w).collect(),
        };
        out.trim();
        out
    }
}

impl FromIterator<bool> for PendingVector {
    fn from_iter<I: IntoIterator<Item = bool>>(iter: I) -> Self {
        let bits: Vec<bool> = iter.into_iter().collect();
        let mut v = Self::zeros(bits.len());
        for (i, b) in bits.into_iter().enumerate() {
            if b {
                v.set(i, true);
            }
        }
        v
    }
}

/// Bit 0 is printed first, so `"0100"` means only bit 1 is set.
impl fmt::Display for PendingVector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for bit in self.iter() {
            f.write_str(if bit { "1" } else { "0" })?;
        }
        Ok(())
    }
}

impl fmt::Debug for PendingVector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PendingVector({self})")
    }
}

impl Serialize for PendingVector {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}
