use core::fmt::Debug;
use core::ops::{BitAnd, BitOr, Not, Sub};

use crate::component::{ComponentId, MAX_COMPONENTS};

/// Number of `u64` words in a [`Mask`].
pub const MASK_WORDS: usize = MAX_COMPONENTS / 64;

// -----------------------------------------------------------------------------
// Mask

/// A fixed-width bitset over [`ComponentId`]s.
///
/// An archetype is identified by its mask, and filters are predicates
/// over masks.
///
/// ```
/// use strata_ecs::component::{ComponentId, Mask};
///
/// let a = ComponentId::new(0);
/// let b = ComponentId::new(5);
///
/// let ab = Mask::from_ids(&[a, b]);
/// let only_a = Mask::from_ids(&[a]);
///
/// assert!(ab.contains(&only_a));
/// assert!(!only_a.contains(&ab));
/// assert!(only_a.contains_any(&ab));
/// assert_eq!(ab.count_ones(), 2);
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Mask {
    bits: [u64; MASK_WORDS],
}

impl Mask {
    /// The mask without any component.
    pub const EMPTY: Mask = Mask {
        bits: [0; MASK_WORDS],
    };

    /// The mask with every component.
    pub const FULL: Mask = Mask {
        bits: [u64::MAX; MASK_WORDS],
    };

    #[inline]
    pub const fn new() -> Self {
        Self::EMPTY
    }

    /// Creates a mask with the given ids set.
    pub fn from_ids(ids: &[ComponentId]) -> Self {
        let mut mask = Self::EMPTY;
        ids.iter().for_each(|&id| mask.insert(id));
        mask
    }

    #[inline(always)]
    const fn locate(id: ComponentId) -> (usize, u64) {
        let index = id.index();
        (index / 64, 1 << (index % 64))
    }

    /// Returns whether `id` is set.
    #[inline]
    pub const fn get(&self, id: ComponentId) -> bool {
        let (word, bit) = Self::locate(id);
        self.bits[word] & bit != 0
    }

    /// Sets or clears `id`.
    #[inline]
    pub const fn set(&mut self, id: ComponentId, value: bool) {
        let (word, bit) = Self::locate(id);
        if value {
            self.bits[word] |= bit;
        } else {
            self.bits[word] &= !bit;
        }
    }

    #[inline]
    pub const fn insert(&mut self, id: ComponentId) {
        self.set(id, true);
    }

    #[inline]
    pub const fn remove(&mut self, id: ComponentId) {
        self.set(id, false);
    }

    /// Returns a copy with `id` flipped.
    #[inline]
    #[must_use]
    pub const fn toggled(mut self, id: ComponentId) -> Self {
        let (word, bit) = Self::locate(id);
        self.bits[word] ^= bit;
        self
    }

    /// Returns `true` if every bit of `other` is set in `self`.
    pub fn contains(&self, other: &Mask) -> bool {
        self.bits
            .iter()
            .zip(other.bits.iter())
            .all(|(lhs, rhs)| lhs & rhs == *rhs)
    }

    /// Returns `true` if `self` and `other` share at least one bit.
    pub fn contains_any(&self, other: &Mask) -> bool {
        self.bits
            .iter()
            .zip(other.bits.iter())
            .any(|(lhs, rhs)| lhs & rhs != 0)
    }

    #[must_use]
    pub fn union(&self, other: &Mask) -> Mask {
        self.zip_with(other, |lhs, rhs| lhs | rhs)
    }

    #[must_use]
    pub fn intersection(&self, other: &Mask) -> Mask {
        self.zip_with(other, |lhs, rhs| lhs & rhs)
    }

    /// Bits of `self` that are not in `other`.
    #[must_use]
    pub fn difference(&self, other: &Mask) -> Mask {
        self.zip_with(other, |lhs, rhs| lhs & !rhs)
    }

    /// The complement over all [`MAX_COMPONENTS`] ids.
    #[must_use]
    pub fn complement(&self) -> Mask {
        let mut bits = self.bits;
        bits.iter_mut().for_each(|word| *word = !*word);
        Mask { bits }
    }

    #[inline]
    fn zip_with(&self, other: &Mask, f: impl Fn(u64, u64) -> u64) -> Mask {
        let mut bits = [0; MASK_WORDS];
        for (i, word) in bits.iter_mut().enumerate() {
            *word = f(self.bits[i], other.bits[i]);
        }
        Mask { bits }
    }

    /// Number of set ids.
    pub fn count_ones(&self) -> u32 {
        self.bits.iter().map(|word| word.count_ones()).sum()
    }

    pub fn is_zero(&self) -> bool {
        self.bits.iter().all(|word| *word == 0)
    }

    /// Iterates over the set ids in ascending order.
    #[inline]
    pub fn iter(&self) -> MaskIter {
        MaskIter {
            bits: self.bits,
            word: 0,
        }
    }
}

impl Debug for Mask {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_set().entries(self.iter().map(ComponentId::index)).finish()
    }
}

impl FromIterator<ComponentId> for Mask {
    fn from_iter<I: IntoIterator<Item = ComponentId>>(iter: I) -> Self {
        let mut mask = Mask::EMPTY;
        iter.into_iter().for_each(|id| mask.insert(id));
        mask
    }
}

impl BitOr for Mask {
    type Output = Mask;

    #[inline]
    fn bitor(self, rhs: Self) -> Mask {
        self.union(&rhs)
    }
}

impl BitAnd for Mask {
    type Output = Mask;

    #[inline]
    fn bitand(self, rhs: Self) -> Mask {
        self.intersection(&rhs)
    }
}

impl Sub for Mask {
    type Output = Mask;

    #[inline]
    fn sub(self, rhs: Self) -> Mask {
        self.difference(&rhs)
    }
}

impl Not for Mask {
    type Output = Mask;

    #[inline]
    fn not(self) -> Mask {
        self.complement()
    }
}

// -----------------------------------------------------------------------------
// MaskIter

/// Iterator over the ids set in a [`Mask`].
#[derive(Clone)]
pub struct MaskIter {
    bits: [u64; MASK_WORDS],
    word: usize,
}

impl Iterator for MaskIter {
    type Item = ComponentId;

    fn next(&mut self) -> Option<ComponentId> {
        while self.word < MASK_WORDS {
            let bits = &mut self.bits[self.word];
            if *bits != 0 {
                let offset = bits.trailing_zeros() as usize;
                *bits &= *bits - 1;
                return Some(ComponentId::new(self.word * 64 + offset));
            }
            self.word += 1;
        }
        None
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use super::{MASK_WORDS, Mask};
    use crate::component::{ComponentId, MAX_COMPONENTS};
    use alloc::vec::Vec;

    fn id(index: usize) -> ComponentId {
        ComponentId::new(index)
    }

    #[test]
    fn set_get_across_words() {
        let mut mask = Mask::new();
        let mid = id(MAX_COMPONENTS / 2);
        let last = id(MAX_COMPONENTS - 1);
        mask.insert(id(0));
        mask.insert(mid);
        mask.insert(last);
        assert_eq!(mask.count_ones(), 3);
        assert!(mask.get(id(0)) && mask.get(mid) && mask.get(last));
        assert!(!mask.get(id(1)));
        mask.remove(mid);
        assert!(!mask.get(mid));
        assert!(mask.get(last));
        assert_eq!(mask.count_ones(), 2);
    }

    #[test]
    fn set_algebra() {
        let ab = Mask::from_ids(&[id(1), id(2)]);
        let bc = Mask::from_ids(&[id(2), id(3)]);

        assert_eq!(ab | bc, Mask::from_ids(&[id(1), id(2), id(3)]));
        assert_eq!(ab & bc, Mask::from_ids(&[id(2)]));
        assert_eq!(ab - bc, Mask::from_ids(&[id(1)]));
        assert!((ab - ab).is_zero());
        assert_eq!((!ab).count_ones() as usize, MASK_WORDS * 64 - 2);
        assert!(!(!ab).contains_any(&ab));
        assert!(Mask::EMPTY.contains(&Mask::EMPTY));
        assert!(ab.contains(&Mask::EMPTY));
    }

    #[test]
    fn iterates_in_order() {
        let mask = Mask::from_ids(&[id(40), id(3), id(MAX_COMPONENTS - 2)]);
        let ids: Vec<usize> = mask.iter().map(ComponentId::index).collect();
        assert_eq!(ids, [3, 40, MAX_COMPONENTS - 2]);
        assert_eq!(mask.iter().collect::<Mask>(), mask);
    }

    #[test]
    fn toggled_flips_one_bit() {
        let mask = Mask::from_ids(&[id(4)]);
        assert!(mask.toggled(id(4)).is_zero());
        assert_eq!(mask.toggled(id(5)).count_ones(), 2);
    }
}
