//! `FixedHasher` and `NoOpHasher`.
//!
//! `FixedHasher` is `foldhash` with a fixed seed, so hash results are stable
//! across runs. `NoOpHasher` uses the written integer as the hash value.

use core::hash::{BuildHasher, Hasher};

use foldhash::fast::{FixedState, FoldHasher};

// -----------------------------------------------------------------------------
// FixedHasher

const FIXED_HASH_STATE: FixedState = FixedState::with_seed(0x95EE04C4F326B271);

/// A hasher whose results only depend on its input.
///
/// Created through [`FixedHashState::build_hasher`].
pub type FixedHasher = FoldHasher<'static>;

/// Fixed hash state based on `foldhash` with a constant seed.
///
/// ```
/// use core::hash::BuildHasher;
/// use strata_utils::hash::FixedHashState;
///
/// let a = FixedHashState.hash_one(17u32);
/// let b = FixedHashState.hash_one(17u32);
/// assert_eq!(a, b);
/// ```
#[derive(Copy, Clone, Default, Debug)]
pub struct FixedHashState;

impl BuildHasher for FixedHashState {
    type Hasher = FixedHasher;

    #[inline(always)]
    fn build_hasher(&self) -> Self::Hasher {
        FIXED_HASH_STATE.build_hasher()
    }
}

// -----------------------------------------------------------------------------
// NoOpHasher

/// A hasher that passes integers through unchanged.
#[derive(Copy, Clone, Default, Debug)]
pub struct NoOpHasher {
    hash: u64,
}

impl Hasher for NoOpHasher {
    #[inline]
    fn finish(&self) -> u64 {
        self.hash
    }

    fn write(&mut self, bytes: &[u8]) {
        // `write_u32(10)` and `write_u64(10)` must agree.
        for byte in bytes.iter().rev() {
            self.hash = self.hash.rotate_left(8).wrapping_add(*byte as u64);
        }
    }

    #[inline]
    fn write_u64(&mut self, i: u64) {
        self.hash = i;
    }

    #[inline]
    fn write_u32(&mut self, i: u32) {
        self.hash = i as u64;
    }
}

/// Builds [`NoOpHasher`]s. Only suitable for keys that are already
/// well distributed, such as `TypeId` or dense ids.
///
/// ```
/// use core::hash::BuildHasher;
/// use strata_utils::hash::NoOpHashState;
///
/// assert_eq!(NoOpHashState.hash_one(3u64), 3);
/// ```
#[derive(Copy, Clone, Default, Debug)]
pub struct NoOpHashState;

impl BuildHasher for NoOpHashState {
    type Hasher = NoOpHasher;

    #[inline(always)]
    fn build_hasher(&self) -> Self::Hasher {
        NoOpHasher { hash: 0 }
    }
}

#[cfg(test)]
mod tests {
    use super::{FixedHashState, NoOpHashState};
    use core::hash::BuildHasher;

    #[test]
    fn noop_widths_agree() {
        assert_eq!(NoOpHashState.hash_one(10u32), NoOpHashState.hash_one(10u64));
        assert_eq!(NoOpHashState.hash_one(10u8), 10);
    }

    #[test]
    fn fixed_state_is_deterministic() {
        let lhs = FixedHashState.hash_one([1u64, 2, 3]);
        let rhs = FixedHashState.hash_one([1u64, 2, 3]);
        assert_eq!(lhs, rhs);
        assert_ne!(lhs, FixedHashState.hash_one([3u64, 2, 1]));
    }
}
