use core::cell::Cell;
use core::fmt::Debug;

use thiserror::Error;

// -----------------------------------------------------------------------------
// LockError

/// Errors raised by [`Lock`].
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum LockError {
    #[error("all {max} lock bits are held", max = Lock::MAX_HOLDERS)]
    Exhausted,

    #[error("lock bit {0} is not held")]
    Imbalance(u8),
}

// -----------------------------------------------------------------------------
// Lock

/// A pool of 64 lock bits guarding against structural changes.
///
/// Every reader takes its own bit and returns it when done; the world is
/// locked while any bit is held. The pool lives in a [`Cell`], so shared
/// borrows of a world can lock it.
///
/// ```
/// use strata_ecs::world::Lock;
///
/// let lock = Lock::new();
/// let a = lock.lock().unwrap();
/// let b = lock.lock().unwrap();
/// assert_ne!(a, b);
///
/// lock.unlock(a).unwrap();
/// assert!(lock.is_locked());
/// lock.unlock(b).unwrap();
/// assert!(!lock.is_locked());
/// assert!(lock.unlock(b).is_err());
/// ```
#[derive(Default)]
pub struct Lock {
    bits: Cell<u64>,
}

impl Debug for Lock {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "Lock({:#066b})", self.bits.get())
    }
}

impl Lock {
    /// Number of simultaneous holders.
    pub const MAX_HOLDERS: u32 = u64::BITS;

    #[inline]
    pub const fn new() -> Self {
        Self { bits: Cell::new(0) }
    }

    /// Takes the lowest free bit.
    pub fn lock(&self) -> Result<u8, LockError> {
        let bits = self.bits.get();
        if bits == u64::MAX {
            log::warn!("lock exhausted, {} holders", Self::MAX_HOLDERS);
            return Err(LockError::Exhausted);
        }
        let bit = (!bits).trailing_zeros();
        self.bits.set(bits | (1 << bit));
        Ok(bit as u8)
    }

    /// Returns a bit taken by [`lock`](Self::lock).
    pub fn unlock(&self, bit: u8) -> Result<(), LockError> {
        let bits = self.bits.get();
        let flag = 1u64.checked_shl(bit as u32).unwrap_or(0);
        if bits & flag == 0 {
            return Err(LockError::Imbalance(bit));
        }
        self.bits.set(bits & !flag);
        Ok(())
    }

    #[inline]
    pub fn is_locked(&self) -> bool {
        self.bits.get() != 0
    }

    /// Number of bits currently held.
    #[inline]
    pub fn held(&self) -> u32 {
        self.bits.get().count_ones()
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use super::{Lock, LockError};

    #[test]
    fn bits_are_recycled() {
        let lock = Lock::new();
        let a = lock.lock().unwrap();
        let b = lock.lock().unwrap();
        assert_eq!((a, b), (0, 1));

        lock.unlock(a).unwrap();
        assert_eq!(lock.lock(), Ok(0));
        assert_eq!(lock.held(), 2);
    }

    #[test]
    fn exhaustion_and_imbalance() {
        let lock = Lock::new();
        for _ in 0..64 {
            lock.lock().unwrap();
        }
        assert_eq!(lock.lock(), Err(LockError::Exhausted));

        lock.unlock(63).unwrap();
        assert_eq!(lock.unlock(63), Err(LockError::Imbalance(63)));
        assert_eq!(lock.unlock(200), Err(LockError::Imbalance(200)));
        assert_eq!(lock.lock(), Ok(63));
    }
}
