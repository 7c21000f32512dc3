use core::fmt::{Debug, Display};

/// Maximum number of distinct component types per world.
#[cfg(not(feature = "tiny"))]
pub const MAX_COMPONENTS: usize = 256;

/// Maximum number of distinct component types per world.
#[cfg(feature = "tiny")]
pub const MAX_COMPONENTS: usize = 64;

// -----------------------------------------------------------------------------
// ComponentId
//
// Ids normally come from registration. Building one by hand is only useful
// for raw access; `ComponentId::new` panics past `MAX_COMPONENTS`, while
// `ComponentId::try_new` reports it.

/// A small, world-local component identifier.
///
/// Ids are handed out in registration order, starting at `0`, and stay
/// stable for the lifetime of the [`World`](crate::world::World).
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct ComponentId(u8);

impl ComponentId {
    /// # Panics
    /// Panics if `index >= MAX_COMPONENTS`, see [`try_new`](Self::try_new).
    #[inline]
    pub const fn new(index: usize) -> Self {
        match Self::try_new(index) {
            Some(id) => id,
            None => panic!("component id out of range"),
        }
    }

    /// Returns `None` if `index >= MAX_COMPONENTS`.
    #[inline]
    pub const fn try_new(index: usize) -> Option<Self> {
        if index < MAX_COMPONENTS {
            Some(Self(index as u8))
        } else {
            None
        }
    }

    #[inline(always)]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl Debug for ComponentId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "ComponentId({})", self.0)
    }
}

impl Display for ComponentId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        Display::fmt(&self.0, f)
    }
}

// -----------------------------------------------------------------------------
// Tests
