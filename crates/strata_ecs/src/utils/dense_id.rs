/// Declares a `NonMaxU32` index newtype for one of the world arenas.
///
/// `Option<Id>` stays four bytes wide, and `Hash` writes the raw `u32` so the
/// ids work with `NoOpHashState`.
macro_rules! dense_id {
    ($(#[$attr:meta])* $name:ident, $what:literal) => {
        $(#[$attr])*
        #[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord)]
        #[repr(transparent)]
        pub struct $name(strata_utils::num::NonMaxU32);

        impl $name {
            /// # Panics
            /// Panics on `u32::MAX`.
            #[inline]
            pub(crate) const fn new(id: u32) -> Self {
                match strata_utils::num::NonMaxU32::new(id) {
                    Some(id) => Self(id),
                    None => panic!(concat!("too many ", $what)),
                }
            }

            #[inline(always)]
            pub const fn index(self) -> usize {
                self.0.index()
            }
        }

        impl core::fmt::Debug for $name {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                write!(f, "{}({})", stringify!($name), self.0.get())
            }
        }

        impl core::fmt::Display for $name {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                core::fmt::Display::fmt(&self.0.get(), f)
            }
        }

        impl core::hash::Hash for $name {
            #[inline(always)]
            fn hash<H: core::hash::Hasher>(&self, state: &mut H) {
                state.write_u32(self.0.get());
            }
        }
    };
}

pub(crate) use dense_id;
