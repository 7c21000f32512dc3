use core::fmt::Debug;

use crate::component::{ComponentId, Mask};
use crate::query::CacheId;

// -----------------------------------------------------------------------------
// Filter

/// A predicate over archetype masks: components that must be present and,
/// optionally, components that must be absent.
///
/// A filter can be registered with a world, which then keeps the list of
/// matching tables up to date instead of scanning every archetype.
///
/// ```
/// use strata_ecs::component::{ComponentId, Mask};
/// use strata_ecs::query::Filter;
///
/// let a = ComponentId::new(0);
/// let b = ComponentId::new(1);
///
/// let filter = Filter::new(&[a]).without(&[b]);
/// assert!(filter.matches(&Mask::from_ids(&[a])));
/// assert!(!filter.matches(&Mask::from_ids(&[a, b])));
///
/// let exact = Filter::new(&[a]).exclusive();
/// assert!(!exact.matches(&Mask::from_ids(&[a, ComponentId::new(3)])));
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct Filter {
    include: Mask,
    exclude: Option<Mask>,
    cache: Option<CacheId>,
}

impl Debug for Filter {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Filter")
            .field("include", &self.include)
            .field("exclude", &self.exclude)
            .field("cache", &self.cache)
            .finish()
    }
}

impl Filter {
    /// Matches every mask containing `ids`.
    pub fn new(ids: &[ComponentId]) -> Self {
        Self::from_mask(Mask::from_ids(ids))
    }

    pub const fn from_mask(include: Mask) -> Self {
        Self {
            include,
            exclude: None,
            cache: None,
        }
    }

    /// Also requires `ids`.
    pub fn with(mut self, ids: &[ComponentId]) -> Self {
        debug_assert!(self.cache.is_none(), "a registered filter cannot change");
        ids.iter().for_each(|&id| self.include.insert(id));
        self
    }

    /// Rejects masks containing any of `ids`.
    pub fn without(mut self, ids: &[ComponentId]) -> Self {
        debug_assert!(self.cache.is_none(), "a registered filter cannot change");
        let exclude = self.exclude.get_or_insert(Mask::EMPTY);
        ids.iter().for_each(|&id| exclude.insert(id));
        self
    }

    /// Only matches masks equal to the required set.
    ///
    /// Replaces any exclusion, so call it after [`with`](Self::with).
    pub fn exclusive(mut self) -> Self {
        debug_assert!(self.cache.is_none(), "a registered filter cannot change");
        self.exclude = Some(!self.include);
        self
    }

    #[inline]
    pub fn matches(&self, mask: &Mask) -> bool {
        mask.contains(&self.include) && !self.exclude.is_some_and(|ex| mask.contains_any(&ex))
    }

    #[inline]
    pub fn include(&self) -> &Mask {
        &self.include
    }

    #[inline]
    pub fn exclude(&self) -> Option<&Mask> {
        self.exclude.as_ref()
    }

    /// The cache this filter is registered under.
    #[inline]
    pub fn cache(&self) -> Option<CacheId> {
        self.cache
    }

    #[inline]
    pub(crate) fn set_cache(&mut self, cache: Option<CacheId>) {
        self.cache = cache;
    }
}

// -----------------------------------------------------------------------------
// Tests
