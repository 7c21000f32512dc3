use alloc::vec::Vec;
use core::any::TypeId;
use core::fmt::Debug;

use strata_utils::TypeIdMap;

use crate::component::{Component, ComponentError, ComponentId, ComponentInfo, Mask};

// -----------------------------------------------------------------------------
// Components

/// The per-world registry of component types.
///
/// Ids are assigned densely in registration order. The registry also keeps
/// a mask of every relation component.
pub struct Components {
    infos: Vec<ComponentInfo>,
    mapper: TypeIdMap<ComponentId>,
    relations: Mask,
}

impl Debug for Components {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        Debug::fmt(&self.infos, f)
    }
}

impl Default for Components {
    fn default() -> Self {
        Self::new()
    }
}

impl Components {
    #[inline]
    pub const fn new() -> Self {
        Self {
            infos: Vec::new(),
            mapper: TypeIdMap::new(),
            relations: Mask::EMPTY,
        }
    }

    /// Returns the number of registered components.
    #[inline]
    pub const fn len(&self) -> usize {
        self.infos.len()
    }

    /// Looks up a component id by its [`TypeId`].
    #[inline]
    pub fn get_id(&self, type_id: TypeId) -> Option<ComponentId> {
        self.mapper.get(&type_id).copied()
    }

    /// Looks up the component id of `T`.
    #[inline]
    pub fn id_of<T: Component>(&self) -> Option<ComponentId> {
        self.mapper.get_type::<T>().copied()
    }

    #[inline]
    pub fn get(&self, id: ComponentId) -> Option<&ComponentInfo> {
        self.infos.get(id.index())
    }

    /// # Safety
    /// `id.index() < self.len()`.
    #[inline]
    pub unsafe fn get_unchecked(&self, id: ComponentId) -> &ComponentInfo {
        debug_assert!(id.index() < self.infos.len());
        unsafe { self.infos.get_unchecked(id.index()) }
    }

    /// Returns `true` if `id` has been handed out by this registry.
    #[inline]
    pub fn contains(&self, id: ComponentId) -> bool {
        id.index() < self.infos.len()
    }

    /// Fails with [`ComponentError::Unregistered`] on the first unknown id.
    pub fn check(&self, ids: &[ComponentId]) -> Result<(), ComponentError> {
        match ids.iter().find(|id| !self.contains(**id)) {
            Some(id) => Err(ComponentError::Unregistered(*id)),
            None => Ok(()),
        }
    }

    /// Returns `true` if `id` is a relation component.
    #[inline]
    pub fn is_relation(&self, id: ComponentId) -> bool {
        self.relations.get(id)
    }

    /// Mask of every registered relation component.
    #[inline]
    pub fn relations(&self) -> &Mask {
        &self.relations
    }

    pub fn iter(&self) -> impl ExactSizeIterator<Item = &ComponentInfo> {
        self.infos.iter()
    }

    /// Registers `T`, returning the existing id if it is already known.
    pub fn register<T: Component>(&mut self) -> Result<ComponentId, ComponentError> {
        #[cold]
        #[inline(never)]
        fn register_internal<T: Component>(
            this: &mut Components,
        ) -> Result<ComponentId, ComponentError> {
            let Some(id) = ComponentId::try_new(this.infos.len()) else {
                return Err(ComponentError::CapacityExceeded(core::any::type_name::<T>()));
            };
            this.infos.push(ComponentInfo::new::<T>(id));
            this.mapper.insert_type::<T>(id);
            if T::RELATION {
                this.relations.insert(id);
            }

            log::debug!("registered component {} as {id}", core::any::type_name::<T>());
            Ok(id)
        }

        match self.id_of::<T>() {
            Some(id) => Ok(id),
            None => register_internal::<T>(self),
        }
    }
}

// -----------------------------------------------------------------------------
// Tests
