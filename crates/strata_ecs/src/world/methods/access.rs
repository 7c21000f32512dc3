use strata_ptr::{Ptr, PtrMut};

use crate::component::{Component, ComponentBuffer, ComponentId};
use crate::entity::Entity;
use crate::world::{World, WorldError};

// -----------------------------------------------------------------------------
// Raw access

impl World {
    /// Returns a pointer to component `id` of `entity`, `None` if the
    /// entity lacks it.
    pub fn get_raw(&self, entity: Entity, id: ComponentId) -> Result<Option<Ptr<'_>>, WorldError> {
        self.check_alive(entity)?;
        Ok(unsafe { self.get_raw_unchecked(entity, id) })
    }

    pub fn get_raw_mut(&mut self, entity: Entity, id: ComponentId) -> Result<Option<PtrMut<'_>>, WorldError> {
        self.check_alive(entity)?;
        let location = self.locations.get(entity);
        let table = unsafe { self.tables.get_unchecked_mut(location.table) };
        Ok(table.get_mut(id, location.row as usize))
    }

    pub fn has_raw(&self, entity: Entity, id: ComponentId) -> Result<bool, WorldError> {
        self.check_alive(entity)?;
        Ok(unsafe { self.has_unchecked(entity, id) })
    }

    /// [`get_raw`](Self::get_raw) without the liveness check.
    ///
    /// # Safety
    /// `entity` must be alive.
    pub unsafe fn get_raw_unchecked(&self, entity: Entity, id: ComponentId) -> Option<Ptr<'_>> {
        debug_assert!(self.entities.alive(entity));
        let location = self.locations.get(entity);
        unsafe { self.tables.get_unchecked(location.table) }.get(id, location.row as usize)
    }

    /// [`has_raw`](Self::has_raw) without the liveness check.
    ///
    /// # Safety
    /// `entity` must be alive.
    pub unsafe fn has_unchecked(&self, entity: Entity, id: ComponentId) -> bool {
        debug_assert!(self.entities.alive(entity));
        let location = self.locations.get(entity);
        unsafe { self.tables.get_unchecked(location.table) }.has(id)
    }
}

// -----------------------------------------------------------------------------
// Typed access

impl World {
    pub fn get<T: Component>(&self, entity: Entity) -> Result<Option<&T>, WorldError> {
        self.check_alive(entity)?;
        let Some(id) = self.components.id_of::<T>() else {
            return Ok(None);
        };
        // SAFETY: `id` was registered for `T`.
        Ok(unsafe { self.get_raw_unchecked(entity, id).map(|ptr| ptr.as_ref::<T>()) })
    }

    pub fn get_mut<T: Component>(&mut self, entity: Entity) -> Result<Option<&mut T>, WorldError> {
        self.check_alive(entity)?;
        let Some(id) = self.components.id_of::<T>() else {
            return Ok(None);
        };
        // SAFETY: `id` was registered for `T`.
        Ok(self.get_raw_mut(entity, id)?.map(|ptr| unsafe { ptr.consume::<T>() }))
    }

    pub fn has<T: Component>(&self, entity: Entity) -> Result<bool, WorldError> {
        self.check_alive(entity)?;
        match self.components.id_of::<T>() {
            Some(id) => Ok(unsafe { self.has_unchecked(entity, id) }),
            None => Ok(false),
        }
    }

    /// Writes `value`, replacing the current value in place or adding `T`
    /// to the entity.
    pub fn set<T: Component>(&mut self, entity: Entity, value: T) -> Result<(), WorldError> {
        if let Some(slot) = self.get_mut::<T>(entity)? {
            *slot = value;
            return Ok(());
        }
        let mut values = ComponentBuffer::new();
        values.push(self, value)?;
        self.exchange_with(entity, values, &[], &[])
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use crate::component::Component;
    use crate::entity::EntityError;
    use crate::world::{World, WorldError};

    #[derive(Default, Debug, PartialEq)]
    struct Speed(f32);
    impl Component for Speed {}

    #[derive(Default, Debug, PartialEq)]
    struct Marker;
    impl Component for Marker {}

    #[test]
    fn set_adds_then_replaces() {
        let mut world = World::new();
        let e = world.new_entity(&[], &[]).unwrap();
        assert_eq!(world.get::<Speed>(e), Ok(None));

        world.set(e, Speed(1.5)).unwrap();
        let table = world.locations.get(e).table;
        world.set(e, Speed(3.0)).unwrap();
        assert_eq!(world.locations.get(e).table, table);
        assert_eq!(world.get::<Speed>(e), Ok(Some(&Speed(3.0))));

        world.set(e, Marker).unwrap();
        assert_eq!(world.has::<Marker>(e), Ok(true));
        assert_eq!(world.get::<Speed>(e), Ok(Some(&Speed(3.0))));
    }

    #[test]
    fn raw_access() {
        let mut world = World::new();
        let speed = world.register_component::<Speed>().unwrap();
        let e = world.new_entity(&[speed], &[]).unwrap();

        let mut ptr = world.get_raw_mut(e, speed).unwrap().unwrap();
        unsafe { ptr.as_mut::<Speed>().0 = 2.0 };
        let ptr = world.get_raw(e, speed).unwrap().unwrap();
        assert_eq!(unsafe { ptr.as_ref::<Speed>() }, &Speed(2.0));
        assert_eq!(world.has_raw(e, speed), Ok(true));
        assert!(unsafe { world.has_unchecked(e, speed) });

        world.remove_entity(e).unwrap();
        assert_eq!(world.get_raw(e, speed).map(|p| p.is_some()), Err(WorldError::Entity(EntityError::NotAlive(e))));
    }
}
