use crate::component::{Component, ComponentId};
use crate::world::{World, WorldError};

impl World {
    /// Returns the id of `T`, registering it first if needed.
    ///
    /// Registering a new type fails while the world is locked.
    pub fn register_component<T: Component>(&mut self) -> Result<ComponentId, WorldError> {
        if let Some(id) = self.components.id_of::<T>() {
            return Ok(id);
        }
        self.check_unlocked()?;
        Ok(self.components.register::<T>()?)
    }

    /// Returns the id of `T`, if registered.
    #[inline]
    pub fn component_id<T: Component>(&self) -> Option<ComponentId> {
        self.components.id_of::<T>()
    }
}

#[cfg(test)]
mod tests {
    use crate::component::Component;
    use crate::world::{World, WorldError};

    #[derive(Default)]
    struct Foo;
    impl Component for Foo {}

    #[derive(Default)]
    struct Bar;
    impl Component for Bar {}

    #[test]
    fn registration_while_locked() {
        let mut world = World::new();
        let foo = world.register_component::<Foo>().unwrap();

        let bit = world.lock().unwrap();
        assert_eq!(world.register_component::<Foo>(), Ok(foo));
        assert_eq!(world.register_component::<Bar>(), Err(WorldError::Locked));
        assert_eq!(world.component_id::<Bar>(), None);
        assert_eq!(world.components().len(), 1);

        world.unlock(bit).unwrap();
        assert!(world.register_component::<Bar>().is_ok());
    }
}
