use crate::component::Mask;
use crate::entity::Entity;
use crate::storage::TableId;
use crate::world::{EntityEvent, World, WorldError};

impl World {
    /// Hands events to `on_each` and the listener, with the world locked.
    pub(crate) fn notify(
        &mut self,
        events: &[EntityEvent],
        mut on_each: Option<&mut dyn FnMut(Entity)>,
    ) -> Result<(), WorldError> {
        if on_each.is_none() && self.listener.is_none() {
            return Ok(());
        }

        let bit = self.lock.lock()?;
        let mut listener = self.listener.take();
        for event in events {
            if let Some(f) = &mut on_each {
                f(event.entity);
            }
            if let Some(listener) = &mut listener {
                listener(event);
            }
        }
        self.listener = listener;
        Ok(self.lock.unlock(bit)?)
    }

    #[inline]
    pub(crate) fn table_mask(&self, table: TableId) -> &Mask {
        let table = unsafe { self.tables.get_unchecked(table) };
        unsafe { self.archetypes.get_unchecked(table.archetype()) }.mask()
    }
}
