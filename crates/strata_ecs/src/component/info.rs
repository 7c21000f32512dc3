use core::alloc::Layout;
use core::any::TypeId;
use core::fmt::Debug;

use crate::component::{Component, ComponentId};
use crate::utils::{DefaultFn, Dropper};

// -----------------------------------------------------------------------------
// ComponentInfo

/// Runtime metadata of a registered component type.
///
/// Everything a column needs to store values of the type without knowing it.
#[derive(Clone)]
pub struct ComponentInfo {
    id: ComponentId,
    name: &'static str,
    type_id: TypeId,
    layout: Layout,
    dropper: Option<Dropper>,
    default: DefaultFn,
    relation: bool,
}

impl Debug for ComponentInfo {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Component")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("layout", &self.layout)
            .field("relation", &self.relation)
            .finish()
    }
}

impl ComponentInfo {
    pub(crate) fn new<T: Component>(id: ComponentId) -> Self {
        Self {
            id,
            name: core::any::type_name::<T>(),
            type_id: TypeId::of::<T>(),
            layout: Layout::new::<T>(),
            dropper: Dropper::of::<T>(),
            default: DefaultFn::of::<T>(),
            relation: T::RELATION,
        }
    }

    #[inline(always)]
    pub fn id(&self) -> ComponentId {
        self.id
    }

    /// Returns the type name, for diagnostics only.
    #[inline(always)]
    pub fn name(&self) -> &'static str {
        self.name
    }

    #[inline(always)]
    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    /// Returns the memory layout of one value.
    #[inline(always)]
    pub fn layout(&self) -> Layout {
        self.layout
    }

    /// Returns the destructor, `None` if the type has no drop glue.
    #[inline(always)]
    pub fn dropper(&self) -> Option<Dropper> {
        self.dropper
    }

    #[inline(always)]
    pub fn default_fn(&self) -> DefaultFn {
        self.default
    }

    /// Returns `true` for relation components.
    #[inline(always)]
    pub fn is_relation(&self) -> bool {
        self.relation
    }
}
