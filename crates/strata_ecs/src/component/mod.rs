//! Component types, their runtime ids, and the component bitmask.

// -----------------------------------------------------------------------------
// Modules

mod buffer;
mod components;
mod error;
mod ident;
mod info;
mod mask;

// -----------------------------------------------------------------------------
// Exports

pub use buffer::ComponentBuffer;
pub use components::Components;
pub use error::ComponentError;
pub use ident::{ComponentId, MAX_COMPONENTS};
pub use info::ComponentInfo;
pub use mask::{MASK_WORDS, Mask, MaskIter};

// -----------------------------------------------------------------------------
// Component

/// A plain data type that can be attached to entities.
///
/// `Default` provides the value used when a component is added by id only.
///
/// Relation components set [`RELATION`](Component::RELATION) to `true`.
/// Each entity holding one has a target entity for it, and entities are
/// stored in separate tables per distinct tuple of targets.
///
/// ```
/// use strata_ecs::component::Component;
///
/// #[derive(Default)]
/// struct Health(u32);
/// impl Component for Health {}
///
/// #[derive(Default)]
/// struct ChildOf;
/// impl Component for ChildOf {
///     const RELATION: bool = true;
/// }
/// ```
pub trait Component: Default + 'static {
    const RELATION: bool = false;
}
