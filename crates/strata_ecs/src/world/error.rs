use thiserror::Error;

use crate::component::ComponentError;
use crate::entity::EntityError;
use crate::graph::TransitionError;
use crate::query::FilterError;
use crate::relation::RelationError;
use crate::world::LockError;

// -----------------------------------------------------------------------------
// WorldError

/// Every error a [`World`](crate::world::World) operation can return.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum WorldError {
    #[error("the world is locked, defer structural changes until iteration ends")]
    Locked,

    #[error(transparent)]
    Entity(#[from] EntityError),

    #[error(transparent)]
    Lock(#[from] LockError),

    #[error(transparent)]
    Transition(#[from] TransitionError),

    #[error(transparent)]
    Component(#[from] ComponentError),

    #[error(transparent)]
    Relation(#[from] RelationError),

    #[error(transparent)]
    Filter(#[from] FilterError),
}

impl WorldError {
    #[cold]
    #[inline(never)]
    pub fn handle_error(&self) -> ! {
        panic!("{self}");
    }
}

macro_rules! impl_promote {
    ($name:ident, $variant:ident) => {
        impl $name {
            #[cold]
            #[inline(never)]
            pub fn handle_error(&self) -> ! {
                panic!("{self}");
            }

            #[inline]
            pub fn promote(self) -> WorldError {
                WorldError::$variant(self)
            }
        }
    };
}

impl_promote!(EntityError, Entity);
impl_promote!(LockError, Lock);
impl_promote!(TransitionError, Transition);
impl_promote!(ComponentError, Component);
impl_promote!(RelationError, Relation);
impl_promote!(FilterError, Filter);
