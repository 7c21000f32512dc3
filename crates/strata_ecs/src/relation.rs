//! Relation components and their targets.
//!
//! A relation component gives each entity holding it a target entity.
//! Entities of one archetype are stored in separate tables per distinct
//! tuple of targets, so queries can select a target without scanning rows.

use core::fmt::Debug;

use thiserror::Error;

use crate::component::ComponentId;
use crate::entity::Entity;

// -----------------------------------------------------------------------------
// Relation

/// A relation component paired with a target.
///
/// [`Entity::ZERO`] means "no target". In queries, [`Entity::WILDCARD`]
/// matches any target.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Relation {
    pub component: ComponentId,
    pub target: Entity,
}

impl Relation {
    #[inline]
    pub const fn new(component: ComponentId, target: Entity) -> Self {
        Self { component, target }
    }
}

impl Debug for Relation {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "Relation({} -> {:?})", self.component, self.target)
    }
}

// -----------------------------------------------------------------------------
// RelationError

/// Errors raised when a relation target is requested or set.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum RelationError {
    #[error("component {0} is not part of the target component set")]
    NotDeclared(ComponentId),

    #[error("component {0} is not a relation component")]
    NotRelation(ComponentId),
}
