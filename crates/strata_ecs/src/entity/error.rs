use thiserror::Error;

use crate::entity::Entity;

/// Errors raised when an entity handle is not usable.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum EntityError {
    #[error("entity {0} is not alive")]
    NotAlive(Entity),

    #[error("entity {0:?} is reserved and cannot be recycled")]
    Reserved(Entity),
}
