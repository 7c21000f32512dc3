use thiserror::Error;

use crate::component::ComponentId;

/// Errors raised when resolving an add/remove transition.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum TransitionError {
    #[error("cannot remove component {0}, it is not present")]
    NotPresent(ComponentId),

    #[error("cannot add component {0}, it is already present")]
    AlreadyPresent(ComponentId),

    #[error("component {0} is both added and removed")]
    AddAndRemove(ComponentId),
}
