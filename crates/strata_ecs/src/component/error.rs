use thiserror::Error;

use crate::component::{ComponentId, MAX_COMPONENTS};

/// Errors raised by the component registry.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum ComponentError {
    #[error("cannot register `{0}`, a world holds at most {max} component types", max = MAX_COMPONENTS)]
    CapacityExceeded(&'static str),

    #[error("component id {0} has not been registered")]
    Unregistered(ComponentId),

    #[error("a `{value}` value was stored under component id {id}, which belongs to another type")]
    TypeMismatch { id: ComponentId, value: &'static str },
}
