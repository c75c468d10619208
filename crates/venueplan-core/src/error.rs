//! Errors returned by editor commands.

use crate::elements::{ElementId, ElementKind};
use thiserror::Error;

/// Why an editing command did nothing.
///
/// Commands leave the scene untouched when they return one of these, so
/// callers that only want no-op behaviour can discard it.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EditError {
    #[error("Select at least one element first")]
    NothingSelected,
    #[error("This needs at least {required} selected elements, got {actual}")]
    NotEnoughSelected { required: usize, actual: usize },
    #[error("Expected a {expected} element, got {actual}")]
    WrongKind {
        expected: ElementKind,
        actual: ElementKind,
    },
    #[error("Unknown element: {0}")]
    UnknownElement(ElementId),
}

/// Result type for editing commands.
pub type EditResult<T> = Result<T, EditError>;
