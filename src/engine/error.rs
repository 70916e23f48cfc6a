use std::fmt;

use crate::models::RenderTreeError;

pub type Result<T> = std::result::Result<T, EngineError>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// Index outside `[0, len]` for insertion or `[0, len)` for removal.
    OutOfRange { index: usize, len: usize },
    /// The view handle is stale, destroyed, or owned by a projection slot.
    NotOwned,
    UnknownContainer,
    /// The target container lives inside the view being inserted.
    CyclicInsertion,
    /// Internal invariant violation while looking for a splice point.
    AnchorResolution(&'static str),
    RenderTree(RenderTreeError),
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineError::OutOfRange { index, len } => {
                write!(f, "index {} out of range for container of length {}", index, len)
            }
            EngineError::NotOwned => write!(f, "view handle is stale or not owned"),
            EngineError::UnknownContainer => write!(f, "unknown view container"),
            EngineError::CyclicInsertion => {
                write!(f, "cannot insert a view into a container it contains")
            }
            EngineError::AnchorResolution(msg) => write!(f, "anchor resolution failed: {}", msg),
            EngineError::RenderTree(e) => write!(f, "render tree: {}", e),
        }
    }
}

impl std::error::Error for EngineError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            EngineError::RenderTree(e) => Some(e),
            _ => None,
        }
    }
}

impl From<RenderTreeError> for EngineError {
    fn from(e: RenderTreeError) -> Self {
        EngineError::RenderTree(e)
    }
}
