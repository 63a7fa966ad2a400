use thiserror::Error;

/// Every failure the engine can surface. All of them are recoverable: the
/// caller logs and the view keeps working.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum EngineError {
    /// The element a drag controller was asked to manage does not exist.
    #[error("element not found: {0}")]
    MissingElement(String),

    /// The draggable element has no parent to act as bounding container.
    #[error("element {0} has no parent container")]
    MissingContainer(String),

    /// The drag surface never appeared within the polling budget.
    #[error("drag surface `{anchor}` not found after {waited_ms} ms")]
    AnchorTimeout { anchor: String, waited_ms: u32 },

    /// Neither the container nor its measurement element has a usable size.
    #[error("container has zero size; scale computation skipped")]
    ZeroSize,

    /// A show request named a plan the engine does not know about.
    #[error("unknown floor plan: {0}")]
    UnknownPlan(String),

    /// JSON handed to the engine could not be decoded.
    #[error("invalid payload: {0}")]
    InvalidPayload(String),

    /// A DOM call failed.
    #[error("dom error: {0}")]
    Dom(String),
}

impl From<serde_json::Error> for EngineError {
    fn from(e: serde_json::Error) -> Self {
        EngineError::InvalidPayload(e.to_string())
    }
}

pub type Result<T, E = EngineError> = std::result::Result<T, E>;
