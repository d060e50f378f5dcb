//! Error types for observatory_layout

use thiserror::Error;

use crate::document::ElementId;

/// Errors raised by the headless host
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LayoutError {
    /// The element is not (or no longer) mounted in the document
    #[error("element {0:?} is not mounted")]
    UnknownElement(ElementId),

    /// The viewport does not accept scroll commands
    #[error("viewport is not scrollable")]
    NotScrollable,

    /// Root margin string could not be parsed
    #[error("invalid root margin {0:?}: expected 1-4 lengths in px or %")]
    InvalidRootMargin(String),

    /// Threshold outside of [0, 1]
    #[error("invalid threshold {0}: must be within 0.0..=1.0")]
    InvalidThreshold(f32),
}

/// Result type for observatory_layout operations
pub type Result<T> = std::result::Result<T, LayoutError>;
