//! Error types for Tether.

use tether_core::CoreError;

use crate::dom::{Capability, ElementId};

/// Result type alias for Tether operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in Tether.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The element id does not belong to this document.
    #[error("Unknown element {0:?}")]
    UnknownElement(ElementId),

    /// The requested tree change would create a cycle or move a node that
    /// cannot be moved (the root, a shadow root).
    #[error("Cannot insert {child:?} under {parent:?}")]
    HierarchyRequest { parent: ElementId, child: ElementId },

    /// The element already hosts a shadow root.
    #[error("Element {0:?} already has a shadow root")]
    ShadowRootExists(ElementId),

    /// The platform does not provide a required observation primitive.
    #[error("Platform capability not supported: {0}")]
    Unsupported(Capability),

    /// Configuration could not be parsed.
    #[error("Invalid configuration: {0}")]
    Config(#[from] toml::de::Error),

    /// Configuration could not be serialized.
    #[error("Failed to serialize configuration: {0}")]
    ConfigSerialize(#[from] toml::ser::Error),

    /// Error from a core primitive.
    #[error(transparent)]
    Core(#[from] CoreError),
}
