//! Error types for the item registry

use oh_core::{ItemName, ItemNameError, ItemTypeError};
use std::time::Duration;
use thiserror::Error;

/// Result type for registry operations
pub type RegistryResult<T> = Result<T, RegistryError>;

/// Errors that can occur in the item registry
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RegistryError {
    /// The item name is not valid
    #[error("invalid item name: {0}")]
    InvalidName(#[from] ItemNameError),

    /// An item with this name is already registered
    #[error("item '{0}' already exists")]
    AlreadyExists(ItemName),

    /// No item with this name is registered
    #[error("item '{0}' not found")]
    NotFound(String),

    /// The posted state does not fit the item's type
    #[error("cannot update item '{item}': {source}")]
    IncompatibleState {
        item: ItemName,
        #[source]
        source: ItemTypeError,
    },

    /// The item did not reach the expected state in time
    #[error("timed out after {timeout:?} waiting for item '{item}'")]
    Timeout { item: ItemName, timeout: Duration },

    /// The event bus was dropped while waiting
    #[error("event bus closed")]
    BusClosed,
}
