//! Error types for the registry and persistence boundaries.

use thiserror::Error;

/// Result type for module registry operations.
pub type RegistryResult<T> = Result<T, RegistryError>;

/// Errors that can occur in module registry operations.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// A module with the same (plugin, module) key is already registered.
    #[error("module already registered: {plugin_id}/{module_id}")]
    AlreadyRegistered {
        plugin_id: String,
        module_id: String,
    },

    /// No such module.
    #[error("module not found: {plugin_id}/{module_id}")]
    NotFound {
        plugin_id: String,
        module_id: String,
    },
}

/// Result type for page persistence operations.
pub type PersistenceResult<T> = Result<T, PersistenceError>;

/// Errors that can occur in page persistence operations.
#[derive(Debug, Error)]
pub enum PersistenceError {
    /// Page not found.
    #[error("page not found: {0}")]
    NotFound(String),

    /// Route slug already taken by another page.
    #[error("route conflict: {0}")]
    RouteConflict(String),

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Backend/transport failure.
    #[error("backend error: {0}")]
    Backend(String),
}
