//! External boundaries of the Plugin Studio layout core.
//!
//! Two collaborators live behind this crate:
//! - [`ModuleRegistry`] — plugin module lookup, used to seed default config
//!   for newly placed modules. Constructor-injected (never ambient module
//!   state) with an explicit changed-notification list so unit tests carry
//!   no import-order side effects.
//! - [`PagePersistence`] — the page CRUD service. The core only touches it
//!   through the flush-then-save sequence.

mod error;
mod module_registry;
mod persistence;

pub use error::{PersistenceError, PersistenceResult, RegistryError, RegistryResult};
pub use module_registry::{ConfigField, ModuleRegistry, ModuleSpec, RegistryEvent};
pub use persistence::{InMemoryPageService, NewPageInput, PagePersistence};
