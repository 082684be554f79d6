//! Core page model for Plugin Studio.
//!
//! Defines the canonical data shapes the layout engine operates on:
//! - [`Page`] / [`PageContent`] — the routed document and its persisted mirror
//! - [`ModuleDefinition`] — one placed plugin module instance
//! - [`LayoutItem`] / [`Layouts`] / [`RawLayouts`] — per-device grid geometry
//! - [`PageData`] / [`ResponsiveLayouts`] — the unified renderer format
//!
//! The canonical internal model is `Layouts` + the `modules` map; the legacy
//! `GridItem` surface and the unified renderer shape exist only at the two
//! conversion boundaries.

mod layout;
mod module;
mod page;
mod unified;

pub use layout::{GridItem, LayoutItem, Layouts, RawLayoutItem, RawLayouts};
pub use module::ModuleDefinition;
pub use page::{Page, PageContent};
pub use unified::{PageData, ResponsiveLayouts, UnifiedLayoutItem, UnifiedModule};

/// Keys mapping module instance ids to their definitions.
pub type ModuleMap = std::collections::BTreeMap<studio_types::InstanceId, ModuleDefinition>;

/// Arbitrary JSON config payload (plugin-defined structure).
pub type ConfigMap = serde_json::Map<String, serde_json::Value>;
