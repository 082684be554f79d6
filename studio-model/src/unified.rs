//! Unified renderer format.
//!
//! The shared page-rendering component consumes this shape instead of the
//! studio's own persistence shape: five breakpoints instead of three, and
//! modules as a self-describing array instead of a map. Converted items carry
//! `_originalItem`/`_originalModule` round-trip references so the reverse
//! conversion can restore fields this shape does not model.

use crate::ConfigMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One layout item in the unified shape.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnifiedLayoutItem {
    /// Instance id of the module this item renders.
    pub module_id: String,
    pub x: u32,
    pub y: u32,
    pub w: u32,
    pub h: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_w: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_h: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_w: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_h: Option<u32>,
    /// Module global config overlaid with this item's device overrides.
    #[serde(default)]
    pub config: ConfigMap,
    /// Round-trip reference: the source item, verbatim. Internal bookkeeping;
    /// must never leak into persisted plugin config.
    #[serde(
        rename = "_originalItem",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub original_item: Option<Value>,
    /// Round-trip reference: the resolved module definition.
    #[serde(
        rename = "_originalModule",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub original_module: Option<Value>,
}

/// A module entry in the unified shape — self-describing, unlike the map
/// entries of the persistence shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnifiedModule {
    /// Instance id (the key in the persistence shape's `modules` map).
    pub id: String,
    pub plugin_id: String,
    pub module_id: String,
    pub name: String,
    #[serde(default)]
    pub config: ConfigMap,
}

/// Five-breakpoint layout record. `wide`/`ultrawide` are copies of `desktop`
/// when produced by conversion.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResponsiveLayouts {
    #[serde(default)]
    pub desktop: Vec<UnifiedLayoutItem>,
    #[serde(default)]
    pub tablet: Vec<UnifiedLayoutItem>,
    #[serde(default)]
    pub mobile: Vec<UnifiedLayoutItem>,
    #[serde(default)]
    pub wide: Vec<UnifiedLayoutItem>,
    #[serde(default)]
    pub ultrawide: Vec<UnifiedLayoutItem>,
}

/// A full page in the unified renderer format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageData {
    pub id: String,
    pub name: String,
    pub route: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub is_published: bool,
    #[serde(default)]
    pub layouts: ResponsiveLayouts,
    #[serde(default)]
    pub modules: Vec<UnifiedModule>,
}
