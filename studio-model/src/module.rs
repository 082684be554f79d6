//! Placed module instances.

use crate::ConfigMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use studio_types::DeviceType;

/// One placed instance of a plugin-provided UI module.
///
/// Owned by the page; keyed in the page's `modules` map by the same instance
/// id that identifies its grid entries. `config` is the merged global
/// configuration (plugin defaults + edits); device-specific forks live in
/// `layout_config` or in the layout item's `configOverrides`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModuleDefinition {
    pub plugin_id: String,
    pub module_id: String,
    pub module_name: String,
    #[serde(default)]
    pub config: ConfigMap,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub layout_config: Option<BTreeMap<DeviceType, ConfigMap>>,
}

impl ModuleDefinition {
    /// Creates a definition with an empty config.
    #[must_use]
    pub fn new(
        plugin_id: impl Into<String>,
        module_id: impl Into<String>,
        module_name: impl Into<String>,
    ) -> Self {
        Self {
            plugin_id: plugin_id.into(),
            module_id: module_id.into(),
            module_name: module_name.into(),
            config: ConfigMap::new(),
            layout_config: None,
        }
    }

    /// Placeholder for an item whose plugin could not be resolved. The
    /// rendering layer shows an inert error card for these.
    #[must_use]
    pub fn unknown(module_name: impl Into<String>) -> Self {
        Self::new("unknown", "unknown", module_name)
    }

    /// Overlays `overrides` onto this module's config (overrides win).
    #[must_use]
    pub fn merged_config(&self, overrides: Option<&ConfigMap>) -> ConfigMap {
        let mut merged = self.config.clone();
        if let Some(extra) = overrides {
            for (k, v) in extra {
                merged.insert(k.clone(), v.clone());
            }
        }
        merged
    }
}
