//! Module registry synchronization.
//!
//! Derives the page's `modules` map from its device layouts: every placed
//! instance gets exactly one entry, orphaned entries are dropped, and new
//! instances are seeded from plugin-declared defaults. This is the function
//! that keeps the modules/layouts consistency invariant true.

use crate::convert::sanitize_config;
use serde::{Deserialize, Serialize};
use studio_model::{LayoutItem, Layouts, ModuleDefinition, ModuleMap};
use studio_registry::ModuleRegistry;
use studio_types::InstanceId;
use tracing::{debug, warn};

/// Diagnostics emitted while syncing. Heuristic fallbacks are reported as
/// values so callers can surface them instead of scraping logs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum SyncWarning {
    /// The plugin id was recovered from the instance-id naming convention.
    PluginIdInferred {
        instance: InstanceId,
        plugin_id: String,
        module_id: String,
    },
    /// No plugin id could be resolved; the module degraded to the `unknown`
    /// placeholder.
    UnresolvedModule { instance: InstanceId },
}

/// Result of one synchronization pass.
#[derive(Debug, Clone)]
pub struct SyncOutcome {
    /// The derived module map — exactly one entry per placed instance.
    pub modules: ModuleMap,
    /// Whether the map differs structurally from the previous one. Callers
    /// skip downstream state updates when false.
    pub changed: bool,
    pub warnings: Vec<SyncWarning>,
}

/// Synchronizes the module map against the given layouts.
///
/// Visits every item across all devices once per unique identifier — first
/// occurrence wins, so cross-device duplicates of the same instance share one
/// entry. Config merges as previous-then-item (item wins); newly seen modules
/// seed plugin defaults first. Pure: the caller commits the result.
#[must_use]
pub fn sync_modules(
    layouts: &Layouts,
    existing: &ModuleMap,
    registry: &ModuleRegistry,
) -> SyncOutcome {
    let mut modules = ModuleMap::new();
    let mut warnings = Vec::new();

    for (device, item) in layouts.iter_all() {
        if modules.contains_key(&item.i) {
            continue;
        }
        let definition = build_definition(item, existing.get(&item.i), registry, &mut warnings);
        debug!(device = %device, instance = %item.i, plugin = %definition.plugin_id, "Synced module entry");
        modules.insert(item.i.clone(), definition);
    }

    let changed = !maps_equal(existing, &modules);
    SyncOutcome {
        modules,
        changed,
        warnings,
    }
}

fn build_definition(
    item: &LayoutItem,
    previous: Option<&ModuleDefinition>,
    registry: &ModuleRegistry,
    warnings: &mut Vec<SyncWarning>,
) -> ModuleDefinition {
    let (plugin_id, module_id) = resolve_plugin(item, previous, warnings);

    let mut definition = match previous {
        Some(prev) => prev.clone(),
        None => {
            // Newly seen instance: seed plugin-declared defaults.
            let mut fresh = ModuleDefinition::new(&plugin_id, &module_id, &module_id);
            if let Some(spec) = registry.get_module(&plugin_id, &module_id) {
                fresh.config = spec.default_config();
                if let Some(name) = spec.display_name() {
                    fresh.module_name = name.to_string();
                }
            }
            fresh
        }
    };
    definition.plugin_id = plugin_id;
    definition.module_id = module_id;

    // Item config wins over whatever was there before.
    if let Some(overrides) = &item.config_overrides {
        for (key, value) in sanitize_config(overrides) {
            definition.config.insert(key, value);
        }
    }
    definition
}

fn resolve_plugin(
    item: &LayoutItem,
    previous: Option<&ModuleDefinition>,
    warnings: &mut Vec<SyncWarning>,
) -> (String, String) {
    // An existing definition is authoritative unless it is the placeholder.
    if let Some(prev) = previous {
        if prev.plugin_id != "unknown" {
            return (prev.plugin_id.clone(), prev.module_id.clone());
        }
    }

    // Next the item's own hints.
    if let Some(plugin_id) = item.plugin_id.clone().filter(|s| !s.is_empty()) {
        let module_id = item
            .module_id
            .clone()
            .filter(|s| !s.is_empty())
            .or_else(|| item.i.infer_plugin_parts().map(|(_, m)| m.to_string()))
            .unwrap_or_else(|| plugin_id.clone());
        return (plugin_id, module_id);
    }

    // Then the config payload.
    if let Some(config) = &item.config_overrides {
        if let Some(plugin_id) = config.get("pluginId").and_then(|v| v.as_str()) {
            let module_id = config
                .get("moduleId")
                .and_then(|v| v.as_str())
                .unwrap_or(plugin_id);
            return (plugin_id.to_string(), module_id.to_string());
        }
    }

    // Last resort: the minted naming convention.
    if let Some((plugin_id, module_id)) = item.i.infer_plugin_parts() {
        warnings.push(SyncWarning::PluginIdInferred {
            instance: item.i.clone(),
            plugin_id: plugin_id.to_string(),
            module_id: module_id.to_string(),
        });
        debug!(instance = %item.i, plugin_id, "Inferred plugin id from instance naming");
        return (plugin_id.to_string(), module_id.to_string());
    }

    warn!(instance = %item.i, "Could not resolve plugin for layout item; using placeholder");
    warnings.push(SyncWarning::UnresolvedModule {
        instance: item.i.clone(),
    });
    ("unknown".to_string(), "unknown".to_string())
}

// Structural equality via stable-order serialization; BTreeMap keys make the
// output deterministic.
fn maps_equal(a: &ModuleMap, b: &ModuleMap) -> bool {
    match (serde_json::to_string(a), serde_json::to_string(b)) {
        (Ok(sa), Ok(sb)) => sa == sb,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use studio_model::ConfigMap;
    use studio_registry::{ConfigField, ModuleSpec};

    fn registry_with_line_chart() -> ModuleRegistry {
        let mut registry = ModuleRegistry::new();
        let mut spec = ModuleSpec::default();
        spec.display_name = Some("Line Chart".into());
        spec.config_fields.insert(
            "title".into(),
            ConfigField {
                default: Some(serde_json::json!("Untitled")),
                label: None,
            },
        );
        registry.register("charts", "line", spec).unwrap();
        registry
    }

    fn item(id: &str) -> LayoutItem {
        LayoutItem::new(InstanceId::from(id), 0, 0, 2, 2)
    }

    #[test]
    fn new_instance_seeds_registry_defaults() {
        let registry = registry_with_line_chart();
        let mut layouts = Layouts::default();
        layouts.desktop.push(item("charts_line_1700000000000"));

        let outcome = sync_modules(&layouts, &ModuleMap::new(), &registry);
        let module = &outcome.modules[&InstanceId::from("charts_line_1700000000000")];
        assert_eq!(module.plugin_id, "charts");
        assert_eq!(module.module_id, "line");
        assert_eq!(module.module_name, "Line Chart");
        assert_eq!(module.config.get("title"), Some(&serde_json::json!("Untitled")));
        assert!(outcome.changed);
        // Resolution went through the naming heuristic and says so.
        assert!(matches!(
            outcome.warnings[0],
            SyncWarning::PluginIdInferred { .. }
        ));
    }

    #[test]
    fn cross_device_duplicates_share_one_entry() {
        let registry = registry_with_line_chart();
        let mut layouts = Layouts::default();
        let mut desktop_item = item("charts_line_1");
        desktop_item.plugin_id = Some("charts".into());
        desktop_item.module_id = Some("line".into());
        layouts.desktop.push(desktop_item);
        layouts.tablet.push(item("charts_line_1"));
        layouts.mobile.push(item("charts_line_1"));

        let outcome = sync_modules(&layouts, &ModuleMap::new(), &registry);
        assert_eq!(outcome.modules.len(), 1);
        // First occurrence (desktop, with hints) won.
        assert_eq!(
            outcome.modules[&InstanceId::from("charts_line_1")].plugin_id,
            "charts"
        );
    }

    #[test]
    fn item_config_wins_over_previous() {
        let registry = ModuleRegistry::new();
        let id = InstanceId::from("charts_line_1");
        let mut existing = ModuleMap::new();
        let mut prev = ModuleDefinition::new("charts", "line", "Line");
        prev.config.insert("title".into(), serde_json::json!("old"));
        prev.config.insert("legend".into(), serde_json::json!(true));
        existing.insert(id.clone(), prev);

        let mut layouts = Layouts::default();
        let mut placed = item("charts_line_1");
        let mut overrides = ConfigMap::new();
        overrides.insert("title".into(), serde_json::json!("new"));
        placed.config_overrides = Some(overrides);
        layouts.desktop.push(placed);

        let outcome = sync_modules(&layouts, &existing, &registry);
        let module = &outcome.modules[&id];
        assert_eq!(module.config.get("title"), Some(&serde_json::json!("new")));
        assert_eq!(module.config.get("legend"), Some(&serde_json::json!(true)));
        assert!(outcome.changed);
    }

    #[test]
    fn unchanged_layouts_report_no_change() {
        let registry = ModuleRegistry::new();
        let id = InstanceId::from("charts_line_1");
        let mut existing = ModuleMap::new();
        existing.insert(id.clone(), ModuleDefinition::new("charts", "line", "Line"));

        let mut layouts = Layouts::default();
        layouts.desktop.push(item("charts_line_1"));

        let outcome = sync_modules(&layouts, &existing, &registry);
        assert!(!outcome.changed);
        assert_eq!(outcome.modules, existing);
    }

    #[test]
    fn orphaned_modules_are_dropped() {
        let registry = ModuleRegistry::new();
        let mut existing = ModuleMap::new();
        existing.insert(
            InstanceId::from("gone_widget_1"),
            ModuleDefinition::new("gone", "widget", "Gone"),
        );

        let outcome = sync_modules(&Layouts::default(), &existing, &registry);
        assert!(outcome.modules.is_empty());
        assert!(outcome.changed);
    }

    #[test]
    fn unresolvable_item_degrades_to_placeholder_with_warning() {
        let registry = ModuleRegistry::new();
        let mut layouts = Layouts::default();
        layouts.desktop.push(item("freeform"));

        let outcome = sync_modules(&layouts, &ModuleMap::new(), &registry);
        let module = &outcome.modules[&InstanceId::from("freeform")];
        assert_eq!(module.plugin_id, "unknown");
        assert_eq!(
            outcome.warnings,
            vec![SyncWarning::UnresolvedModule {
                instance: InstanceId::from("freeform")
            }]
        );
    }

    #[test]
    fn config_payload_plugin_hint_is_used() {
        let registry = ModuleRegistry::new();
        let mut layouts = Layouts::default();
        let mut placed = item("freeform");
        let mut overrides = ConfigMap::new();
        overrides.insert("pluginId".into(), serde_json::json!("charts"));
        overrides.insert("moduleId".into(), serde_json::json!("bar"));
        placed.config_overrides = Some(overrides);
        layouts.desktop.push(placed);

        let outcome = sync_modules(&layouts, &ModuleMap::new(), &registry);
        let module = &outcome.modules[&InstanceId::from("freeform")];
        assert_eq!(module.plugin_id, "charts");
        assert_eq!(module.module_id, "bar");
        assert!(outcome.warnings.is_empty());
    }
}
