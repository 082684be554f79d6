//! Format converters.
//!
//! The canonical internal model is `Layouts` + the `modules` map; two other
//! shapes exist only at the boundaries:
//! - the legacy `GridItem` surface older UI code still reads, and
//! - the unified renderer format ([`PageData`]/[`ResponsiveLayouts`]).
//!
//! Converted unified items embed `_originalItem`/`_originalModule` round-trip
//! references so the reverse conversion restores fields the unified shape
//! does not model (`minW`, legacy hints). Internal bookkeeping keys are
//! stripped before any config reaches persisted plugin configuration.

use serde::{Deserialize, Serialize};
use studio_model::{
    ConfigMap, GridItem, LayoutItem, Layouts, ModuleMap, Page, PageData, ResponsiveLayouts,
    UnifiedLayoutItem, UnifiedModule,
};
use studio_types::{DeviceType, InstanceId};
use tracing::{debug, warn};

/// Bookkeeping keys that must never leak into stored plugin configuration.
const INTERNAL_KEYS: [&str; 4] = [
    "_originalItem",
    "_pluginStudioItem",
    "_originalModule",
    "_legacy",
];

/// Diagnostics from the unified-format reverse conversion. The silent
/// fallback paths of the old implementation are observable here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum ConvertWarning {
    /// The unified item carried no usable round-trip reference; a fresh item
    /// was synthesized from the unified geometry alone.
    SynthesizedItem { instance: InstanceId },
    /// The round-trip reference was present but did not parse.
    MalformedOriginalItem { instance: InstanceId },
}

/// Strips internal bookkeeping keys from a config payload.
#[must_use]
pub fn sanitize_config(config: &ConfigMap) -> ConfigMap {
    config
        .iter()
        .filter(|(key, _)| !INTERNAL_KEYS.contains(&key.as_str()))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect()
}

/// Converts a page and its canonical layouts into the unified renderer
/// format. `wide`/`ultrawide` breakpoints default to a copy of `desktop`.
#[must_use]
pub fn to_unified(page: &Page, layouts: &Layouts) -> PageData {
    let convert_device = |device: DeviceType| -> Vec<UnifiedLayoutItem> {
        layouts
            .device(device)
            .iter()
            .map(|item| to_unified_item(item, &page.modules))
            .collect()
    };

    let desktop = convert_device(DeviceType::Desktop);
    let responsive = ResponsiveLayouts {
        wide: desktop.clone(),
        ultrawide: desktop.clone(),
        desktop,
        tablet: convert_device(DeviceType::Tablet),
        mobile: convert_device(DeviceType::Mobile),
    };

    let modules = page
        .modules
        .iter()
        .map(|(id, module)| UnifiedModule {
            id: id.as_str().to_string(),
            plugin_id: module.plugin_id.clone(),
            module_id: module.module_id.clone(),
            name: module.module_name.clone(),
            config: sanitize_config(&module.config),
        })
        .collect();

    PageData {
        id: page.id.to_string(),
        name: page.name.clone(),
        route: page.route.clone(),
        description: page.description.clone(),
        is_published: page.is_published,
        layouts: responsive,
        modules,
    }
}

fn to_unified_item(item: &LayoutItem, modules: &ModuleMap) -> UnifiedLayoutItem {
    let module = modules.get(&item.i);
    let config = match module {
        Some(m) => sanitize_config(&m.merged_config(item.config_overrides.as_ref())),
        None => {
            warn!(instance = %item.i, "Layout item has no module entry; converting with overrides only");
            item.config_overrides
                .as_ref()
                .map(sanitize_config)
                .unwrap_or_default()
        }
    };

    UnifiedLayoutItem {
        module_id: item.i.as_str().to_string(),
        x: item.x,
        y: item.y,
        w: item.w,
        h: item.h,
        min_w: item.min_w,
        min_h: item.min_h,
        max_w: item.max_w,
        max_h: item.max_h,
        config,
        original_item: serde_json::to_value(item).ok(),
        original_module: module.and_then(|m| serde_json::to_value(m).ok()),
    }
}

/// Converts a unified layout record back to the canonical three-device shape.
///
/// Items carrying an `_originalItem` reference are restored from it, with
/// only geometry overlaid from the unified item — legacy-only fields survive.
/// Items that originated purely in the unified system are synthesized fresh
/// and reported in the warning list.
#[must_use]
pub fn from_unified(responsive: &ResponsiveLayouts) -> (Layouts, Vec<ConvertWarning>) {
    let mut warnings = Vec::new();
    let mut layouts = Layouts::default();

    for device in DeviceType::ALL {
        let source = match device {
            DeviceType::Desktop => &responsive.desktop,
            DeviceType::Tablet => &responsive.tablet,
            DeviceType::Mobile => &responsive.mobile,
        };
        let mut seen = std::collections::HashSet::new();
        for unified in source {
            let item = from_unified_item(unified, &mut warnings);
            if !seen.insert(item.i.clone()) {
                debug!(device = %device, id = %item.i, "Dropping duplicate unified item");
                continue;
            }
            layouts.device_mut(device).push(item);
        }
    }

    (layouts, warnings)
}

fn from_unified_item(unified: &UnifiedLayoutItem, warnings: &mut Vec<ConvertWarning>) -> LayoutItem {
    let sanitized = sanitize_config(&unified.config);

    if let Some(original) = &unified.original_item {
        match serde_json::from_value::<LayoutItem>(original.clone()) {
            Ok(mut restored) => {
                restored.x = unified.x;
                restored.y = unified.y;
                restored.w = unified.w;
                restored.h = unified.h;
                if unified.min_w.is_some() {
                    restored.min_w = unified.min_w;
                }
                if unified.min_h.is_some() {
                    restored.min_h = unified.min_h;
                }
                if unified.max_w.is_some() {
                    restored.max_w = unified.max_w;
                }
                if unified.max_h.is_some() {
                    restored.max_h = unified.max_h;
                }
                if !sanitized.is_empty() {
                    restored.config_overrides = Some(sanitized);
                }
                return restored;
            }
            Err(err) => {
                warn!(instance = %unified.module_id, %err, "Malformed _originalItem reference; synthesizing");
                warnings.push(ConvertWarning::MalformedOriginalItem {
                    instance: InstanceId::from(unified.module_id.as_str()),
                });
            }
        }
    } else {
        warnings.push(ConvertWarning::SynthesizedItem {
            instance: InstanceId::from(unified.module_id.as_str()),
        });
    }

    let mut item = LayoutItem::new(
        InstanceId::from(unified.module_id.as_str()),
        unified.x,
        unified.y,
        unified.w,
        unified.h,
    );
    item.min_w = unified.min_w;
    item.min_h = unified.min_h;
    item.max_w = unified.max_w;
    item.max_h = unified.max_h;
    if !sanitized.is_empty() {
        item.config_overrides = Some(sanitized);
    }
    item
}

/// Rebuilds the persistence-shape module map from a unified module array.
#[must_use]
pub fn modules_from_unified(modules: &[UnifiedModule]) -> ModuleMap {
    modules
        .iter()
        .map(|m| {
            let mut definition = studio_model::ModuleDefinition::new(
                m.plugin_id.clone(),
                m.module_id.clone(),
                m.name.clone(),
            );
            definition.config = sanitize_config(&m.config);
            (InstanceId::from(m.id.as_str()), definition)
        })
        .collect()
}

/// Maps a legacy grid item into the canonical shape.
#[must_use]
pub fn grid_to_layout_item(grid: &GridItem) -> LayoutItem {
    let mut item = LayoutItem::new(grid.i.clone(), grid.x, grid.y, grid.w, grid.h);
    item.min_w = grid.min_w;
    item.min_h = grid.min_h;
    item.module_unique_id = Some(grid.module_unique_id.clone());
    item.plugin_id = Some(grid.plugin_id.clone());
    if !grid.args.is_empty() {
        item.config_overrides = Some(sanitize_config(&grid.args));
    }
    item
}

/// Maps a canonical item onto the legacy grid surface. `args` carries the
/// module's merged config; unresolvable items degrade to the `unknown`
/// placeholder plugin.
#[must_use]
pub fn layout_item_to_grid(item: &LayoutItem, modules: &ModuleMap) -> GridItem {
    let module = modules.get(&item.i);
    let plugin_id = item
        .plugin_id
        .clone()
        .or_else(|| module.map(|m| m.plugin_id.clone()))
        .or_else(|| item.i.infer_plugin_parts().map(|(p, _)| p.to_string()))
        .unwrap_or_else(|| {
            warn!(instance = %item.i, "No plugin resolvable for legacy grid item");
            "unknown".to_string()
        });

    let args = match module {
        Some(m) => sanitize_config(&m.merged_config(item.config_overrides.as_ref())),
        None => item
            .config_overrides
            .as_ref()
            .map(sanitize_config)
            .unwrap_or_default(),
    };

    GridItem {
        i: item.i.clone(),
        x: item.x,
        y: item.y,
        w: item.w,
        h: item.h,
        min_w: item.min_w,
        min_h: item.min_h,
        plugin_id,
        module_unique_id: item
            .module_unique_id
            .clone()
            .unwrap_or_else(|| item.i.clone()),
        args,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use studio_model::ModuleDefinition;

    fn page_with_item() -> (Page, Layouts) {
        let mut page = Page::local("Dash", "dash");
        let id = InstanceId::from("charts_line_1");
        let mut module = ModuleDefinition::new("charts", "line", "Line Chart");
        module.config.insert("title".into(), serde_json::json!("hi"));
        page.modules.insert(id.clone(), module);

        let mut layouts = Layouts::default();
        let mut item = LayoutItem::new(id, 2, 1, 6, 4);
        item.min_w = Some(2);
        layouts.desktop.push(item);
        (page, layouts)
    }

    #[test]
    fn wide_breakpoints_copy_desktop() {
        let (page, layouts) = page_with_item();
        let unified = to_unified(&page, &layouts);
        assert_eq!(unified.layouts.wide, unified.layouts.desktop);
        assert_eq!(unified.layouts.ultrawide, unified.layouts.desktop);
    }

    #[test]
    fn round_trip_restores_legacy_only_fields() {
        let (page, layouts) = page_with_item();
        let unified = to_unified(&page, &layouts);
        let (restored, warnings) = from_unified(&unified.layouts);

        assert!(warnings.is_empty());
        let item = &restored.desktop[0];
        assert_eq!((item.x, item.y, item.w, item.h), (2, 1, 6, 4));
        assert_eq!(item.min_w, Some(2));
        assert_eq!(item.module_unique_id, None);
    }

    #[test]
    fn geometry_overlay_beats_stale_reference() {
        let (page, layouts) = page_with_item();
        let mut unified = to_unified(&page, &layouts);
        // Renderer moved the item after conversion.
        unified.layouts.desktop[0].x = 9;
        unified.layouts.desktop[0].w = 3;

        let (restored, _) = from_unified(&unified.layouts);
        assert_eq!(restored.desktop[0].x, 9);
        assert_eq!(restored.desktop[0].w, 3);
    }

    #[test]
    fn internal_keys_never_reach_config() {
        let mut config = ConfigMap::new();
        config.insert("_originalItem".into(), serde_json::json!({}));
        config.insert("_pluginStudioItem".into(), serde_json::json!(true));
        config.insert("_originalModule".into(), serde_json::json!({}));
        config.insert("_legacy".into(), serde_json::json!(1));
        config.insert("title".into(), serde_json::json!("keep"));

        let sanitized = sanitize_config(&config);
        assert_eq!(sanitized.len(), 1);
        assert_eq!(sanitized.get("title"), Some(&serde_json::json!("keep")));
    }

    #[test]
    fn unified_only_items_are_synthesized_with_warning() {
        let mut responsive = ResponsiveLayouts::default();
        let mut config = ConfigMap::new();
        config.insert("label".into(), serde_json::json!("new"));
        responsive.desktop.push(UnifiedLayoutItem {
            module_id: "fresh_widget_1".into(),
            x: 1,
            y: 2,
            w: 3,
            h: 4,
            config,
            ..Default::default()
        });

        let (layouts, warnings) = from_unified(&responsive);
        let item = &layouts.desktop[0];
        assert_eq!(item.i.as_str(), "fresh_widget_1");
        assert_eq!(
            item.config_overrides.as_ref().unwrap().get("label"),
            Some(&serde_json::json!("new"))
        );
        assert_eq!(
            warnings,
            vec![ConvertWarning::SynthesizedItem {
                instance: InstanceId::from("fresh_widget_1")
            }]
        );
    }

    #[test]
    fn grid_round_trip_keeps_identity_and_args() {
        let mut args = ConfigMap::new();
        args.insert("title".into(), serde_json::json!("legacy"));
        let grid = GridItem {
            i: InstanceId::from("charts_line_1"),
            x: 0,
            y: 0,
            w: 4,
            h: 3,
            min_w: Some(2),
            min_h: None,
            plugin_id: "charts".into(),
            module_unique_id: InstanceId::from("charts_line_1"),
            args,
        };

        let item = grid_to_layout_item(&grid);
        assert_eq!(item.plugin_id.as_deref(), Some("charts"));

        let mut modules = ModuleMap::new();
        modules.insert(
            grid.i.clone(),
            ModuleDefinition::new("charts", "line", "Line"),
        );
        let back = layout_item_to_grid(&item, &modules);
        assert_eq!(back.i, grid.i);
        assert_eq!(back.plugin_id, "charts");
        assert_eq!(back.module_unique_id, grid.module_unique_id);
        assert_eq!(back.args.get("title"), Some(&serde_json::json!("legacy")));
    }
}
