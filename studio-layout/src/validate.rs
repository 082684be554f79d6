//! Layout validation and normalization.
//!
//! Drag-library output is not always clean: geometry arrives as floats that
//! may be missing, NaN, or negative, identifiers can be absent, and the same
//! item occasionally appears twice in one array. This module repairs all of
//! that silently — the permissive policy is deliberate, there is no invalid
//! input, only input that needs fixing.

use studio_model::{LayoutItem, Layouts, RawLayoutItem, RawLayouts};
use studio_types::{ColumnCounts, DeviceType, InstanceId};
use tracing::debug;

const DEFAULT_SPAN: u32 = 2;

/// Validates a raw payload into a structurally sound [`Layouts`].
///
/// Per device array: deduplicates by identifier (first occurrence wins),
/// coerces `x,y` to 0 and `w,h` to 2 when not finite, clamps `w` to the
/// device's column count, and synthesizes `item_{x}_{y}_{w}_{h}` identifiers
/// when absent. Never mutates the input and never fails.
///
/// Id synthesis runs before dedup on purpose: two id-less items with the
/// same geometry get the same synthesized id and collapse to one, which is
/// the only way the uniqueness guarantee can hold for them at all.
#[must_use]
pub fn validate(raw: &RawLayouts, cols: &ColumnCounts) -> Layouts {
    let mut out = Layouts::default();
    for device in DeviceType::ALL {
        let max_w = cols.for_device(device);
        let mut seen = std::collections::HashSet::new();
        for raw_item in raw.device(device) {
            let item = normalize_item(raw_item, max_w);
            if !seen.insert(item.i.clone()) {
                debug!(device = %device, id = %item.i, "Dropping duplicate layout item");
                continue;
            }
            out.device_mut(device).push(item);
        }
    }
    out
}

fn normalize_item(raw: &RawLayoutItem, max_w: u32) -> LayoutItem {
    let x = coerce(raw.x, 0);
    let y = coerce(raw.y, 0);
    let w = coerce(raw.w, DEFAULT_SPAN).min(max_w).max(1);
    let h = coerce(raw.h, DEFAULT_SPAN).max(1);

    let id = raw
        .i
        .clone()
        .filter(|s| !s.is_empty())
        .or_else(|| raw.module_unique_id.clone().filter(|s| !s.is_empty()))
        .unwrap_or_else(|| format!("item_{x}_{y}_{w}_{h}"));

    let mut item = LayoutItem::new(InstanceId::from(id), x, y, w, h);
    item.min_w = raw.min_w.and_then(finite_u32);
    item.min_h = raw.min_h.and_then(finite_u32);
    item.max_w = raw.max_w.and_then(finite_u32);
    item.max_h = raw.max_h.and_then(finite_u32);
    item.module_unique_id = raw
        .module_unique_id
        .clone()
        .map(InstanceId::from)
        .or_else(|| Some(item.i.clone()));
    item.plugin_id = raw.plugin_id.clone();
    item.module_id = raw.module_id.clone();
    item.config_overrides = raw.config_overrides.clone();
    item
}

fn coerce(value: Option<f64>, default: u32) -> u32 {
    match value {
        Some(v) if v.is_finite() && v >= 0.0 => v as u32,
        Some(v) if v.is_finite() => 0,
        _ => default,
    }
}

fn finite_u32(value: f64) -> Option<u32> {
    if value.is_finite() && value >= 0.0 {
        Some(value as u32)
    } else {
        None
    }
}
