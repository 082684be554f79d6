//! Per-device grid layouts.
//!
//! [`LayoutItem`] is the canonical persisted shape. [`RawLayoutItem`] is what
//! the drag library actually hands us — geometry may be missing or non-finite
//! and the identifier may be absent, so every field is optional and the
//! validator repairs it. [`GridItem`] is the legacy surface still read by
//! older UI code (`args` instead of `configOverrides`, mandatory
//! `moduleUniqueId`).

use crate::ConfigMap;
use serde::{Deserialize, Serialize};
use studio_types::{DeviceType, InstanceId};

/// One placed item in a device's grid.
///
/// Wire shape (camelCase):
/// `{ i, x, y, w, h, minW?, minH?, maxW?, maxH?, configOverrides? }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutItem {
    pub i: InstanceId,
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
    /// Legacy duplicate of `i`, kept for pages written by the old editor.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub module_unique_id: Option<InstanceId>,
    /// Plugin hint carried by items created from the legacy surface.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plugin_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub module_id: Option<String>,
    /// Device-specific config delta applied on top of the module's config.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config_overrides: Option<ConfigMap>,
}

impl LayoutItem {
    /// A fresh item at the given geometry.
    #[must_use]
    pub fn new(i: InstanceId, x: u32, y: u32, w: u32, h: u32) -> Self {
        Self {
            i,
            x,
            y,
            w,
            h,
            min_w: None,
            min_h: None,
            max_w: None,
            max_h: None,
            module_unique_id: None,
            plugin_id: None,
            module_id: None,
            config_overrides: None,
        }
    }
}

/// The three persisted device layouts. Array order carries no meaning; grid
/// positions are the placement.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Layouts {
    #[serde(default)]
    pub desktop: Vec<LayoutItem>,
    #[serde(default)]
    pub tablet: Vec<LayoutItem>,
    #[serde(default)]
    pub mobile: Vec<LayoutItem>,
}

impl Layouts {
    /// The layout array for a device.
    #[must_use]
    pub fn device(&self, device: DeviceType) -> &[LayoutItem] {
        match device {
            DeviceType::Desktop => &self.desktop,
            DeviceType::Tablet => &self.tablet,
            DeviceType::Mobile => &self.mobile,
        }
    }

    /// Mutable layout array for a device.
    pub fn device_mut(&mut self, device: DeviceType) -> &mut Vec<LayoutItem> {
        match device {
            DeviceType::Desktop => &mut self.desktop,
            DeviceType::Tablet => &mut self.tablet,
            DeviceType::Mobile => &mut self.mobile,
        }
    }

    /// Iterates every item across all devices, in sync-visit order.
    pub fn iter_all(&self) -> impl Iterator<Item = (DeviceType, &LayoutItem)> {
        DeviceType::ALL
            .into_iter()
            .flat_map(move |d| self.device(d).iter().map(move |item| (d, item)))
    }

    /// Every distinct instance id referenced by any device array.
    #[must_use]
    pub fn instance_ids(&self) -> std::collections::BTreeSet<InstanceId> {
        self.iter_all().map(|(_, item)| item.i.clone()).collect()
    }

    /// Removes every entry for an instance across all devices. Returns the
    /// number of entries removed.
    pub fn remove_instance(&mut self, id: &InstanceId) -> usize {
        let mut removed = 0;
        for device in DeviceType::ALL {
            let arr = self.device_mut(device);
            let before = arr.len();
            arr.retain(|item| item.i != *id);
            removed += before - arr.len();
        }
        removed
    }
}

/// Unvalidated layout payload as received from the drag library.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawLayoutItem {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub i: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub w: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub h: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_w: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_h: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_w: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_h: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub module_unique_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plugin_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub module_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config_overrides: Option<ConfigMap>,
}

impl From<&LayoutItem> for RawLayoutItem {
    fn from(item: &LayoutItem) -> Self {
        Self {
            i: Some(item.i.as_str().to_string()),
            x: Some(f64::from(item.x)),
            y: Some(f64::from(item.y)),
            w: Some(f64::from(item.w)),
            h: Some(f64::from(item.h)),
            min_w: item.min_w.map(f64::from),
            min_h: item.min_h.map(f64::from),
            max_w: item.max_w.map(f64::from),
            max_h: item.max_h.map(f64::from),
            module_unique_id: item
                .module_unique_id
                .as_ref()
                .map(|id| id.as_str().to_string()),
            plugin_id: item.plugin_id.clone(),
            module_id: item.module_id.clone(),
            config_overrides: item.config_overrides.clone(),
        }
    }
}

/// Unvalidated per-device payload.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawLayouts {
    #[serde(default)]
    pub desktop: Vec<RawLayoutItem>,
    #[serde(default)]
    pub tablet: Vec<RawLayoutItem>,
    #[serde(default)]
    pub mobile: Vec<RawLayoutItem>,
}

impl RawLayouts {
    /// The raw array for a device.
    #[must_use]
    pub fn device(&self, device: DeviceType) -> &[RawLayoutItem] {
        match device {
            DeviceType::Desktop => &self.desktop,
            DeviceType::Tablet => &self.tablet,
            DeviceType::Mobile => &self.mobile,
        }
    }

    /// Mutable raw array for a device.
    pub fn device_mut(&mut self, device: DeviceType) -> &mut Vec<RawLayoutItem> {
        match device {
            DeviceType::Desktop => &mut self.desktop,
            DeviceType::Tablet => &mut self.tablet,
            DeviceType::Mobile => &mut self.mobile,
        }
    }
}

impl From<&Layouts> for RawLayouts {
    fn from(layouts: &Layouts) -> Self {
        Self {
            desktop: layouts.desktop.iter().map(RawLayoutItem::from).collect(),
            tablet: layouts.tablet.iter().map(RawLayoutItem::from).collect(),
            mobile: layouts.mobile.iter().map(RawLayoutItem::from).collect(),
        }
    }
}

/// Legacy grid item read by older UI surfaces.
///
/// Differences from [`LayoutItem`]: `moduleUniqueId` is mandatory (and equals
/// `i`), per-item config lives in `args`, and `pluginId` is inline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GridItem {
    pub i: InstanceId,
    pub x: u32,
    pub y: u32,
    pub w: u32,
    pub h: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_w: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_h: Option<u32>,
    pub plugin_id: String,
    pub module_unique_id: InstanceId,
    #[serde(default)]
    pub args: ConfigMap,
}
