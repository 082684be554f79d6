//! Responsive breakpoints and their column grids.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A device breakpoint with its own layout array in a page.
///
/// These three are the persisted breakpoints; the unified renderer's extra
/// breakpoints ([`Breakpoint::Wide`], [`Breakpoint::Ultrawide`]) are derived
/// views over [`DeviceType::Desktop`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceType {
    Desktop,
    Tablet,
    Mobile,
}

impl DeviceType {
    /// All persisted device types, in sync-visit order.
    pub const ALL: [DeviceType; 3] = [DeviceType::Desktop, DeviceType::Tablet, DeviceType::Mobile];

    /// The key used in persisted JSON for this device's layout array.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            DeviceType::Desktop => "desktop",
            DeviceType::Tablet => "tablet",
            DeviceType::Mobile => "mobile",
        }
    }
}

impl fmt::Display for DeviceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Renderer-facing breakpoints. `wide`/`ultrawide` have no persisted layout
/// of their own and fall back to the desktop arrangement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Breakpoint {
    Desktop,
    Tablet,
    Mobile,
    Wide,
    Ultrawide,
}

impl Breakpoint {
    /// The persisted device this breakpoint reads its layout from.
    #[must_use]
    pub fn source_device(&self) -> DeviceType {
        match self {
            Breakpoint::Desktop | Breakpoint::Wide | Breakpoint::Ultrawide => DeviceType::Desktop,
            Breakpoint::Tablet => DeviceType::Tablet,
            Breakpoint::Mobile => DeviceType::Mobile,
        }
    }
}

/// Grid column counts per device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnCounts {
    pub desktop: u32,
    pub tablet: u32,
    pub mobile: u32,
}

impl ColumnCounts {
    /// Columns for the given device.
    #[must_use]
    pub fn for_device(&self, device: DeviceType) -> u32 {
        match device {
            DeviceType::Desktop => self.desktop,
            DeviceType::Tablet => self.tablet,
            DeviceType::Mobile => self.mobile,
        }
    }
}

impl Default for ColumnCounts {
    fn default() -> Self {
        Self {
            desktop: 12,
            tablet: 8,
            mobile: 4,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn device_keys_match_wire_contract() {
        assert_eq!(DeviceType::Desktop.as_str(), "desktop");
        assert_eq!(
            serde_json::to_string(&DeviceType::Tablet).unwrap(),
            "\"tablet\""
        );
    }

    #[test]
    fn wide_breakpoints_fall_back_to_desktop() {
        assert_eq!(Breakpoint::Wide.source_device(), DeviceType::Desktop);
        assert_eq!(Breakpoint::Ultrawide.source_device(), DeviceType::Desktop);
        assert_eq!(Breakpoint::Mobile.source_device(), DeviceType::Mobile);
    }
}
