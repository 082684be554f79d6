//! Identifier types used throughout the Plugin Studio core.
//!
//! Page ids use UUID v7 for time-ordered, globally unique identifiers.
//! Module instance ids are structured strings (`{pluginId}_{moduleId}_{ts}`)
//! for backward compatibility with already-persisted pages.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Unique identifier for a page.
/// Uses UUID v7 which embeds a timestamp for natural ordering.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PageId(String);

impl PageId {
    /// Creates a new page ID with the current timestamp.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::now_v7().to_string())
    }

    /// Wraps an existing identifier string (backend-assigned ids are opaque).
    pub fn from_string(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for PageId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for PageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for PageId {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.to_string()))
    }
}

/// Identifier of one placed module instance on the canvas.
///
/// The same value keys both the layout entries (`LayoutItem.i`) and the
/// page's `modules` map. Freshly dropped instances are minted as
/// `{pluginId}_{moduleId}_{timestamp_ms}`; ids loaded from stored pages may
/// follow any convention, so parsing is best-effort.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InstanceId(String);

impl InstanceId {
    /// Mints a fresh instance id for a dropped module.
    #[must_use]
    pub fn mint(plugin_id: &str, module_id: &str, now_ms: u64) -> Self {
        Self(format!("{plugin_id}_{module_id}_{now_ms}"))
    }

    /// Wraps an existing identifier string.
    pub fn from_string(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Attempts to recover `(plugin_id, module_id)` from the id's naming
    /// convention. Requires at least three `_`-separated segments with a
    /// numeric timestamp tail; returns `None` for free-form ids.
    #[must_use]
    pub fn infer_plugin_parts(&self) -> Option<(&str, &str)> {
        let parts: Vec<&str> = self.0.split('_').collect();
        if parts.len() < 3 {
            return None;
        }
        let tail = parts[parts.len() - 1];
        if tail.is_empty() || !tail.chars().all(|c| c.is_ascii_digit()) {
            return None;
        }
        Some((parts[0], parts[1]))
    }
}

impl fmt::Display for InstanceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for InstanceId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for InstanceId {
    fn from(s: String) -> Self {
        Self(s)
    }
}
