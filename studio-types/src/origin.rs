//! Origin tags for layout-change events.

use serde::{Deserialize, Serialize};

/// Classifies why a layout mutation occurred.
///
/// User gestures are authoritative and applied immediately; everything else
/// (programmatic rewrites, external sync) is debounced so rapid bursts
/// collapse to the most recent payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeOrigin {
    /// The user finished dragging an item.
    DragStop,
    /// The user finished resizing an item.
    ResizeStop,
    /// A module was dropped onto the canvas.
    DropAdd,
    /// Programmatic or external update (sync, import, script).
    External,
}

impl ChangeOrigin {
    /// Whether this origin takes the immediate (non-debounced) path.
    #[must_use]
    pub fn is_user_initiated(&self) -> bool {
        matches!(
            self,
            ChangeOrigin::DragStop | ChangeOrigin::ResizeStop | ChangeOrigin::DropAdd
        )
    }
}
