//! Explicit cross-device layout copying.
//!
//! One-shot, user-triggered transform — never runs as part of automatic
//! reconciliation or on viewport resize.

use studio_model::Layouts;
use studio_types::{ColumnCounts, DeviceType};
use tracing::debug;

const TABLET_MAX_X: u32 = 4;

/// Copies `from`'s layout into `to`'s column grid, proportionally rescaling
/// widths: `w' = min(floor(w * cols[to] / cols[from]), cols[to])`. Mobile
/// targets stack in a single column (`x = 0`), tablet clamps `x` to 4,
/// desktop keeps the original `x`. Heights copy unchanged.
#[must_use]
pub fn copy_layout(
    layouts: &Layouts,
    from: DeviceType,
    to: DeviceType,
    cols: &ColumnCounts,
) -> Layouts {
    let from_cols = cols.for_device(from).max(1);
    let to_cols = cols.for_device(to).max(1);

    let mut out = layouts.clone();
    let copied: Vec<_> = layouts
        .device(from)
        .iter()
        .map(|item| {
            let mut scaled = item.clone();
            let rescaled = (u64::from(item.w) * u64::from(to_cols)) / u64::from(from_cols);
            scaled.w = u32::try_from(rescaled).unwrap_or(u32::MAX).min(to_cols).max(1);
            scaled.x = match to {
                DeviceType::Mobile => 0,
                DeviceType::Tablet => item.x.min(TABLET_MAX_X),
                DeviceType::Desktop => item.x,
            };
            scaled
        })
        .collect();

    debug!(from = %from, to = %to, items = copied.len(), "Copied layout across devices");
    *out.device_mut(to) = copied;
    out
}
