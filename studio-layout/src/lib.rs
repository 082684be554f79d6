//! Layout reconciliation engine for Plugin Studio.
//!
//! Maintains the canvas state of a page being edited: ingests raw grid events
//! from the drag library, validates and deduplicates them, keeps the page's
//! `modules` map consistent with its per-device layouts, and debounces the
//! durable page commit separately from the live UI state.
//!
//! # Architecture
//!
//! The engine is a deterministic state machine driven by the host's event
//! loop. All I/O stays outside: the persistence service is only reached
//! through the flush-then-save sequence in [`EditorSession`].
//!
//! ## Components
//!
//! - **Validate**: repairs malformed drag-library payloads ([`validate`])
//! - **Sync**: derives the module map from the layouts ([`sync_modules`])
//! - **Reconcile**: immediate vs. debounced application ([`LayoutReconciler`])
//! - **Persist**: debounced page-mirror commit with flush ([`PersistScheduler`])
//! - **Convert**: legacy and unified-renderer format boundaries
//! - **Copy**: explicit cross-device layout rescaling ([`copy_layout`])
//!
//! ## Event flow
//!
//! 1. The grid fires a layout change tagged with a [`ChangeOrigin`]
//! 2. User origins apply synchronously; everything else debounces ~120 ms
//! 3. Apply = validate → sync modules → commit live state
//! 4. The page mirror commit is itself debounced; `flush()` settles both
//!
//! [`ChangeOrigin`]: studio_types::ChangeOrigin

mod clock;
mod convert;
mod copy;
mod hash;
mod reconciler;
mod scheduler;
mod session;
mod sync_modules;
mod validate;

pub use clock::{Clock, ManualClock, SystemClock};
pub use convert::{
    from_unified, grid_to_layout_item, layout_item_to_grid, modules_from_unified, sanitize_config,
    to_unified, ConvertWarning,
};
pub use copy::copy_layout;
pub use hash::content_hash;
pub use reconciler::{ChangeOutcome, LayoutReconciler, ReconcilerConfig};
pub use scheduler::PersistScheduler;
pub use session::EditorSession;
pub use sync_modules::{sync_modules, SyncOutcome, SyncWarning};
pub use validate::validate;

/// Quiet window for both the apply debounce and the page-commit debounce.
pub const DEBOUNCE_WINDOW_MS: u64 = 120;
