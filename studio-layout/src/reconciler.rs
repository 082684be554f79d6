//! Layout change reconciler — the central state machine.
//!
//! Ingests raw layout-change events tagged with an origin. User gestures
//! (drag stop, resize stop, drop-add, or events with no origin metadata at
//! all) are authoritative: any pending debounced payload is canceled and the
//! event applies synchronously, guarded by a content hash so the duplicate
//! events drag libraries fire per gesture collapse to one commit.
//! Programmatic/external updates debounce for a quiet window; within the
//! window only the most recent payload survives.
//!
//! Applying always runs the same pipeline: validate → sync modules → commit
//! live state → schedule the page-mirror persistence (itself debounced, see
//! [`PersistScheduler`]). The engine does no I/O; `tick` is driven by the
//! host loop and all time comes from the injected [`Clock`].

use crate::clock::Clock;
use crate::copy::copy_layout;
use crate::hash::content_hash;
use crate::scheduler::PersistScheduler;
use crate::sync_modules::{sync_modules, SyncWarning};
use crate::validate::validate;
use crate::DEBOUNCE_WINDOW_MS;
use std::sync::Arc;
use studio_model::{ConfigMap, LayoutItem, Layouts, ModuleMap, Page, RawLayoutItem, RawLayouts};
use studio_registry::ModuleRegistry;
use studio_types::{ChangeOrigin, ColumnCounts, DeviceType, InstanceId};
use tracing::{debug, info, warn};

/// Tunables for the reconciler.
#[derive(Debug, Clone)]
pub struct ReconcilerConfig {
    /// Quiet window for debounced (non-user) layout changes and for the
    /// page-mirror commit.
    pub debounce_ms: u64,
    /// Column grid per device, used for validation clamps and drop placement.
    pub cols: ColumnCounts,
}

impl Default for ReconcilerConfig {
    fn default() -> Self {
        Self {
            debounce_ms: DEBOUNCE_WINDOW_MS,
            cols: ColumnCounts::default(),
        }
    }
}

/// What became of one ingested layout-change event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChangeOutcome {
    /// Applied synchronously; carries sync diagnostics.
    Committed { warnings: Vec<SyncWarning> },
    /// Identical to the last committed payload; dropped.
    Skipped,
    /// Stored as the pending debounced payload.
    Deferred,
}

struct PendingChange {
    raw: RawLayouts,
    hash: String,
    deadline_ms: u64,
}

/// The editing-session state machine for one page.
pub struct LayoutReconciler {
    config: ReconcilerConfig,
    clock: Arc<dyn Clock>,
    registry: Arc<ModuleRegistry>,
    page: Page,
    /// Live (synchronously updated) layout state — what the canvas renders.
    committed: Layouts,
    last_committed_hash: Option<String>,
    pending: Option<PendingChange>,
    scheduler: PersistScheduler,
}

impl LayoutReconciler {
    /// Starts an editing session over `page`.
    #[must_use]
    pub fn new(
        page: Page,
        registry: Arc<ModuleRegistry>,
        clock: Arc<dyn Clock>,
        config: ReconcilerConfig,
    ) -> Self {
        let committed = page.layouts.clone();
        let last_committed_hash = Some(content_hash(&RawLayouts::from(&committed)));
        let scheduler = PersistScheduler::new(config.debounce_ms);
        Self {
            config,
            clock,
            registry,
            page,
            committed,
            last_committed_hash,
            pending: None,
            scheduler,
        }
    }

    // ── Event ingestion ──────────────────────────────────────────

    /// Ingests one layout-change event. `None` origin is treated as a user
    /// action (the drag library does not always tag its events).
    pub fn handle_change(
        &mut self,
        raw: RawLayouts,
        origin: Option<ChangeOrigin>,
    ) -> ChangeOutcome {
        let now = self.clock.now_ms();
        let hash = content_hash(&raw);
        let immediate = origin.map_or(true, |o| o.is_user_initiated());

        if immediate {
            // User actions are authoritative: anything pending is stale.
            self.pending = None;
            if self.last_committed_hash.as_deref() == Some(hash.as_str()) {
                debug!(?origin, "Duplicate layout payload; skipping");
                return ChangeOutcome::Skipped;
            }
            let warnings = self.apply(&raw, hash, now);
            return ChangeOutcome::Committed { warnings };
        }

        debug!(?origin, deadline_ms = now + self.config.debounce_ms, "Layout change deferred");
        self.pending = Some(PendingChange {
            raw,
            hash,
            deadline_ms: now + self.config.debounce_ms,
        });
        ChangeOutcome::Deferred
    }

    /// Fires any due debounce timers. Returns true if anything committed.
    pub fn tick(&mut self) -> bool {
        let now = self.clock.now_ms();
        let mut committed = false;

        let due = self
            .pending
            .as_ref()
            .is_some_and(|p| now >= p.deadline_ms);
        if due {
            if let Some(pending) = self.pending.take() {
                if self.last_committed_hash.as_deref() == Some(pending.hash.as_str()) {
                    debug!("Debounced payload identical to committed state; discarding");
                } else {
                    self.apply(&pending.raw, pending.hash, now);
                    committed = true;
                }
            }
        }

        committed |= self.scheduler.tick(&mut self.page, now);
        committed
    }

    /// Forces all pending debounced state to settle now. After this returns,
    /// the page mirror reflects every ingested change; the save path calls
    /// this before touching the persistence service.
    pub fn flush(&mut self) {
        let now = self.clock.now_ms();
        if let Some(pending) = self.pending.take() {
            if self.last_committed_hash.as_deref() != Some(pending.hash.as_str()) {
                self.apply(&pending.raw, pending.hash, now);
            }
        }
        self.scheduler.flush(&mut self.page);
    }

    /// Drops all pending timers without committing (component teardown).
    pub fn teardown(&mut self) {
        self.pending = None;
        self.scheduler.cancel();
    }

    fn apply(&mut self, raw: &RawLayouts, hash: String, now_ms: u64) -> Vec<SyncWarning> {
        let layouts = validate(raw, &self.config.cols);
        let outcome = sync_modules(&layouts, &self.page.modules, &self.registry);

        self.committed = layouts.clone();
        self.page.layouts = layouts;
        if outcome.changed {
            self.page.modules = outcome.modules;
        }
        self.last_committed_hash = Some(hash);
        self.schedule_persist(now_ms);

        info!(
            items = self.committed.iter_all().count(),
            modules = self.page.modules.len(),
            warnings = outcome.warnings.len(),
            "Layout committed"
        );
        outcome.warnings
    }

    // ── Editing operations ───────────────────────────────────────

    /// Drops a new module instance onto the canvas. The item is placed at
    /// the bottom of every device layout with its width clamped to each
    /// device's columns. Returns the minted instance id.
    pub fn add_module(
        &mut self,
        plugin_id: &str,
        module_id: &str,
        w: u32,
        h: u32,
    ) -> (InstanceId, ChangeOutcome) {
        let now = self.clock.now_ms();
        let id = InstanceId::mint(plugin_id, module_id, now);

        let mut raw = RawLayouts::from(&self.committed);
        for device in DeviceType::ALL {
            let bottom = self
                .committed
                .device(device)
                .iter()
                .map(|item| item.y.saturating_add(item.h))
                .max()
                .unwrap_or(0);
            let device_w = w.min(self.config.cols.for_device(device)).max(1);
            raw.device_mut(device).push(RawLayoutItem {
                i: Some(id.as_str().to_string()),
                x: Some(0.0),
                y: Some(f64::from(bottom)),
                w: Some(f64::from(device_w)),
                h: Some(f64::from(h.max(1))),
                plugin_id: Some(plugin_id.to_string()),
                module_id: Some(module_id.to_string()),
                ..Default::default()
            });
        }

        let outcome = self.handle_change(raw, Some(ChangeOrigin::DropAdd));
        (id, outcome)
    }

    /// Removes an instance from every device layout; its module entry goes
    /// with it during sync.
    pub fn remove_module(&mut self, id: &InstanceId) -> ChangeOutcome {
        let mut next = self.committed.clone();
        if next.remove_instance(id) == 0 {
            debug!(instance = %id, "Remove requested for unplaced instance");
            return ChangeOutcome::Skipped;
        }
        self.handle_change(RawLayouts::from(&next), None)
    }

    /// Applies a drag-stop position for one item on one device.
    pub fn move_item(&mut self, device: DeviceType, id: &InstanceId, x: u32, y: u32) -> ChangeOutcome {
        let raw = self.with_item_updated(device, id, |item| {
            item.x = x;
            item.y = y;
        });
        self.handle_change(raw, Some(ChangeOrigin::DragStop))
    }

    /// Applies a resize-stop size for one item on one device.
    pub fn resize_item(
        &mut self,
        device: DeviceType,
        id: &InstanceId,
        w: u32,
        h: u32,
    ) -> ChangeOutcome {
        let raw = self.with_item_updated(device, id, |item| {
            item.w = w;
            item.h = h;
        });
        self.handle_change(raw, Some(ChangeOrigin::ResizeStop))
    }

    /// Merges `config` onto the module's global config (new values win) and
    /// schedules persistence. Returns false when the instance is unknown.
    pub fn update_module_config(&mut self, id: &InstanceId, config: ConfigMap) -> bool {
        let now = self.clock.now_ms();
        let Some(module) = self.page.modules.get_mut(id) else {
            warn!(instance = %id, "Config update for unknown module instance");
            return false;
        };
        for (key, value) in config {
            module.config.insert(key, value);
        }
        self.schedule_persist(now);
        true
    }

    /// Sets the device-specific config delta on one layout item.
    pub fn update_item_config_overrides(
        &mut self,
        device: DeviceType,
        id: &InstanceId,
        overrides: ConfigMap,
    ) -> bool {
        let now = self.clock.now_ms();
        let Some(item) = self
            .committed
            .device_mut(device)
            .iter_mut()
            .find(|item| item.i == *id)
        else {
            warn!(instance = %id, device = %device, "Override update for unplaced instance");
            return false;
        };
        item.config_overrides = if overrides.is_empty() {
            None
        } else {
            Some(overrides)
        };
        self.page.layouts = self.committed.clone();
        self.schedule_persist(now);
        true
    }

    fn schedule_persist(&mut self, now_ms: u64) {
        let layouts = self.committed.clone();
        let modules = self.page.modules.clone();
        self.scheduler
            .schedule(&mut self.page, layouts, modules, false, now_ms);
    }

    /// Copies one device's layout into another's column grid (explicit,
    /// user-triggered) and applies it immediately.
    pub fn copy_device_layout(&mut self, from: DeviceType, to: DeviceType) -> ChangeOutcome {
        let next = copy_layout(&self.committed, from, to, &self.config.cols);
        self.handle_change(RawLayouts::from(&next), None)
    }

    // ── State access ─────────────────────────────────────────────

    /// The page being edited (live state plus debounced mirror).
    #[must_use]
    pub fn page(&self) -> &Page {
        &self.page
    }

    pub(crate) fn page_mut(&mut self) -> &mut Page {
        &mut self.page
    }

    /// The live layout state the canvas renders.
    #[must_use]
    pub fn layouts(&self) -> &Layouts {
        &self.committed
    }

    /// The live module map.
    #[must_use]
    pub fn modules(&self) -> &ModuleMap {
        &self.page.modules
    }

    /// Whether a debounced layout change is waiting.
    #[must_use]
    pub fn has_pending_change(&self) -> bool {
        self.pending.is_some()
    }

    /// Whether a page-mirror commit is waiting.
    #[must_use]
    pub fn has_pending_persist(&self) -> bool {
        self.scheduler.has_pending()
    }

    /// Consumes the session, returning the page. Pending state is settled
    /// first.
    #[must_use]
    pub fn into_page(mut self) -> Page {
        self.flush();
        self.page
    }

    fn with_item_updated(
        &self,
        device: DeviceType,
        id: &InstanceId,
        update: impl FnOnce(&mut LayoutItem),
    ) -> RawLayouts {
        let mut next = self.committed.clone();
        match next.device_mut(device).iter_mut().find(|item| item.i == *id) {
            Some(item) => update(item),
            None => {
                // Tolerated: fall back to a fresh item at default geometry.
                warn!(instance = %id, device = %device, "Updating missing item; constructing fresh");
                let mut fresh = LayoutItem::new(id.clone(), 0, 0, 2, 2);
                update(&mut fresh);
                next.device_mut(device).push(fresh);
            }
        }
        RawLayouts::from(&next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use pretty_assertions::assert_eq;
    use studio_model::ModuleDefinition;

    fn session() -> (LayoutReconciler, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::starting_at(1_000));
        let reconciler = LayoutReconciler::new(
            Page::local("Dash", "dash"),
            Arc::new(ModuleRegistry::new()),
            clock.clone(),
            ReconcilerConfig::default(),
        );
        (reconciler, clock)
    }

    fn raw_with(id: &str, x: f64) -> RawLayouts {
        let mut raw = RawLayouts::default();
        raw.desktop.push(RawLayoutItem {
            i: Some(id.into()),
            x: Some(x),
            y: Some(0.0),
            w: Some(4.0),
            h: Some(3.0),
            ..Default::default()
        });
        raw
    }

    #[test]
    fn duplicate_user_events_commit_once() {
        let (mut reconciler, _clock) = session();
        let payload = raw_with("charts_line_1", 2.0);

        let first = reconciler.handle_change(payload.clone(), Some(ChangeOrigin::DragStop));
        assert!(matches!(first, ChangeOutcome::Committed { .. }));

        let second = reconciler.handle_change(payload, Some(ChangeOrigin::DragStop));
        assert_eq!(second, ChangeOutcome::Skipped);
    }

    #[test]
    fn untagged_events_apply_immediately() {
        let (mut reconciler, _clock) = session();
        let outcome = reconciler.handle_change(raw_with("a_b_1", 0.0), None);
        assert!(matches!(outcome, ChangeOutcome::Committed { .. }));
        assert_eq!(reconciler.layouts().desktop.len(), 1);
    }

    #[test]
    fn external_events_debounce_and_collapse() {
        let (mut reconciler, clock) = session();

        let first = reconciler.handle_change(raw_with("a_b_1", 1.0), Some(ChangeOrigin::External));
        assert_eq!(first, ChangeOutcome::Deferred);

        clock.advance(50);
        let second = reconciler.handle_change(raw_with("a_b_1", 5.0), Some(ChangeOrigin::External));
        assert_eq!(second, ChangeOutcome::Deferred);

        // First deadline would have been at 1120; the newer payload replaced it.
        clock.advance(70);
        assert!(!reconciler.tick());

        clock.advance(50);
        assert!(reconciler.tick());
        assert_eq!(reconciler.layouts().desktop[0].x, 5);
    }

    #[test]
    fn user_event_cancels_pending_debounce() {
        let (mut reconciler, clock) = session();
        reconciler.handle_change(raw_with("a_b_1", 1.0), Some(ChangeOrigin::External));
        reconciler.handle_change(raw_with("a_b_1", 3.0), Some(ChangeOrigin::DragStop));
        assert!(!reconciler.has_pending_change());

        clock.advance(500);
        reconciler.tick();
        assert_eq!(reconciler.layouts().desktop[0].x, 3);
    }

    #[test]
    fn add_module_survives_absurd_committed_geometry() {
        let (mut reconciler, _clock) = session();

        // A hostile payload can park an item at the saturation ceiling.
        let mut raw = RawLayouts::default();
        raw.desktop.push(RawLayoutItem {
            i: Some("a_b_1".into()),
            x: Some(0.0),
            y: Some(5.0e9),
            w: Some(4.0),
            h: Some(3.0),
            ..Default::default()
        });
        reconciler.handle_change(raw, Some(ChangeOrigin::DragStop));
        assert_eq!(reconciler.layouts().desktop[0].y, u32::MAX);

        let (id, outcome) = reconciler.add_module("charts", "bar", 4, 3);
        assert!(matches!(outcome, ChangeOutcome::Committed { .. }));
        let dropped = reconciler
            .layouts()
            .desktop
            .iter()
            .find(|item| item.i == id)
            .cloned();
        assert_eq!(dropped.map(|item| item.y), Some(u32::MAX));
    }

    #[test]
    fn apply_keeps_modules_in_sync() {
        let (mut reconciler, _clock) = session();
        reconciler.handle_change(raw_with("charts_line_1700", 0.0), Some(ChangeOrigin::DropAdd));

        let id = InstanceId::from("charts_line_1700");
        assert!(reconciler.modules().contains_key(&id));
        assert!(reconciler.page().consistency_violations().is_empty());

        reconciler.remove_module(&id);
        assert!(reconciler.modules().is_empty());
        assert!(reconciler.layouts().desktop.is_empty());
    }

    #[test]
    fn page_mirror_lags_until_flush() {
        let (mut reconciler, _clock) = session();
        reconciler.handle_change(raw_with("a_b_1", 2.0), Some(ChangeOrigin::DragStop));

        // Live state is current, the mirror is not.
        assert_eq!(reconciler.layouts().desktop.len(), 1);
        assert!(reconciler.page().content.layouts.desktop.is_empty());
        assert!(reconciler.has_pending_persist());

        reconciler.flush();
        assert_eq!(reconciler.page().content.layouts.desktop.len(), 1);
        assert!(!reconciler.has_pending_persist());
    }

    #[test]
    fn add_module_places_on_every_device() {
        let (mut reconciler, _clock) = session();
        let (id, outcome) = reconciler.add_module("charts", "line", 6, 4);
        assert!(matches!(outcome, ChangeOutcome::Committed { .. }));

        assert_eq!(reconciler.layouts().desktop[0].i, id);
        assert_eq!(reconciler.layouts().desktop[0].w, 6);
        // Clamped to the narrower grids.
        assert_eq!(reconciler.layouts().mobile[0].w, 4);
        let module = &reconciler.modules()[&id];
        assert_eq!(module.plugin_id, "charts");
        assert_eq!(module.module_id, "line");
    }

    #[test]
    fn move_missing_item_constructs_fresh() {
        let (mut reconciler, _clock) = session();
        let id = InstanceId::from("ghost_widget_1");
        let outcome = reconciler.move_item(DeviceType::Desktop, &id, 3, 2);
        assert!(matches!(outcome, ChangeOutcome::Committed { .. }));

        let item = &reconciler.layouts().desktop[0];
        assert_eq!((item.x, item.y, item.w, item.h), (3, 2, 2, 2));
    }

    #[test]
    fn config_update_merges_and_schedules_persist() {
        let (mut reconciler, _clock) = session();
        let (id, _) = reconciler.add_module("charts", "line", 4, 3);
        reconciler.flush();

        let mut config = ConfigMap::new();
        config.insert("title".into(), serde_json::json!("Revenue"));
        assert!(reconciler.update_module_config(&id, config));
        assert!(reconciler.has_pending_persist());

        reconciler.flush();
        assert_eq!(
            reconciler.page().content.modules[&id].config.get("title"),
            Some(&serde_json::json!("Revenue"))
        );
    }

    #[test]
    fn unknown_config_target_is_reported() {
        let (mut reconciler, _clock) = session();
        assert!(!reconciler.update_module_config(&InstanceId::from("nope"), ConfigMap::new()));
    }

    #[test]
    fn teardown_discards_pending_state() {
        let (mut reconciler, clock) = session();
        reconciler.handle_change(raw_with("a_b_1", 1.0), Some(ChangeOrigin::External));
        reconciler.teardown();

        clock.advance(1_000);
        assert!(!reconciler.tick());
        assert!(reconciler.layouts().desktop.is_empty());
    }

    #[test]
    fn existing_page_modules_survive_resync() {
        let clock = Arc::new(ManualClock::starting_at(1_000));
        let mut page = Page::local("Dash", "dash");
        let id = InstanceId::from("charts_line_1");
        let mut module = ModuleDefinition::new("charts", "line", "Line");
        module.config.insert("title".into(), serde_json::json!("keep"));
        page.modules.insert(id.clone(), module);
        page.layouts
            .desktop
            .push(LayoutItem::new(id.clone(), 0, 0, 4, 3));

        let mut reconciler = LayoutReconciler::new(
            page,
            Arc::new(ModuleRegistry::new()),
            clock,
            ReconcilerConfig::default(),
        );
        reconciler.move_item(DeviceType::Desktop, &id, 6, 0);

        assert_eq!(
            reconciler.modules()[&id].config.get("title"),
            Some(&serde_json::json!("keep"))
        );
    }
}
