//! Debounced commit of reconciled state onto the page object.
//!
//! Live UI state updates synchronously inside the reconciler; the page
//! mirror — what a save operation actually reads — commits on a separate
//! ~120 ms debounce so a drag gesture does not thrash the page object.
//! `flush` always wins over an armed timer.

use studio_model::{Layouts, ModuleMap, Page};
use tracing::debug;

struct PendingCommit {
    layouts: Layouts,
    modules: ModuleMap,
    deadline_ms: u64,
}

/// Schedules the commit-to-page step. Last write wins: a newer schedule
/// replaces any pending payload and re-arms the timer.
pub struct PersistScheduler {
    window_ms: u64,
    pending: Option<PendingCommit>,
}

impl PersistScheduler {
    /// Creates a scheduler with the given quiet window.
    #[must_use]
    pub fn new(window_ms: u64) -> Self {
        Self {
            window_ms,
            pending: None,
        }
    }

    /// Schedules a page commit. With `immediate`, commits synchronously and
    /// clears any pending payload; otherwise arms the timer.
    pub fn schedule(
        &mut self,
        page: &mut Page,
        layouts: Layouts,
        modules: ModuleMap,
        immediate: bool,
        now_ms: u64,
    ) {
        if immediate {
            self.pending = None;
            commit(page, layouts, modules);
            return;
        }
        self.pending = Some(PendingCommit {
            layouts,
            modules,
            deadline_ms: now_ms + self.window_ms,
        });
        debug!(deadline_ms = now_ms + self.window_ms, "Page commit scheduled");
    }

    /// Fires the pending commit if its quiet window has elapsed. Returns
    /// whether the page was mutated.
    pub fn tick(&mut self, page: &mut Page, now_ms: u64) -> bool {
        let due = self
            .pending
            .as_ref()
            .is_some_and(|p| now_ms >= p.deadline_ms);
        if !due {
            return false;
        }
        match self.pending.take() {
            Some(pending) => {
                commit(page, pending.layouts, pending.modules);
                true
            }
            None => false,
        }
    }

    /// Cancels the timer and commits whatever is pending, synchronously.
    /// Returns whether the page was mutated.
    pub fn flush(&mut self, page: &mut Page) -> bool {
        match self.pending.take() {
            Some(pending) => {
                commit(page, pending.layouts, pending.modules);
                true
            }
            None => false,
        }
    }

    /// Drops any pending commit without applying it (teardown path).
    pub fn cancel(&mut self) {
        self.pending = None;
    }

    /// Whether a commit is armed.
    #[must_use]
    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }
}

fn commit(page: &mut Page, layouts: Layouts, modules: ModuleMap) {
    page.content.layouts = layouts;
    page.content.modules = modules;
    debug!(page_id = %page.id, "Page content committed");
}
