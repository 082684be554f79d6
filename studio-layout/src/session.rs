//! Editor session — ties the reconciler to the persistence service.
//!
//! The only place the layout core touches the network. Saving always
//! flushes first, so a save can never race a just-finished drag whose
//! debounce window is still open.

use crate::reconciler::LayoutReconciler;
use std::sync::Arc;
use studio_model::Page;
use studio_registry::{NewPageInput, PagePersistence, PersistenceResult};
use tracing::{info, warn};

/// One page-editing session.
pub struct EditorSession {
    reconciler: LayoutReconciler,
    service: Arc<dyn PagePersistence>,
}

impl EditorSession {
    /// Wraps a reconciler with a persistence service.
    #[must_use]
    pub fn new(reconciler: LayoutReconciler, service: Arc<dyn PagePersistence>) -> Self {
        Self {
            reconciler,
            service,
        }
    }

    /// The underlying reconciler.
    #[must_use]
    pub fn reconciler(&self) -> &LayoutReconciler {
        &self.reconciler
    }

    /// Mutable access for event ingestion and editing operations.
    pub fn reconciler_mut(&mut self) -> &mut LayoutReconciler {
        &mut self.reconciler
    }

    /// Flushes all pending debounced state and persists the page.
    ///
    /// Local placeholder pages are created on the backend first (adopting
    /// the service-assigned id). On failure the in-memory state is left
    /// untouched — the user's edits stay visible and retry is another save.
    pub async fn save(&mut self) -> PersistenceResult<Page> {
        self.reconciler.flush();

        if self.reconciler.page().is_local {
            let page = self.reconciler.page();
            let created = self
                .service
                .create_page(NewPageInput {
                    name: page.name.clone(),
                    route: page.route.clone(),
                    description: page.description.clone(),
                })
                .await?;
            info!(old_id = %self.reconciler.page().id, new_id = %created.id, "Local page created on backend");
            let page = self.reconciler.page_mut();
            page.id = created.id;
            page.is_local = false;
        }

        let id = self.reconciler.page().id.clone();
        let content = self.reconciler.page().content.clone();
        match self.service.update_page(&id, content).await {
            Ok(stored) => Ok(stored),
            Err(err) => {
                // No rollback: edits stay visible, retry is just another save.
                warn!(page_id = %id, %err, "Page save failed");
                Err(err)
            }
        }
    }

    /// Deletes the page from the backend and ends the session.
    pub async fn delete(mut self) -> PersistenceResult<()> {
        self.reconciler.teardown();
        let page = self.reconciler.page();
        if page.is_local {
            // Never persisted; nothing to delete remotely.
            return Ok(());
        }
        self.service.delete_page(&page.id).await
    }

    /// Ends the session, settling pending state into the returned page.
    #[must_use]
    pub fn into_page(self) -> Page {
        self.reconciler.into_page()
    }
}
