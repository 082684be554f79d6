//! Page persistence service boundary.
//!
//! The layout core never talks to the network directly; a save operation
//! flushes pending debounces and then hands the page content to whatever
//! implements [`PagePersistence`]. [`InMemoryPageService`] backs tests and
//! the offline/local placeholder path.

use crate::error::{PersistenceError, PersistenceResult};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use studio_model::{Page, PageContent};
use studio_types::PageId;
use tokio::sync::RwLock;
use tracing::{debug, info};

/// Input for creating a page.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPageInput {
    pub name: String,
    pub route: String,
    #[serde(default)]
    pub description: String,
}

/// Page CRUD as exposed by the backend.
#[async_trait]
pub trait PagePersistence: Send + Sync {
    /// Creates a page; the service assigns the id.
    async fn create_page(&self, input: NewPageInput) -> PersistenceResult<Page>;

    /// Replaces the persisted content of a page, returning the stored page.
    async fn update_page(&self, id: &PageId, content: PageContent) -> PersistenceResult<Page>;

    /// Deletes a page.
    async fn delete_page(&self, id: &PageId) -> PersistenceResult<()>;

    /// Fetches a page by id.
    async fn get_page(&self, id: &PageId) -> PersistenceResult<Page>;

    /// Lists all pages.
    async fn list_pages(&self) -> PersistenceResult<Vec<Page>>;
}

/// In-memory page store.
#[derive(Default)]
pub struct InMemoryPageService {
    pages: Arc<RwLock<HashMap<PageId, Page>>>,
}

impl InMemoryPageService {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PagePersistence for InMemoryPageService {
    async fn create_page(&self, input: NewPageInput) -> PersistenceResult<Page> {
        let mut pages = self.pages.write().await;
        if pages.values().any(|p| p.route == input.route) {
            return Err(PersistenceError::RouteConflict(input.route));
        }
        let mut page = Page::new(PageId::new(), input.name, input.route);
        page.description = input.description;
        pages.insert(page.id.clone(), page.clone());
        info!(page_id = %page.id, route = %page.route, "Page created");
        Ok(page)
    }

    async fn update_page(&self, id: &PageId, content: PageContent) -> PersistenceResult<Page> {
        let mut pages = self.pages.write().await;
        let page = pages
            .get_mut(id)
            .ok_or_else(|| PersistenceError::NotFound(id.to_string()))?;
        page.layouts = content.layouts.clone();
        page.modules = content.modules.clone();
        page.content = content;
        debug!(page_id = %id, "Page content updated");
        Ok(page.clone())
    }

    async fn delete_page(&self, id: &PageId) -> PersistenceResult<()> {
        let mut pages = self.pages.write().await;
        pages
            .remove(id)
            .ok_or_else(|| PersistenceError::NotFound(id.to_string()))?;
        info!(page_id = %id, "Page deleted");
        Ok(())
    }

    async fn get_page(&self, id: &PageId) -> PersistenceResult<Page> {
        let pages = self.pages.read().await;
        pages
            .get(id)
            .cloned()
            .ok_or_else(|| PersistenceError::NotFound(id.to_string()))
    }

    async fn list_pages(&self) -> PersistenceResult<Vec<Page>> {
        Ok(self.pages.read().await.values().cloned().collect())
    }
}
