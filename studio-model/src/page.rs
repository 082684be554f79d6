//! Pages — named, routed documents produced by the studio.

use crate::{Layouts, ModuleMap};
use serde::{Deserialize, Serialize};
use studio_types::{InstanceId, PageId};

/// The persisted slice of a page: exactly what a save operation serializes.
///
/// Wire shape:
/// `{ layouts: { desktop, tablet, mobile }, modules: { [instanceId]: {...} } }`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PageContent {
    #[serde(default)]
    pub layouts: Layouts,
    #[serde(default)]
    pub modules: ModuleMap,
}

/// A named, routed page document.
///
/// `layouts`/`modules` are the live editing state updated synchronously on
/// every reconciled change; `content` is the debounced mirror the save path
/// reads. The two converge whenever the persistence scheduler fires or a
/// flush settles.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page {
    pub id: PageId,
    pub name: String,
    /// Unique slug this page is served under.
    pub route: String,
    #[serde(default)]
    pub description: String,
    /// Created client-side and not yet persisted to the backend.
    #[serde(default)]
    pub is_local: bool,
    #[serde(default)]
    pub is_published: bool,
    #[serde(default)]
    pub layouts: Layouts,
    #[serde(default)]
    pub modules: ModuleMap,
    #[serde(default)]
    pub content: PageContent,
}

impl Page {
    /// Creates an empty page with a backend-assigned or fresh id.
    #[must_use]
    pub fn new(id: PageId, name: impl Into<String>, route: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            route: route.into(),
            description: String::new(),
            is_local: false,
            is_published: false,
            layouts: Layouts::default(),
            modules: ModuleMap::new(),
            content: PageContent::default(),
        }
    }

    /// In-memory placeholder page used when the persistence service is
    /// unavailable. Becomes non-local once a create succeeds.
    #[must_use]
    pub fn local(name: impl Into<String>, route: impl Into<String>) -> Self {
        let mut page = Self::new(PageId::new(), name, route);
        page.is_local = true;
        page
    }

    /// Instance ids referenced by a layout but missing from `modules`, or
    /// present in `modules` but placed on no device. Empty on a consistent
    /// page; drift between the two is the primary bug class the reconciler
    /// exists to prevent.
    #[must_use]
    pub fn consistency_violations(&self) -> Vec<InstanceId> {
        let placed = self.layouts.instance_ids();
        let mut violations: Vec<InstanceId> = placed
            .iter()
            .filter(|id| !self.modules.contains_key(*id))
            .cloned()
            .collect();
        violations.extend(
            self.modules
                .keys()
                .filter(|id| !placed.contains(*id))
                .cloned(),
        );
        violations
    }
}
