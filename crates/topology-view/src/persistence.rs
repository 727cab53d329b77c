//! Saved-view persistence
//!
//! Named snapshots are kept per site under `site-topology-views-<siteId>` as a
//! JSON array of [`SavedView`]. The backing store is a plain synchronous
//! key-value surface ([`ViewStore`]) so the same code runs against browser
//! `localStorage` in WASM and an in-memory map natively and in tests.
//!
//! Saving a name that already exists replaces that entry in place, keeping its
//! position in the list. Deleting is the only operation that needs the host to
//! confirm first (see [`crate::session::ViewSession::delete_view`]).
//!
//! # Usage
//! ```ignore
//! let persistence = ViewPersistence::new(MemoryViewStore::new());
//! persistence.save(Some("site-1"), &view)?;
//! let names = persistence.list(Some("site-1"))?;
//! let view = persistence.load(Some("site-1"), "Floor 2")?;
//! ```

use crate::error::{PersistenceError, PersistenceResult};
use std::cell::RefCell;
use std::collections::HashMap;
use topology_types::SavedView;

/// Storage key prefix; the site id is appended
pub const STORAGE_KEY_PREFIX: &str = "site-topology-views-";

/// Storage key for a site's saved views
pub fn storage_key(site_id: &str) -> String {
    format!("{}{}", STORAGE_KEY_PREFIX, site_id)
}

// =============================================================================
// STORE
// =============================================================================

/// Synchronous string key-value store
pub trait ViewStore {
    fn get_item(&self, key: &str) -> PersistenceResult<Option<String>>;
    fn set_item(&self, key: &str, value: &str) -> PersistenceResult<()>;
    fn remove_item(&self, key: &str) -> PersistenceResult<()>;
}

/// In-memory store for native hosts and tests
#[derive(Debug, Default)]
pub struct MemoryViewStore {
    items: RefCell<HashMap<String, String>>,
}

impl MemoryViewStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Raw value under `key` (inspection in tests)
    pub fn raw(&self, key: &str) -> Option<String> {
        self.items.borrow().get(key).cloned()
    }
}

impl ViewStore for MemoryViewStore {
    fn get_item(&self, key: &str) -> PersistenceResult<Option<String>> {
        Ok(self.items.borrow().get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> PersistenceResult<()> {
        self.items
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&self, key: &str) -> PersistenceResult<()> {
        self.items.borrow_mut().remove(key);
        Ok(())
    }
}

/// Browser `localStorage`
#[cfg(target_arch = "wasm32")]
pub struct LocalStorageViewStore {
    storage: web_sys::Storage,
}

#[cfg(target_arch = "wasm32")]
impl LocalStorageViewStore {
    /// Bind to `window.localStorage`
    pub fn new() -> PersistenceResult<Self> {
        let window =
            web_sys::window().ok_or_else(|| PersistenceError::Storage("no window".into()))?;
        let storage = window
            .local_storage()
            .map_err(|e| PersistenceError::Storage(format!("{:?}", e)))?
            .ok_or_else(|| PersistenceError::Storage("localStorage unavailable".into()))?;
        Ok(Self { storage })
    }
}

#[cfg(target_arch = "wasm32")]
impl ViewStore for LocalStorageViewStore {
    fn get_item(&self, key: &str) -> PersistenceResult<Option<String>> {
        self.storage
            .get_item(key)
            .map_err(|e| PersistenceError::Storage(format!("{:?}", e)))
    }

    fn set_item(&self, key: &str, value: &str) -> PersistenceResult<()> {
        self.storage
            .set_item(key, value)
            .map_err(|e| PersistenceError::Storage(format!("{:?}", e)))
    }

    fn remove_item(&self, key: &str) -> PersistenceResult<()> {
        self.storage
            .remove_item(key)
            .map_err(|e| PersistenceError::Storage(format!("{:?}", e)))
    }
}

// =============================================================================
// PERSISTENCE
// =============================================================================

/// Saved-view collection access, one JSON array per site
#[derive(Debug, Default)]
pub struct ViewPersistence<S: ViewStore> {
    store: S,
}

impl<S: ViewStore> ViewPersistence<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Save a view, replacing any same-name view in place
    pub fn save(&self, site_id: Option<&str>, view: &SavedView) -> PersistenceResult<()> {
        let site_id = site_id.ok_or(PersistenceError::NoSiteSelected)?;
        let mut views = self.read(site_id)?;

        match views.iter_mut().find(|v| v.name == view.name) {
            Some(existing) => {
                tracing::debug!(site_id, name = %view.name, "overwriting saved view");
                *existing = view.clone();
            }
            None => views.push(view.clone()),
        }

        self.write(site_id, &views)?;
        tracing::info!(
            site_id,
            name = %view.name,
            layout = view.layout.as_str(),
            devices = view.positions.len(),
            "saved view"
        );
        Ok(())
    }

    /// Names of the site's saved views, in stored order
    pub fn list(&self, site_id: Option<&str>) -> PersistenceResult<Vec<String>> {
        let site_id = site_id.ok_or(PersistenceError::NoSiteSelected)?;
        Ok(self.read(site_id)?.into_iter().map(|v| v.name).collect())
    }

    pub fn load(&self, site_id: Option<&str>, name: &str) -> PersistenceResult<SavedView> {
        let site_id = site_id.ok_or(PersistenceError::NoSiteSelected)?;
        self.read(site_id)?
            .into_iter()
            .find(|v| v.name == name)
            .ok_or_else(|| PersistenceError::SnapshotNotFound(name.to_string()))
    }

    /// Remove a saved view; an unknown name leaves the collection untouched
    pub fn delete(&self, site_id: Option<&str>, name: &str) -> PersistenceResult<()> {
        let site_id = site_id.ok_or(PersistenceError::NoSiteSelected)?;
        let mut views = self.read(site_id)?;
        let before = views.len();
        views.retain(|v| v.name != name);
        if views.len() == before {
            return Err(PersistenceError::SnapshotNotFound(name.to_string()));
        }

        if views.is_empty() {
            self.store.remove_item(&storage_key(site_id))?;
        } else {
            self.write(site_id, &views)?;
        }
        tracing::info!(site_id, name, "deleted saved view");
        Ok(())
    }

    /// Does the site have a view called `name`?
    pub fn exists(&self, site_id: Option<&str>, name: &str) -> PersistenceResult<bool> {
        Ok(self.list(site_id)?.iter().any(|n| n == name))
    }

    fn read(&self, site_id: &str) -> PersistenceResult<Vec<SavedView>> {
        let Some(raw) = self.store.get_item(&storage_key(site_id))? else {
            return Ok(Vec::new());
        };
        serde_json::from_str(&raw).map_err(|e| {
            tracing::warn!(site_id, error = %e, "stored views could not be parsed");
            PersistenceError::Corrupt(e.to_string())
        })
    }

    fn write(&self, site_id: &str, views: &[SavedView]) -> PersistenceResult<()> {
        let json = serde_json::to_string(views)
            .map_err(|e| PersistenceError::Storage(e.to_string()))?;
        self.store.set_item(&storage_key(site_id), &json)
    }
}
