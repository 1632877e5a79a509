//! Tab container and the ledger of bound native handles.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use common::{BridgeError, NativeHandle};
use parking_lot::{Mutex, RwLock};

use crate::delegate::TabDelegate;
use crate::tab::{Tab, TabId};

/// Records which tab holds each bound handle.
///
/// No two tabs may hold the same handle at the same time. One ledger serves
/// the whole process; every [`TabModel`] in it is created over the same one,
/// and it hands out the tab ids so they never collide between models.
#[derive(Debug, Default)]
pub struct HandleLedger {
    owners: Mutex<HashMap<NativeHandle, TabId>>,
    last_id: AtomicU32,
}

impl HandleLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate a process-unique tab id.
    pub fn allocate_tab_id(&self) -> TabId {
        TabId(self.last_id.fetch_add(1, Ordering::Relaxed) + 1)
    }

    /// Claim `handle` for `owner`.
    pub fn claim(&self, handle: NativeHandle, owner: TabId) -> Result<(), BridgeError> {
        let mut owners = self.owners.lock();
        if let Some(existing) = owners.get(&handle) {
            return Err(BridgeError::HandleInUse {
                handle,
                owner: existing.0,
            });
        }
        owners.insert(handle, owner);
        Ok(())
    }

    /// Release `handle` if `owner` holds it.
    pub fn release(&self, handle: NativeHandle, owner: TabId) {
        let mut owners = self.owners.lock();
        if owners.get(&handle) == Some(&owner) {
            owners.remove(&handle);
        }
    }

    /// Tab currently holding `handle`.
    pub fn owner(&self, handle: NativeHandle) -> Option<TabId> {
        self.owners.lock().get(&handle).copied()
    }

    /// Number of bound handles.
    pub fn len(&self) -> usize {
        self.owners.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Container owning the tabs of one shell.
#[derive(Debug)]
pub struct TabModel {
    tabs: RwLock<Vec<Arc<Tab>>>,
    ledger: Arc<HandleLedger>,
}

impl TabModel {
    /// Create an empty model over the process-wide handle ledger.
    pub fn new(ledger: Arc<HandleLedger>) -> Self {
        Self {
            tabs: RwLock::new(Vec::new()),
            ledger,
        }
    }

    /// Create a new unbound tab.
    pub fn create_tab(&self, delegate: TabDelegate) -> Arc<Tab> {
        let id = self.ledger.allocate_tab_id();
        let tab = Arc::new(Tab::new(id, delegate, self.ledger.clone()));
        self.tabs.write().push(tab.clone());
        tracing::debug!(tab = %id, "tab created");
        tab
    }

    /// Get a tab by ID.
    pub fn get(&self, id: TabId) -> Option<Arc<Tab>> {
        self.tabs.read().iter().find(|tab| tab.id() == id).cloned()
    }

    /// Tab bound to a native handle.
    pub fn tab_for_handle(&self, handle: NativeHandle) -> Option<Arc<Tab>> {
        self.ledger.owner(handle).and_then(|id| self.get(id))
    }

    /// Remove a tab from the model.
    pub fn remove(&self, id: TabId) -> Option<Arc<Tab>> {
        let mut tabs = self.tabs.write();
        let index = tabs.iter().position(|tab| tab.id() == id)?;
        Some(tabs.remove(index))
    }

    /// Get all tabs.
    pub fn tabs(&self) -> Vec<Arc<Tab>> {
        self.tabs.read().clone()
    }

    /// Handle ledger shared by this model's tabs.
    pub fn ledger(&self) -> &Arc<HandleLedger> {
        &self.ledger
    }

    pub fn len(&self) -> usize {
        self.tabs.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn handle(raw: usize) -> NativeHandle {
        NativeHandle::from_raw(raw).unwrap()
    }

    fn new_model() -> TabModel {
        TabModel::new(Arc::new(HandleLedger::new()))
    }

    #[test]
    fn test_ids_are_stable_and_unique() {
        let model = new_model();
        let first = model.create_tab(TabDelegate::none());
        let second = model.create_tab(TabDelegate::none());

        assert_ne!(first.id(), second.id());
        assert_eq!(model.len(), 2);

        model.remove(first.id());
        let third = model.create_tab(TabDelegate::none());
        assert_ne!(third.id(), first.id());
        assert_eq!(model.get(second.id()).unwrap().id(), second.id());
    }

    #[test]
    fn test_handle_is_exclusive() {
        let model = new_model();
        let first = model.create_tab(TabDelegate::none());
        let second = model.create_tab(TabDelegate::none());

        first.bind(handle(0x40)).unwrap();
        let err = second.bind(handle(0x40)).unwrap_err();
        assert_eq!(
            err,
            BridgeError::HandleInUse {
                handle: handle(0x40),
                owner: first.id().0,
            }
        );
        assert!(!second.is_bound());

        first.unbind().unwrap();
        second.bind(handle(0x40)).unwrap();
        assert_eq!(model.ledger().owner(handle(0x40)), Some(second.id()));
    }

    #[test]
    fn test_lookup_by_handle() {
        let model = new_model();
        let tab = model.create_tab(TabDelegate::none());
        assert!(model.tab_for_handle(handle(0x80)).is_none());

        tab.bind(handle(0x80)).unwrap();
        assert_eq!(model.tab_for_handle(handle(0x80)).unwrap().id(), tab.id());

        tab.unbind().unwrap();
        assert!(model.tab_for_handle(handle(0x80)).is_none());
        assert!(model.ledger().is_empty());
    }

    #[test]
    fn test_handle_is_exclusive_across_models() {
        let ledger = Arc::new(HandleLedger::new());
        let first_model = TabModel::new(ledger.clone());
        let second_model = TabModel::new(ledger.clone());
        let first = first_model.create_tab(TabDelegate::none());
        let second = second_model.create_tab(TabDelegate::none());

        first.bind(handle(0x40)).unwrap();
        assert!(matches!(
            second.bind(handle(0x40)),
            Err(BridgeError::HandleInUse { .. })
        ));
        assert!(!second.is_bound());
        assert_eq!(ledger.len(), 1);

        first.unbind().unwrap();
        second.bind(handle(0x40)).unwrap();
        assert_ne!(first.id(), second.id());
        assert_eq!(second_model.tab_for_handle(handle(0x40)).unwrap().id(), second.id());
        assert!(first_model.tab_for_handle(handle(0x40)).is_none());
    }
}
