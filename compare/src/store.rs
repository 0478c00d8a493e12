use insight_metrics::EntityKind;

use crate::item::{ComparisonItem, ItemId, NewComparisonItem};
use crate::state::{Change, WorkspaceState};
use crate::storage::StateStorage;

/// Storage key of the compare-mode flag (`"true"` / `"false"`).
pub const COMPARE_MODE_KEY: &str = "spark_insight_compare_mode";

/// Storage key of the selected items (JSON array).
pub const COMPARE_ITEMS_KEY: &str = "spark_insight_compare_items";

/// Session-wide comparison selection, persisted after every change.
///
/// No operation fails: storage errors are logged and the in-memory state
/// stays authoritative for the rest of the session.
#[derive(Debug)]
pub struct ComparisonWorkspace<S: StateStorage> {
    state: WorkspaceState,
    storage: S,
}

impl<S: StateStorage> ComparisonWorkspace<S> {
    /// Hydrate from `storage`. Absent or unreadable entries fall back to
    /// compare mode off and no items.
    pub fn load(storage: S) -> Self {
        let is_compare_mode = read_mode(&storage);
        let items = read_items(&storage);
        let (state, dropped) = WorkspaceState::restore(is_compare_mode, items);
        if dropped > 0 {
            tracing::warn!(dropped, "dropped duplicate comparison items from storage");
        }
        tracing::debug!(
            compare_mode = state.is_compare_mode(),
            items = state.selected_items().len(),
            "comparison workspace loaded"
        );
        Self { state, storage }
    }

    pub fn is_compare_mode(&self) -> bool {
        self.state.is_compare_mode()
    }

    pub fn selected_items(&self) -> &[ComparisonItem] {
        self.state.selected_items()
    }

    /// Checked ids in the order they were checked.
    pub fn comparison_selection(&self) -> &[String] {
        self.state.comparison_selection()
    }

    pub fn toggle_compare_mode(&mut self) {
        let change = self.state.toggle_compare_mode();
        self.persist(change);
    }

    pub fn add_item(&mut self, item: NewComparisonItem) {
        let change = self.state.add_item(item.into());
        self.persist(change);
    }

    pub fn remove_item(&mut self, id: &str) {
        let change = self.state.remove_item(id);
        self.persist(change);
    }

    pub fn toggle_comparison_item(&mut self, id: &str, force: Option<bool>) {
        let change = self.state.toggle_comparison_item(id, force);
        self.persist(change);
    }

    pub fn is_item_selected(&self, id: &str) -> bool {
        self.state.is_item_selected(id)
    }

    pub fn has_item(&self, kind: EntityKind, app_id: &str, item_id: &ItemId) -> bool {
        self.state.has_item(kind, app_id, item_id)
    }

    pub fn clear(&mut self) {
        let change = self.state.clear();
        self.persist(change);
    }

    /// Checked items that are still selected, in check order.
    pub fn checked_items(&self) -> Vec<&ComparisonItem> {
        self.state.checked_items()
    }

    /// Exactly two checked items of the same kind, ready to compare.
    pub fn comparison_pair(&self) -> Option<(&ComparisonItem, &ComparisonItem)> {
        self.state.comparison_pair()
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    fn persist(&self, change: Change) {
        if change.is_empty() {
            return;
        }
        if change.mode {
            let value = if self.state.is_compare_mode() {
                "true"
            } else {
                "false"
            };
            if let Err(e) = self.storage.set(COMPARE_MODE_KEY, value) {
                tracing::warn!(key = COMPARE_MODE_KEY, error = %e, "failed to persist compare mode");
            }
        }
        if change.items {
            let result = serde_json::to_string(self.state.selected_items())
                .map_err(|e| e.to_string())
                .and_then(|json| {
                    self.storage
                        .set(COMPARE_ITEMS_KEY, &json)
                        .map_err(|e| e.to_string())
                });
            if let Err(e) = result {
                tracing::warn!(key = COMPARE_ITEMS_KEY, error = %e, "failed to persist comparison items");
            }
        }
    }
}

fn read_entry<S: StateStorage>(storage: &S, key: &str) -> Option<String> {
    match storage.get(key) {
        Ok(value) => value,
        Err(e) => {
            tracing::warn!(key, error = %e, "failed to read comparison state");
            None
        }
    }
}

fn read_mode<S: StateStorage>(storage: &S) -> bool {
    match read_entry(storage, COMPARE_MODE_KEY).as_deref().map(str::trim) {
        None | Some("false") => false,
        Some("true") => true,
        Some(other) => {
            tracing::warn!(key = COMPARE_MODE_KEY, value = other, "ignoring malformed compare mode");
            false
        }
    }
}

fn read_items<S: StateStorage>(storage: &S) -> Vec<ComparisonItem> {
    let Some(raw) = read_entry(storage, COMPARE_ITEMS_KEY) else {
        return Vec::new();
    };
    match serde_json::from_str(&raw) {
        Ok(items) => items,
        Err(e) => {
            tracing::warn!(key = COMPARE_ITEMS_KEY, error = %e, "ignoring malformed comparison items");
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{MemoryStorage, StorageError};
    use pretty_assertions::assert_eq;

    fn stage(app: &str, id: i64, name: &str) -> NewComparisonItem {
        NewComparisonItem::new(EntityKind::Stage, app, id).named(name)
    }

    fn ids<S: StateStorage>(ws: &ComparisonWorkspace<S>) -> Vec<&str> {
        ws.selected_items().iter().map(ComparisonItem::id).collect()
    }

    #[test]
    fn empty_storage_loads_defaults() {
        let ws = ComparisonWorkspace::load(MemoryStorage::new());
        assert!(!ws.is_compare_mode());
        assert!(ws.selected_items().is_empty());
        assert!(ws.comparison_selection().is_empty());
    }

    #[test]
    fn corrupt_storage_loads_defaults() {
        let storage = MemoryStorage::new();
        storage.set(COMPARE_MODE_KEY, "maybe").unwrap();
        storage.set(COMPARE_ITEMS_KEY, "{not json").unwrap();

        let ws = ComparisonWorkspace::load(storage);
        assert!(!ws.is_compare_mode());
        assert!(ws.selected_items().is_empty());
    }

    #[test]
    fn repeated_add_keeps_first_entry() {
        let mut ws = ComparisonWorkspace::load(MemoryStorage::new());
        ws.add_item(stage("app-1", 3, "Stage 3"));
        ws.add_item(stage("app-1", 3, "Stage 3 renamed"));

        assert_eq!(ids(&ws), vec!["app-1:stage:3"]);
        assert_eq!(ws.selected_items()[0].name(), Some("Stage 3"));
    }

    #[test]
    fn toggles() {
        let mut ws = ComparisonWorkspace::load(MemoryStorage::new());
        let id = "app-1:stage:3";

        ws.toggle_comparison_item(id, None);
        ws.toggle_comparison_item(id, None);
        assert!(!ws.is_item_selected(id));

        ws.toggle_comparison_item(id, Some(true));
        ws.toggle_comparison_item(id, Some(true));
        assert_eq!(ws.comparison_selection(), ["app-1:stage:3".to_string()]);

        ws.toggle_comparison_item(id, Some(false));
        ws.toggle_comparison_item(id, Some(false));
        assert!(ws.comparison_selection().is_empty());
    }

    #[test]
    fn checking_does_not_require_membership() {
        let mut ws = ComparisonWorkspace::load(MemoryStorage::new());
        ws.toggle_comparison_item("app-7:job:2", Some(true));
        assert!(ws.is_item_selected("app-7:job:2"));
        assert!(ws.selected_items().is_empty());
        assert!(ws.checked_items().is_empty());
    }

    #[test]
    fn remove_unchecks() {
        let mut ws = ComparisonWorkspace::load(MemoryStorage::new());
        ws.add_item(stage("app-1", 3, "s"));
        ws.toggle_comparison_item("app-1:stage:3", None);
        ws.remove_item("app-1:stage:3");

        assert!(ws.selected_items().is_empty());
        assert!(!ws.is_item_selected("app-1:stage:3"));
    }

    #[test]
    fn clear_keeps_compare_mode() {
        let mut ws = ComparisonWorkspace::load(MemoryStorage::new());
        ws.toggle_compare_mode();
        ws.add_item(stage("app-1", 3, "s"));
        ws.toggle_comparison_item("app-1:stage:3", None);
        ws.clear();

        assert!(ws.is_compare_mode());
        assert!(ws.selected_items().is_empty());
        assert!(ws.comparison_selection().is_empty());
        assert_eq!(
            ws.storage().get(COMPARE_ITEMS_KEY).unwrap().as_deref(),
            Some("[]")
        );
    }

    #[test]
    fn reload_reproduces_persisted_fields_but_not_selection() {
        let storage = MemoryStorage::new();
        let mut ws = ComparisonWorkspace::load(storage.clone());
        ws.toggle_compare_mode();
        ws.add_item(stage("app-1", 3, "Stage 3"));
        ws.add_item(NewComparisonItem::new(EntityKind::App, "app-2", "app-2"));
        ws.toggle_comparison_item("app-1:stage:3", None);

        let reloaded = ComparisonWorkspace::load(storage);
        assert!(reloaded.is_compare_mode());
        assert_eq!(reloaded.selected_items(), ws.selected_items());
        assert!(reloaded.comparison_selection().is_empty());
    }

    #[test]
    fn has_item_uses_composite_key() {
        let mut ws = ComparisonWorkspace::load(MemoryStorage::new());
        ws.add_item(NewComparisonItem::new(EntityKind::Job, "app-1", 5));

        assert!(ws.has_item(EntityKind::Job, "app-1", &ItemId::Num(5)));
        assert!(!ws.has_item(EntityKind::Stage, "app-1", &ItemId::Num(5)));
        assert!(!ws.has_item(EntityKind::Job, "app-2", &ItemId::Num(5)));
    }

    #[test]
    fn mode_flag_is_stored_as_text() {
        let storage = MemoryStorage::new();
        let mut ws = ComparisonWorkspace::load(storage.clone());
        ws.toggle_compare_mode();
        assert_eq!(storage.get(COMPARE_MODE_KEY).unwrap().as_deref(), Some("true"));
        ws.toggle_compare_mode();
        assert_eq!(storage.get(COMPARE_MODE_KEY).unwrap().as_deref(), Some("false"));
        assert_eq!(storage.get(COMPARE_ITEMS_KEY).unwrap(), None);
    }

    struct FailingStorage;

    impl StateStorage for FailingStorage {
        fn get(&self, _key: &str) -> Result<Option<String>, StorageError> {
            Err(StorageError::NoDataDir)
        }

        fn set(&self, _key: &str, _value: &str) -> Result<(), StorageError> {
            Err(StorageError::NoDataDir)
        }
    }

    #[test]
    fn storage_failures_are_swallowed() {
        let mut ws = ComparisonWorkspace::load(FailingStorage);
        ws.toggle_compare_mode();
        ws.add_item(stage("app-1", 1, "s"));

        assert!(ws.is_compare_mode());
        assert_eq!(ids(&ws), vec!["app-1:stage:1"]);
    }
}
