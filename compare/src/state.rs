//! Pure state transitions of the comparison workspace.
//!
//! Every transition reports which persisted fields it changed so the owner
//! can write exactly those back to storage.

use insight_metrics::EntityKind;

use crate::item::{ComparisonItem, ItemId, item_key};

/// Persisted fields touched by a transition.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[must_use]
pub struct Change {
    pub mode: bool,
    pub items: bool,
}

impl Change {
    pub const NONE: Self = Self {
        mode: false,
        items: false,
    };

    pub fn is_empty(self) -> bool {
        !self.mode && !self.items
    }
}

/// In-memory comparison state.
///
/// `selected_items` has no two entries with the same id. Removing an item
/// also unchecks it. `comparison_selection` is usually a subset of the
/// selected ids but nothing enforces that: checking an id never adds an
/// item.
///
/// The fields are private so the transitions below are the only way to
/// change them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WorkspaceState {
    is_compare_mode: bool,
    selected_items: Vec<ComparisonItem>,
    /// Checked ids in the order they were checked. Never persisted.
    comparison_selection: Vec<String>,
}

impl WorkspaceState {
    /// State restored from persisted fields. Duplicate ids keep their first
    /// occurrence.
    pub fn restore(is_compare_mode: bool, items: Vec<ComparisonItem>) -> (Self, usize) {
        let mut selected_items: Vec<ComparisonItem> = Vec::with_capacity(items.len());
        let mut dropped = 0;
        for item in items {
            if selected_items.iter().any(|i| i.id() == item.id()) {
                dropped += 1;
            } else {
                selected_items.push(item);
            }
        }
        let state = Self {
            is_compare_mode,
            selected_items,
            comparison_selection: Vec::new(),
        };
        (state, dropped)
    }

    pub fn is_compare_mode(&self) -> bool {
        self.is_compare_mode
    }

    pub fn selected_items(&self) -> &[ComparisonItem] {
        &self.selected_items
    }

    pub fn comparison_selection(&self) -> &[String] {
        &self.comparison_selection
    }

    pub fn toggle_compare_mode(&mut self) -> Change {
        self.is_compare_mode = !self.is_compare_mode;
        Change {
            mode: true,
            items: false,
        }
    }

    /// Append `item` unless its id is already selected. The first write wins.
    pub fn add_item(&mut self, item: ComparisonItem) -> Change {
        if self.contains(item.id()) {
            return Change::NONE;
        }
        self.selected_items.push(item);
        Change {
            mode: false,
            items: true,
        }
    }

    /// Remove the item with `id` and uncheck it. The uncheck happens even
    /// when no such item was selected.
    pub fn remove_item(&mut self, id: &str) -> Change {
        self.comparison_selection.retain(|checked| checked != id);
        let before = self.selected_items.len();
        self.selected_items.retain(|item| item.id() != id);
        Change {
            mode: false,
            items: self.selected_items.len() != before,
        }
    }

    /// `Some(true)` checks, `Some(false)` unchecks, `None` flips.
    pub fn toggle_comparison_item(&mut self, id: &str, force: Option<bool>) -> Change {
        let checked = self.is_item_selected(id);
        let want = force.unwrap_or(!checked);
        if want && !checked {
            self.comparison_selection.push(id.to_string());
        } else if !want && checked {
            self.comparison_selection.retain(|c| c != id);
        }
        Change::NONE
    }

    pub fn is_item_selected(&self, id: &str) -> bool {
        self.comparison_selection.iter().any(|c| c == id)
    }

    pub fn has_item(&self, kind: EntityKind, app_id: &str, item_id: &ItemId) -> bool {
        self.contains(&item_key(kind, app_id, item_id))
    }

    /// Empty both collections. The compare-mode flag is untouched.
    pub fn clear(&mut self) -> Change {
        self.comparison_selection.clear();
        let had_items = !self.selected_items.is_empty();
        self.selected_items.clear();
        Change {
            mode: false,
            items: had_items,
        }
    }

    /// Checked ids that resolve to a selected item, in check order.
    pub fn checked_items(&self) -> Vec<&ComparisonItem> {
        self.comparison_selection
            .iter()
            .filter_map(|id| self.selected_items.iter().find(|item| item.id() == id))
            .collect()
    }

    /// The two checked items when exactly two of the same kind are checked.
    pub fn comparison_pair(&self) -> Option<(&ComparisonItem, &ComparisonItem)> {
        match self.checked_items().as_slice() {
            [a, b] if a.kind() == b.kind() => Some((*a, *b)),
            _ => None,
        }
    }

    fn contains(&self, id: &str) -> bool {
        self.selected_items.iter().any(|item| item.id() == id)
    }
}
