//! Comparison items and their composite key.

use std::fmt;

use insight_metrics::EntityKind;
use serde::{Deserialize, Serialize};

/// Identifier of an item within its application. Jobs and stages use
/// numbers, applications use their string id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ItemId {
    Num(i64),
    Text(String),
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Num(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

impl From<i64> for ItemId {
    fn from(n: i64) -> Self {
        Self::Num(n)
    }
}

impl From<&str> for ItemId {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for ItemId {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

/// `{app_id}:{type}:{item_id}`, the identity of a comparison item.
pub fn item_key(kind: EntityKind, app_id: &str, item_id: &ItemId) -> String {
    format!("{app_id}:{kind}:{item_id}")
}

/// Caller-supplied parts of a comparison item. The id is derived.
#[derive(Debug, Clone, PartialEq)]
pub struct NewComparisonItem {
    pub kind: EntityKind,
    pub app_id: String,
    pub item_id: ItemId,
    pub name: Option<String>,
    pub details: Option<serde_json::Value>,
}

impl NewComparisonItem {
    pub fn new(kind: EntityKind, app_id: impl Into<String>, item_id: impl Into<ItemId>) -> Self {
        Self {
            kind,
            app_id: app_id.into(),
            item_id: item_id.into(),
            name: None,
            details: None,
        }
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }
}

/// An entity marked for comparison.
///
/// The id is always recomputed from `type`, `appId` and `itemId`, including
/// when read back from storage, so a stored id can never disagree with its
/// parts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "StoredItem")]
pub struct ComparisonItem {
    id: String,
    #[serde(rename = "type")]
    kind: EntityKind,
    app_id: String,
    item_id: ItemId,
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<serde_json::Value>,
}

impl ComparisonItem {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn kind(&self) -> EntityKind {
        self.kind
    }

    pub fn app_id(&self) -> &str {
        &self.app_id
    }

    pub fn item_id(&self) -> &ItemId {
        &self.item_id
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn details(&self) -> Option<&serde_json::Value> {
        self.details.as_ref()
    }

    /// Display name, falling back to the item id.
    pub fn display_name(&self) -> String {
        self.name
            .clone()
            .unwrap_or_else(|| format!("{} {}", self.kind, self.item_id))
    }
}

impl From<NewComparisonItem> for ComparisonItem {
    fn from(new: NewComparisonItem) -> Self {
        Self {
            id: item_key(new.kind, &new.app_id, &new.item_id),
            kind: new.kind,
            app_id: new.app_id,
            item_id: new.item_id,
            name: new.name,
            details: new.details,
        }
    }
}

/// Persisted shape. Any stored `id` is ignored.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredItem {
    #[serde(rename = "type")]
    kind: EntityKind,
    app_id: String,
    item_id: ItemId,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    details: Option<serde_json::Value>,
}

impl From<StoredItem> for ComparisonItem {
    fn from(stored: StoredItem) -> Self {
        NewComparisonItem {
            kind: stored.kind,
            app_id: stored.app_id,
            item_id: stored.item_id,
            name: stored.name,
            details: stored.details,
        }
        .into()
    }
}
