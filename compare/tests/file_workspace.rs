#![allow(clippy::unwrap_used, clippy::expect_used)]

use insight_metrics::EntityKind;
use insight_compare::COMPARE_ITEMS_KEY;
use insight_compare::COMPARE_MODE_KEY;
use insight_compare::ComparisonItem;
use insight_compare::ComparisonWorkspace;
use insight_compare::FileStorage;
use insight_compare::NewComparisonItem;
use insight_compare::StateStorage;
use pretty_assertions::assert_eq;
use serde_json::json;
use tempfile::TempDir;

#[test]
fn workspace_survives_restart_on_disk() {
    let tmp = TempDir::new().unwrap();
    let dir = tmp.path().join("spark-insight");

    {
        let mut ws = ComparisonWorkspace::load(FileStorage::with_dir(dir.clone()));
        ws.toggle_compare_mode();
        ws.add_item(NewComparisonItem::new(EntityKind::Stage, "app-1", 3).named("Stage 3"));
        ws.add_item(NewComparisonItem::new(EntityKind::Stage, "app-2", 3).named("Stage 3"));
        ws.toggle_comparison_item("app-1:stage:3", None);
    }

    let ws = ComparisonWorkspace::load(FileStorage::with_dir(dir.clone()));
    assert!(ws.is_compare_mode());
    let ids: Vec<&str> = ws.selected_items().iter().map(ComparisonItem::id).collect();
    assert_eq!(ids, vec!["app-1:stage:3", "app-2:stage:3"]);
    assert!(ws.comparison_selection().is_empty());

    let raw = std::fs::read_to_string(dir.join(COMPARE_ITEMS_KEY)).unwrap();
    let stored: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(
        stored[0],
        json!({
            "id": "app-1:stage:3",
            "type": "stage",
            "appId": "app-1",
            "itemId": 3,
            "name": "Stage 3",
        })
    );
}

#[test]
fn hand_edited_items_are_rekeyed_and_deduplicated() {
    let tmp = TempDir::new().unwrap();
    let storage = FileStorage::with_dir(tmp.path().to_path_buf());
    storage.set(COMPARE_MODE_KEY, "true").unwrap();
    storage
        .set(
            COMPARE_ITEMS_KEY,
            &json!([
                {"id": "stale", "type": "job", "appId": "app-1", "itemId": 4, "name": "first"},
                {"id": "app-1:job:4", "type": "job", "appId": "app-1", "itemId": 4, "name": "second"},
                {"type": "app", "appId": "app-9", "itemId": "app-9"}
            ])
            .to_string(),
        )
        .unwrap();

    let ws = ComparisonWorkspace::load(storage);
    let ids: Vec<&str> = ws.selected_items().iter().map(ComparisonItem::id).collect();
    assert_eq!(ids, vec!["app-1:job:4", "app-9:app:app-9"]);
    assert_eq!(ws.selected_items()[0].name(), Some("first"));
}

#[test]
fn unreadable_directory_falls_back_to_defaults() {
    let tmp = TempDir::new().unwrap();
    let file = tmp.path().join("not-a-dir");
    std::fs::write(&file, "x").unwrap();

    let mut ws = ComparisonWorkspace::load(FileStorage::with_dir(file));
    assert!(!ws.is_compare_mode());
    ws.toggle_compare_mode();
    assert!(ws.is_compare_mode());
}
