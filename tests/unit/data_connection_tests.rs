/*!
 * Tests for reconciliation against a scripted store
 */

use futures::FutureExt;
use serde_json::json;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use szlk_backend::data_connection::models::{BatchInput, EntryId, EntryPayload, TranslationEntry};
use szlk_backend::data_connection::{BatchOutcome, DataConnection};
use szlk_backend::errors::DataConnectionError;

use crate::common::mock_store::ScriptedStore;
use crate::common::new_entry_json;

fn connection(store: &ScriptedStore) -> DataConnection {
    DataConnection::new(Arc::new(store.clone()))
}

fn ids(entries: &[TranslationEntry]) -> HashSet<EntryId> {
    entries.iter().map(|e| e.id.clone()).collect()
}

#[tokio::test]
async fn test_searchTranslation_withSch_shouldReturnMatchingEntries() {
    let store = ScriptedStore::new();
    let schlange = store.seed("Schlange", "e", "Yılan");
    let schiene = store.seed("Schiene", "e", "Ray");
    store.seed("main", "v", "ana");

    let found = connection(&store).search_translation("sch").await.unwrap();

    assert_eq!(ids(&found), ids(&[schlange, schiene]));
}

#[tokio::test]
async fn test_searchTranslation_withSpecialCharacters_shouldMatchLiterally() {
    let store = ScriptedStore::new();
    let haupt = store.seed("Haupt-", "pre", "Ana");
    store.seed("Hauptbahnhof", "e", "Gar");

    let found = connection(&store).search_translation("haupt-").await.unwrap();
    assert_eq!(ids(&found), ids(&[haupt]));

    let none = connection(&store).search_translation(".*").await.unwrap();
    assert!(none.is_empty());
}

#[tokio::test]
async fn test_searchTranslation_withMaxResults_shouldCapResults() {
    let store = ScriptedStore::new();
    for i in 0..5 {
        store.seed(&format!("Wort {}", i), "e", "kelime");
    }

    let data = DataConnection::with_max_results(Arc::new(store.clone()), 3);
    assert_eq!(data.search_translation("wort").await.unwrap().len(), 3);
}

#[tokio::test]
async fn test_searchTranslation_withStoreFailure_shouldReturnError() {
    let store = ScriptedStore::new();
    store.fail_find();

    let result = connection(&store).search_translation("x").await;
    assert!(matches!(result, Err(DataConnectionError::Store(_))));
}

#[tokio::test]
async fn test_updateTranslation_withNewEntry_shouldAssignIdentityAndEqualDates() {
    let store = ScriptedStore::new();
    let input = BatchInput::from_value(json!([
        {"type": "pre", "translation": "Ana", "origin": {"main": "Haupt-"}}
    ]));

    let result = connection(&store).update_translation(input).combined().await;

    assert_eq!(result.len(), 1);
    assert!(!result[0].id.as_str().is_empty());
    assert_eq!(result[0].creation_date, result[0].edit_date);
    assert_eq!(store.calls().create, 1);
}

#[tokio::test]
async fn test_updateTranslation_withEmptyInput_shouldResolveEmptyWithoutStoreCalls() {
    let store = ScriptedStore::new();
    let data = connection(&store);

    let (added, updated) = data.update_translation(BatchInput::from_value(json!([]))).settle().await;
    assert!(added.unwrap().is_empty());
    assert!(updated.unwrap().is_empty());

    let combined = data.update_translation(BatchInput::Invalid).combined().await;
    assert!(combined.is_empty());
    assert_eq!(store.calls().mutations(), 0);
}

#[tokio::test]
async fn test_updateTranslation_withMixedBatch_shouldReturnAllEntries() {
    let store = ScriptedStore::new();
    let existing: Vec<TranslationEntry> = (0..3)
        .map(|i| store.seed(&format!("word {}", i), "e", "old"))
        .collect();
    let before = ids(&store.entries());

    let mut items: Vec<serde_json::Value> = existing
        .iter()
        .map(|e| {
            let mut payload = EntryPayload::from(e.clone());
            payload.translation = Some("new".to_string());
            serde_json::to_value(payload).unwrap()
        })
        .collect();
    items.push(new_entry_json("fresh", "v", "taze"));

    let result = connection(&store)
        .update_translation(BatchInput::from_value(json!(items)))
        .combined()
        .await;

    assert_eq!(result.len(), 4);
    let fresh: Vec<_> = result.iter().filter(|e| !before.contains(&e.id)).collect();
    assert_eq!(fresh.len(), 1);
    assert_eq!(fresh[0].origin.main, "fresh");
    assert!(result
        .iter()
        .filter(|e| before.contains(&e.id))
        .all(|e| e.translation == "new"));
}

#[tokio::test]
async fn test_updateTranslation_withMistypedFieldOnExisting_shouldKeepBothChannels() {
    let store = ScriptedStore::new();
    let existing = store.seed("Schlange", "e", "old");

    let input = BatchInput::from_value(json!([
        {"_id": existing.id.as_str(), "creationDate": 1.5, "translation": "y"},
        new_entry_json("fresh", "v", "taze"),
    ]));

    let result = connection(&store).update_translation(input).combined().await;

    assert_eq!(result.len(), 2);
    let updated = result.iter().find(|e| e.id == existing.id).unwrap();
    assert_eq!(updated.translation, "y");
    assert_eq!(updated.creation_date, existing.creation_date);
    assert!(result.iter().any(|e| e.origin.main == "fresh"));
}

#[tokio::test]
async fn test_combined_withAddedFailing_shouldResolveWithUpdatedEntries() {
    let store = ScriptedStore::new();
    let a = store.seed("a", "e", "x");
    let b = store.seed("b", "e", "x");
    store.fail_create();

    let input = BatchInput::from_value(json!([
        {"_id": a.id.as_str(), "translation": "y"},
        {"_id": b.id.as_str(), "translation": "y"},
        new_entry_json("c", "e", "x"),
    ]));

    let result = connection(&store).update_translation(input).combined().await;

    assert_eq!(ids(&result), ids(&[a, b]));
}

#[tokio::test]
async fn test_combined_withEitherSettlementOrder_shouldReturnUnion() {
    for (create_delay, update_delay) in [(30, 0), (0, 30)] {
        let store = ScriptedStore::new();
        let existing = store.seed("old", "e", "x");
        store.delay_create(Duration::from_millis(create_delay));
        store.delay_update(&existing.id, Duration::from_millis(update_delay));

        let input = BatchInput::from_value(json!([
            {"_id": existing.id.as_str(), "translation": "y"},
            new_entry_json("new", "e", "x"),
        ]));

        let result = connection(&store).update_translation(input).combined().await;

        assert_eq!(result.len(), 2);
        assert!(result.iter().any(|e| e.id == existing.id));
        assert!(result.iter().any(|e| e.origin.main == "new"));
    }
}

#[tokio::test]
async fn test_combined_withBothChannelsFailing_shouldResolveEmpty() {
    let outcome = BatchOutcome {
        added: async { Err(DataConnectionError::MissingIdentity) }.boxed(),
        updated: async { Err(DataConnectionError::InvalidInput("x".to_string())) }.boxed(),
    };
    assert!(outcome.combined().await.is_empty());
}

#[tokio::test]
async fn test_createMany_withInvalidRecord_shouldFailWholeChannel() {
    let store = ScriptedStore::new();
    let input = BatchInput::from_value(json!([
        new_entry_json("ok", "e", "x"),
        {"origin": {"main": "missing type"}, "translation": "x"},
    ]));

    let (added, updated) = connection(&store).update_translation(input).settle().await;

    assert!(matches!(added, Err(DataConnectionError::Store(_))));
    assert!(updated.unwrap().is_empty());
    assert!(store.entries().is_empty());
}

#[tokio::test]
async fn test_updateMany_withFailures_shouldReturnOnlySuccessfulUpdates() {
    let store = ScriptedStore::new();
    let entries: Vec<TranslationEntry> = (0..6).map(|i| store.seed(&format!("w{}", i), "e", "x")).collect();
    store.fail_update(&entries[1].id);
    store.fail_update(&entries[4].id);

    let items: Vec<serde_json::Value> = entries
        .iter()
        .map(|e| json!({"_id": e.id.as_str(), "translation": "y"}))
        .chain(std::iter::once(json!({"_id": "missing", "translation": "y"})))
        .collect();

    let (_, updated) = connection(&store)
        .update_translation(BatchInput::from_value(json!(items)))
        .settle()
        .await;

    let updated = updated.expect("update channel never fails");
    assert_eq!(updated.len(), 4);
    assert!(!ids(&updated).contains(&entries[1].id));
    assert!(!ids(&updated).contains(&entries[4].id));
}

#[tokio::test]
async fn test_deleteTranslation_withDuplicatesAndInvalid_shouldDeleteOnce() {
    let store = ScriptedStore::new();
    let target = store.seed("delete me", "e", "x");
    let keep = store.seed("keep me", "e", "x");

    let input = BatchInput::from_value(json!([
        {"_id": target.id.as_str()},
        {"_id": target.id.as_str()},
        {"translation": "no identity"},
        "not an object",
    ]));

    let deleted = connection(&store).delete_translation(input).await.unwrap();

    assert_eq!(deleted.len(), 1);
    assert_eq!(deleted[0].id, target.id);
    assert_eq!(ids(&store.entries()), ids(&[keep]));
}

#[tokio::test]
async fn test_deleteTranslation_withMistypedField_shouldStillDeleteByIdentity() {
    let store = ScriptedStore::new();
    let target = store.seed("delete me", "e", "x");

    let deleted = connection(&store)
        .delete_translation(BatchInput::from_value(json!({"_id": target.id.as_str(), "type": 7})))
        .await
        .unwrap();

    assert_eq!(ids(&deleted), ids(&[target]));
    assert!(store.entries().is_empty());
}

#[tokio::test]
async fn test_deleteTranslation_withInvalidInput_shouldReturnValidationError() {
    let store = ScriptedStore::new();

    let result = connection(&store)
        .delete_translation(BatchInput::from_value(json!("invalid parameter")))
        .await;

    assert!(matches!(result, Err(DataConnectionError::InvalidInput(_))));
    assert_eq!(store.calls().delete, 0);
}

#[tokio::test]
async fn test_deleteTranslation_withUnknownIdentity_shouldReturnEmpty() {
    let store = ScriptedStore::new();
    store.seed("stays", "e", "x");

    let deleted = connection(&store)
        .delete_translation(BatchInput::from_value(json!({"_id": "unknown"})))
        .await
        .unwrap();

    assert!(deleted.is_empty());
    assert_eq!(store.entries().len(), 1);
}

#[tokio::test]
async fn test_deleteTranslation_withStoreFailure_shouldSkipFailedItem() {
    let store = ScriptedStore::new();
    let a = store.seed("a", "e", "x");
    let b = store.seed("b", "e", "x");
    store.fail_delete(&a.id);

    let deleted = connection(&store)
        .delete_translation(BatchInput::from_value(json!([
            {"_id": a.id.as_str()},
            {"id": b.id.as_str()},
        ])))
        .await
        .unwrap();

    assert_eq!(ids(&deleted), ids(&[b]));
}

#[tokio::test]
async fn test_close_shouldCloseStore() {
    let store = ScriptedStore::new();
    connection(&store).close().await.unwrap();
    assert_eq!(store.calls().close, 1);
}
