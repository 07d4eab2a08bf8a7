/*!
 * Reconciliation workflows against the SQLite store
 */

use serde_json::json;
use std::collections::HashSet;
use tokio_test::{assert_err, assert_ok};

use szlk_backend::data_connection::models::{BatchInput, EntryId, TranslationEntry};
use szlk_backend::data_connection::store::{MatchSpec, TranslationStore};
use szlk_backend::database::DatabaseConnection;
use szlk_backend::errors::{DataConnectionError, StoreError};
use szlk_backend::Repository;

use crate::common::{
    create_temp_dir, data_connection, file_repository, in_memory_repository, init_logging,
    new_entry_json,
};

async fn seed(repo: &Repository, entries: &[(&str, &str, &str)]) -> Vec<TranslationEntry> {
    let data = data_connection(repo.clone());
    let items: Vec<_> = entries
        .iter()
        .map(|(main, kind, translation)| new_entry_json(main, kind, translation))
        .collect();
    data.update_translation(BatchInput::from_value(json!(items)))
        .combined()
        .await
}

fn ids(entries: &[TranslationEntry]) -> HashSet<EntryId> {
    entries.iter().map(|e| e.id.clone()).collect()
}

#[tokio::test]
async fn test_search_withSch_shouldReturnSchlangeAndSchiene() {
    init_logging();
    let repo = in_memory_repository();
    seed(&repo, &[("Schlange", "e", "Yılan"), ("Schiene", "e", "Ray"), ("main", "v", "ana")]).await;

    let found = data_connection(repo).search_translation("sch").await.unwrap();

    let mains: HashSet<_> = found.iter().map(|e| e.origin.main.as_str()).collect();
    assert_eq!(mains, HashSet::from(["Schlange", "Schiene"]));
}

#[tokio::test]
async fn test_add_withSingleNewEntry_shouldPersistWithEqualDates() {
    init_logging();
    let repo = in_memory_repository();
    let data = data_connection(repo.clone());

    let result = data
        .update_translation(BatchInput::from_value(json!([
            {"type": "pre", "translation": "Ana", "origin": {"main": "Haupt-"}}
        ])))
        .combined()
        .await;

    assert_eq!(result.len(), 1);
    let created = &result[0];
    assert_eq!(created.creation_date, created.edit_date);

    let stored = repo.get(&created.id).await.unwrap();
    assert_eq!(stored.as_ref(), Some(created));
}

#[tokio::test]
async fn test_update_withMixedBatch_shouldUpdateThreeAndCreateOne() {
    init_logging();
    let repo = in_memory_repository();
    let existing = seed(&repo, &[("eins", "n", "bir"), ("zwei", "n", "iki"), ("drei", "n", "üç")]).await;
    let before = ids(&existing);

    let mut items: Vec<_> = existing
        .iter()
        .map(|e| {
            json!({
                "_id": e.id.as_str(),
                "origin": {"main": e.origin.main, "short": "k"},
                "type": e.kind,
                "translation": format!("{}!", e.translation),
                "creationDate": "1999-01-01T00:00:00Z",
            })
        })
        .collect();
    items.push(new_entry_json("vier", "n", "dört"));

    let result = data_connection(repo.clone())
        .update_translation(BatchInput::from_value(json!(items)))
        .combined()
        .await;

    assert_eq!(result.len(), 4);
    let fresh: Vec<_> = result.iter().filter(|e| !before.contains(&e.id)).collect();
    assert_eq!(fresh.len(), 1);

    for original in &existing {
        let stored = repo.get(&original.id).await.unwrap().unwrap();
        assert_eq!(stored.translation, format!("{}!", original.translation));
        assert_eq!(stored.origin.short.as_deref(), Some("k"));
        assert_eq!(stored.creation_date, original.creation_date);
        assert!(stored.edit_date >= original.edit_date);
    }
}

#[tokio::test]
async fn test_update_withInvalidNewEntry_shouldStillApplyUpdates() {
    init_logging();
    let repo = in_memory_repository();
    let existing = seed(&repo, &[("alt", "e", "eski")]).await;

    let result = data_connection(repo.clone())
        .update_translation(BatchInput::from_value(json!([
            {"_id": existing[0].id.as_str(), "translation": "yeni"},
            {"origin": {"main": "no translation"}, "type": "e"},
            new_entry_json("valid", "e", "geçerli"),
        ])))
        .combined()
        .await;

    assert_eq!(ids(&result), ids(&existing));
    let all = repo.find(&MatchSpec::All, 100).await.unwrap();
    assert_eq!(all.len(), 1, "the failed create batch must not persist anything");
}

#[tokio::test]
async fn test_delete_withDuplicatesAndInvalidEntries_shouldDeleteOnce() {
    init_logging();
    let repo = in_memory_repository();
    let existing = seed(&repo, &[("weg", "e", "git"), ("bleibt", "e", "kal")]).await;
    let target = existing.iter().find(|e| e.origin.main == "weg").unwrap();

    let deleted = data_connection(repo.clone())
        .delete_translation(BatchInput::from_value(json!([
            {"_id": target.id.as_str()},
            {"_id": target.id.as_str()},
            {"_id": ""},
            42,
        ])))
        .await;

    let deleted = assert_ok!(deleted);
    assert_eq!(deleted.len(), 1);
    assert_eq!(deleted[0].id, target.id);
    assert_eq!(repo.find(&MatchSpec::All, 100).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_delete_withInvalidInput_shouldRejectAndKeepData() {
    init_logging();
    let repo = in_memory_repository();
    seed(&repo, &[("bleibt", "e", "kal")]).await;

    let result = data_connection(repo.clone())
        .delete_translation(BatchInput::from_value(json!("invalid parameter")))
        .await;

    let error = assert_err!(result);
    assert!(matches!(error, DataConnectionError::InvalidInput(_)));
    assert_eq!(repo.find(&MatchSpec::All, 100).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_fileDatabase_shouldPersistAcrossReopen() {
    init_logging();
    let dir = create_temp_dir().unwrap();

    let repo = file_repository(&dir);
    let created = seed(&repo, &[("Dauer", "e", "kalıcı")]).await;
    assert_ok!(data_connection(repo.clone()).close().await);

    let err = repo.find(&MatchSpec::All, 10).await;
    assert!(matches!(err, Err(StoreError::Closed)));

    let reopened = Repository::new(
        DatabaseConnection::new(dir.path().join("translations.db")).unwrap(),
    );
    let found = data_connection(reopened).search_translation("dauer").await.unwrap();
    assert_eq!(ids(&found), ids(&created));
}
