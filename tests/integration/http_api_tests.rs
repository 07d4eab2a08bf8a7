/*!
 * HTTP route tests against a server on an ephemeral port
 */

use reqwest::StatusCode;
use serde_json::{Value, json};

use crate::common::mock_store::ScriptedStore;
use crate::common::{
    TEST_PASS, TEST_USER, data_connection, in_memory_repository, init_logging, new_entry_json,
    spawn_server,
};

fn with_login(data: Value) -> Value {
    json!({ "user": TEST_USER, "pass": TEST_PASS, "data": data })
}

#[tokio::test]
async fn test_translationRoutes_fullCycle_shouldCreateSearchUpdateDelete() {
    init_logging();
    let server = spawn_server(data_connection(in_memory_repository())).await;
    let client = reqwest::Client::new();

    // Create
    let response = client
        .post(server.url("/translations"))
        .json(&with_login(json!([new_entry_json("Schlange", "e", "Yılan")])))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let created: Vec<Value> = response.json().await.unwrap();
    assert_eq!(created.len(), 1);
    let id = created[0]["_id"].as_str().unwrap().to_string();
    assert_eq!(created[0]["creationDate"], created[0]["editDate"]);

    // Search
    let found: Vec<Value> = client
        .get(server.url("/translations/SCH"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0]["origin"]["main"], "Schlange");

    // Update
    let updated: Vec<Value> = client
        .post(server.url("/translations"))
        .json(&with_login(json!({"_id": id, "translation": "yılan"})))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(updated.len(), 1);
    assert_eq!(updated[0]["translation"], "yılan");
    assert_eq!(updated[0]["creationDate"], created[0]["creationDate"]);

    // Delete
    let deleted: Vec<Value> = client
        .delete(server.url("/translations"))
        .json(&with_login(json!([{"_id": id}])))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(deleted.len(), 1);

    let found: Vec<Value> = client
        .get(server.url("/translations/sch"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(found.is_empty());

    server.stop().await;
}

#[tokio::test]
async fn test_mutatingRoutes_withBadLogin_shouldReturn401WithoutStoreCalls() {
    init_logging();
    let store = ScriptedStore::new();
    let server = spawn_server(data_connection(store.clone())).await;
    let client = reqwest::Client::new();

    let body = json!({"user": TEST_USER, "pass": "wrong", "data": [new_entry_json("x", "e", "y")]});

    let post = client.post(server.url("/translations")).json(&body).send().await.unwrap();
    assert_eq!(post.status(), StatusCode::UNAUTHORIZED);

    let delete = client.delete(server.url("/translations")).json(&body).send().await.unwrap();
    assert_eq!(delete.status(), StatusCode::UNAUTHORIZED);

    assert_eq!(store.calls().mutations(), 0);
    server.stop().await;
}

#[tokio::test]
async fn test_delete_withInvalidPayload_shouldReturn400() {
    init_logging();
    let server = spawn_server(data_connection(ScriptedStore::new())).await;

    let response = reqwest::Client::new()
        .delete(server.url("/translations"))
        .json(&with_login(json!("invalid parameter")))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    server.stop().await;
}

#[tokio::test]
async fn test_search_withStoreFailure_shouldReturn500AndEmptyList() {
    init_logging();
    let store = ScriptedStore::new();
    store.fail_find();
    let server = spawn_server(data_connection(store)).await;

    let response = reqwest::get(server.url("/translations/abc")).await.unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body, json!([]));
    server.stop().await;
}

#[tokio::test]
async fn test_login_shouldGrantOrRejectWithoutEchoingPassword() {
    init_logging();
    let server = spawn_server(data_connection(ScriptedStore::new())).await;
    let client = reqwest::Client::new();

    let ok = client
        .post(server.url("/login"))
        .json(&json!({"user": TEST_USER, "pass": TEST_PASS}))
        .send()
        .await
        .unwrap();
    assert_eq!(ok.status(), StatusCode::OK);
    assert_eq!(ok.json::<Value>().await.unwrap(), json!({"user": TEST_USER}));

    let denied = client
        .post(server.url("/login"))
        .json(&json!({"user": TEST_USER, "pass": "nope"}))
        .send()
        .await
        .unwrap();
    assert_eq!(denied.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(denied.json::<Value>().await.unwrap(), json!({"user": TEST_USER}));

    server.stop().await;
}

#[tokio::test]
async fn test_languageRoutes_shouldServeCatalog() {
    init_logging();
    let server = spawn_server(data_connection(ScriptedStore::new())).await;

    let supported: Value = reqwest::get(server.url("/languages"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(supported["en"]["message_id"], "app.lang.english");

    let messages: Value = reqwest::get(server.url("/languages/ger"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(messages["app.lang.german"], "Deutsch");

    let missing = reqwest::get(server.url("/languages/ja")).await.unwrap();
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);

    server.stop().await;
}
