mod common;

use anyhow::Result;
use axum::http::{Method, StatusCode};
use serde_json::json;

use common::TestApp;

#[tokio::test]
async fn create_client_sets_creator_and_timestamps() -> Result<()> {
    let app = TestApp::new();
    let (_alice, token) = app.user("alice").await?;

    let res = app.post("/clients/", &token, json!({ "client_name": "Acme" })).await?;

    assert_eq!(res.status, StatusCode::CREATED);
    assert!(res.body["id"].is_i64());
    assert_eq!(res.body["client_name"], "Acme");
    assert_eq!(res.body["created_by"], "alice");
    assert_eq!(res.body["created_at"], res.body["updated_at"]);
    assert_eq!(res.body["projects"], json!([]));
    Ok(())
}

#[tokio::test]
async fn create_ignores_attempts_to_set_creator() -> Result<()> {
    let app = TestApp::new();
    let (_alice, token) = app.user("alice").await?;
    let (bob, _) = app.user("bob").await?;

    let res = app
        .post("/clients/", &token, json!({ "client_name": "Acme", "created_by": bob.id }))
        .await?;

    assert_eq!(res.status, StatusCode::CREATED);
    assert_eq!(res.body["created_by"], "alice");
    Ok(())
}

#[tokio::test]
async fn create_client_requires_name() -> Result<()> {
    let app = TestApp::new();
    let (_alice, token) = app.user("alice").await?;

    let res = app.post("/clients/", &token, json!({})).await?;

    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(res.body, json!({ "client_name": ["This field is required."] }));

    let list = app.get("/clients/", &token).await?;
    assert_eq!(list.body, json!([]));
    Ok(())
}

#[tokio::test]
async fn malformed_json_is_bad_request() -> Result<()> {
    let app = TestApp::new();
    let (_alice, token) = app.user("alice").await?;

    let request = axum::http::Request::builder()
        .method(Method::POST)
        .uri("/clients/")
        .header("authorization", format!("Bearer {}", token))
        .header("content-type", "application/json")
        .body(axum::body::Body::from("{not json"))?;
    let response = tower::ServiceExt::oneshot(app.router.clone(), request).await?;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn body_without_json_content_type_is_unsupported() -> Result<()> {
    let app = TestApp::new();
    let (_alice, token) = app.user("alice").await?;

    let request = axum::http::Request::builder()
        .method(Method::POST)
        .uri("/clients/")
        .header("authorization", format!("Bearer {}", token))
        .body(axum::body::Body::from(r#"{"client_name":"Acme"}"#))?;
    let response = tower::ServiceExt::oneshot(app.router.clone(), request).await?;

    assert_eq!(response.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
    assert_eq!(app.get("/clients/", &token).await?.body, json!([]));
    Ok(())
}

#[tokio::test]
async fn signed_path_id_does_not_resolve() -> Result<()> {
    let app = TestApp::new();
    let (_alice, token) = app.user("alice").await?;
    let id = app.create_client(&token, "Acme").await?;

    for uri in [format!("/clients/+{}/", id), format!("/clients/-{}/", id)] {
        let res = app.get(&uri, &token).await?;
        assert_eq!(res.status, StatusCode::NOT_FOUND, "{}", uri);
    }
    assert_eq!(app.get(&format!("/clients/{}/", id), &token).await?.status, StatusCode::OK);
    Ok(())
}

#[tokio::test]
async fn retrieve_returns_empty_project_list_not_null() -> Result<()> {
    let app = TestApp::new();
    let (_alice, token) = app.user("alice").await?;
    let id = app.create_client(&token, "Acme").await?;

    let res = app.get(&format!("/clients/{}/", id), &token).await?;

    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body["id"], id);
    assert_eq!(res.body["created_by"], "alice");
    assert_eq!(res.body["projects"], json!([]));
    Ok(())
}

#[tokio::test]
async fn retrieve_lists_project_ids_and_names() -> Result<()> {
    let app = TestApp::new();
    let (alice, token) = app.user("alice").await?;
    let id = app.create_client(&token, "Acme").await?;
    let p1 = app.create_project(&token, id, "Website", &[alice.id]).await?;
    let p2 = app.create_project(&token, id, "Mobile", &[]).await?;

    let res = app.get(&format!("/clients/{}/", id), &token).await?;

    assert_eq!(
        res.body["projects"],
        json!([{ "id": p1, "name": "Website" }, { "id": p2, "name": "Mobile" }])
    );
    Ok(())
}

#[tokio::test]
async fn retrieve_missing_client_is_not_found() -> Result<()> {
    let app = TestApp::new();
    let (_alice, token) = app.user("alice").await?;

    for uri in ["/clients/999/", "/clients/abc/"] {
        let res = app.get(uri, &token).await?;
        assert_eq!(res.status, StatusCode::NOT_FOUND, "{}", uri);
        assert_eq!(res.body["code"], "NOT_FOUND");
    }
    Ok(())
}

#[tokio::test]
async fn list_returns_every_client_with_nested_projects() -> Result<()> {
    let app = TestApp::new();
    let (alice, alice_token) = app.user("alice").await?;
    let (_bob, bob_token) = app.user("bob").await?;
    let acme = app.create_client(&alice_token, "Acme").await?;
    app.create_client(&bob_token, "Globex").await?;
    app.create_project(&alice_token, acme, "Website", &[alice.id]).await?;

    let res = app.get("/clients/", &bob_token).await?;

    assert_eq!(res.status, StatusCode::OK);
    let clients = res.body.as_array().cloned().unwrap_or_default();
    assert_eq!(clients.len(), 2);
    assert_eq!(clients[0]["client_name"], "Acme");
    assert_eq!(clients[0]["projects"][0]["project_name"], "Website");
    assert_eq!(clients[0]["projects"][0]["users"], json!([alice.id]));
    assert_eq!(clients[1]["created_by"], "bob");
    assert_eq!(clients[1]["projects"], json!([]));
    Ok(())
}

#[tokio::test]
async fn update_renames_and_advances_modified_timestamp() -> Result<()> {
    let app = TestApp::new();
    let (_alice, token) = app.user("alice").await?;
    let created = app.post("/clients/", &token, json!({ "client_name": "Acme" })).await?;
    let id = created.body["id"].as_i64().unwrap_or_default();

    let res = app
        .put(&format!("/clients/{}/", id), &token, json!({ "client_name": "Acme Corp" }))
        .await?;

    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body["client_name"], "Acme Corp");
    assert_eq!(res.body["created_at"], created.body["created_at"]);
    assert!(timestamp(&res.body["updated_at"]) > timestamp(&created.body["updated_at"]));
    Ok(())
}

#[tokio::test]
async fn update_with_same_name_still_advances_timestamp() -> Result<()> {
    let app = TestApp::new();
    let (_alice, token) = app.user("alice").await?;
    let id = app.create_client(&token, "Acme").await?;
    let uri = format!("/clients/{}/", id);

    let first = app.put(&uri, &token, json!({ "client_name": "Acme" })).await?;
    let second = app.put(&uri, &token, json!({ "client_name": "Acme" })).await?;
    let third = app.patch(&uri, &token, json!({})).await?;

    assert_eq!(third.status, StatusCode::OK);
    assert_eq!(third.body["client_name"], "Acme");
    assert!(timestamp(&second.body["updated_at"]) > timestamp(&first.body["updated_at"]));
    assert!(timestamp(&third.body["updated_at"]) > timestamp(&second.body["updated_at"]));
    Ok(())
}

#[tokio::test]
async fn put_requires_name_but_patch_does_not() -> Result<()> {
    let app = TestApp::new();
    let (_alice, token) = app.user("alice").await?;
    let id = app.create_client(&token, "Acme").await?;
    let uri = format!("/clients/{}/", id);

    let put = app.put(&uri, &token, json!({})).await?;
    assert_eq!(put.status, StatusCode::BAD_REQUEST);
    assert_eq!(put.body["client_name"], json!(["This field is required."]));

    let patch = app.patch(&uri, &token, json!({ "client_name": "" })).await?;
    assert_eq!(patch.status, StatusCode::BAD_REQUEST);
    assert_eq!(patch.body["client_name"], json!(["This field may not be blank."]));

    let unchanged = app.get(&uri, &token).await?;
    assert_eq!(unchanged.body["client_name"], "Acme");
    Ok(())
}

#[tokio::test]
async fn update_missing_client_is_not_found() -> Result<()> {
    let app = TestApp::new();
    let (_alice, token) = app.user("alice").await?;

    let res = app.patch("/clients/42/", &token, json!({ "client_name": "X" })).await?;

    assert_eq!(res.status, StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn delete_cascades_to_every_owned_project() -> Result<()> {
    let app = TestApp::new();
    let (alice, token) = app.user("alice").await?;
    let acme = app.create_client(&token, "Acme").await?;
    let globex = app.create_client(&token, "Globex").await?;
    let mut owned = Vec::new();
    for name in ["One", "Two", "Three"] {
        owned.push(app.create_project(&token, acme, name, &[alice.id]).await?);
    }
    let survivor = app.create_project(&token, globex, "Kept", &[alice.id]).await?;

    let res = app.delete(&format!("/clients/{}/", acme), &token).await?;
    assert_eq!(res.status, StatusCode::NO_CONTENT);
    assert_eq!(res.body, serde_json::Value::Null);

    for id in owned {
        let gone = app.get(&format!("/projects/{}/", id), &token).await?;
        assert_eq!(gone.status, StatusCode::NOT_FOUND);
    }
    assert_eq!(app.get(&format!("/clients/{}/", acme), &token).await?.status, StatusCode::NOT_FOUND);
    assert_eq!(app.get(&format!("/projects/{}/", survivor), &token).await?.status, StatusCode::OK);

    let mine = app.get("/projects/", &token).await?;
    assert_eq!(mine.body.as_array().map(Vec::len), Some(1));
    Ok(())
}

#[tokio::test]
async fn delete_missing_client_is_not_found() -> Result<()> {
    let app = TestApp::new();
    let (_alice, token) = app.user("alice").await?;

    let res = app.delete("/clients/7/", &token).await?;

    assert_eq!(res.status, StatusCode::NOT_FOUND);
    Ok(())
}

fn timestamp(value: &serde_json::Value) -> chrono::DateTime<chrono::Utc> {
    value
        .as_str()
        .and_then(|s| chrono::DateTime::parse_from_rfc3339(s).ok())
        .map(|ts| ts.with_timezone(&chrono::Utc))
        .unwrap_or_else(|| panic!("not a timestamp: {}", value))
}
