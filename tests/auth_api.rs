mod common;

use anyhow::Result;
use axum::http::{Method, StatusCode};
use ledger_api::auth::{generate_jwt, Claims};
use ledger_api::database::RecordStore;

#[tokio::test]
async fn missing_token_is_unauthorized() -> Result<()> {
    let app = common::TestApp::new();

    for uri in ["/clients/", "/projects/", "/clients/1/"] {
        let res = app.send(Method::GET, uri, None, None).await?;
        assert_eq!(res.status, StatusCode::UNAUTHORIZED, "{}", uri);
        assert_eq!(res.body["code"], "UNAUTHORIZED");
    }
    Ok(())
}

#[tokio::test]
async fn token_signed_with_other_secret_is_unauthorized() -> Result<()> {
    let app = common::TestApp::new();
    let user = app.store.create_user("alice").await?;
    let forged = generate_jwt(&Claims::new(user.id, "alice", 1)?, "not-the-secret")?;

    let res = app.get("/clients/", &forged).await?;

    assert_eq!(res.status, StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn token_for_unknown_user_is_forbidden() -> Result<()> {
    let app = common::TestApp::new();
    let ghost = generate_jwt(&Claims::new(99, "ghost", 1)?, common::TEST_SECRET)?;

    let res = app.get("/clients/", &ghost).await?;

    assert_eq!(res.status, StatusCode::FORBIDDEN);
    assert_eq!(res.body["code"], "FORBIDDEN");
    Ok(())
}

#[tokio::test]
async fn token_with_mismatched_username_is_forbidden() -> Result<()> {
    let app = common::TestApp::new();
    let user = app.store.create_user("alice").await?;
    let token = generate_jwt(&Claims::new(user.id, "mallory", 1)?, common::TEST_SECRET)?;

    let res = app.get("/clients/", &token).await?;

    assert_eq!(res.status, StatusCode::FORBIDDEN);
    Ok(())
}

#[tokio::test]
async fn unknown_routes_are_not_found_without_auth() -> Result<()> {
    let app = common::TestApp::new();

    let res = app.send(Method::GET, "/nowhere/", None, None).await?;

    assert_eq!(res.status, StatusCode::NOT_FOUND);
    Ok(())
}
