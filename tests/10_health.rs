mod common;

use anyhow::Result;
use reqwest::StatusCode;

use common::Api;

#[tokio::test]
async fn health_endpoint_responds() -> Result<()> {
    let api = Api::anonymous().await?;
    let (status, body) = api.get("/health").await?;

    assert_eq!(status, StatusCode::OK, "unexpected body: {}", body);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["store"], "ok");
    Ok(())
}

#[tokio::test]
async fn root_lists_service_banner() -> Result<()> {
    let api = Api::anonymous().await?;
    let (status, body) = api.get("/").await?;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["name"], "kinder-api");
    assert!(body["data"]["endpoints"].is_object());
    Ok(())
}

#[tokio::test]
async fn protected_routes_require_a_bearer_token() -> Result<()> {
    let api = Api::anonymous().await?;

    let (status, _) = api.get("/api/children").await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = api.with_token("not-a-jwt").get("/api/auth/whoami").await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    Ok(())
}
