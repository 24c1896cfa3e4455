// In-process router tests: no listener, one fresh in-memory store per test.

use anyhow::Result;
use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use kinder_api::server;
use kinder_api::state::AppState;

const SECRET: &str = "router-test-secret";

fn app() -> Router {
    server::app(AppState::in_memory(SECRET))
}

async fn call(app: &Router, method: Method, uri: &str, token: Option<&str>, body: Option<Value>) -> Result<(StatusCode, Value)> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(serde_json::to_vec(&body)?))?,
        None => builder.body(Body::empty())?,
    };

    let response = app.clone().oneshot(request).await?;
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await?;
    let value = if bytes.is_empty() { Value::Null } else { serde_json::from_slice(&bytes)? };
    Ok((status, value))
}

async fn register_owner(app: &Router, email: &str) -> Result<String> {
    let (status, body) = call(
        app,
        Method::POST,
        "/auth/register",
        None,
        Some(json!({ "email": email, "password": "parola-sigura", "organizationName": "Grădinița Ursuleț" })),
    )
    .await?;
    anyhow::ensure!(status == StatusCode::CREATED, "register failed: {} {}", status, body);
    Ok(body["data"]["token"].as_str().unwrap_or_default().to_string())
}

#[tokio::test]
async fn health_and_root_are_public() -> Result<()> {
    let app = app();
    let (status, body) = call(&app, Method::GET, "/health", None, None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["ai"], false);

    let (status, body) = call(&app, Method::GET, "/", None, None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    Ok(())
}

#[tokio::test]
async fn tokens_signed_with_another_secret_are_rejected() -> Result<()> {
    let app = app();
    let claims = kinder_api::auth::Claims::new("someone", "someone@example.ro", 1);
    let foreign = kinder_api::auth::generate_jwt(&claims, "another-secret")?;

    let (status, body) = call(&app, Method::GET, "/api/auth/whoami", Some(&foreign), None).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], true);

    let own = kinder_api::auth::generate_jwt(&claims, SECRET)?;
    let (status, body) = call(&app, Method::GET, "/api/auth/whoami", Some(&own), None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["uid"], "someone");
    Ok(())
}

#[tokio::test]
async fn owner_sets_up_a_location_and_enrolls_a_child() -> Result<()> {
    let app = app();
    let token = register_owner(&app, "director@example.ro").await?;

    let (status, body) = call(&app, Method::POST, "/api/admin/locations", Some(&token), Some(json!({ "name": "Filiala Nord" }))).await?;
    assert_eq!(status, StatusCode::CREATED, "{}", body);
    let location_id = body["data"]["id"].as_str().unwrap_or_default().to_string();

    let (status, body) = call(
        &app,
        Method::POST,
        &format!("/api/admin/locations/{}/groups", location_id),
        Some(&token),
        Some(json!({ "nume": "Grupa Mare" })),
    )
    .await?;
    assert_eq!(status, StatusCode::CREATED, "{}", body);
    let grupa_id = body["data"]["id"].as_str().unwrap_or_default().to_string();

    let (status, body) = call(
        &app,
        Method::POST,
        &format!("/api/children?location={}", location_id),
        Some(&token),
        Some(json!({
            "cnp": "6050101123451",
            "nume": "Popa",
            "prenume": "Ilinca",
            "parinte1": { "nume": "Dan Popa" },
            "contract": { "taxaLunara": "950.50", "meseIncluse": 2 },
            "grupaId": grupa_id
        })),
    )
    .await?;
    assert_eq!(status, StatusCode::CREATED, "{}", body);
    assert_eq!(body["data"]["grupaNume"], "Grupa Mare");

    let (status, body) = call(&app, Method::GET, &format!("/api/children?location={}", location_id), Some(&token), None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().map(Vec::len), Some(1));

    let (status, _) = call(
        &app,
        Method::DELETE,
        &format!("/api/children/6050101123451?location={}", location_id),
        Some(&token),
        None,
    )
    .await?;
    assert_eq!(status, StatusCode::NO_CONTENT);
    Ok(())
}

#[tokio::test]
async fn organizations_are_isolated() -> Result<()> {
    let app = app();
    let first = register_owner(&app, "unu@example.ro").await?;
    let second = register_owner(&app, "doi@example.ro").await?;

    let (_, body) = call(&app, Method::POST, "/api/admin/locations", Some(&first), Some(json!({ "name": "Centru" }))).await?;
    let location_id = body["data"]["id"].as_str().unwrap_or_default().to_string();

    // The second owner cannot address the first owner's location
    let (status, _) = call(&app, Method::GET, &format!("/api/location?location={}", location_id), Some(&second), None).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (_, body) = call(&app, Method::GET, "/api/admin/locations", Some(&second), None).await?;
    assert_eq!(body["data"].as_array().map(Vec::len), Some(0));
    Ok(())
}
