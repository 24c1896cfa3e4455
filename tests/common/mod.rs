#![allow(dead_code)]

use std::process::{Child, Command, Stdio};
use std::sync::OnceLock;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use reqwest::{Method, StatusCode};
use serde_json::{json, Value};

static SERVER: OnceLock<TestServer> = OnceLock::new();

pub const JWT_SECRET: &str = "integration-test-secret";
pub const CHILD_CNP: &str = "6050101123451";

pub struct TestServer {
    pub port: u16,
    pub base_url: String,
    child: Child,
}

impl TestServer {
    fn spawn() -> Result<Self> {
        // Pick an unused port for isolation
        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let base_url = format!("http://127.0.0.1:{}", port);

        // Each test binary gets its own server with an empty in-memory store
        let mut cmd = Command::new(env!("CARGO_BIN_EXE_kinder-api"));
        cmd.env("KINDER_API_PORT", port.to_string())
            .env("STORE_BACKEND", "memory")
            .env("JWT_SECRET", JWT_SECRET)
            .env_remove("AI_ENDPOINT")
            .env("RUST_LOG", "warn")
            .stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit());

        let child = cmd.spawn().context("failed to spawn server binary")?;

        Ok(Self { port, base_url, child })
    }

    async fn wait_ready(&self, timeout: Duration) -> Result<()> {
        let client = reqwest::Client::new();
        let deadline = Instant::now() + timeout;
        loop {
            if Instant::now() > deadline {
                break;
            }
            let url = format!("{}/health", self.base_url);
            if let Ok(resp) = client.get(&url).send().await {
                if resp.status() == StatusCode::OK || resp.status() == StatusCode::SERVICE_UNAVAILABLE {
                    return Ok(());
                }
            }
            tokio::time::sleep(Duration::from_millis(150)).await;
        }
        anyhow::bail!("server did not become ready on {} within {:?}", self.base_url, timeout)
    }
}

pub async fn ensure_server() -> Result<&'static TestServer> {
    let server = SERVER.get_or_init(|| TestServer::spawn().expect("failed to spawn server binary"));
    server.wait_ready(Duration::from_secs(10)).await?;
    Ok(server)
}

/// Thin JSON client bound to one bearer token
#[derive(Clone)]
pub struct Api {
    client: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl Api {
    pub async fn anonymous() -> Result<Self> {
        let server = ensure_server().await?;
        Ok(Self {
            client: reqwest::Client::new(),
            base_url: server.base_url.clone(),
            token: None,
        })
    }

    pub fn with_token(&self, token: &str) -> Self {
        Self { token: Some(token.to_string()), ..self.clone() }
    }

    pub async fn send(&self, method: Method, path: &str, body: Option<Value>) -> Result<(StatusCode, Value)> {
        let mut request = self.client.request(method, format!("{}{}", self.base_url, path));
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }
        if let Some(body) = body {
            request = request.json(&body);
        }
        let response = request.send().await?;
        let status = response.status();
        let text = response.text().await?;
        let value = if text.is_empty() { Value::Null } else { serde_json::from_str(&text)? };
        Ok((status, value))
    }

    pub async fn get(&self, path: &str) -> Result<(StatusCode, Value)> {
        self.send(Method::GET, path, None).await
    }

    pub async fn post(&self, path: &str, body: Value) -> Result<(StatusCode, Value)> {
        self.send(Method::POST, path, Some(body)).await
    }

    pub async fn put(&self, path: &str, body: Value) -> Result<(StatusCode, Value)> {
        self.send(Method::PUT, path, Some(body)).await
    }

    pub async fn patch(&self, path: &str, body: Value) -> Result<(StatusCode, Value)> {
        self.send(Method::PATCH, path, Some(body)).await
    }

    pub async fn delete(&self, path: &str) -> Result<(StatusCode, Value)> {
        self.send(Method::DELETE, path, None).await
    }

    /// POST /auth/login and return a client carrying the new token
    pub async fn login(&self, email: &str, password: &str) -> Result<Self> {
        let (status, body) = self.post("/auth/login", json!({ "email": email, "password": password })).await?;
        anyhow::ensure!(status == StatusCode::OK, "login failed for {}: {} {}", email, status, body);
        let token = body["data"]["token"].as_str().context("token missing from login response")?;
        Ok(self.with_token(token))
    }
}

pub fn unique_email(prefix: &str) -> String {
    format!("{}-{}@example.ro", prefix, uuid::Uuid::new_v4().simple())
}

/// A registered owner with one location and one group
pub struct Kindergarten {
    pub owner: Api,
    pub location_id: String,
    pub grupa_id: String,
}

impl Kindergarten {
    pub async fn create() -> Result<Self> {
        let api = Api::anonymous().await?;
        let email = unique_email("owner");
        let (status, body) = api
            .post(
                "/auth/register",
                json!({
                    "email": email,
                    "password": "parola-sigura",
                    "displayName": "Ana Popescu",
                    "organizationName": "Grădinița Fluturașilor",
                    "facilityType": "kindergarten"
                }),
            )
            .await?;
        anyhow::ensure!(status == StatusCode::CREATED, "register failed: {} {}", status, body);
        let owner = api.login(&email, "parola-sigura").await?;

        let (status, body) = owner.post("/api/admin/locations", json!({ "name": "Sediul central", "capacity": 60 })).await?;
        anyhow::ensure!(status == StatusCode::CREATED, "location create failed: {} {}", status, body);
        let location_id = body["data"]["id"].as_str().context("location id")?.to_string();

        let (status, body) = owner
            .post(
                &format!("/api/admin/locations/{}/groups", location_id),
                json!({ "nume": "Grupa Mică", "emoji": "🐣", "capacitate": 20 }),
            )
            .await?;
        anyhow::ensure!(status == StatusCode::CREATED, "group create failed: {} {}", status, body);
        let grupa_id = body["data"]["id"].as_str().context("group id")?.to_string();

        Ok(Self { owner, location_id, grupa_id })
    }

    /// Path with the owner's `?location=` hint appended
    pub fn at(&self, path: &str) -> String {
        let separator = if path.contains('?') { '&' } else { '?' };
        format!("{}{}location={}", path, separator, self.location_id)
    }

    pub async fn enroll(&self, cnp: &str) -> Result<Value> {
        let (status, body) = self
            .owner
            .post(
                &self.at("/api/children"),
                json!({
                    "cnp": cnp,
                    "nume": "Ionescu",
                    "prenume": "Maria",
                    "parinte1": { "nume": "Elena Ionescu", "telefon": "0722000000" },
                    "contract": { "taxaLunara": 1200, "meseIncluse": 3, "tipAbonament": "full" },
                    "grupaId": self.grupa_id
                }),
            )
            .await?;
        anyhow::ensure!(status == StatusCode::CREATED, "enroll failed: {} {}", status, body);
        Ok(body["data"].clone())
    }

    pub async fn add_staff(&self) -> Result<Api> {
        let email = unique_email("educatoare");
        let (status, body) = self
            .owner
            .post(
                "/api/admin/staff",
                json!({
                    "email": email,
                    "password": "parola-sigura",
                    "name": "Ioana Dumitru",
                    "locationId": self.location_id,
                    "grupaId": self.grupa_id
                }),
            )
            .await?;
        anyhow::ensure!(status == StatusCode::CREATED, "staff create failed: {} {}", status, body);
        self.owner.login(&email, "parola-sigura").await
    }

    /// Returns the guardian's client and uid
    pub async fn add_guardian(&self, cnp: &str) -> Result<(Api, String)> {
        let email = unique_email("parinte");
        let (status, body) = self
            .owner
            .post(
                "/api/admin/guardians",
                json!({
                    "email": email,
                    "password": "parola-sigura",
                    "name": "Elena Ionescu",
                    "locationId": self.location_id,
                    "copilCnp": cnp
                }),
            )
            .await?;
        anyhow::ensure!(status == StatusCode::CREATED, "guardian create failed: {} {}", status, body);
        let uid = body["data"]["uid"].as_str().context("guardian uid")?.to_string();
        Ok((self.owner.login(&email, "parola-sigura").await?, uid))
    }
}
