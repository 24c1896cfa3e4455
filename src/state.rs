use anyhow::Context;
use std::sync::Arc;

use crate::ai::{CompletionClient, HttpCompletionClient};
use crate::config::AppConfig;
use crate::database::{DocumentStore, MemoryDocumentStore};
use crate::identity::IdentityResolver;
use crate::services::attendance_service::AttendanceDefaults;
use crate::types::hhmm;

/// Shared handles passed to every handler and middleware
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn DocumentStore>,
    pub resolver: Arc<IdentityResolver>,
    pub jwt_secret: Arc<str>,
    pub jwt_expiry_hours: u64,
    pub attendance: AttendanceDefaults,
    pub ai: Option<Arc<dyn CompletionClient>>,
}

impl AppState {
    pub fn new(store: Arc<dyn DocumentStore>, jwt_secret: &str) -> Self {
        Self {
            resolver: Arc::new(IdentityResolver::standard(store.clone())),
            store,
            jwt_secret: Arc::from(jwt_secret),
            jwt_expiry_hours: 24,
            attendance: AttendanceDefaults::default(),
            ai: None,
        }
    }

    /// State wired from configuration; the AI client is built when an endpoint is set.
    pub fn from_config(store: Arc<dyn DocumentStore>, config: &AppConfig) -> anyhow::Result<Self> {
        let check_in = hhmm::parse(&config.attendance.default_check_in)
            .with_context(|| format!("invalid ATTENDANCE_DEFAULT_CHECK_IN '{}'", config.attendance.default_check_in))?;
        let check_out = hhmm::parse(&config.attendance.default_check_out)
            .with_context(|| format!("invalid ATTENDANCE_DEFAULT_CHECK_OUT '{}'", config.attendance.default_check_out))?;

        let ai = HttpCompletionClient::from_config(&config.ai)
            .context("failed to build AI client")?
            .map(|client| Arc::new(client) as Arc<dyn CompletionClient>);

        let mut state = Self::new(store, &config.security.jwt_secret);
        state.jwt_expiry_hours = config.security.jwt_expiry_hours;
        state.attendance = AttendanceDefaults { check_in, check_out };
        state.ai = ai;
        Ok(state)
    }

    /// Fresh in-memory state, used by tests and `STORE_BACKEND=memory`
    pub fn in_memory(jwt_secret: &str) -> Self {
        Self::new(Arc::new(MemoryDocumentStore::new()), jwt_secret)
    }

    pub fn with_ai(mut self, client: Arc<dyn CompletionClient>) -> Self {
        self.ai = Some(client);
        self
    }
}
