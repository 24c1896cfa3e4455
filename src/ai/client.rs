use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;
use tracing::{debug, warn};

use super::{AiError, ChatMessage, CompletionClient, ResponseFormat};
use crate::config::AiConfig;

/// OpenAI-compatible `/chat/completions` client
pub struct HttpCompletionClient {
    http: reqwest::Client,
    endpoint: String,
    api_key: Option<String>,
    model: String,
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

impl HttpCompletionClient {
    pub fn new(endpoint: impl Into<String>, api_key: Option<String>, model: impl Into<String>, timeout: Duration) -> Result<Self, AiError> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            endpoint: endpoint.into(),
            api_key,
            model: model.into(),
        })
    }

    /// Builds a client when an endpoint is configured
    pub fn from_config(config: &AiConfig) -> Result<Option<Self>, AiError> {
        match &config.endpoint {
            Some(endpoint) if !endpoint.trim().is_empty() => Self::new(
                endpoint.trim(),
                config.api_key.clone(),
                config.model.clone(),
                Duration::from_secs(config.timeout_secs),
            )
            .map(Some),
            _ => Ok(None),
        }
    }
}

#[async_trait]
impl CompletionClient for HttpCompletionClient {
    async fn complete(&self, messages: &[ChatMessage], format: ResponseFormat) -> Result<String, AiError> {
        let mut body = json!({
            "model": self.model,
            "messages": messages,
        });
        if format == ResponseFormat::Json {
            body["response_format"] = json!({ "type": "json_object" });
        }

        let mut request = self.http.post(&self.endpoint).json(&body);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        debug!("AI completion request to {} ({} messages)", self.endpoint, messages.len());
        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            warn!("AI completion endpoint answered {}", status);
            return Err(AiError::Status(status.as_u16()));
        }

        let parsed: CompletionResponse = response.json().await?;
        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .filter(|c| !c.trim().is_empty())
            .ok_or_else(|| AiError::InvalidResponse("empty completion".to_string()))
    }
}
