//! Upstream chat-completions client.
//!
//! The browser never sees the upstream token; it posts a prompt here and
//! this client forwards it with the configured bearer token and a bounded
//! timeout.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::config::schema::ChatConfig;
use crate::error::ApiError;

/// Body accepted on `POST /api/chat`.
#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub prompt: String,
}

#[derive(Serialize)]
struct UpstreamMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Serialize)]
struct UpstreamRequest<'a> {
    model: &'a str,
    messages: Vec<UpstreamMessage<'a>>,
}

#[derive(Deserialize)]
struct UpstreamChoiceMessage {
    content: String,
}

#[derive(Deserialize)]
struct UpstreamChoice {
    message: UpstreamChoiceMessage,
}

#[derive(Deserialize)]
struct UpstreamResponse {
    #[serde(default)]
    choices: Vec<UpstreamChoice>,
}

/// Client for the chat-completions upstream.
pub struct ChatClient {
    client: reqwest::Client,
    config: ChatConfig,
}

impl ChatClient {
    pub fn new(config: ChatConfig, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { client, config })
    }

    /// Forward one prompt upstream and return the assistant's reply.
    /// Timeouts and upstream errors map to delivery failures; the caller
    /// never sees upstream detail.
    pub async fn complete(&self, prompt: &str) -> Result<String, ApiError> {
        let request = UpstreamRequest {
            model: &self.config.model,
            messages: vec![UpstreamMessage {
                role: "user",
                content: prompt,
            }],
        };

        let response = self
            .client
            .post(&self.config.api_url)
            .bearer_auth(&self.config.token)
            .json(&request)
            .send()
            .await
            .map_err(|e| ApiError::Delivery(format!("chat upstream: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::Delivery(format!(
                "chat upstream returned status {}",
                status
            )));
        }

        let parsed: UpstreamResponse = response
            .json()
            .await
            .map_err(|e| ApiError::Delivery(format!("chat upstream body: {}", e)))?;

        parsed
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or_else(|| ApiError::Delivery("chat upstream returned no choices".to_string()))
    }
}
