use anyhow::{Context, Result};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::TurnEndpoint;

/// Body of `POST /chat`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TurnRequest {
    pub user_input: String,
    /// `null` until the backend has assigned a session.
    pub session_id: Option<String>,
}

/// Successful reply from `POST /chat`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TurnReply {
    pub session_id: String,
    pub final_response: String,
    #[serde(default)]
    pub thoughts: Option<Vec<String>>,
}

/// HTTP client for the turn endpoint.
pub struct TurnClient {
    client: Client,
    url: String,
}

impl TurnClient {
    /// `endpoint` is the backend base URL; the turn path is appended.
    pub fn new(endpoint: &str) -> Self {
        Self {
            client: Client::new(),
            url: format!("{}/chat", endpoint.trim_end_matches('/')),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

impl TurnEndpoint for TurnClient {
    async fn send_turn(&self, request: &TurnRequest) -> Result<TurnReply> {
        debug!(url = %self.url, has_session = request.session_id.is_some(), "sending turn");

        let response = self
            .client
            .post(&self.url)
            .json(request)
            .send()
            .await
            .with_context(|| format!("Failed to connect to turn endpoint: {}", self.url))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Turn request failed with status {status}: {body}");
        }

        let reply = response
            .json::<TurnReply>()
            .await
            .context("Failed to parse turn endpoint response")?;
        debug!(session_id = %reply.session_id, "turn reply received");
        Ok(reply)
    }
}
