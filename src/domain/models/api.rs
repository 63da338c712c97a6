use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use serde::Deserialize;
use serde::Serialize;

#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClearSessionsResponse {
    pub message: String,
}

#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiKeyStatus {
    pub has_api_key: bool,
}

#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScrapeRequest {
    pub url: String,
}

#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScrapeResponse {
    pub session_id: String,
}

#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatRequest {
    pub session_id: String,
    pub query: String,
}

#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatResponse {
    pub response: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

/// The scrape-and-chat server. Any transport failure or non-2xx status is an `Err`.
#[async_trait]
pub trait Api {
    /// Invalidates every session the server holds.
    async fn clear_sessions(&self) -> Result<ClearSessionsResponse>;

    /// Informational only. A missing key on the server never blocks the client.
    async fn check_api_key(&self) -> Result<ApiKeyStatus>;

    /// Scrapes the page and returns the identifier of the session bound to its content.
    async fn scrape(&self, req: ScrapeRequest) -> Result<ScrapeResponse>;

    async fn chat(&self, req: ChatRequest) -> Result<ChatResponse>;
}

pub type ApiHandle = Arc<dyn Api + Send + Sync>;
