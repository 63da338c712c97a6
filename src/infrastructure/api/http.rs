#[cfg(test)]
#[path = "http_test.rs"]
mod tests;

use anyhow::bail;
use anyhow::Result;
use async_trait::async_trait;
use serde::de::DeserializeOwned;

use crate::configuration::Config;
use crate::configuration::ConfigKey;
use crate::domain::models::Api;
use crate::domain::models::ApiKeyStatus;
use crate::domain::models::ChatRequest;
use crate::domain::models::ChatResponse;
use crate::domain::models::ClearSessionsResponse;
use crate::domain::models::ScrapeRequest;
use crate::domain::models::ScrapeResponse;

async fn parse_json<T: DeserializeOwned>(res: reqwest::Response, what: &str) -> Result<T> {
    if !res.status().is_success() {
        tracing::error!(status = res.status().as_u16(), what, "Request failed");
        bail!(format!("Failed to {what}: server returned {}", res.status()));
    }

    return Ok(res.json::<T>().await?);
}

/// JSON over HTTP client for the scrape-and-chat server.
pub struct HttpApi {
    client: reqwest::Client,
    url: String,
}

impl Default for HttpApi {
    fn default() -> HttpApi {
        return HttpApi::new(&Config::get(ConfigKey::ServerURL));
    }
}

impl HttpApi {
    pub fn new(url: &str) -> HttpApi {
        return HttpApi {
            client: reqwest::Client::new(),
            url: url.trim_end_matches('/').to_string(),
        };
    }

    fn endpoint(&self, path: &str) -> String {
        return format!("{url}/api/{path}", url = self.url);
    }
}

#[async_trait]
impl Api for HttpApi {
    #[allow(clippy::implicit_return)]
    async fn clear_sessions(&self) -> Result<ClearSessionsResponse> {
        let res = self
            .client
            .post(self.endpoint("clear_sessions"))
            .send()
            .await?;

        return parse_json(res, "clear sessions").await;
    }

    #[allow(clippy::implicit_return)]
    async fn check_api_key(&self) -> Result<ApiKeyStatus> {
        let res = self
            .client
            .get(self.endpoint("check_api_key"))
            .send()
            .await?;

        return parse_json(res, "check API key").await;
    }

    #[allow(clippy::implicit_return)]
    async fn scrape(&self, req: ScrapeRequest) -> Result<ScrapeResponse> {
        let res = self
            .client
            .post(self.endpoint("scrape"))
            .json(&req)
            .send()
            .await?;

        return parse_json(res, "scrape website").await;
    }

    #[allow(clippy::implicit_return)]
    async fn chat(&self, req: ChatRequest) -> Result<ChatResponse> {
        let res = self
            .client
            .post(self.endpoint("chat"))
            .json(&req)
            .send()
            .await?;

        let chat_res = parse_json::<ChatResponse>(res, "get response").await?;
        tracing::debug!(body = ?chat_res, "Chat response");

        return Ok(chat_res);
    }
}
