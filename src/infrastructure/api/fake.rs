use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::Mutex;

use anyhow::bail;
use anyhow::Result;
use async_trait::async_trait;

use crate::domain::models::Api;
use crate::domain::models::ApiHandle;
use crate::domain::models::ApiKeyStatus;
use crate::domain::models::ChatRequest;
use crate::domain::models::ChatResponse;
use crate::domain::models::ClearSessionsResponse;
use crate::domain::models::ScrapeRequest;
use crate::domain::models::ScrapeResponse;

/// In-memory server that records every call it receives.
#[derive(Default)]
pub struct FakeApi {
    pub calls: Mutex<Vec<String>>,
    pub chat_responses: Mutex<VecDeque<ChatResponse>>,
    pub fail_chat: bool,
    pub fail_clear: bool,
    pub fail_scrape: bool,
    pub session_id: String,
}

impl FakeApi {
    pub fn with_session(session_id: &str) -> FakeApi {
        return FakeApi {
            session_id: session_id.to_string(),
            ..FakeApi::default()
        };
    }

    pub fn handle(self) -> (Arc<FakeApi>, ApiHandle) {
        let fake = Arc::new(self);
        let handle: ApiHandle = fake.clone();
        return (fake, handle);
    }

    pub fn push_chat_response(&self, res: ChatResponse) {
        self.chat_responses.lock().unwrap().push_back(res);
    }

    pub fn calls(&self) -> Vec<String> {
        return self.calls.lock().unwrap().clone();
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl Api for FakeApi {
    async fn clear_sessions(&self) -> Result<ClearSessionsResponse> {
        self.record("clear_sessions".to_string());
        if self.fail_clear {
            bail!("Connection refused");
        }

        return Ok(ClearSessionsResponse {
            message: "All sessions cleared".to_string(),
        });
    }

    async fn check_api_key(&self) -> Result<ApiKeyStatus> {
        self.record("check_api_key".to_string());
        return Ok(ApiKeyStatus { has_api_key: true });
    }

    async fn scrape(&self, req: ScrapeRequest) -> Result<ScrapeResponse> {
        self.record(format!("scrape {}", req.url));
        if self.fail_scrape {
            bail!("Failed to scrape website");
        }

        return Ok(ScrapeResponse {
            session_id: self.session_id.to_string(),
        });
    }

    async fn chat(&self, req: ChatRequest) -> Result<ChatResponse> {
        self.record(format!("chat {} {}", req.session_id, req.query));
        if self.fail_chat {
            bail!("Failed to get response");
        }

        if let Some(res) = self.chat_responses.lock().unwrap().pop_front() {
            return Ok(res);
        }

        return Ok(ChatResponse {
            response: format!("You asked: {}", req.query),
            session_id: None,
            url: None,
        });
    }
}
