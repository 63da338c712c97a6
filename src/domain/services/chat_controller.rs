#[cfg(test)]
#[path = "chat_controller_test.rs"]
mod tests;

use std::fmt;

use anyhow::Result;

use super::LocalStore;
use super::StoreKey;
use crate::domain::models::ApiHandle;
use crate::domain::models::Author;
use crate::domain::models::ChatRequest;
use crate::domain::models::ChatResponse;
use crate::domain::models::ChatTicket;
use crate::domain::models::Message;
use crate::domain::models::MessageType;
use crate::domain::models::SessionContext;

pub const CHAT_ERROR_TEXT: &str =
    "Sorry, I encountered an error processing your request. Please try again.";

#[derive(Debug, PartialEq, Eq)]
pub enum SendError {
    Empty,
    NotEnabled,
    Busy,
}

impl fmt::Display for SendError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SendError::Empty => return f.write_str("Please enter a message"),
            SendError::NotEnabled => {
                return f.write_str("Scrape a website before asking questions about it")
            }
            SendError::Busy => return f.write_str("Still waiting for the previous answer"),
        }
    }
}

/// Sends questions scoped to the active session and reconciles what the server reports back
/// against the locally stored session and URL. One request is in flight at a time.
#[derive(Default)]
pub struct ChatController {
    context: Option<SessionContext>,
    in_flight: Option<u64>,
    sequence: u64,
}

impl ChatController {
    /// Binds to a session. Calling this again simply rebinds, there is no per-call registration
    /// to undo.
    pub fn enable(&mut self, context: SessionContext) {
        tracing::info!(session_id = context.id, url = context.url, "Chat enabled");
        self.context = Some(context);
        self.in_flight = None;
    }

    pub fn disable(&mut self) {
        self.context = None;
        self.in_flight = None;
    }

    pub fn context(&self) -> Option<&SessionContext> {
        return self.context.as_ref();
    }

    pub fn is_enabled(&self) -> bool {
        return self.context.is_some();
    }

    pub fn is_busy(&self) -> bool {
        return self.in_flight.is_some();
    }

    pub fn begin_send(&mut self, input: &str) -> Result<ChatTicket, SendError> {
        let query = input.trim();
        if query.is_empty() {
            return Err(SendError::Empty);
        }

        let context = match &self.context {
            Some(context) => context,
            None => return Err(SendError::NotEnabled),
        };

        if self.in_flight.is_some() {
            return Err(SendError::Busy);
        }

        self.sequence += 1;
        self.in_flight = Some(self.sequence);

        return Ok(ChatTicket {
            session_id: context.id.to_string(),
            query: query.to_string(),
            generation: context.generation,
            sequence: self.sequence,
        });
    }

    pub async fn run(api: &ApiHandle, ticket: &ChatTicket) -> Result<ChatResponse> {
        return api
            .chat(ChatRequest {
                session_id: ticket.session_id.to_string(),
                query: ticket.query.to_string(),
            })
            .await;
    }

    fn accepts(&self, ticket: &ChatTicket) -> bool {
        let generation_matches = self
            .context
            .as_ref()
            .is_some_and(|context| return context.generation == ticket.generation);

        return generation_matches && self.in_flight == Some(ticket.sequence);
    }

    /// Returns the messages to append to the transcript, or `None` when the response belongs to
    /// a request this controller no longer waits for. Store changes are only applied in memory,
    /// the caller flushes them.
    pub fn reconcile(
        &mut self,
        store: &mut LocalStore,
        ticket: &ChatTicket,
        res: ChatResponse,
    ) -> Option<Vec<Message>> {
        if !self.accepts(ticket) {
            tracing::warn!(
                generation = ticket.generation,
                sequence = ticket.sequence,
                "Dropping stale chat response"
            );
            return None;
        }
        self.in_flight = None;

        let mut messages = vec![];
        let current_session_id = store.get(StoreKey::CurrentSessionId);
        let current_url = store.get(StoreKey::CurrentUrl);

        if let Some(session_id) = &res.session_id {
            if current_session_id.as_ref() != Some(session_id) {
                tracing::warn!(
                    response = session_id,
                    current = ?current_session_id,
                    "Session mismatch, adopting the server's session"
                );
                store.set(StoreKey::CurrentSessionId, session_id);
                self.context = self.context.as_ref().map(|e| return e.rebind(session_id));
            }
        }

        if let Some(url) = &res.url {
            if current_url.as_ref() != Some(url) {
                tracing::warn!(response = url, current = ?current_url, "URL mismatch");
                messages.push(Message::new_with_type(
                    Author::Bot,
                    MessageType::Info,
                    &format!("Note: This response is based on content from: {url}"),
                ));
                store.set(StoreKey::CurrentUrl, url);
                self.context = self.context.as_ref().map(|e| return e.with_url(url));
            }
        }

        messages.push(Message::new(Author::Bot, &res.response));

        return Some(messages);
    }

    pub fn fail(&mut self, ticket: &ChatTicket, err: &str) -> Option<Message> {
        if !self.accepts(ticket) {
            tracing::warn!(error = err, "Dropping stale chat failure");
            return None;
        }
        self.in_flight = None;

        tracing::error!(error = err, "Error sending message");
        return Some(Message::new_with_type(
            Author::Bot,
            MessageType::Error,
            CHAT_ERROR_TEXT,
        ));
    }
}
