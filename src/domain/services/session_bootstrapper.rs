#[cfg(test)]
#[path = "session_bootstrapper_test.rs"]
mod tests;

use anyhow::Result;

use super::LocalStore;
use super::StoreKey;
use crate::domain::models::ApiHandle;
use crate::domain::models::BootstrapTicket;
use crate::domain::models::ScrapeRequest;
use crate::domain::models::SessionContext;

/// Turns a URL into a chat session: invalidate whatever the server holds, scrape, then hand the
/// returned session to the chat controller. Each submission gets a new generation, and only the
/// most recent generation may complete.
#[derive(Default)]
pub struct SessionBootstrapper {
    generation: u64,
}

impl SessionBootstrapper {
    pub fn generation(&self) -> u64 {
        return self.generation;
    }

    /// Returns `None` without touching any state when the URL is blank.
    pub fn begin(&mut self, store: &mut LocalStore, url: &str) -> Option<BootstrapTicket> {
        let url = url.trim();
        if url.is_empty() {
            return None;
        }

        store.remove(StoreKey::CurrentSessionId);
        store.remove(StoreKey::CurrentUrl);

        self.generation += 1;
        tracing::info!(url, generation = self.generation, "Starting to scrape new URL");

        return Some(BootstrapTicket {
            url: url.to_string(),
            generation: self.generation,
        });
    }

    pub fn is_current(&self, ticket: &BootstrapTicket) -> bool {
        return ticket.generation == self.generation;
    }

    /// Clears every server-side session, then scrapes. A failure of either call aborts the whole
    /// flow so a scrape never runs against stale server state.
    pub async fn run(api: &ApiHandle, ticket: &BootstrapTicket) -> Result<String> {
        let cleared = api.clear_sessions().await?;
        tracing::debug!(message = cleared.message, "Server sessions cleared");

        let res = api
            .scrape(ScrapeRequest {
                url: ticket.url.to_string(),
            })
            .await?;

        return Ok(res.session_id);
    }

    pub fn complete(
        &self,
        store: &mut LocalStore,
        ticket: &BootstrapTicket,
        session_id: &str,
    ) -> Option<SessionContext> {
        if !self.is_current(ticket) {
            tracing::warn!(
                url = ticket.url,
                generation = ticket.generation,
                current = self.generation,
                "Dropping scrape result for a superseded request"
            );
            return None;
        }

        store.set(StoreKey::CurrentSessionId, session_id);
        store.set(StoreKey::CurrentUrl, &ticket.url);

        return Some(SessionContext::new(
            session_id,
            &ticket.url,
            ticket.generation,
        ));
    }
}
