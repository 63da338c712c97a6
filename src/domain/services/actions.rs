#[cfg(test)]
#[path = "actions_test.rs"]
mod tests;

use anyhow::Result;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use super::ChatController;
use super::SessionBootstrapper;
use crate::domain::models::Action;
use crate::domain::models::ApiHandle;
use crate::domain::models::BootstrapTicket;
use crate::domain::models::ChatTicket;
use crate::domain::models::Event;

async fn clear_sessions(api: ApiHandle) -> Result<()> {
    match api.clear_sessions().await {
        Ok(res) => tracing::info!(message = res.message, "On startup - server sessions cleared"),
        Err(err) => tracing::error!(error = ?err, "Error clearing sessions on startup"),
    }

    return Ok(());
}

async fn check_api_key(api: ApiHandle) -> Result<()> {
    match api.check_api_key().await {
        Ok(res) if res.has_api_key => tracing::info!("Server has an API key configured"),
        Ok(_) => tracing::warn!("Server has no API key configured, chat answers will fail"),
        Err(err) => tracing::error!(error = ?err, "Error checking API key"),
    }

    return Ok(());
}

async fn bootstrap(
    api: ApiHandle,
    ticket: BootstrapTicket,
    tx: mpsc::UnboundedSender<Event>,
) -> Result<()> {
    match SessionBootstrapper::run(&api, &ticket).await {
        Ok(session_id) => tx.send(Event::ScrapeSucceeded(ticket, session_id))?,
        Err(err) => tx.send(Event::ScrapeFailed(ticket, format!("{err:?}")))?,
    }

    return Ok(());
}

async fn chat(api: ApiHandle, ticket: ChatTicket, tx: mpsc::UnboundedSender<Event>) -> Result<()> {
    match ChatController::run(&api, &ticket).await {
        Ok(res) => tx.send(Event::ChatResponded(ticket, res))?,
        Err(err) => tx.send(Event::ChatFailed(ticket, format!("{err:?}")))?,
    }

    return Ok(());
}

/// Runs every network call off the render loop, one task per action.
pub struct ActionsService {}

impl ActionsService {
    pub async fn start(
        api: ApiHandle,
        tx: mpsc::UnboundedSender<Event>,
        rx: &mut mpsc::UnboundedReceiver<Action>,
    ) -> Result<()> {
        // Lazy default.
        let mut bootstrap_worker: JoinHandle<Result<()>> = tokio::spawn(async {
            return Ok(());
        });

        loop {
            let Some(action) = rx.recv().await else {
                return Ok(());
            };

            let worker_api = api.clone();
            let worker_tx = tx.clone();
            match action {
                Action::ClearSessions() => {
                    tokio::spawn(clear_sessions(worker_api));
                }
                Action::CheckApiKey() => {
                    tokio::spawn(check_api_key(worker_api));
                }
                Action::Bootstrap(ticket) => {
                    // Only the newest URL matters, the UI drops older results regardless.
                    bootstrap_worker.abort();
                    bootstrap_worker = tokio::spawn(bootstrap(worker_api, ticket, worker_tx));
                }
                Action::Chat(ticket) => {
                    tokio::spawn(chat(worker_api, ticket, worker_tx));
                }
            }
        }
    }
}
