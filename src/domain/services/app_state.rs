#[cfg(test)]
#[path = "app_state_test.rs"]
mod tests;

use std::time::Duration;
use std::time::Instant;

use ratatui::prelude::Rect;

use super::BubbleList;
use super::ChatController;
use super::LocalStore;
use super::Notifications;
use super::Scroll;
use super::SendError;
use super::SessionBootstrapper;
use crate::domain::models::Action;
use crate::domain::models::Author;
use crate::domain::models::BootstrapTicket;
use crate::domain::models::ChatResponse;
use crate::domain::models::ChatTicket;
use crate::domain::models::Loading;
use crate::domain::models::Message;
use crate::domain::models::Severity;

const TYPING_FRAMES: [&str; 3] = [".  ", ".. ", "..."];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    /// Only the URL input is usable.
    Input,
    /// A scrape is in flight.
    Loading,
    /// The transcript and message input are visible.
    Chat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Focus {
    Url,
    Message,
}

pub struct AppState {
    pub bootstrapper: SessionBootstrapper,
    pub bubble_list: BubbleList,
    pub chat: ChatController,
    pub focus: Focus,
    pub last_known_height: u16,
    pub last_known_width: u16,
    pub loading: Loading,
    pub messages: Vec<Message>,
    pub notifications: Notifications,
    pub phase: Phase,
    pub scroll: Scroll,
    pub store: LocalStore,
    pub tick: usize,
}

impl AppState {
    pub fn new(store: LocalStore, notification_timeout: Duration) -> AppState {
        return AppState {
            bootstrapper: SessionBootstrapper::default(),
            bubble_list: BubbleList::default(),
            chat: ChatController::default(),
            focus: Focus::Url,
            last_known_height: 0,
            last_known_width: 0,
            loading: Loading::default(),
            messages: vec![Message::welcome()],
            notifications: Notifications::new(notification_timeout),
            phase: Phase::Input,
            scroll: Scroll::default(),
            store,
            tick: 0,
        };
    }

    pub async fn submit_url(&mut self, url: &str) -> Option<Action> {
        let ticket = match self.bootstrapper.begin(&mut self.store, url) {
            Some(ticket) => ticket,
            None => {
                self.notifications
                    .push("Please enter a valid URL", Severity::Error);
                return None;
            }
        };

        self.chat.disable();
        self.focus = Focus::Url;
        self.phase = Phase::Loading;
        self.loading = Loading::new("Processing website...");
        self.persist().await;

        return Some(Action::Bootstrap(ticket));
    }

    pub async fn handle_scrape_success(&mut self, ticket: &BootstrapTicket, session_id: &str) {
        let context = match self
            .bootstrapper
            .complete(&mut self.store, ticket, session_id)
        {
            Some(context) => context,
            None => return,
        };

        // Only the static welcome message survives a new session.
        self.messages.truncate(1);
        self.bubble_list.clear();
        self.chat.enable(context);
        self.phase = Phase::Chat;
        self.focus = Focus::Message;
        self.sync_dependants();
        self.scroll.last();

        self.notifications.push(
            &format!("Website {} scraped successfully!", ticket.url),
            Severity::Success,
        );
        self.persist().await;
    }

    pub fn handle_scrape_failure(&mut self, ticket: &BootstrapTicket, err: &str) {
        if !self.bootstrapper.is_current(ticket) {
            tracing::warn!(
                url = ticket.url,
                generation = ticket.generation,
                current = self.bootstrapper.generation(),
                "Dropping scrape failure for a superseded request"
            );
            return;
        }

        tracing::error!(url = ticket.url, error = err, "Error scraping website");
        self.phase = Phase::Input;
        self.focus = Focus::Url;
        self.notifications.push(
            "Failed to scrape website. Please try again.",
            Severity::Error,
        );
    }

    pub fn send_message(&mut self, input: &str) -> Option<Action> {
        let ticket = match self.chat.begin_send(input) {
            Ok(ticket) => ticket,
            Err(err) => {
                let mut severity = Severity::Warning;
                if err == SendError::Busy {
                    severity = Severity::Info;
                }

                self.notifications.push(&err.to_string(), severity);
                return None;
            }
        };

        self.add_message(Message::new(Author::User, &ticket.query));

        return Some(Action::Chat(ticket));
    }

    pub async fn handle_chat_response(&mut self, ticket: &ChatTicket, res: ChatResponse) {
        if let Some(messages) = self.chat.reconcile(&mut self.store, ticket, res) {
            for message in messages {
                self.add_message(message);
            }
        }
        self.persist().await;
    }

    pub fn handle_chat_failure(&mut self, ticket: &ChatTicket, err: &str) {
        if let Some(message) = self.chat.fail(ticket, err) {
            self.add_message(message);
        }
    }

    pub fn toggle_focus(&mut self) {
        if self.focus == Focus::Url && self.chat.is_enabled() {
            self.focus = Focus::Message;
        } else {
            self.focus = Focus::Url;
        }
    }

    pub fn on_tick(&mut self, now: Instant) {
        self.tick = self.tick.wrapping_add(1);
        self.notifications.prune(now);
        if self.chat.is_busy() {
            self.sync_dependants();
        }
    }

    pub fn typing_message(&self) -> Option<Message> {
        if !self.chat.is_busy() {
            return None;
        }

        let frame = TYPING_FRAMES[self.tick % TYPING_FRAMES.len()];
        return Some(Message::new(Author::Bot, frame));
    }

    pub fn set_rect(&mut self, rect: Rect) {
        self.last_known_width = rect.width;
        self.last_known_height = rect.height;
        self.sync_dependants();
    }

    pub fn add_message(&mut self, message: Message) {
        self.messages.push(message);
        self.sync_dependants();
        self.scroll.last();
    }

    /// Writes pending store changes. A failed write keeps the in-memory session usable and
    /// warns once per failed attempt.
    async fn persist(&mut self) {
        if let Err(err) = self.store.flush().await {
            tracing::error!(path = ?self.store.path(), error = ?err, "Failed to write local store");
            self.notifications.push(
                "Unable to save the session locally, it will be lost on exit",
                Severity::Warning,
            );
        }
    }

    fn sync_dependants(&mut self) {
        let typing = self.typing_message();
        self.bubble_list.set_messages(
            &self.messages,
            typing.as_ref(),
            self.last_known_width.into(),
        );

        let pinned = self.scroll.is_at_bottom();
        self.scroll
            .set_state(self.bubble_list.len() as u16, self.last_known_height);

        if pinned || typing.is_some() {
            self.scroll.last();
        }
    }
}
