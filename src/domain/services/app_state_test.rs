use std::fs;
use std::time::Duration;
use std::time::Instant;

use anyhow::bail;
use anyhow::Result;
use ratatui::prelude::Rect;
use tempfile::TempDir;

use super::AppState;
use super::Focus;
use super::Phase;
use crate::domain::models::Action;
use crate::domain::models::Author;
use crate::domain::models::BootstrapTicket;
use crate::domain::models::ChatResponse;
use crate::domain::models::ChatTicket;
use crate::domain::models::Message;
use crate::domain::models::MessageType;
use crate::domain::models::Severity;
use crate::domain::services::LocalStore;
use crate::domain::services::StoreKey;
use crate::domain::services::CHAT_ERROR_TEXT;

fn app_state_with_store(store: LocalStore) -> AppState {
    let mut app_state = AppState::new(store, Duration::from_millis(3000));
    app_state.set_rect(Rect::new(0, 0, 100, 300));
    return app_state;
}

fn app_state() -> AppState {
    return app_state_with_store(LocalStore::in_memory());
}

async fn submit(app_state: &mut AppState, url: &str) -> Result<BootstrapTicket> {
    match app_state.submit_url(url).await {
        Some(Action::Bootstrap(ticket)) => return Ok(ticket),
        _ => bail!("Expected a bootstrap action"),
    }
}

fn send(app_state: &mut AppState, text: &str) -> Result<ChatTicket> {
    match app_state.send_message(text) {
        Some(Action::Chat(ticket)) => return Ok(ticket),
        _ => bail!("Expected a chat action"),
    }
}

async fn chatting(session_id: &str, url: &str) -> Result<AppState> {
    let mut app_state = app_state();
    let ticket = submit(&mut app_state, url).await?;
    app_state.handle_scrape_success(&ticket, session_id).await;
    return Ok(app_state);
}

fn answer(text: &str) -> ChatResponse {
    return ChatResponse {
        response: text.to_string(),
        session_id: None,
        url: None,
    };
}

#[test]
fn it_starts_on_the_url_input() {
    let app_state = app_state();
    assert_eq!(app_state.phase, Phase::Input);
    assert_eq!(app_state.focus, Focus::Url);
    assert_eq!(app_state.messages.len(), 1);
    assert_eq!(app_state.messages[0].text, Message::welcome().text);
    assert!(!app_state.chat.is_enabled());
}

#[tokio::test]
async fn it_rejects_a_blank_url() -> Result<()> {
    let mut app_state = app_state();
    assert!(app_state.submit_url("   ").await.is_none());

    assert_eq!(app_state.phase, Phase::Input);
    assert_eq!(app_state.notifications.items().len(), 1);
    assert_eq!(app_state.notifications.items()[0].severity, Severity::Error);
    assert_eq!(
        app_state.notifications.items()[0].message,
        "Please enter a valid URL"
    );
    return Ok(());
}

#[tokio::test]
async fn it_shows_loading_while_scraping() -> Result<()> {
    let mut app_state = app_state();
    app_state.store.set(StoreKey::CurrentSessionId, "stale");

    let ticket = submit(&mut app_state, "https://example.com").await?;
    assert_eq!(ticket.url, "https://example.com");
    assert_eq!(app_state.phase, Phase::Loading);
    assert_eq!(app_state.loading.text, "Processing website...");
    assert_eq!(app_state.store.get(StoreKey::CurrentSessionId), None);
    assert!(!app_state.chat.is_enabled());
    return Ok(());
}

#[tokio::test]
async fn it_enables_chat_after_a_successful_scrape() -> Result<()> {
    let app_state = chatting("abc", "https://example.com").await?;

    assert_eq!(app_state.phase, Phase::Chat);
    assert_eq!(app_state.focus, Focus::Message);
    assert!(app_state.chat.is_enabled());
    assert_eq!(
        app_state.store.get(StoreKey::CurrentSessionId),
        Some("abc".to_string())
    );
    assert_eq!(
        app_state.store.get(StoreKey::CurrentUrl),
        Some("https://example.com".to_string())
    );

    let notification = &app_state.notifications.items()[0];
    assert_eq!(notification.severity, Severity::Success);
    assert_eq!(
        notification.message,
        "Website https://example.com scraped successfully!"
    );
    return Ok(());
}

#[tokio::test]
async fn it_ignores_a_superseded_scrape() -> Result<()> {
    let mut app_state = app_state();
    let first = submit(&mut app_state, "https://one.example.com").await?;
    let second = submit(&mut app_state, "https://two.example.com").await?;

    app_state.handle_scrape_success(&first, "one").await;
    assert_eq!(app_state.phase, Phase::Loading);
    assert!(!app_state.chat.is_enabled());

    app_state.handle_scrape_failure(&first, "boom");
    assert_eq!(app_state.phase, Phase::Loading);
    assert!(app_state.notifications.items().is_empty());

    app_state.handle_scrape_success(&second, "two").await;
    assert_eq!(app_state.chat.context().unwrap().id, "two");
    return Ok(());
}

#[tokio::test]
async fn it_shows_exactly_one_error_on_scrape_failure() -> Result<()> {
    let mut app_state = app_state();
    let ticket = submit(&mut app_state, "https://example.com").await?;
    app_state.handle_scrape_failure(&ticket, "connection refused");

    assert_eq!(app_state.phase, Phase::Input);
    assert_eq!(app_state.focus, Focus::Url);
    assert!(!app_state.chat.is_enabled());
    assert_eq!(app_state.notifications.items().len(), 1);
    assert_eq!(
        app_state.notifications.items()[0].message,
        "Failed to scrape website. Please try again."
    );
    assert_eq!(app_state.messages.len(), 1);
    return Ok(());
}

#[tokio::test]
async fn it_warns_on_an_empty_message() -> Result<()> {
    let mut app_state = chatting("abc", "https://example.com").await?;
    assert!(app_state.send_message("  \n ").is_none());

    assert_eq!(app_state.messages.len(), 1);
    assert!(!app_state.chat.is_busy());
    let notification = app_state.notifications.items().last().unwrap();
    assert_eq!(notification.severity, Severity::Warning);
    return Ok(());
}

#[tokio::test]
async fn it_serializes_questions() -> Result<()> {
    let mut app_state = chatting("abc", "https://example.com").await?;
    send(&mut app_state, "one")?;

    assert!(app_state.send_message("two").is_none());
    assert_eq!(app_state.messages.len(), 2);
    let notification = app_state.notifications.items().last().unwrap();
    assert_eq!(notification.severity, Severity::Info);
    return Ok(());
}

#[test]
fn it_refuses_to_send_before_a_session_exists() {
    let mut app_state = app_state();
    assert!(app_state.send_message("hello").is_none());
    assert_eq!(app_state.messages.len(), 1);
}

#[tokio::test]
async fn it_appends_the_question_and_shows_typing() -> Result<()> {
    let mut app_state = chatting("abc", "https://example.com").await?;
    let ticket = send(&mut app_state, "  What is this?  ")?;

    assert_eq!(ticket.session_id, "abc");
    assert_eq!(ticket.query, "What is this?");
    assert_eq!(app_state.messages.len(), 2);
    assert_eq!(app_state.messages[1].author, Author::User);
    assert_eq!(app_state.messages[1].text, "What is this?");
    assert!(app_state.chat.is_busy());
    assert!(app_state.typing_message().is_some());
    return Ok(());
}

#[tokio::test]
async fn it_scopes_every_question_to_the_session() -> Result<()> {
    let mut app_state = chatting("abc", "https://example.com").await?;

    let first = send(&mut app_state, "one")?;
    app_state.handle_chat_response(&first, answer("first")).await;
    assert!(!app_state.chat.is_busy());

    let second = send(&mut app_state, "two")?;
    assert!(app_state.chat.is_busy());
    app_state.handle_chat_response(&second, answer("second")).await;

    let third = send(&mut app_state, "three")?;

    for ticket in [&first, &second, &third] {
        assert_eq!(ticket.session_id, "abc");
    }
    assert_eq!(app_state.messages[2].author, Author::Bot);
    assert_eq!(app_state.messages[2].text, "first");
    assert_eq!(app_state.messages[4].text, "second");
    assert_eq!(app_state.messages[5].text, "three");
    return Ok(());
}

#[tokio::test]
async fn it_adopts_the_session_the_server_reports() -> Result<()> {
    let mut app_state = chatting("abc", "https://example.com").await?;

    let ticket = send(&mut app_state, "one")?;
    app_state
        .handle_chat_response(
            &ticket,
            ChatResponse {
                response: "ok".to_string(),
                session_id: Some("xyz".to_string()),
                url: Some("https://example.com".to_string()),
            },
        )
        .await;

    assert_eq!(
        app_state.store.get(StoreKey::CurrentSessionId),
        Some("xyz".to_string())
    );
    assert_eq!(app_state.messages.len(), 3);
    assert_eq!(send(&mut app_state, "two")?.session_id, "xyz");
    return Ok(());
}

#[tokio::test]
async fn it_discloses_a_different_url_once() -> Result<()> {
    let mut app_state = chatting("abc", "https://example.com").await?;
    let other = ChatResponse {
        response: "ok".to_string(),
        session_id: Some("abc".to_string()),
        url: Some("https://other.example.com".to_string()),
    };

    let ticket = send(&mut app_state, "one")?;
    app_state.handle_chat_response(&ticket, other.clone()).await;
    let ticket = send(&mut app_state, "two")?;
    app_state.handle_chat_response(&ticket, other).await;

    let disclosures = app_state
        .messages
        .iter()
        .filter(|e| return e.message_type() == MessageType::Info)
        .collect::<Vec<_>>();
    assert_eq!(disclosures.len(), 1);
    assert_eq!(
        disclosures[0].text,
        "Note: This response is based on content from: https://other.example.com"
    );
    return Ok(());
}

#[tokio::test]
async fn it_shows_an_error_message_when_chat_fails() -> Result<()> {
    let mut app_state = chatting("abc", "https://example.com").await?;
    let ticket = send(&mut app_state, "one")?;
    app_state.handle_chat_failure(&ticket, "500");

    assert!(!app_state.chat.is_busy());
    let last = app_state.messages.last().unwrap();
    assert_eq!(last.message_type(), MessageType::Error);
    assert_eq!(last.text, CHAT_ERROR_TEXT);

    // The controller is usable again.
    assert!(send(&mut app_state, "two").is_ok());
    return Ok(());
}

#[tokio::test]
async fn it_resets_the_transcript_for_a_new_session() -> Result<()> {
    let mut app_state = chatting("abc", "https://example.com").await?;
    let ticket = send(&mut app_state, "one")?;
    app_state.handle_chat_response(&ticket, answer("first")).await;
    assert_eq!(app_state.messages.len(), 3);

    let ticket = submit(&mut app_state, "https://other.example.com").await?;
    app_state.handle_scrape_success(&ticket, "def").await;

    assert_eq!(app_state.messages.len(), 1);
    assert_eq!(app_state.messages[0].text, Message::welcome().text);
    assert_eq!(send(&mut app_state, "again")?.session_id, "def");
    return Ok(());
}

#[tokio::test]
async fn it_drops_answers_from_a_previous_session() -> Result<()> {
    let mut app_state = chatting("abc", "https://example.com").await?;
    let old = send(&mut app_state, "one")?;

    let ticket = submit(&mut app_state, "https://other.example.com").await?;
    app_state.handle_scrape_success(&ticket, "def").await;
    app_state.handle_chat_response(&old, answer("late")).await;

    assert_eq!(app_state.messages.len(), 1);
    return Ok(());
}

#[tokio::test]
async fn it_only_focuses_the_message_input_while_chatting() -> Result<()> {
    let mut app_state = app_state();
    app_state.toggle_focus();
    assert_eq!(app_state.focus, Focus::Url);

    let mut app_state = chatting("abc", "https://example.com").await?;
    app_state.toggle_focus();
    assert_eq!(app_state.focus, Focus::Url);
    app_state.toggle_focus();
    assert_eq!(app_state.focus, Focus::Message);
    return Ok(());
}

#[test]
fn it_expires_notifications_on_tick() {
    let mut app_state = app_state();
    app_state.notifications.push("hello", Severity::Info);

    app_state.on_tick(Instant::now());
    assert_eq!(app_state.notifications.items().len(), 1);

    app_state.on_tick(Instant::now() + Duration::from_millis(3001));
    assert!(app_state.notifications.items().is_empty());
    assert_eq!(app_state.tick, 2);
}

#[tokio::test]
async fn it_keeps_chatting_when_the_store_cannot_be_written() -> Result<()> {
    let dir = TempDir::new()?;
    let blocker = dir.path().join("blocker");
    fs::write(&blocker, "not a directory")?;

    let store = LocalStore::open(&blocker.join("local_store.yaml")).await?;
    let mut app_state = app_state_with_store(store);

    let ticket = submit(&mut app_state, "https://example.com").await?;
    app_state.handle_scrape_success(&ticket, "abc").await;

    assert_eq!(app_state.phase, Phase::Chat);
    assert_eq!(app_state.focus, Focus::Message);
    assert!(app_state.chat.is_enabled());
    assert_eq!(
        app_state.store.get(StoreKey::CurrentSessionId),
        Some("abc".to_string())
    );
    let warnings = app_state
        .notifications
        .items()
        .iter()
        .filter(|e| return e.severity == Severity::Warning)
        .count();
    assert_eq!(warnings, 1);

    let question = send(&mut app_state, "still there?")?;
    app_state
        .handle_chat_response(
            &question,
            ChatResponse {
                response: "yes".to_string(),
                session_id: Some("xyz".to_string()),
                url: None,
            },
        )
        .await;

    assert!(!app_state.chat.is_busy());
    assert_eq!(app_state.messages.last().unwrap().text, "yes");
    assert_eq!(
        app_state.store.get(StoreKey::CurrentSessionId),
        Some("xyz".to_string())
    );
    return Ok(());
}
