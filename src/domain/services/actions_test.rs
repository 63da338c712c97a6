use anyhow::bail;
use anyhow::Result;
use tokio::sync::mpsc;

use super::ActionsService;
use crate::domain::models::Action;
use crate::domain::models::ApiHandle;
use crate::domain::models::BootstrapTicket;
use crate::domain::models::ChatTicket;
use crate::domain::models::Event;
use crate::infrastructure::api::fake::FakeApi;

async fn run_action(api: ApiHandle, action: Action) -> Result<Event> {
    let (action_tx, mut action_rx) = mpsc::unbounded_channel::<Action>();
    let (event_tx, mut event_rx) = mpsc::unbounded_channel::<Event>();

    tokio::spawn(async move {
        return ActionsService::start(api, event_tx, &mut action_rx).await;
    });
    action_tx.send(action)?;

    match event_rx.recv().await {
        Some(event) => return Ok(event),
        None => bail!("Channel closed without an event"),
    }
}

fn bootstrap_ticket(url: &str, generation: u64) -> BootstrapTicket {
    return BootstrapTicket {
        url: url.to_string(),
        generation,
    };
}

#[tokio::test]
async fn it_clears_sessions_before_scraping() -> Result<()> {
    let (fake, api) = FakeApi::with_session("abc").handle();
    let event = run_action(
        api,
        Action::Bootstrap(bootstrap_ticket("https://example.com", 1)),
    )
    .await?;

    match event {
        Event::ScrapeSucceeded(ticket, session_id) => {
            assert_eq!(ticket.generation, 1);
            assert_eq!(session_id, "abc");
        }
        _ => bail!("Wrong event"),
    }

    assert_eq!(
        fake.calls(),
        vec!["clear_sessions", "scrape https://example.com"]
    );
    return Ok(());
}

#[tokio::test]
async fn it_does_not_scrape_when_clearing_fails() -> Result<()> {
    let (fake, api) = FakeApi {
        fail_clear: true,
        ..FakeApi::default()
    }
    .handle();
    let event = run_action(
        api,
        Action::Bootstrap(bootstrap_ticket("https://example.com", 1)),
    )
    .await?;

    match event {
        Event::ScrapeFailed(ticket, err) => {
            assert_eq!(ticket.url, "https://example.com");
            assert!(err.contains("Connection refused"));
        }
        _ => bail!("Wrong event"),
    }

    assert_eq!(fake.calls(), vec!["clear_sessions"]);
    return Ok(());
}

#[tokio::test]
async fn it_reports_scrape_failures() -> Result<()> {
    let (_fake, api) = FakeApi {
        fail_scrape: true,
        ..FakeApi::default()
    }
    .handle();
    let event = run_action(
        api,
        Action::Bootstrap(bootstrap_ticket("https://example.com", 3)),
    )
    .await?;

    match event {
        Event::ScrapeFailed(ticket, _) => assert_eq!(ticket.generation, 3),
        _ => bail!("Wrong event"),
    }

    return Ok(());
}

#[tokio::test]
async fn it_sends_chat_with_the_ticket_session() -> Result<()> {
    let (fake, api) = FakeApi::default().handle();
    let ticket = ChatTicket {
        session_id: "abc".to_string(),
        query: "What is this?".to_string(),
        generation: 1,
        sequence: 1,
    };
    let event = run_action(api, Action::Chat(ticket.clone())).await?;

    match event {
        Event::ChatResponded(responded, res) => {
            assert_eq!(responded, ticket);
            assert_eq!(res.response, "You asked: What is this?");
        }
        _ => bail!("Wrong event"),
    }

    assert_eq!(fake.calls(), vec!["chat abc What is this?"]);
    return Ok(());
}

#[tokio::test]
async fn it_reports_chat_failures() -> Result<()> {
    let (_fake, api) = FakeApi {
        fail_chat: true,
        ..FakeApi::default()
    }
    .handle();
    let ticket = ChatTicket {
        session_id: "abc".to_string(),
        query: "hi".to_string(),
        generation: 1,
        sequence: 4,
    };

    match run_action(api, Action::Chat(ticket)).await? {
        Event::ChatFailed(failed, err) => {
            assert_eq!(failed.sequence, 4);
            assert!(err.contains("Failed to get response"));
        }
        _ => bail!("Wrong event"),
    }

    return Ok(());
}

#[tokio::test]
async fn it_stops_when_the_action_channel_closes() -> Result<()> {
    let (_fake, api) = FakeApi::default().handle();
    let (action_tx, mut action_rx) = mpsc::unbounded_channel::<Action>();
    let (event_tx, _event_rx) = mpsc::unbounded_channel::<Event>();
    drop(action_tx);

    ActionsService::start(api, event_tx, &mut action_rx).await?;
    return Ok(());
}
