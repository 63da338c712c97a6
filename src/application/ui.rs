use std::io;
use std::path;
use std::time::Duration;
use std::time::Instant;

use anyhow::Result;
use crossterm::cursor;
use crossterm::event::DisableBracketedPaste;
use crossterm::event::DisableMouseCapture;
use crossterm::event::EnableBracketedPaste;
use crossterm::event::EnableMouseCapture;
use crossterm::terminal::disable_raw_mode;
use crossterm::terminal::enable_raw_mode;
use crossterm::terminal::EnterAlternateScreen;
use crossterm::terminal::LeaveAlternateScreen;
use ratatui::backend::CrosstermBackend;
use ratatui::prelude::*;
use ratatui::widgets::Block;
use ratatui::widgets::BorderType;
use ratatui::widgets::Borders;
use ratatui::widgets::Paragraph;
use ratatui::widgets::Scrollbar;
use ratatui::widgets::ScrollbarOrientation;
use ratatui::widgets::Wrap;
use ratatui::Terminal;
use tokio::sync::mpsc;

use crate::configuration::Config;
use crate::configuration::ConfigKey;
use crate::domain::models::Action;
use crate::domain::models::Event;
use crate::domain::models::TextArea;
use crate::domain::models::MESSAGE_INPUT_TITLE;
use crate::domain::models::URL_INPUT_TITLE;
use crate::domain::services::events::EventsService;
use crate::domain::services::AppState;
use crate::domain::services::Focus;
use crate::domain::services::LocalStore;
use crate::domain::services::Phase;

const EMPTY_HINT: &str =
    "Enter a website URL above and press Enter. Once it has been read you can ask questions about it here.";

fn refresh_focus(
    app_state: &AppState,
    url_input: &mut tui_textarea::TextArea<'_>,
    message_input: &mut tui_textarea::TextArea<'_>,
) {
    let mut message_title = MESSAGE_INPUT_TITLE.to_string();
    if let Some(context) = app_state.chat.context() {
        message_title = format!("{MESSAGE_INPUT_TITLE} ({})", context.url);
    }

    TextArea::set_focus(url_input, URL_INPUT_TITLE, app_state.focus == Focus::Url);
    TextArea::set_focus(
        message_input,
        &message_title,
        app_state.focus == Focus::Message,
    );
}

fn focused_input<'b, 'a>(
    focus: Focus,
    url_input: &'b mut tui_textarea::TextArea<'a>,
    message_input: &'b mut tui_textarea::TextArea<'a>,
) -> &'b mut tui_textarea::TextArea<'a> {
    if focus == Focus::Message {
        return message_input;
    }

    return url_input;
}

fn render_body<B: Backend>(frame: &mut Frame<B>, rect: Rect, app_state: &mut AppState) {
    match app_state.phase {
        Phase::Input => {
            frame.render_widget(
                Paragraph::new(EMPTY_HINT)
                    .block(
                        Block::default()
                            .borders(Borders::ALL)
                            .border_type(BorderType::Rounded)
                            .border_style(Style::default().fg(Color::DarkGray)),
                    )
                    .wrap(Wrap { trim: true })
                    .alignment(Alignment::Center),
                rect,
            );
        }
        Phase::Loading => {
            app_state.loading.render(frame, rect, app_state.tick);
        }
        Phase::Chat => {
            if rect.width != app_state.last_known_width
                || rect.height != app_state.last_known_height
            {
                app_state.set_rect(rect);
            }

            app_state
                .bubble_list
                .render(frame, rect, app_state.scroll.position);
            frame.render_stateful_widget(
                Scrollbar::new(ScrollbarOrientation::VerticalRight),
                rect.inner(&Margin {
                    vertical: 1,
                    horizontal: 0,
                }),
                &mut app_state.scroll.scrollbar_state,
            );
        }
    }
}

async fn start_loop<B: Backend>(
    terminal: &mut Terminal<B>,
    app_state: &mut AppState,
    tx: mpsc::UnboundedSender<Action>,
    rx: mpsc::UnboundedReceiver<Event>,
) -> Result<()> {
    let mut events = EventsService::new(rx);
    let mut url_input = TextArea::url();
    let mut message_input = TextArea::message();

    #[cfg(feature = "dev")]
    {
        if Config::get(ConfigKey::Url).is_empty() {
            Config::set(ConfigKey::Url, "https://example.com");
        }
    }

    // A startup scrape clears server sessions itself, a separate clear could race it.
    let startup_url = Config::get(ConfigKey::Url);
    if startup_url.trim().is_empty() {
        tx.send(Action::ClearSessions())?;
    } else {
        url_input.insert_str(startup_url.trim());
        if let Some(action) = app_state.submit_url(&startup_url).await {
            tx.send(action)?;
        }
    }
    tx.send(Action::CheckApiKey())?;

    loop {
        terminal.draw(|frame| {
            let size = frame.size();
            let mut constraints = vec![Constraint::Length(3), Constraint::Min(1)];
            if app_state.phase == Phase::Chat {
                constraints.push(Constraint::Length(3));
            }

            let layout = Layout::default()
                .direction(Direction::Vertical)
                .constraints(constraints)
                .split(size);

            frame.render_widget(url_input.widget(), layout[0]);
            render_body(frame, layout[1], app_state);
            if app_state.phase == Phase::Chat {
                frame.render_widget(message_input.widget(), layout[2]);
            }

            app_state.notifications.render(frame, size);
        })?;

        match events.next().await? {
            Event::KeyboardCTRLC() => {
                break;
            }
            Event::KeyboardTab() => {
                app_state.toggle_focus();
                refresh_focus(app_state, &mut url_input, &mut message_input);
            }
            Event::KeyboardEnter() => {
                match app_state.focus {
                    Focus::Url => {
                        let url = url_input.lines().join("");
                        if let Some(action) = app_state.submit_url(&url).await {
                            tx.send(action)?;
                        }
                    }
                    Focus::Message => {
                        let text = message_input.lines().join("\n");
                        if let Some(action) = app_state.send_message(&text) {
                            message_input = TextArea::message();
                            tx.send(action)?;
                        }
                    }
                }
                refresh_focus(app_state, &mut url_input, &mut message_input);
            }
            Event::KeyboardPaste(text) => {
                // Both inputs are single line.
                let text = text.replace(['\r', '\n'], " ");
                focused_input(app_state.focus, &mut url_input, &mut message_input).insert_str(text);
            }
            Event::KeyboardCharInput(input) => {
                focused_input(app_state.focus, &mut url_input, &mut message_input).input(input);
            }
            Event::ScrapeSucceeded(ticket, session_id) => {
                app_state.handle_scrape_success(&ticket, &session_id).await;
                refresh_focus(app_state, &mut url_input, &mut message_input);
            }
            Event::ScrapeFailed(ticket, err) => {
                app_state.handle_scrape_failure(&ticket, &err);
                refresh_focus(app_state, &mut url_input, &mut message_input);
            }
            Event::ChatResponded(ticket, res) => {
                app_state.handle_chat_response(&ticket, res).await;
                // The server may have answered from a different URL.
                refresh_focus(app_state, &mut url_input, &mut message_input);
            }
            Event::ChatFailed(ticket, err) => {
                app_state.handle_chat_failure(&ticket, &err);
            }
            Event::UIScrollDown() => {
                app_state.scroll.down();
            }
            Event::UIScrollUp() => {
                app_state.scroll.up();
            }
            Event::UIScrollPageDown() => {
                app_state.scroll.down_page();
            }
            Event::UIScrollPageUp() => {
                app_state.scroll.up_page();
            }
            Event::UITick() => {
                app_state.on_tick(Instant::now());
            }
        }
    }

    return Ok(());
}

pub fn destruct_terminal_for_panic() {
    let _ = disable_raw_mode();
    let _ = crossterm::execute!(
        io::stdout(),
        LeaveAlternateScreen,
        DisableMouseCapture,
        DisableBracketedPaste
    );
    let _ = crossterm::execute!(io::stdout(), cursor::Show);
}

pub async fn start(
    tx: mpsc::UnboundedSender<Action>,
    rx: mpsc::UnboundedReceiver<Event>,
) -> Result<()> {
    let store_file = Config::get(ConfigKey::StoreFile);
    let store = match LocalStore::open(path::Path::new(&store_file)).await {
        Ok(store) => store,
        Err(err) => {
            tracing::error!(error = ?err, store_file, "Unable to read local store, keeping state in memory");
            LocalStore::in_memory()
        }
    };
    let notification_timeout = Config::get(ConfigKey::NotificationTimeout).parse::<u64>()?;
    let mut app_state = AppState::new(store, Duration::from_millis(notification_timeout));

    let stdout = io::stdout();
    let mut stdout = stdout.lock();

    enable_raw_mode()?;
    crossterm::execute!(
        stdout,
        EnterAlternateScreen,
        EnableMouseCapture,
        EnableBracketedPaste
    )?;
    let term_backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(term_backend)?;

    start_loop(&mut terminal, &mut app_state, tx, rx).await?;

    disable_raw_mode()?;
    crossterm::execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture,
        DisableBracketedPaste
    )?;
    terminal.show_cursor()?;

    return Ok(());
}
