#[cfg(test)]
#[path = "notifications_test.rs"]
mod tests;

use std::time::Duration;
use std::time::Instant;

use ratatui::prelude::Backend;
use ratatui::prelude::Rect;
use ratatui::style::Style;
use ratatui::widgets::Block;
use ratatui::widgets::BorderType;
use ratatui::widgets::Borders;
use ratatui::widgets::Clear;
use ratatui::widgets::Paragraph;
use ratatui::widgets::Wrap;
use ratatui::Frame;

use crate::domain::models::Notification;
use crate::domain::models::Severity;

const MAX_WIDTH: u16 = 40;

/// Transient toasts stacked in the top-right corner.
pub struct Notifications {
    items: Vec<Notification>,
    timeout: Duration,
}

impl Default for Notifications {
    fn default() -> Notifications {
        return Notifications::new(Duration::from_millis(3000));
    }
}

impl Notifications {
    pub fn new(timeout: Duration) -> Notifications {
        return Notifications {
            items: vec![],
            timeout,
        };
    }

    pub fn push(&mut self, message: &str, severity: Severity) {
        tracing::debug!(message, severity = severity.to_string(), "Notification");
        self.items.push(Notification::new(message, severity));
    }

    pub fn items(&self) -> &[Notification] {
        return &self.items;
    }

    /// Drops expired notifications. Returns whether anything was removed.
    pub fn prune(&mut self, now: Instant) -> bool {
        let before = self.items.len();
        let timeout = self.timeout;
        self.items.retain(|e| return !e.is_expired(now, timeout));

        return before != self.items.len();
    }

    pub fn render<B: Backend>(&self, frame: &mut Frame<B>, rect: Rect) {
        let width = MAX_WIDTH.min(rect.width);
        let mut y = rect.y;

        for notification in self.items.iter() {
            let inner_width = width.saturating_sub(4).max(1) as usize;
            let text = notification.text();
            let text_lines = (text.chars().count() / inner_width) as u16 + 1;
            let height = text_lines + 2;

            if y + height > rect.y + rect.height {
                break;
            }

            let area = Rect::new(rect.x + rect.width - width, y, width, height);
            frame.render_widget(Clear, area);
            frame.render_widget(
                Paragraph::new(text)
                    .wrap(Wrap { trim: true })
                    .block(
                        Block::default()
                            .borders(Borders::ALL)
                            .border_type(BorderType::Rounded)
                            .border_style(Style::default().fg(notification.severity.color())),
                    ),
                area,
            );

            y += height;
        }
    }
}
