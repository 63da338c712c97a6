#[cfg(test)]
#[path = "notification_test.rs"]
mod tests;

use std::time::Duration;
use std::time::Instant;

use ratatui::style::Color;
use strum::EnumIter;

#[derive(Copy, Clone, Debug, PartialEq, Eq, EnumIter, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum Severity {
    Success,
    Error,
    Warning,
    Info,
}

impl Severity {
    pub fn icon(&self) -> &'static str {
        match self {
            Severity::Success => return "✔",
            Severity::Error => return "✖",
            Severity::Warning => return "⚠",
            Severity::Info => return "ℹ",
        }
    }

    pub fn color(&self) -> Color {
        match self {
            Severity::Success => return Color::Rgb(0, 255, 170),
            Severity::Error => return Color::Rgb(255, 51, 102),
            Severity::Warning => return Color::Rgb(255, 170, 0),
            Severity::Info => return Color::Rgb(0, 128, 255),
        }
    }
}

#[derive(Clone, Debug)]
pub struct Notification {
    pub message: String,
    pub severity: Severity,
    pub created_at: Instant,
}

impl Notification {
    pub fn new(message: &str, severity: Severity) -> Notification {
        return Notification {
            message: message.to_string(),
            severity,
            created_at: Instant::now(),
        };
    }

    pub fn is_expired(&self, now: Instant, timeout: Duration) -> bool {
        return now.saturating_duration_since(self.created_at) >= timeout;
    }

    pub fn text(&self) -> String {
        return format!("{} {}", self.severity.icon(), self.message);
    }
}
