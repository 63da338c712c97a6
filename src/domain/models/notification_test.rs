use std::time::Duration;

use strum::IntoEnumIterator;

use super::Notification;
use super::Severity;

#[test]
fn it_prefixes_text_with_icon() {
    let notification = Notification::new("Please enter a valid URL", Severity::Error);
    assert_eq!(notification.text(), "✖ Please enter a valid URL");
}

#[test]
fn it_expires_after_timeout() {
    let notification = Notification::new("Scraped", Severity::Success);
    let timeout = Duration::from_millis(3000);

    assert!(!notification.is_expired(notification.created_at, timeout));
    assert!(!notification.is_expired(
        notification.created_at + Duration::from_millis(2999),
        timeout
    ));
    assert!(notification.is_expired(notification.created_at + timeout, timeout));
}

#[test]
fn it_has_distinct_icons_per_severity() {
    let mut icons = Severity::iter().map(|e| return e.icon()).collect::<Vec<_>>();
    icons.dedup();
    assert_eq!(icons.len(), 4);
}

#[test]
fn it_serializes_severity_lowercase() {
    assert_eq!(Severity::Warning.to_string(), "warning");
}
