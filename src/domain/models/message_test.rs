use super::Author;
use super::Message;
use super::MessageType;
use crate::configuration::Config;
use crate::configuration::ConfigKey;

#[test]
fn it_executes_new() {
    let msg = Message::new(Author::Bot, "Hi there!");
    assert_eq!(msg.author, Author::Bot);
    assert_eq!(msg.author.to_string(), "Crawler");
    assert_eq!(msg.text, "Hi there!".to_string());
    assert_eq!(msg.message_type(), MessageType::Normal);
}

#[test]
fn it_executes_new_replacing_tabs() {
    let msg = Message::new(Author::Bot, "\t\tHi there!");
    assert_eq!(msg.text, "    Hi there!".to_string());
}

#[test]
fn it_executes_new_with_type() {
    let msg = Message::new_with_type(Author::Bot, MessageType::Error, "It broke!");
    assert_eq!(msg.text, "It broke!".to_string());
    assert_eq!(msg.message_type(), MessageType::Error);
}

#[test]
fn it_uses_username_for_user_author() {
    let msg = Message::new(Author::User, "What is on this page?");
    assert_eq!(msg.author.to_string(), Config::get(ConfigKey::Username));
}

#[test]
fn it_creates_welcome_from_bot() {
    let msg = Message::welcome();
    assert_eq!(msg.author, Author::Bot);
    assert_eq!(msg.message_type(), MessageType::Normal);
}
