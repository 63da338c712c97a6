use tui_textarea::Input;

use super::BootstrapTicket;
use super::ChatResponse;
use super::ChatTicket;

pub enum Event {
    ChatFailed(ChatTicket, String),
    ChatResponded(ChatTicket, ChatResponse),
    KeyboardCharInput(Input),
    KeyboardCTRLC(),
    KeyboardEnter(),
    KeyboardPaste(String),
    KeyboardTab(),
    ScrapeFailed(BootstrapTicket, String),
    ScrapeSucceeded(BootstrapTicket, String),
    UIScrollDown(),
    UIScrollUp(),
    UIScrollPageDown(),
    UIScrollPageUp(),
    UITick(),
}
