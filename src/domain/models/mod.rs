mod action;
mod api;
mod author;
mod event;
mod loading;
mod message;
mod notification;
mod session;
mod textarea;

pub use action::*;
pub use api::*;
pub use author::*;
pub use event::*;
pub use loading::*;
pub use message::*;
pub use notification::*;
pub use session::*;
pub use textarea::*;
