pub mod actions;
mod app_state;
mod bubble;
mod bubble_list;
mod chat_controller;
pub mod events;
mod local_store;
pub mod markup;
mod notifications;
mod scroll;
mod session_bootstrapper;

pub use app_state::*;
pub use bubble::*;
pub use bubble_list::*;
pub use chat_controller::*;
pub use local_store::*;
pub use notifications::*;
pub use scroll::*;
pub use session_bootstrapper::*;
