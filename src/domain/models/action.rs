use super::BootstrapTicket;
use super::ChatTicket;

pub enum Action {
    Bootstrap(BootstrapTicket),
    Chat(ChatTicket),
    CheckApiKey(),
    ClearSessions(),
}
