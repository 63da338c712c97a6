#[cfg(test)]
#[path = "session_test.rs"]
mod tests;

/// The session the chat controller is currently bound to. Each bootstrap produces a fresh context
/// with a higher generation, which lets late responses for older sessions be recognised.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SessionContext {
    pub id: String,
    pub url: String,
    pub generation: u64,
}

impl SessionContext {
    pub fn new(id: &str, url: &str, generation: u64) -> SessionContext {
        return SessionContext {
            id: id.to_string(),
            url: url.to_string(),
            generation,
        };
    }

    pub fn rebind(&self, id: &str) -> SessionContext {
        return SessionContext {
            id: id.to_string(),
            url: self.url.to_string(),
            generation: self.generation,
        };
    }

    pub fn with_url(&self, url: &str) -> SessionContext {
        return SessionContext {
            id: self.id.to_string(),
            url: url.to_string(),
            generation: self.generation,
        };
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BootstrapTicket {
    pub url: String,
    pub generation: u64,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChatTicket {
    pub session_id: String,
    pub query: String,
    pub generation: u64,
    pub sequence: u64,
}
