pub mod session;
pub mod watcher;

use tokio::sync::broadcast;
use tracing::debug;

pub use session::{AuthSession, SessionProvider, SessionStore, TokenSet};
pub use watcher::{AuthWatcher, Subscription};

/// Name of the channel auth events are published on.
pub const AUTH_CHANNEL: &str = "auth";

const HUB_CAPACITY: usize = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthStatus {
    Checking,
    Authenticated,
    Unauthenticated,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthEvent {
    SignedIn,
    SignedOut,
    TokenRefresh,
}

/// In-process publish/subscribe hub for the `auth` channel.
#[derive(Clone)]
pub struct AuthHub {
    tx: broadcast::Sender<AuthEvent>,
}

impl AuthHub {
    pub fn new() -> Self {
        let (tx, _rx) = broadcast::channel(HUB_CAPACITY);
        Self { tx }
    }

    pub fn publish(&self, event: AuthEvent) {
        match self.tx.send(event) {
            Ok(listeners) => debug!("{} event {:?} delivered to {} listener(s)", AUTH_CHANNEL, event, listeners),
            Err(_) => debug!("{} event {:?} had no listeners", AUTH_CHANNEL, event),
        }
    }

    pub fn listen(&self) -> broadcast::Receiver<AuthEvent> {
        self.tx.subscribe()
    }
}

impl Default for AuthHub {
    fn default() -> Self {
        Self::new()
    }
}
