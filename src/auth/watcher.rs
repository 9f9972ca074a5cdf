use std::sync::Arc;
use std::sync::{Mutex, PoisonError};

use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::auth::{AUTH_CHANNEL, AuthEvent, AuthHub, AuthStatus, SessionProvider};

/// Turns session checks and `auth` channel events into `AuthStatus` updates.
#[derive(Clone)]
pub struct AuthWatcher {
    hub: AuthHub,
    provider: Arc<dyn SessionProvider>,
}

impl AuthWatcher {
    pub fn new(hub: AuthHub, provider: Arc<dyn SessionProvider>) -> Self {
        Self { hub, provider }
    }

    /// Single session check. Any failure counts as no session.
    pub async fn check(&self) -> AuthStatus {
        check_session(self.provider.as_ref()).await
    }

    /// Runs a session check right away, then keeps reporting status changes
    /// until the returned subscription is unsubscribed or dropped.
    pub fn subscribe<F>(&self, callback: F) -> Subscription
    where
        F: Fn(AuthStatus) + Send + 'static,
    {
        // Attach before spawning so events published after this call are seen.
        let mut events = self.hub.listen();
        let provider = self.provider.clone();
        let active = Arc::new(Mutex::new(true));

        let handle = {
            let active = active.clone();
            tokio::spawn(async move {
                // The flag stays locked while the callback runs, so detaching
                // waits for a delivery already in progress.
                let deliver = move |status: AuthStatus| {
                    let live = active.lock().unwrap_or_else(PoisonError::into_inner);
                    if *live {
                        callback(status);
                    }
                    *live
                };

                let status = check_session(provider.as_ref()).await;
                if !deliver(status) {
                    return;
                }

                loop {
                    let status = match events.recv().await {
                        Ok(AuthEvent::SignedIn) => AuthStatus::Authenticated,
                        Ok(AuthEvent::SignedOut) => AuthStatus::Unauthenticated,
                        Ok(AuthEvent::TokenRefresh) => check_session(provider.as_ref()).await,
                        Err(RecvError::Lagged(skipped)) => {
                            warn!("{} listener lagged by {} event(s), re-checking session", AUTH_CHANNEL, skipped);
                            check_session(provider.as_ref()).await
                        }
                        Err(RecvError::Closed) => break,
                    };
                    if !deliver(status) {
                        break;
                    }
                }
            })
        };

        Subscription {
            active,
            handle: Some(handle),
        }
    }
}

async fn check_session(provider: &dyn SessionProvider) -> AuthStatus {
    match provider.fetch_session().await {
        Ok(session) if session.tokens.is_some() => AuthStatus::Authenticated,
        Ok(_) => AuthStatus::Unauthenticated,
        Err(e) => {
            debug!("session check failed: {}", e);
            AuthStatus::Unauthenticated
        }
    }
}

/// Live listener registration returned by [`AuthWatcher::subscribe`].
pub struct Subscription {
    active: Arc<Mutex<bool>>,
    handle: Option<JoinHandle<()>>,
}

impl Subscription {
    /// Detaches the listener. Once this returns no callback is running and
    /// none will start. Calling it again does nothing. Must not be called
    /// from inside the callback.
    pub fn unsubscribe(&mut self) {
        *self.active.lock().unwrap_or_else(PoisonError::into_inner) = false;
        if let Some(handle) = self.handle.take() {
            handle.abort();
            debug!("{} listener detached", AUTH_CHANNEL);
        }
    }

    pub fn is_active(&self) -> bool {
        self.handle.is_some()
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.unsubscribe();
    }
}
