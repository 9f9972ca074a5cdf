use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::info;

use crate::auth::{AuthEvent, AuthHub};
use crate::error::DataError;

/// Token set issued by the external identity provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenSet {
    pub id_token: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthSession {
    pub tokens: Option<TokenSet>,
}

/// Answers the session check: is there a valid token set right now?
#[async_trait]
pub trait SessionProvider: Send + Sync {
    async fn fetch_session(&self) -> Result<AuthSession, DataError>;
}

/// Holds the current user's tokens and announces changes on the auth hub.
pub struct SessionStore {
    tokens: RwLock<Option<TokenSet>>,
    hub: AuthHub,
}

impl SessionStore {
    pub fn new(hub: AuthHub) -> Self {
        Self {
            tokens: RwLock::new(None),
            hub,
        }
    }

    pub async fn sign_in(&self, id_token: impl Into<String>) {
        *self.tokens.write().await = Some(TokenSet {
            id_token: id_token.into(),
        });
        info!("user signed in");
        self.hub.publish(AuthEvent::SignedIn);
    }

    pub async fn sign_out(&self) {
        self.tokens.write().await.take();
        info!("user signed out");
        self.hub.publish(AuthEvent::SignedOut);
    }

    /// Replaces the token set, e.g. after the identity provider rotated it.
    pub async fn refresh_tokens(&self, id_token: impl Into<String>) {
        *self.tokens.write().await = Some(TokenSet {
            id_token: id_token.into(),
        });
        info!("session tokens refreshed");
        self.hub.publish(AuthEvent::TokenRefresh);
    }

    /// Signs in, or rotates the tokens of a session that is already live.
    pub async fn submit_token(&self, id_token: impl Into<String>) {
        if self.current_tokens().await.is_some() {
            self.refresh_tokens(id_token).await;
        } else {
            self.sign_in(id_token).await;
        }
    }

    pub async fn current_tokens(&self) -> Option<TokenSet> {
        self.tokens.read().await.clone()
    }
}

#[async_trait]
impl SessionProvider for SessionStore {
    async fn fetch_session(&self) -> Result<AuthSession, DataError> {
        Ok(AuthSession {
            tokens: self.current_tokens().await,
        })
    }
}
