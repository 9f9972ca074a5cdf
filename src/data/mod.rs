pub mod dto;
pub mod http;
pub mod local;

#[cfg(test)]
pub(crate) mod stub;

use std::sync::Arc;

use async_trait::async_trait;

use crate::auth::SessionProvider;
use crate::error::DataError;
use crate::models::Todo;

pub use http::GraphQlTodoStore;
pub use local::SqliteTodoStore;

/// Which identity a data operation is issued under.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthMode {
    /// Anonymous API key, read-only.
    ApiKey,
    /// Signed-in user, full access.
    UserSession,
}

#[derive(Clone)]
pub enum Credential {
    ApiKey(String),
    UserSession(Arc<dyn SessionProvider>),
}

impl Credential {
    pub fn mode(&self) -> AuthMode {
        match self {
            Credential::ApiKey(_) => AuthMode::ApiKey,
            Credential::UserSession(_) => AuthMode::UserSession,
        }
    }

    /// Id token of the current user. Fails when nobody is signed in.
    pub async fn session_token(&self) -> Result<Option<String>, DataError> {
        match self {
            Credential::ApiKey(_) => Ok(None),
            Credential::UserSession(provider) => {
                let session = provider
                    .fetch_session()
                    .await
                    .map_err(|e| DataError::unauthorized(format!("No current user session: {}", e)))?;
                session
                    .tokens
                    .map(|tokens| Some(tokens.id_token))
                    .ok_or_else(|| DataError::unauthorized("No current user session"))
            }
        }
    }
}

/// Typed access to the `Todo` collection under one credential mode.
#[async_trait]
pub trait TodoStore: Send + Sync {
    fn auth_mode(&self) -> AuthMode;

    /// Every valid record, in the order the backend returns them.
    async fn list(&self) -> Result<Vec<Todo>, DataError>;

    async fn create(&self, content: &str) -> Result<Todo, DataError>;

    async fn delete(&self, id: &str) -> Result<(), DataError>;
}

/// Trimmed content, or a validation error when nothing is left.
pub fn normalize_content(content: &str) -> Result<&str, DataError> {
    let trimmed = content.trim();
    if trimmed.is_empty() {
        return Err(DataError::validation("Todo content must not be empty"));
    }
    Ok(trimmed)
}
