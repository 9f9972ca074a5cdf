use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use reqwest::StatusCode;
use reqwest::header::AUTHORIZATION;
use serde::de::DeserializeOwned;
use serde_json::json;
use tracing::{debug, warn};

use crate::data::dto::{self, GraphQlError, GraphQlRequest, GraphQlResponse};
use crate::data::{AuthMode, Credential, TodoStore, normalize_content};
use crate::error::{AppError, DataError};
use crate::models::{DeleteTodoRequest, NewTodoRequest, Todo, filter_valid};

pub fn build_client(timeout: Duration) -> Result<Client, AppError> {
    Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| AppError::Config(format!("Failed to build http client: {}", e)))
}

/// `TodoStore` backed by the hosted GraphQL collection API.
pub struct GraphQlTodoStore {
    client: Client,
    endpoint: String,
    credential: Credential,
}

impl GraphQlTodoStore {
    pub fn new(endpoint: impl Into<String>, credential: Credential, timeout: Duration) -> Result<Self, AppError> {
        Ok(Self::with_client(build_client(timeout)?, endpoint, credential))
    }

    pub fn with_client(client: Client, endpoint: impl Into<String>, credential: Credential) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
            credential,
        }
    }

    async fn execute<T: DeserializeOwned>(
        &self,
        operation: &str,
        query: &str,
        variables: serde_json::Value,
    ) -> Result<T, DataError> {
        let request = self
            .client
            .post(&self.endpoint)
            .json(&GraphQlRequest { query, variables });

        let request = match &self.credential {
            Credential::ApiKey(key) => request.header("x-api-key", key.as_str()),
            Credential::UserSession(_) => match self.credential.session_token().await? {
                Some(token) => request.header(AUTHORIZATION, token),
                None => request,
            },
        };

        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;
        debug!("{} responded with {}", operation, status);

        let envelope = serde_json::from_str::<GraphQlResponse<serde_json::Value>>(&body).ok();
        let denied = status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN;

        if let Some(first) = envelope.as_ref().and_then(|e| e.errors.first()) {
            warn!("{} failed with {}: {:?}", operation, status, first);
            return Err(classify(first, denied));
        }

        if denied {
            return Err(DataError::unauthorized(format!("Unauthorized: {} {}", status, body)));
        }

        if !status.is_success() {
            return Err(DataError::unknown(format!(
                "{} failed with status {}: {}",
                operation, status, body
            )));
        }

        let data = envelope
            .and_then(|e| e.data)
            .ok_or_else(|| DataError::unknown(format!("{} returned no data", operation)))?;

        serde_json::from_value(data).map_err(|e| {
            DataError::unknown(format!("Failed to parse {} response: {}", operation, e))
        })
    }
}

fn classify(error: &GraphQlError, denied: bool) -> DataError {
    if denied || error.is_unauthorized() {
        DataError::unauthorized(error.message.clone())
    } else {
        DataError::unknown(error.message.clone())
    }
}

#[async_trait]
impl TodoStore for GraphQlTodoStore {
    fn auth_mode(&self) -> AuthMode {
        self.credential.mode()
    }

    async fn list(&self) -> Result<Vec<Todo>, DataError> {
        let data: dto::ListTodosData = self.execute("listTodos", dto::LIST_TODOS, json!({})).await?;
        let items = data.list_todos.map(|c| c.items).unwrap_or_default();
        let fetched = items.len();
        let todos = filter_valid(items);
        debug!("listTodos returned {} item(s), {} valid", fetched, todos.len());
        Ok(todos)
    }

    async fn create(&self, content: &str) -> Result<Todo, DataError> {
        let input = NewTodoRequest {
            content: normalize_content(content)?.to_string(),
        };
        let data: dto::CreateTodoData = self
            .execute("createTodo", dto::CREATE_TODO, json!({ "input": input }))
            .await?;
        data.create_todo
            .ok_or_else(|| DataError::unknown("Failed to create todo"))
    }

    async fn delete(&self, id: &str) -> Result<(), DataError> {
        let input = DeleteTodoRequest { id: id.to_string() };
        let data: dto::DeleteTodoData = self
            .execute("deleteTodo", dto::DELETE_TODO, json!({ "input": input }))
            .await?;
        if data.delete_todo.is_none() {
            debug!("deleteTodo for {} matched nothing", id);
        }
        Ok(())
    }
}
