use serde::{Deserialize, Serialize};

use crate::models::Todo;

pub const LIST_TODOS: &str = "query ListTodos { listTodos { items { id content createdAt updatedAt } } }";

pub const CREATE_TODO: &str = "mutation CreateTodo($input: CreateTodoInput!) { createTodo(input: $input) { id content createdAt updatedAt } }";

pub const DELETE_TODO: &str = "mutation DeleteTodo($input: DeleteTodoInput!) { deleteTodo(input: $input) { id } }";

#[derive(Debug, Serialize)]
pub struct GraphQlRequest<'a> {
    pub query: &'a str,
    pub variables: serde_json::Value,
}

#[derive(Debug, Deserialize)]
pub struct GraphQlResponse<T> {
    pub data: Option<T>,
    #[serde(default)]
    pub errors: Vec<GraphQlError>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GraphQlError {
    pub message: String,
    #[serde(rename = "errorType", default)]
    pub error_type: Option<String>,
}

impl GraphQlError {
    pub fn is_unauthorized(&self) -> bool {
        matches!(
            self.error_type.as_deref(),
            Some("Unauthorized") | Some("UnauthorizedException")
        )
    }
}

/// Items stay untyped so invalid entries can be filtered instead of
/// failing the whole page.
#[derive(Debug, Deserialize)]
pub struct Connection {
    #[serde(default)]
    pub items: Vec<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
pub struct ListTodosData {
    #[serde(rename = "listTodos")]
    pub list_todos: Option<Connection>,
}

#[derive(Debug, Deserialize)]
pub struct CreateTodoData {
    #[serde(rename = "createTodo")]
    pub create_todo: Option<Todo>,
}

#[derive(Debug, Deserialize)]
pub struct DeleteTodoData {
    #[serde(rename = "deleteTodo")]
    pub delete_todo: Option<serde_json::Value>,
}
