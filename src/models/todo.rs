use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use tracing::warn;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Todo {
    pub id: String,
    pub content: String,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewTodoRequest {
    pub content: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteTodoRequest {
    pub id: String,
}

/// Keeps the entries that are non-null and carry a string `content`,
/// preserving their order.
pub fn filter_valid(items: impl IntoIterator<Item = Value>) -> Vec<Todo> {
    items
        .into_iter()
        .filter_map(|item| {
            if item.is_null() {
                warn!("Dropping null todo entry");
                return None;
            }
            if !item.get("content").is_some_and(Value::is_string) {
                warn!("Dropping todo without string content: {}", item);
                return None;
            }
            match serde_json::from_value::<Todo>(item) {
                Ok(todo) => Some(todo),
                Err(e) => {
                    warn!("Dropping malformed todo entry: {}", e);
                    None
                }
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn drops_null_and_non_string_content() {
        let items = vec![
            json!({"id": "a", "content": "Buy milk", "createdAt": "2025-01-01T00:00:00Z"}),
            Value::Null,
            json!({"id": "b", "content": null}),
            json!({"id": "c", "content": 42}),
            json!({"id": "d"}),
            json!({"id": "e", "content": "Walk dog"}),
        ];

        let todos = filter_valid(items);
        let ids: Vec<&str> = todos.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, ["a", "e"]);
        assert_eq!(todos[0].created_at.as_deref(), Some("2025-01-01T00:00:00Z"));
        assert_eq!(todos[1].updated_at, None);
    }

    #[test]
    fn filtering_is_idempotent() {
        let items = vec![
            json!({"id": "a", "content": "one"}),
            json!({"id": "b", "content": false}),
            json!({"id": "c", "content": "three", "updatedAt": "2025-01-02T00:00:00Z"}),
        ];

        let once = filter_valid(items);
        let again = filter_valid(once.iter().map(|t| serde_json::to_value(t).unwrap()));
        assert_eq!(once, again);
    }

    #[test]
    fn serializes_timestamps_in_camel_case() {
        let todo = Todo {
            id: "a".to_string(),
            content: "Buy milk".to_string(),
            created_at: Some("2025-01-01T00:00:00Z".to_string()),
            updated_at: None,
        };
        let value = serde_json::to_value(&todo).unwrap();
        assert_eq!(value["createdAt"], "2025-01-01T00:00:00Z");
        assert!(value.get("created_at").is_none());
    }
}
