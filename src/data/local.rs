use async_trait::async_trait;
use chrono::Utc;
use sqlx::SqlitePool;
use sqlx::sqlite::SqlitePoolOptions;
use tracing::{debug, info};
use uuid::Uuid;

use crate::data::{AuthMode, Credential, TodoStore, normalize_content};
use crate::error::{AppError, DataError};
use crate::models::Todo;

/// Opens the local database and applies the embedded migrations.
pub async fn open_pool(database_url: &str) -> Result<SqlitePool, AppError> {
    let options = if database_url.contains(":memory:") {
        // Every connection to an in-memory database sees its own copy.
        SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
    } else {
        SqlitePoolOptions::new().max_connections(5)
    };

    let pool = options.connect(database_url).await?;
    sqlx::migrate!("./migrations").run(&pool).await?;
    info!("local todo database ready at {}", database_url);
    Ok(pool)
}

/// `TodoStore` over the local SQLite database, applying the same rules as
/// the hosted collection: API key reads only, a signed-in user does everything.
pub struct SqliteTodoStore {
    db: SqlitePool,
    credential: Credential,
}

impl SqliteTodoStore {
    pub fn new(db: SqlitePool, credential: Credential) -> Self {
        Self { db, credential }
    }

    async fn authorize(&self, operation: &str, mutation: bool) -> Result<(), DataError> {
        match &self.credential {
            Credential::ApiKey(_) if mutation => Err(DataError::unauthorized(format!(
                "Not Authorized to access {} on type Mutation",
                operation
            ))),
            Credential::ApiKey(_) => Ok(()),
            Credential::UserSession(_) => self.credential.session_token().await.map(|_| ()),
        }
    }
}

#[async_trait]
impl TodoStore for SqliteTodoStore {
    fn auth_mode(&self) -> AuthMode {
        self.credential.mode()
    }

    async fn list(&self) -> Result<Vec<Todo>, DataError> {
        self.authorize("listTodos", false).await?;
        let todos = sqlx::query_as::<_, Todo>(
            "SELECT id, content, created_at, updated_at FROM todos ORDER BY created_at, rowid",
        )
        .fetch_all(&self.db)
        .await?;
        Ok(todos)
    }

    async fn create(&self, content: &str) -> Result<Todo, DataError> {
        let content = normalize_content(content)?;
        self.authorize("createTodo", true).await?;

        let id = Uuid::new_v4().to_string();
        let now = Utc::now().to_rfc3339();

        sqlx::query("INSERT INTO todos (id, content, created_at, updated_at) VALUES (?, ?, ?, ?)")
            .bind(&id)
            .bind(content)
            .bind(&now)
            .bind(&now)
            .execute(&self.db)
            .await?;

        debug!("created todo {}", id);
        Ok(Todo {
            id,
            content: content.to_string(),
            created_at: Some(now.clone()),
            updated_at: Some(now),
        })
    }

    async fn delete(&self, id: &str) -> Result<(), DataError> {
        self.authorize("deleteTodo", true).await?;

        let affected = sqlx::query("DELETE FROM todos WHERE id = ?")
            .bind(id)
            .execute(&self.db)
            .await?
            .rows_affected();

        if affected == 0 {
            debug!("delete of unknown todo {} was a no-op", id);
        }
        Ok(())
    }
}
