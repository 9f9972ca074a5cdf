use std::sync::Arc;

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::{info, warn};

use crate::auth::{AuthHub, AuthWatcher, SessionStore};
use crate::config::{AppConfig, BackendConfig};
use crate::data::http::build_client;
use crate::data::local::open_pool;
use crate::data::{Credential, GraphQlTodoStore, SqliteTodoStore, TodoStore};
use crate::error::AppError;
use crate::views::AdminSession;

/// API key the local store accepts for anonymous reads.
const LOCAL_API_KEY: &str = "local";

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub db: Option<SqlitePool>,
    pub sessions: Arc<SessionStore>,
    pub public_store: Arc<dyn TodoStore>,
    pub admin: Arc<AdminSession>,
}

impl AppState {
    pub async fn build(config: AppConfig) -> Result<Self, AppError> {
        let hub = AuthHub::new();
        let sessions = Arc::new(SessionStore::new(hub.clone()));
        let user_session = Credential::UserSession(sessions.clone());

        let db: Option<SqlitePool>;
        let public_store: Arc<dyn TodoStore>;
        let admin_store: Arc<dyn TodoStore>;

        match &config.backend {
            BackendConfig::Remote(remote) => {
                if remote.api_key_expired(Utc::now()) {
                    warn!("TODO_API_KEY has expired, public reads will fail until it is rotated");
                }
                info!("using remote todo backend at {}", remote.endpoint);
                let client = build_client(config.request_timeout)?;
                db = None;
                public_store = Arc::new(GraphQlTodoStore::with_client(
                    client.clone(),
                    remote.endpoint.clone(),
                    Credential::ApiKey(remote.api_key.clone()),
                ));
                admin_store = Arc::new(GraphQlTodoStore::with_client(
                    client,
                    remote.endpoint.clone(),
                    user_session,
                ));
            }
            BackendConfig::Local => {
                info!("no TODO_API_ENDPOINT set, using local store");
                let pool = open_pool(&config.database_url).await?;
                public_store = Arc::new(SqliteTodoStore::new(
                    pool.clone(),
                    Credential::ApiKey(LOCAL_API_KEY.to_string()),
                ));
                admin_store = Arc::new(SqliteTodoStore::new(pool.clone(), user_session));
                db = Some(pool);
            }
        }

        let watcher = AuthWatcher::new(hub, sessions.clone());
        let admin = Arc::new(AdminSession::mount(watcher, admin_store));

        Ok(Self {
            config: Arc::new(config),
            db,
            sessions,
            public_store,
            admin,
        })
    }
}
