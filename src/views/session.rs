use std::sync::Arc;

use tokio::sync::{Mutex, mpsc};
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::auth::{AuthStatus, AuthWatcher, Subscription};
use crate::data::TodoStore;
use crate::views::{AdminView, Effect, Route};

/// What the HTTP layer should answer for a dashboard visit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdminPage {
    Redirect(Route),
    Html(String),
}

/// Keeps one admin view in step with the auth watcher and executes the
/// effects its transitions return.
pub struct AdminSession {
    view: Arc<Mutex<AdminView>>,
    store: Arc<dyn TodoStore>,
    watcher: AuthWatcher,
    subscription: std::sync::Mutex<Subscription>,
    pump: JoinHandle<()>,
}

impl AdminSession {
    pub fn mount(watcher: AuthWatcher, store: Arc<dyn TodoStore>) -> Self {
        let view = Arc::new(Mutex::new(AdminView::new()));
        let (tx, mut rx) = mpsc::unbounded_channel();
        let subscription = watcher.subscribe(move |status| {
            let _ = tx.send(status);
        });

        let pump = {
            let view = view.clone();
            let store = store.clone();
            tokio::spawn(async move {
                while let Some(status) = rx.recv().await {
                    apply_status(&view, store.as_ref(), status).await;
                }
                debug!("admin session status pump stopped");
            })
        };

        Self {
            view,
            store,
            watcher,
            subscription: std::sync::Mutex::new(subscription),
            pump,
        }
    }

    /// Every visit re-checks the session. A confirmation of an already
    /// authenticated view keeps its list and error untouched.
    pub async fn visit(&self) -> AdminPage {
        let status = self.watcher.check().await;
        let current = self.view.lock().await.auth_status();
        if !(status == AuthStatus::Authenticated && current == AuthStatus::Authenticated) {
            apply_status(&self.view, self.store.as_ref(), status).await;
        }

        match self.view.lock().await.render() {
            Some(html) => AdminPage::Html(html),
            None => AdminPage::Redirect(Route::Login),
        }
    }

    pub async fn create(&self, content: &str) -> Option<Effect> {
        let content = {
            let mut view = self.view.lock().await;
            if view.auth_status() != AuthStatus::Authenticated {
                return Some(Effect::NavigateTo(Route::Login));
            }
            view.set_draft(content);
            view.begin_create()?
        };

        let result = self.store.create(&content).await;
        self.view.lock().await.finish_create(result)
    }

    pub async fn delete(&self, id: &str) -> Option<Effect> {
        {
            let mut view = self.view.lock().await;
            if view.auth_status() != AuthStatus::Authenticated {
                return Some(Effect::NavigateTo(Route::Login));
            }
            view.begin_delete();
        }

        let result = self.store.delete(id).await;
        self.view.lock().await.finish_delete(id, result)
    }

    pub async fn snapshot(&self) -> AdminView {
        self.view.lock().await.clone()
    }

    pub fn unmount(&self) {
        if let Ok(mut subscription) = self.subscription.lock() {
            subscription.unsubscribe();
        }
        self.pump.abort();
    }
}

impl Drop for AdminSession {
    fn drop(&mut self) {
        self.unmount();
    }
}

async fn apply_status(view: &Mutex<AdminView>, store: &dyn TodoStore, status: AuthStatus) {
    let effect = view.lock().await.on_auth_status(status);
    match effect {
        Some(Effect::FetchTodos) => {
            let result = store.list().await;
            let mut view = view.lock().await;
            // The session may have ended while the list was in flight.
            if view.auth_status() == AuthStatus::Authenticated {
                view.apply_fetch(result);
            }
        }
        Some(Effect::NavigateTo(route)) => info!("admin view navigating to {}", route),
        None => {}
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::auth::{AuthHub, SessionStore};
    use crate::data::AuthMode;
    use crate::data::stub::{StubStore, todo};
    use crate::error::DataError;

    struct Fixture {
        sessions: Arc<SessionStore>,
        store: Arc<StubStore>,
        session: AdminSession,
    }

    fn fixture(todos: Vec<crate::models::Todo>) -> Fixture {
        let hub = AuthHub::new();
        let sessions = Arc::new(SessionStore::new(hub.clone()));
        mount(hub, sessions, todos)
    }

    /// Signs in before mounting, so the initial check is the only status.
    async fn signed_in_fixture(todos: Vec<crate::models::Todo>) -> Fixture {
        let hub = AuthHub::new();
        let sessions = Arc::new(SessionStore::new(hub.clone()));
        sessions.sign_in("id-token").await;
        let fx = mount(hub, sessions, todos);
        wait_for_status(&fx.session, AuthStatus::Authenticated).await;
        fx
    }

    fn mount(hub: AuthHub, sessions: Arc<SessionStore>, todos: Vec<crate::models::Todo>) -> Fixture {
        let store = Arc::new(StubStore::with_todos(AuthMode::UserSession, todos));
        let watcher = AuthWatcher::new(hub, sessions.clone());
        let session = AdminSession::mount(watcher, store.clone());
        Fixture {
            sessions,
            store,
            session,
        }
    }

    async fn wait_for_status(session: &AdminSession, expected: AuthStatus) -> AdminView {
        tokio::time::timeout(Duration::from_secs(1), async {
            loop {
                let view = session.snapshot().await;
                if view.auth_status() == expected && !(expected == AuthStatus::Authenticated && view.is_loading()) {
                    return view;
                }
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await
        .expect("timed out waiting for auth status")
    }

    #[tokio::test]
    async fn visit_without_session_redirects_to_login() {
        let fx = fixture(Vec::new());
        assert_eq!(fx.session.visit().await, AdminPage::Redirect(Route::Login));
        assert_eq!(StubStore::calls(&fx.store.list_calls), 0);
    }

    #[tokio::test]
    async fn visit_with_session_renders_dashboard() {
        let fx = signed_in_fixture(vec![todo("1", "Buy milk")]).await;

        let AdminPage::Html(html) = fx.session.visit().await else {
            panic!("expected dashboard html");
        };
        assert!(html.contains("Admin Dashboard"));
        assert!(html.contains("Buy milk"));
    }

    #[tokio::test]
    async fn sign_in_then_out_follows_hub_events() {
        let fx = fixture(vec![todo("1", "Buy milk")]);
        wait_for_status(&fx.session, AuthStatus::Unauthenticated).await;

        fx.sessions.sign_in("id-token").await;
        let view = wait_for_status(&fx.session, AuthStatus::Authenticated).await;
        assert_eq!(view.todos().len(), 1);

        fx.sessions.sign_out().await;
        let view = wait_for_status(&fx.session, AuthStatus::Unauthenticated).await;
        assert!(view.todos().is_empty());
        assert_eq!(fx.session.visit().await, AdminPage::Redirect(Route::Login));
    }

    #[tokio::test]
    async fn token_refresh_refetches_the_list() {
        let fx = signed_in_fixture(Vec::new()).await;
        let before = StubStore::calls(&fx.store.list_calls);

        fx.sessions.refresh_tokens("id-token-2").await;
        tokio::time::timeout(Duration::from_secs(1), async {
            while StubStore::calls(&fx.store.list_calls) == before {
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await
        .expect("refresh should trigger a new fetch");
    }

    #[tokio::test]
    async fn denied_write_returns_login_navigation() {
        let fx = signed_in_fixture(vec![todo("1", "a")]).await;

        assert_eq!(fx.session.create("Buy milk").await, None);
        assert_eq!(fx.session.snapshot().await.todos().len(), 2);

        fx.store.fail_writes(DataError::unauthorized("Not Authorized to perform this action"));
        assert_eq!(
            fx.session.delete("1").await,
            Some(Effect::NavigateTo(Route::Login))
        );
        assert_eq!(fx.session.snapshot().await.todos().len(), 2);
    }

    #[tokio::test]
    async fn blank_create_never_reaches_the_store() {
        let fx = signed_in_fixture(Vec::new()).await;

        for blank in ["", "   "] {
            assert_eq!(fx.session.create(blank).await, None);
        }
        assert_eq!(StubStore::calls(&fx.store.create_calls), 0);
        assert_eq!(fx.session.snapshot().await.error(), None);
    }

    #[tokio::test]
    async fn writes_before_sign_in_go_to_login() {
        let fx = fixture(Vec::new());
        wait_for_status(&fx.session, AuthStatus::Unauthenticated).await;

        assert_eq!(
            fx.session.create("Buy milk").await,
            Some(Effect::NavigateTo(Route::Login))
        );
        assert_eq!(StubStore::calls(&fx.store.create_calls), 0);
    }
}
