//! Admin dashboard state machine.
//!
//! Starts in `Checking`; auth statuses drive it to `Authenticated` (and a
//! fetch) or `Unauthenticated` (and a redirect to the login page). Every
//! transition that needs I/O or navigation returns an [`Effect`] instead of
//! performing it, so the driver decides how to execute it.

use tracing::{error, info, warn};

use crate::auth::AuthStatus;
use crate::error::DataError;
use crate::models::Todo;
use crate::views::{Effect, Route, error_region, escape_html, page};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminView {
    auth: AuthStatus,
    todos: Vec<Todo>,
    draft: String,
    loading: bool,
    error: Option<String>,
}

impl AdminView {
    pub fn new() -> Self {
        Self {
            auth: AuthStatus::Checking,
            todos: Vec::new(),
            draft: String::new(),
            loading: true,
            error: None,
        }
    }

    pub fn auth_status(&self) -> AuthStatus {
        self.auth
    }

    pub fn todos(&self) -> &[Todo] {
        &self.todos
    }

    pub fn draft(&self) -> &str {
        &self.draft
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn on_auth_status(&mut self, status: AuthStatus) -> Option<Effect> {
        self.auth = status;
        match status {
            AuthStatus::Checking => None,
            AuthStatus::Authenticated => Some(Effect::FetchTodos),
            AuthStatus::Unauthenticated => {
                // Leaving the page discards everything but the status.
                *self = Self {
                    auth: AuthStatus::Unauthenticated,
                    ..Self::new()
                };
                Some(Effect::NavigateTo(Route::Login))
            }
        }
    }

    pub fn apply_fetch(&mut self, result: Result<Vec<Todo>, DataError>) {
        match result {
            Ok(todos) => {
                self.todos = todos;
                self.error = None;
            }
            Err(e) => {
                error!("Error fetching todos: {}", e);
                self.error = Some(e.message);
            }
        }
        self.loading = false;
    }

    pub fn set_draft(&mut self, draft: impl Into<String>) {
        self.draft = draft.into();
    }

    /// Content to submit, or `None` when the trimmed draft is empty.
    pub fn begin_create(&mut self) -> Option<String> {
        let content = self.draft.trim();
        if content.is_empty() {
            return None;
        }
        let content = content.to_string();
        self.error = None;
        Some(content)
    }

    pub fn finish_create(&mut self, result: Result<Todo, DataError>) -> Option<Effect> {
        match result {
            Ok(todo) => {
                info!("created todo {}", todo.id);
                self.todos.push(todo);
                self.draft.clear();
                None
            }
            Err(e) => self.fail("creating", e),
        }
    }

    pub fn begin_delete(&mut self) {
        self.error = None;
    }

    pub fn finish_delete(&mut self, id: &str, result: Result<(), DataError>) -> Option<Effect> {
        match result {
            Ok(()) => {
                info!("deleted todo {}", id);
                self.todos.retain(|todo| todo.id != id);
                None
            }
            Err(e) => self.fail("deleting", e),
        }
    }

    fn fail(&mut self, action: &str, err: DataError) -> Option<Effect> {
        error!("Error {} todo: {}", action, err);
        let denied = err.is_authorization_denied();
        self.error = Some(err.message);
        if denied {
            warn!("authorization rejected while {} todo, treating as session loss", action);
            return Some(Effect::NavigateTo(Route::Login));
        }
        None
    }

    /// `None` once the user is known to be signed out: the page is being left.
    pub fn render(&self) -> Option<String> {
        match self.auth {
            AuthStatus::Unauthenticated => None,
            AuthStatus::Checking => Some(page("Admin Dashboard", "<div>Loading...</div>")),
            AuthStatus::Authenticated if self.loading => {
                Some(page("Admin Dashboard", "<div>Loading...</div>"))
            }
            AuthStatus::Authenticated => Some(page("Admin Dashboard", &self.render_dashboard())),
        }
    }

    fn render_dashboard(&self) -> String {
        let mut body = String::from("<h1>Admin Dashboard</h1>\n");
        body.push_str(&error_region(self.error()));
        body.push_str(&format!(
            "<form method=\"post\" action=\"{}/todos\">\n<input type=\"text\" name=\"content\" value=\"{}\" placeholder=\"Add a new todo\">\n<button type=\"submit\">Add Todo</button>\n</form>\n",
            Route::AdminDashboard,
            escape_html(&self.draft)
        ));
        body.push_str("<form method=\"post\" action=\"/logout\"><button type=\"submit\">Sign out</button></form>\n");
        body.push_str(&format!(
            "<form method=\"post\" action=\"{}\"><input type=\"password\" name=\"token\" placeholder=\"New ID token\"><button type=\"submit\">Refresh token</button></form>\n",
            Route::Login
        ));

        if self.todos.is_empty() {
            body.push_str("<p>No todos available</p>");
        } else {
            body.push_str("<ul>\n");
            for todo in &self.todos {
                body.push_str(&format!(
                    "<li><span>{}</span><form method=\"post\" action=\"{}/todos/{}/delete\"><button type=\"submit\">Delete</button></form></li>\n",
                    escape_html(&todo.content),
                    Route::AdminDashboard,
                    escape_html(&todo.id)
                ));
            }
            body.push_str("</ul>");
        }
        body
    }
}

impl Default for AdminView {
    fn default() -> Self {
        Self::new()
    }
}
