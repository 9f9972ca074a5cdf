use tracing::{error, info};

use crate::data::TodoStore;
use crate::error::DataError;
use crate::models::Todo;
use crate::views::{Route, error_region, escape_html, page};

/// Read-only list shown to everyone. Fetched once per mount.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PublicView {
    Loading,
    Ready(Vec<Todo>),
    Failed(String),
}

impl PublicView {
    pub async fn mount(store: &dyn TodoStore) -> Self {
        let mut view = PublicView::Loading;
        view.apply(store.list().await);
        view
    }

    pub fn apply(&mut self, result: Result<Vec<Todo>, DataError>) {
        *self = match result {
            Ok(todos) => {
                info!("public view loaded {} todo(s)", todos.len());
                PublicView::Ready(todos)
            }
            Err(e) => {
                error!("Error fetching todos: {}", e);
                PublicView::Failed(e.message)
            }
        };
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, PublicView::Loading)
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            PublicView::Failed(message) => Some(message.as_str()),
            _ => None,
        }
    }

    pub fn todos(&self) -> &[Todo] {
        match self {
            PublicView::Ready(todos) => todos.as_slice(),
            _ => &[],
        }
    }

    pub fn render(&self) -> String {
        if self.is_loading() {
            return page("Todo List", "<div>Loading...</div>");
        }

        let mut body = String::from("<h1>Todo List</h1>\n");
        body.push_str(&error_region(self.error()));
        body.push_str(&format!("<a href=\"{}\">Admin Login</a>\n", Route::Login));

        let todos = self.todos();
        if todos.is_empty() {
            body.push_str("<p>No todos available</p>");
        } else {
            body.push_str("<ul>\n");
            for todo in todos {
                body.push_str(&format!("<li><span>{}</span></li>\n", escape_html(&todo.content)));
            }
            body.push_str("</ul>");
        }
        page("Todo List", &body)
    }
}
