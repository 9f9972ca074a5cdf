pub mod admin;
pub mod login;
pub mod public;
pub mod session;

use std::fmt;

pub use admin::AdminView;
pub use login::LoginView;
pub use public::PublicView;
pub use session::{AdminPage, AdminSession};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Home,
    Login,
    AdminDashboard,
}

impl Route {
    pub fn path(self) -> &'static str {
        match self {
            Route::Home => "/",
            Route::Login => "/login",
            Route::AdminDashboard => "/admin-dashboard",
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

/// Work a view transition asks its driver to carry out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    FetchTodos,
    NavigateTo(Route),
}

pub(crate) fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

pub(crate) fn page(title: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head><meta charset=\"utf-8\"><title>{}</title></head>\n<body>\n{}\n</body>\n</html>\n",
        escape_html(title),
        body
    )
}

pub(crate) fn error_region(error: Option<&str>) -> String {
    match error {
        Some(message) => format!("<div class=\"error\" role=\"alert\">{}</div>\n", escape_html(message)),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn routes_have_fixed_paths() {
        assert_eq!(Route::Home.path(), "/");
        assert_eq!(Route::Login.to_string(), "/login");
        assert_eq!(Route::AdminDashboard.path(), "/admin-dashboard");
    }

    #[test]
    fn escapes_markup() {
        assert_eq!(
            escape_html("<b>\"milk\" & 'eggs'</b>"),
            "&lt;b&gt;&quot;milk&quot; &amp; &#39;eggs&#39;&lt;/b&gt;"
        );
    }
}
