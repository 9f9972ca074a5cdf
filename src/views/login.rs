use tracing::info;

use crate::views::{Effect, Route, error_region, page};

/// Sign-in page. The identity provider does the actual authentication and
/// only reports back that a user is present.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoginView {
    authenticated: bool,
    error: Option<String>,
}

impl LoginView {
    pub fn new() -> Self {
        Self::default()
    }

    /// Redirects to the dashboard the first time a user is reported.
    pub fn on_authenticated(&mut self) -> Option<Effect> {
        if self.authenticated {
            return None;
        }
        self.authenticated = true;
        info!("login complete, redirecting to {}", Route::AdminDashboard);
        Some(Effect::NavigateTo(Route::AdminDashboard))
    }

    pub fn reject(&mut self, message: impl Into<String>) {
        self.error = Some(message.into());
    }

    pub fn render(&self) -> String {
        if self.authenticated {
            return page("Sign in", "<div>Redirecting to dashboard...</div>");
        }
        let mut body = String::from("<div>Please sign in to continue</div>\n");
        body.push_str(&error_region(self.error.as_deref()));
        body.push_str(&format!(
            "<form method=\"post\" action=\"{}\">\n<input type=\"password\" name=\"token\" placeholder=\"Identity token\">\n<button type=\"submit\">Sign in</button>\n</form>",
            Route::Login
        ));
        page("Sign in", &body)
    }
}
