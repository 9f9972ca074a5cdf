use axum::extract::{Form, Path, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum::routing::{get, post};
use axum::Router;
use serde::Deserialize;
use tracing::warn;

use crate::error::AppError;
use crate::state::AppState;
use crate::views::{AdminPage, Effect, LoginView, PublicView, Route};

#[derive(Deserialize)]
struct SignInForm {
    #[serde(default)]
    token: String,
}

#[derive(Deserialize)]
struct CreateTodoForm {
    #[serde(default)]
    content: String,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route(Route::Home.path(), get(home))
        .route(Route::Login.path(), get(login_page).post(sign_in))
        .route("/logout", post(sign_out))
        .route(Route::AdminDashboard.path(), get(admin_dashboard))
        .route("/admin-dashboard/todos", post(create_todo))
        .route("/admin-dashboard/todos/{id}/delete", post(delete_todo))
        .with_state(state)
}

async fn health(State(state): State<AppState>) -> Result<StatusCode, AppError> {
    if let Some(db) = &state.db {
        sqlx::query("select 1").execute(db).await?;
    }
    Ok(StatusCode::OK)
}

async fn home(State(state): State<AppState>) -> Html<String> {
    let view = PublicView::mount(state.public_store.as_ref()).await;
    Html(view.render())
}

async fn login_page(State(state): State<AppState>) -> Response {
    let mut view = LoginView::new();
    if state.sessions.current_tokens().await.is_some() {
        if let Some(Effect::NavigateTo(route)) = view.on_authenticated() {
            return navigate(route).into_response();
        }
    }
    Html(view.render()).into_response()
}

async fn sign_in(State(state): State<AppState>, Form(form): Form<SignInForm>) -> Response {
    let mut view = LoginView::new();
    let token = form.token.trim();
    if token.is_empty() {
        warn!("sign-in attempt without a token");
        view.reject("A token is required");
        return (StatusCode::BAD_REQUEST, Html(view.render())).into_response();
    }

    state.sessions.submit_token(token).await;
    match view.on_authenticated() {
        Some(Effect::NavigateTo(route)) => navigate(route).into_response(),
        _ => Html(view.render()).into_response(),
    }
}

async fn sign_out(State(state): State<AppState>) -> Redirect {
    state.sessions.sign_out().await;
    navigate(Route::Login)
}

async fn admin_dashboard(State(state): State<AppState>) -> Response {
    match state.admin.visit().await {
        AdminPage::Redirect(route) => navigate(route).into_response(),
        AdminPage::Html(html) => Html(html).into_response(),
    }
}

async fn create_todo(State(state): State<AppState>, Form(form): Form<CreateTodoForm>) -> Redirect {
    after_write(state.admin.create(&form.content).await)
}

async fn delete_todo(State(state): State<AppState>, Path(id): Path<String>) -> Redirect {
    after_write(state.admin.delete(&id).await)
}

fn after_write(effect: Option<Effect>) -> Redirect {
    match effect {
        Some(Effect::NavigateTo(route)) => navigate(route),
        _ => navigate(Route::AdminDashboard),
    }
}

fn navigate(route: Route) -> Redirect {
    Redirect::to(route.path())
}
