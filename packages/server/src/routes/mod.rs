use axum::{
    Router,
    routing::{get, post},
};

use crate::handlers;
use crate::state::AppState;

/// All API routes, nested under `/api` by the caller. Resource paths keep
/// their trailing slashes.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/themes", theme_routes())
        .nest("/posts", post_routes())
        .nest("/tasks", task_routes())
        .nest("/providers", provider_routes())
        .route("/dashboard/stats/", get(handlers::dashboard::dashboard_stats))
        .route("/health/", get(handlers::health::health))
}

fn theme_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::theme::list_themes).post(handlers::theme::create_theme),
        )
        .route(
            "/{id}/",
            get(handlers::theme::get_theme)
                .patch(handlers::theme::update_theme)
                .delete(handlers::theme::delete_theme),
        )
        .route("/{id}/generate_topics/", post(handlers::theme::generate_topics))
        .route("/{id}/generate_post/", post(handlers::theme::generate_post))
        .route("/{id}/posts/", get(handlers::theme::list_theme_posts))
        .route("/{id}/status/", get(handlers::theme::theme_status))
}

fn post_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::post::list_posts))
        .route(
            "/{id}/",
            get(handlers::post::get_post)
                .patch(handlers::post::update_post)
                .delete(handlers::post::delete_post),
        )
        .route("/{id}/improve/", post(handlers::post::improve_post))
        .route(
            "/{id}/regenerate_image_prompt/",
            post(handlers::post::regenerate_image_prompt),
        )
        .route("/{id}/publish/", post(handlers::post::publish_post))
        .route("/{id}/status/", get(handlers::post::post_status))
}

fn task_routes() -> Router<AppState> {
    Router::new()
        .route("/check/", get(handlers::task::check_task))
        .route("/ping/", post(handlers::task::ping_task))
}

fn provider_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::provider::list_providers))
        .route("/{name}/test/", post(handlers::provider::test_provider))
}
