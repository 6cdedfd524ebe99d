pub mod config;
pub mod consumers;
pub mod database;
pub mod entity;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod maintenance;
pub mod models;
pub mod queue;
pub mod routes;
pub mod state;

use std::time::Duration;

use axum::http::HeaderValue;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tracing::warn;
use utoipa::OpenApi;
use utoipa_scalar::{Scalar, Servable as ScalarServable};
use utoipa_swagger_ui::SwaggerUi;

use crate::config::CorsConfig;
use crate::state::AppState;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "PostPilot API",
        version = "1.0.0",
        description = "AI-assisted LinkedIn content pipeline"
    ),
    paths(
        handlers::theme::list_themes,
        handlers::theme::create_theme,
        handlers::theme::get_theme,
        handlers::theme::update_theme,
        handlers::theme::delete_theme,
        handlers::theme::generate_topics,
        handlers::theme::generate_post,
        handlers::theme::list_theme_posts,
        handlers::theme::theme_status,
        handlers::post::list_posts,
        handlers::post::get_post,
        handlers::post::update_post,
        handlers::post::delete_post,
        handlers::post::improve_post,
        handlers::post::regenerate_image_prompt,
        handlers::post::publish_post,
        handlers::post::post_status,
        handlers::task::check_task,
        handlers::task::ping_task,
        handlers::provider::list_providers,
        handlers::provider::test_provider,
        handlers::dashboard::dashboard_stats,
        handlers::health::health,
    ),
    tags(
        (name = "Themes", description = "Theme CRUD and generation triggers"),
        (name = "Posts", description = "Post CRUD, improvement and publishing"),
        (name = "Tasks", description = "Background task polling"),
        (name = "Providers", description = "AI provider administration"),
        (name = "Dashboard", description = "Aggregate statistics"),
        (name = "Health", description = "Liveness"),
    ),
)]
struct ApiDoc;

/// CORS layer from the `server.cors` block. An empty origin list means any
/// origin, for local development.
fn cors_layer(config: &CorsConfig) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods(Any)
        .allow_headers(Any)
        .max_age(Duration::from_secs(config.max_age));

    if config.allow_origins.is_empty() {
        return layer.allow_origin(Any);
    }

    let origins: Vec<HeaderValue> = config
        .allow_origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(origin, "Ignoring unparsable CORS origin");
                None
            }
        })
        .collect();
    layer.allow_origin(AllowOrigin::list(origins))
}

/// Build the application router.
pub fn build_router(state: AppState) -> axum::Router {
    let cors = cors_layer(&state.config.server.cors);

    axum::Router::new()
        .nest("/api", routes::api_routes())
        .with_state(state)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .merge(Scalar::with_url("/scalar", ApiDoc::openapi()))
        .layer(cors)
}
