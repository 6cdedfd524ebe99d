use std::collections::HashMap;

use axum::Json;
use axum::extract::State;
use common::api::{DashboardStatsBody, PostBody, ThemeBody};
use common::status::PostStatus;
use sea_orm::*;
use tracing::instrument;

use crate::entity::{post, theme};
use crate::error::AppError;
use super::theme::post_counts_for;
use crate::models::post::post_body;
use crate::models::theme::theme_body;
use crate::state::AppState;

const RECENT_LIMIT: u64 = 5;

/// Aggregate counters and recent activity for the dashboard.
#[utoipa::path(
    get,
    path = "/api/dashboard/stats/",
    tag = "Dashboard",
    operation_id = "dashboardStats",
    responses(
        (status = 200, description = "Dashboard aggregates", body = DashboardStatsBody),
    ),
)]
#[instrument(skip(state))]
pub async fn dashboard_stats(
    State(state): State<AppState>,
) -> Result<Json<DashboardStatsBody>, AppError> {
    let db = &state.db;

    let total_themes = theme::Entity::find().count(db).await? as i64;
    let total_posts = post::Entity::find().count(db).await? as i64;
    let published_posts = post::Entity::find()
        .filter(post::Column::Status.eq(PostStatus::Published))
        .count(db)
        .await? as i64;
    let draft_posts = post::Entity::find()
        .filter(post::Column::Status.eq(PostStatus::Draft))
        .count(db)
        .await? as i64;
    let generated_posts = post::Entity::find()
        .filter(post::Column::Status.eq(PostStatus::Generated))
        .count(db)
        .await? as i64;

    let recent_posts = recent_posts(&state).await?;
    let recent_themes = recent_themes(&state).await?;

    Ok(Json(DashboardStatsBody {
        total_themes,
        total_posts,
        published_posts,
        draft_posts,
        generated_posts,
        ai_provider: state.providers.default_provider_name().to_string(),
        ai_model: state.providers.default_model_name(),
        recent_posts,
        recent_themes,
    }))
}

async fn recent_posts(state: &AppState) -> Result<Vec<PostBody>, AppError> {
    let posts = post::Entity::find()
        .order_by_desc(post::Column::CreatedAt)
        .limit(RECENT_LIMIT)
        .all(&state.db)
        .await?;

    let theme_ids: Vec<i32> = posts.iter().map(|p| p.theme_id).collect();
    let titles: HashMap<i32, String> = theme::Entity::find()
        .filter(theme::Column::Id.is_in(theme_ids))
        .all(&state.db)
        .await?
        .into_iter()
        .map(|t| (t.id, t.title))
        .collect();

    Ok(posts
        .into_iter()
        .map(|p| {
            let title = titles.get(&p.theme_id).cloned().unwrap_or_default();
            post_body(p, title)
        })
        .collect())
}

async fn recent_themes(state: &AppState) -> Result<Vec<ThemeBody>, AppError> {
    let themes = theme::Entity::find()
        .order_by_desc(theme::Column::CreatedAt)
        .limit(RECENT_LIMIT)
        .all(&state.db)
        .await?;

    let ids: Vec<i32> = themes.iter().map(|t| t.id).collect();
    let counts = post_counts_for(&state.db, &ids).await?;

    Ok(themes
        .into_iter()
        .map(|t| {
            let count = counts.get(&t.id).copied().unwrap_or_default();
            theme_body(t, count)
        })
        .collect())
}
