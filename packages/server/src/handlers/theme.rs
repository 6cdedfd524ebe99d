use std::collections::HashMap;

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use chrono::Utc;
use common::api::{EnqueueBody, ErrorBody, ExistingPostBody, PostBody, ThemeBody, ThemeStatusBody};
use common::jobs::{PostJob, TopicsJob};
use common::status::{PostType, ProcessingStatus};
use common::task::TaskKind;
use sea_orm::*;
use tracing::{info, instrument, warn};

use crate::entity::{post, theme};
use crate::error::AppError;
use crate::extractors::json::AppJson;
use crate::models::post::post_body;
use crate::models::theme::*;
use crate::queue::enqueue_task;
use crate::state::AppState;

/// Find a theme by ID or return 404.
pub async fn find_theme<C: ConnectionTrait>(db: &C, id: i32) -> Result<theme::Model, AppError> {
    theme::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Theme not found".into()))
}

/// Per-theme post counters for a set of themes, in one grouped pass.
pub async fn post_counts_for(
    db: &DatabaseConnection,
    theme_ids: &[i32],
) -> Result<HashMap<i32, PostCounts>, AppError> {
    if theme_ids.is_empty() {
        return Ok(HashMap::new());
    }

    let rows: Vec<(i32, PostType)> = post::Entity::find()
        .select_only()
        .column(post::Column::ThemeId)
        .column(post::Column::PostType)
        .filter(post::Column::ThemeId.is_in(theme_ids.to_vec()))
        .into_tuple()
        .all(db)
        .await?;

    let mut counts: HashMap<i32, PostCounts> = HashMap::new();
    for (theme_id, post_type) in rows {
        let entry = counts.entry(theme_id).or_default();
        entry.total += 1;
        match post_type {
            PostType::Article => entry.articles += 1,
            PostType::Simple => entry.simple += 1,
        }
    }
    Ok(counts)
}

async fn body_with_counts(
    db: &DatabaseConnection,
    model: theme::Model,
) -> Result<ThemeBody, AppError> {
    let counts = post_counts_for(db, &[model.id]).await?;
    let count = counts.get(&model.id).copied().unwrap_or_default();
    Ok(theme_body(model, count))
}

/// Flip a theme's processing status.
async fn set_processing_status<C: ConnectionTrait>(
    conn: &C,
    theme_id: i32,
    status: ProcessingStatus,
) -> Result<(), AppError> {
    let update = theme::ActiveModel {
        id: Set(theme_id),
        processing_status: Set(status),
        updated_at: Set(Utc::now()),
        ..Default::default()
    };
    update.update(conn).await?;
    Ok(())
}

/// List themes, most recent first.
#[utoipa::path(
    get,
    path = "/api/themes/",
    tag = "Themes",
    operation_id = "listThemes",
    params(ThemeListQuery),
    responses(
        (status = 200, description = "List of themes", body = Vec<ThemeBody>),
    ),
)]
#[instrument(skip(state, query))]
pub async fn list_themes(
    State(state): State<AppState>,
    Query(query): Query<ThemeListQuery>,
) -> Result<Json<Vec<ThemeBody>>, AppError> {
    let mut select = theme::Entity::find().order_by_desc(theme::Column::CreatedAt);
    if let Some(active) = query.active {
        select = select.filter(theme::Column::IsActive.eq(active));
    }
    let themes = select.all(&state.db).await?;

    let ids: Vec<i32> = themes.iter().map(|t| t.id).collect();
    let counts = post_counts_for(&state.db, &ids).await?;

    let bodies = themes
        .into_iter()
        .map(|t| {
            let count = counts.get(&t.id).copied().unwrap_or_default();
            theme_body(t, count)
        })
        .collect();
    Ok(Json(bodies))
}

/// Create a theme.
#[utoipa::path(
    post,
    path = "/api/themes/",
    tag = "Themes",
    operation_id = "createTheme",
    request_body = CreateThemeRequest,
    responses(
        (status = 201, description = "Theme created", body = ThemeBody),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, payload))]
pub async fn create_theme(
    State(state): State<AppState>,
    AppJson(payload): AppJson<CreateThemeRequest>,
) -> Result<impl IntoResponse, AppError> {
    validate_create_theme(&payload)?;

    let now = Utc::now();
    let new_theme = theme::ActiveModel {
        title: Set(payload.title.trim().to_string()),
        is_active: Set(true),
        processing_status: Set(ProcessingStatus::Idle),
        suggested_topics: Set(None),
        topics_generated_at: Set(None),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };
    let model = new_theme.insert(&state.db).await?;

    info!(theme_id = model.id, "Theme created");
    Ok((StatusCode::CREATED, Json(theme_body(model, PostCounts::default()))))
}

/// Get a single theme.
#[utoipa::path(
    get,
    path = "/api/themes/{id}/",
    tag = "Themes",
    operation_id = "getTheme",
    params(("id" = i32, Path, description = "Theme ID")),
    responses(
        (status = 200, description = "Theme details", body = ThemeBody),
        (status = 404, description = "Theme not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state), fields(theme_id = %id))]
pub async fn get_theme(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<ThemeBody>, AppError> {
    let model = find_theme(&state.db, id).await?;
    Ok(Json(body_with_counts(&state.db, model).await?))
}

/// Partially update a theme.
#[utoipa::path(
    patch,
    path = "/api/themes/{id}/",
    tag = "Themes",
    operation_id = "updateTheme",
    params(("id" = i32, Path, description = "Theme ID")),
    request_body = UpdateThemeRequest,
    responses(
        (status = 200, description = "Theme updated", body = ThemeBody),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 404, description = "Theme not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, payload), fields(theme_id = %id))]
pub async fn update_theme(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    AppJson(payload): AppJson<UpdateThemeRequest>,
) -> Result<Json<ThemeBody>, AppError> {
    validate_update_theme(&payload)?;
    let model = find_theme(&state.db, id).await?;

    let mut active: theme::ActiveModel = model.into();
    if let Some(title) = payload.title {
        active.title = Set(title.trim().to_string());
    }
    if let Some(is_active) = payload.is_active {
        active.is_active = Set(is_active);
    }
    active.updated_at = Set(Utc::now());
    let updated = active.update(&state.db).await?;

    Ok(Json(body_with_counts(&state.db, updated).await?))
}

/// Soft-delete a theme (clears `is_active`; posts are kept).
#[utoipa::path(
    delete,
    path = "/api/themes/{id}/",
    tag = "Themes",
    operation_id = "deleteTheme",
    params(("id" = i32, Path, description = "Theme ID")),
    responses(
        (status = 204, description = "Theme deactivated"),
        (status = 404, description = "Theme not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state), fields(theme_id = %id))]
pub async fn delete_theme(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<StatusCode, AppError> {
    let model = find_theme(&state.db, id).await?;

    let mut active: theme::ActiveModel = model.into();
    active.is_active = Set(false);
    active.updated_at = Set(Utc::now());
    active.update(&state.db).await?;

    Ok(StatusCode::NO_CONTENT)
}

/// Kick off topic generation for a theme.
#[utoipa::path(
    post,
    path = "/api/themes/{id}/generate_topics/",
    tag = "Themes",
    operation_id = "generateTopics",
    params(("id" = i32, Path, description = "Theme ID")),
    responses(
        (status = 202, description = "Generation task enqueued", body = EnqueueBody),
        (status = 400, description = "Default provider not configured (PROVIDER_NOT_CONFIGURED)", body = ErrorBody),
        (status = 404, description = "Theme not found (NOT_FOUND)", body = ErrorBody),
        (status = 409, description = "Theme is already processing (CONFLICT)", body = ErrorBody),
        (status = 503, description = "Queue unavailable (QUEUE_UNAVAILABLE)", body = ErrorBody),
    ),
)]
#[instrument(skip(state), fields(theme_id = %id))]
pub async fn generate_topics(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, AppError> {
    let theme = find_theme(&state.db, id).await?;
    if theme.processing_status.is_processing() {
        return Err(AppError::Conflict("Topic generation already in progress".into()));
    }
    // Fail fast before any row or message exists.
    state.providers.default_service()?;

    let existing = stored_topics(&theme);
    let job = TopicsJob {
        theme_id: theme.id,
        theme_title: theme.title.clone(),
        existing_topics: existing.clone(),
    };

    set_processing_status(&state.db, theme.id, ProcessingStatus::Processing).await?;
    let task_id = match enqueue_task(&state, TaskKind::GenerateTopics, &job, Some(theme.id), None)
        .await
    {
        Ok(task_id) => task_id,
        Err(e) => {
            warn!(theme_id = theme.id, "Enqueue failed, reverting processing status");
            set_processing_status(&state.db, theme.id, ProcessingStatus::Idle).await?;
            return Err(e);
        }
    };

    Ok((
        StatusCode::ACCEPTED,
        Json(EnqueueBody {
            task_id,
            message: "Topic generation started".into(),
            theme_id: Some(theme.id),
            existing_topics_count: Some(existing.len()),
        }),
    ))
}

/// Kick off post generation for a topic of a theme.
#[utoipa::path(
    post,
    path = "/api/themes/{id}/generate_post/",
    tag = "Themes",
    operation_id = "generatePost",
    params(("id" = i32, Path, description = "Theme ID")),
    request_body = GeneratePostRequest,
    responses(
        (status = 200, description = "A post for this topic already exists; nothing enqueued", body = ExistingPostBody),
        (status = 202, description = "Generation task enqueued", body = EnqueueBody),
        (status = 400, description = "Validation or provider configuration error", body = ErrorBody),
        (status = 404, description = "Theme not found (NOT_FOUND)", body = ErrorBody),
        (status = 409, description = "Theme is already processing (CONFLICT)", body = ErrorBody),
        (status = 503, description = "Queue unavailable (QUEUE_UNAVAILABLE)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, payload), fields(theme_id = %id))]
pub async fn generate_post(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    AppJson(payload): AppJson<GeneratePostRequest>,
) -> Result<axum::response::Response, AppError> {
    validate_generate_post(&payload)?;
    let theme = find_theme(&state.db, id).await?;
    if theme.processing_status.is_processing() {
        return Err(AppError::Conflict("Theme is already processing".into()));
    }

    let topic = payload.topic.trim().to_string();

    // Duplicate guard: one post per (theme, type, topic).
    let existing = post::Entity::find()
        .filter(post::Column::ThemeId.eq(theme.id))
        .filter(post::Column::PostType.eq(payload.post_type))
        .filter(post::Column::Topic.eq(topic.clone()))
        .one(&state.db)
        .await?;
    if let Some(existing) = existing {
        info!(post_id = existing.id, "Post for this topic already exists");
        return Ok((
            StatusCode::OK,
            Json(ExistingPostBody {
                warning: format!(
                    "A {} post for topic '{}' already exists",
                    payload.post_type, topic
                ),
                post_id: existing.id,
            }),
        )
            .into_response());
    }

    state.providers.default_service()?;

    let job = PostJob {
        theme_id: theme.id,
        theme_title: theme.title.clone(),
        topic,
        post_type: payload.post_type,
        topic_data: payload.topic_data,
    };

    set_processing_status(&state.db, theme.id, ProcessingStatus::Processing).await?;
    let task_id = match enqueue_task(&state, TaskKind::GeneratePost, &job, Some(theme.id), None)
        .await
    {
        Ok(task_id) => task_id,
        Err(e) => {
            warn!(theme_id = theme.id, "Enqueue failed, reverting processing status");
            set_processing_status(&state.db, theme.id, ProcessingStatus::Idle).await?;
            return Err(e);
        }
    };

    Ok((
        StatusCode::ACCEPTED,
        Json(EnqueueBody {
            task_id,
            message: format!("{} generation started", job.post_type),
            theme_id: Some(theme.id),
            existing_topics_count: None,
        }),
    )
        .into_response())
}

/// Posts belonging to a theme, most recent first.
#[utoipa::path(
    get,
    path = "/api/themes/{id}/posts/",
    tag = "Themes",
    operation_id = "listThemePosts",
    params(("id" = i32, Path, description = "Theme ID")),
    responses(
        (status = 200, description = "Posts of the theme", body = Vec<PostBody>),
        (status = 404, description = "Theme not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state), fields(theme_id = %id))]
pub async fn list_theme_posts(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<Vec<PostBody>>, AppError> {
    let theme = find_theme(&state.db, id).await?;

    let posts = post::Entity::find()
        .filter(post::Column::ThemeId.eq(theme.id))
        .order_by_desc(post::Column::CreatedAt)
        .all(&state.db)
        .await?;

    let bodies = posts
        .into_iter()
        .map(|p| post_body(p, theme.title.clone()))
        .collect();
    Ok(Json(bodies))
}

/// Read-only processing snapshot of a theme.
#[utoipa::path(
    get,
    path = "/api/themes/{id}/status/",
    tag = "Themes",
    operation_id = "themeStatus",
    params(("id" = i32, Path, description = "Theme ID")),
    responses(
        (status = 200, description = "Processing snapshot", body = ThemeStatusBody),
        (status = 404, description = "Theme not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state), fields(theme_id = %id))]
pub async fn theme_status(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<ThemeStatusBody>, AppError> {
    let theme = find_theme(&state.db, id).await?;
    Ok(Json(theme_status_body(&theme)))
}
