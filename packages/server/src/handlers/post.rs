use std::collections::HashMap;

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use chrono::Utc;
use common::api::{EnqueueBody, ErrorBody, PostBody, PostStatusBody};
use common::jobs::{ImagePromptJob, ImproveJob};
use common::status::{PostStatus, PostType, ProcessingStatus};
use common::task::TaskKind;
use sea_orm::*;
use tracing::{info, instrument, warn};

use crate::entity::{post, theme};
use crate::error::AppError;
use crate::extractors::json::AppJson;
use crate::models::post::*;
use crate::queue::enqueue_task;
use crate::state::AppState;

/// Find a post by ID or return 404.
pub async fn find_post<C: ConnectionTrait>(db: &C, id: i32) -> Result<post::Model, AppError> {
    post::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Post not found".into()))
}

async fn theme_title_of(db: &DatabaseConnection, theme_id: i32) -> Result<String, AppError> {
    Ok(theme::Entity::find_by_id(theme_id)
        .one(db)
        .await?
        .map(|t| t.title)
        .unwrap_or_default())
}

/// Flip a post's processing status.
async fn set_processing_status<C: ConnectionTrait>(
    conn: &C,
    post_id: i32,
    status: ProcessingStatus,
) -> Result<(), AppError> {
    let update = post::ActiveModel {
        id: Set(post_id),
        processing_status: Set(status),
        updated_at: Set(Utc::now()),
        ..Default::default()
    };
    update.update(conn).await?;
    Ok(())
}

/// List posts, most recent first, with optional filters.
#[utoipa::path(
    get,
    path = "/api/posts/",
    tag = "Posts",
    operation_id = "listPosts",
    params(PostListQuery),
    responses(
        (status = 200, description = "List of posts", body = Vec<PostBody>),
    ),
)]
#[instrument(skip(state, query))]
pub async fn list_posts(
    State(state): State<AppState>,
    Query(query): Query<PostListQuery>,
) -> Result<Json<Vec<PostBody>>, AppError> {
    let mut select = post::Entity::find().order_by_desc(post::Column::CreatedAt);
    if let Some(theme_id) = query.theme {
        select = select.filter(post::Column::ThemeId.eq(theme_id));
    }
    if let Some(status) = query.status {
        select = select.filter(post::Column::Status.eq(status));
    }
    if let Some(post_type) = query.post_type {
        select = select.filter(post::Column::PostType.eq(post_type));
    }
    let posts = select.all(&state.db).await?;

    let theme_ids: Vec<i32> = posts.iter().map(|p| p.theme_id).collect();
    let titles: HashMap<i32, String> = theme::Entity::find()
        .filter(theme::Column::Id.is_in(theme_ids))
        .all(&state.db)
        .await?
        .into_iter()
        .map(|t| (t.id, t.title))
        .collect();

    let bodies = posts
        .into_iter()
        .map(|p| {
            let title = titles.get(&p.theme_id).cloned().unwrap_or_default();
            post_body(p, title)
        })
        .collect();
    Ok(Json(bodies))
}

/// Get a single post.
#[utoipa::path(
    get,
    path = "/api/posts/{id}/",
    tag = "Posts",
    operation_id = "getPost",
    params(("id" = i32, Path, description = "Post ID")),
    responses(
        (status = 200, description = "Post details", body = PostBody),
        (status = 404, description = "Post not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state), fields(post_id = %id))]
pub async fn get_post(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<PostBody>, AppError> {
    let model = find_post(&state.db, id).await?;
    let title = theme_title_of(&state.db, model.theme_id).await?;
    Ok(Json(post_body(model, title)))
}

/// Partially update a post's editable fields.
#[utoipa::path(
    patch,
    path = "/api/posts/{id}/",
    tag = "Posts",
    operation_id = "updatePost",
    params(("id" = i32, Path, description = "Post ID")),
    request_body = UpdatePostRequest,
    responses(
        (status = 200, description = "Post updated", body = PostBody),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 404, description = "Post not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, payload), fields(post_id = %id))]
pub async fn update_post(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    AppJson(payload): AppJson<UpdatePostRequest>,
) -> Result<Json<PostBody>, AppError> {
    let model = find_post(&state.db, id).await?;
    validate_update_post(&payload, model.post_type)?;
    let theme_title = theme_title_of(&state.db, model.theme_id).await?;

    let mut active: post::ActiveModel = model.into();
    if let Some(title) = payload.title {
        active.title = Set(title.trim().to_string());
    }
    if let Some(content) = payload.content {
        active.content = Set(content);
    }
    if let Some(promotional_post) = payload.promotional_post {
        active.promotional_post = Set(promotional_post);
    }
    if let Some(seo_title) = payload.seo_title {
        active.seo_title = Set(seo_title.trim().to_string());
    }
    if let Some(seo_description) = payload.seo_description {
        active.seo_description = Set(seo_description.trim().to_string());
    }
    if let Some(link) = payload.link {
        active.link = Set(link);
    }
    if let Some(scheduled_date) = payload.scheduled_date {
        active.scheduled_date = Set(scheduled_date);
    }
    if let Some(status) = payload.status {
        active.status = Set(status);
    }
    active.updated_at = Set(Utc::now());
    let updated = active.update(&state.db).await?;

    Ok(Json(post_body(updated, theme_title)))
}

/// Delete a post permanently.
#[utoipa::path(
    delete,
    path = "/api/posts/{id}/",
    tag = "Posts",
    operation_id = "deletePost",
    params(("id" = i32, Path, description = "Post ID")),
    responses(
        (status = 204, description = "Post deleted"),
        (status = 404, description = "Post not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state), fields(post_id = %id))]
pub async fn delete_post(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<StatusCode, AppError> {
    let model = find_post(&state.db, id).await?;
    model.delete(&state.db).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Kick off an AI rewrite of a post's content.
#[utoipa::path(
    post,
    path = "/api/posts/{id}/improve/",
    tag = "Posts",
    operation_id = "improvePost",
    params(("id" = i32, Path, description = "Post ID")),
    responses(
        (status = 202, description = "Improvement task enqueued", body = EnqueueBody),
        (status = 400, description = "Default provider not configured (PROVIDER_NOT_CONFIGURED)", body = ErrorBody),
        (status = 404, description = "Post not found (NOT_FOUND)", body = ErrorBody),
        (status = 409, description = "Post is already processing (CONFLICT)", body = ErrorBody),
        (status = 503, description = "Queue unavailable (QUEUE_UNAVAILABLE)", body = ErrorBody),
    ),
)]
#[instrument(skip(state), fields(post_id = %id))]
pub async fn improve_post(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, AppError> {
    let model = find_post(&state.db, id).await?;
    if model.processing_status.is_processing() {
        return Err(AppError::Conflict("Post is already processing".into()));
    }
    state.providers.default_service()?;

    let job = ImproveJob {
        post_id: model.id,
        title: model.title.clone(),
        post_type: model.post_type,
        topic: model.topic.clone(),
        content: model.content.clone(),
    };

    set_processing_status(&state.db, model.id, ProcessingStatus::Processing).await?;
    let task_id =
        match enqueue_task(&state, TaskKind::ImprovePost, &job, Some(model.theme_id), Some(model.id))
            .await
        {
            Ok(task_id) => task_id,
            Err(e) => {
                warn!(post_id = model.id, "Enqueue failed, reverting processing status");
                set_processing_status(&state.db, model.id, ProcessingStatus::Idle).await?;
                return Err(e);
            }
        };

    Ok((
        StatusCode::ACCEPTED,
        Json(EnqueueBody {
            task_id,
            message: "Post improvement started".into(),
            theme_id: None,
            existing_topics_count: None,
        }),
    ))
}

/// Kick off cover image prompt regeneration. Articles only.
#[utoipa::path(
    post,
    path = "/api/posts/{id}/regenerate_image_prompt/",
    tag = "Posts",
    operation_id = "regenerateImagePrompt",
    params(("id" = i32, Path, description = "Post ID")),
    responses(
        (status = 202, description = "Regeneration task enqueued", body = EnqueueBody),
        (status = 400, description = "Post is not an article, or provider not configured", body = ErrorBody),
        (status = 404, description = "Post not found (NOT_FOUND)", body = ErrorBody),
        (status = 409, description = "Post is already processing (CONFLICT)", body = ErrorBody),
        (status = 503, description = "Queue unavailable (QUEUE_UNAVAILABLE)", body = ErrorBody),
    ),
)]
#[instrument(skip(state), fields(post_id = %id))]
pub async fn regenerate_image_prompt(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, AppError> {
    let model = find_post(&state.db, id).await?;
    if model.post_type != PostType::Article {
        return Err(AppError::Validation(
            "Cover image prompts only apply to article posts".into(),
        ));
    }
    if model.processing_status.is_processing() {
        return Err(AppError::Conflict("Post is already processing".into()));
    }
    state.providers.default_service()?;

    let theme_title = theme_title_of(&state.db, model.theme_id).await?;
    let job = ImagePromptJob {
        post_id: model.id,
        title: model.title.clone(),
        topic: model.topic.clone(),
        theme_title,
        current_prompt: model.cover_image_prompt.clone(),
    };

    set_processing_status(&state.db, model.id, ProcessingStatus::Processing).await?;
    let task_id = match enqueue_task(
        &state,
        TaskKind::RegenerateImagePrompt,
        &job,
        Some(model.theme_id),
        Some(model.id),
    )
    .await
    {
        Ok(task_id) => task_id,
        Err(e) => {
            warn!(post_id = model.id, "Enqueue failed, reverting processing status");
            set_processing_status(&state.db, model.id, ProcessingStatus::Idle).await?;
            return Err(e);
        }
    };

    Ok((
        StatusCode::ACCEPTED,
        Json(EnqueueBody {
            task_id,
            message: "Image prompt regeneration started".into(),
            theme_id: None,
            existing_topics_count: None,
        }),
    ))
}

/// Publish a post immediately.
#[utoipa::path(
    post,
    path = "/api/posts/{id}/publish/",
    tag = "Posts",
    operation_id = "publishPost",
    params(("id" = i32, Path, description = "Post ID")),
    responses(
        (status = 200, description = "Post published", body = PostBody),
        (status = 404, description = "Post not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state), fields(post_id = %id))]
pub async fn publish_post(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<PostBody>, AppError> {
    let model = find_post(&state.db, id).await?;
    let theme_title = theme_title_of(&state.db, model.theme_id).await?;

    let now = Utc::now();
    let mut active: post::ActiveModel = model.into();
    active.status = Set(PostStatus::Published);
    active.post_date = Set(now);
    active.updated_at = Set(now);
    let published = active.update(&state.db).await?;

    info!(post_id = published.id, "Post published");
    Ok(Json(post_body(published, theme_title)))
}

/// Read-only processing snapshot of a post.
#[utoipa::path(
    get,
    path = "/api/posts/{id}/status/",
    tag = "Posts",
    operation_id = "postStatus",
    params(("id" = i32, Path, description = "Post ID")),
    responses(
        (status = 200, description = "Processing snapshot", body = PostStatusBody),
        (status = 404, description = "Post not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state), fields(post_id = %id))]
pub async fn post_status(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<PostStatusBody>, AppError> {
    let model = find_post(&state.db, id).await?;
    Ok(Json(post_status_body(&model)))
}
