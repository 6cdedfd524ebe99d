use std::sync::Arc;

use chrono::{DateTime, Utc};
use common::event::{OutcomeData, TaskEvent};
use common::status::{PostStatus, ProcessingStatus};
use common::task::TaskState;
use common::topic::SuggestedTopics;
use mq::{BroccoliError, BrokerMessage, Mq};
use sea_orm::sea_query::LockType;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DatabaseTransaction, EntityTrait,
    QueryFilter, QuerySelect, Set, TransactionTrait,
};
use tracing::{error, info, warn};

use crate::entity::{post, task, theme};

/// Consume task lifecycle events from the event queue.
///
/// Runs single-concurrency so each terminal event's transaction commits
/// before the next event is looked at.
pub async fn consume_task_events(db: DatabaseConnection, mq: Arc<Mq>, queue_name: String) {
    info!(queue = %queue_name, "Starting task event consumer");

    let result = mq
        .process_messages(
            &queue_name,
            None, // single-threaded for sequential DB writes
            None,
            move |message: BrokerMessage<TaskEvent>| {
                let db = db.clone();
                async move {
                    let event = message.payload;
                    let task_id = event.task_id().to_string();

                    if let Err(e) = apply_task_event(&db, event).await {
                        error!(task_id = %task_id, error = %e, "Failed to apply task event");
                        return Err(BroccoliError::Job(e.to_string()));
                    }
                    Ok(())
                }
            },
        )
        .await;

    if let Err(e) = result {
        error!(error = %e, "Task event consumer stopped unexpectedly");
    }
}

/// Apply a single event: task row update and, for terminal events, the
/// owning entity's mutation, all in one transaction.
pub async fn apply_task_event(db: &DatabaseConnection, event: TaskEvent) -> anyhow::Result<()> {
    let txn = db.begin().await?;

    let Some(row) = task::Entity::find_by_id(event.task_id())
        .lock(LockType::Update)
        .one(&txn)
        .await?
    else {
        // Event for a row we never recorded; acknowledge and move on.
        warn!(task_id = %event.task_id(), "Event for unknown task, dropping");
        txn.commit().await?;
        return Ok(());
    };

    if row.state.is_terminal() {
        // Replays of terminal events are no-ops.
        info!(task_id = %row.id, state = %row.state, "Task already terminal, skipping");
        txn.commit().await?;
        return Ok(());
    }

    match event {
        TaskEvent::Started { attempt, at, worker_id, .. } => {
            info!(task_id = %row.id, attempt, worker = %worker_id, "Task started");
            let update = task::ActiveModel {
                id: Set(row.id.clone()),
                state: Set(TaskState::Started),
                attempts: Set(i32::from(attempt)),
                started_at: Set(Some(row.started_at.unwrap_or(at))),
                ..Default::default()
            };
            update.update(&txn).await?;
        }
        TaskEvent::Retrying { attempt, error, next_delay_secs, .. } => {
            info!(
                task_id = %row.id,
                attempt,
                next_delay_secs,
                error = %error.message,
                "Task attempt failed, retry scheduled"
            );
            let update = task::ActiveModel {
                id: Set(row.id.clone()),
                state: Set(TaskState::Retry),
                attempts: Set(i32::from(attempt)),
                error_code: Set(Some(error.code.to_string())),
                error_message: Set(Some(error.message)),
                ..Default::default()
            };
            update.update(&txn).await?;
        }
        TaskEvent::Completed { attempts, provider, model, data, at, .. } => {
            let result = serde_json::to_value(&data)?;
            apply_outcome(&txn, &row, data, provider, model, at).await?;

            let update = task::ActiveModel {
                id: Set(row.id.clone()),
                state: Set(TaskState::Success),
                attempts: Set(i32::from(attempts)),
                result: Set(Some(result)),
                error_code: Set(None),
                error_message: Set(None),
                finished_at: Set(Some(at)),
                ..Default::default()
            };
            update.update(&txn).await?;
            info!(task_id = %row.id, kind = %row.kind, "Task completed");
        }
        TaskEvent::Failed { attempts, error, at, .. } => {
            fail_owning_entity(&txn, &row).await?;

            let update = task::ActiveModel {
                id: Set(row.id.clone()),
                state: Set(TaskState::Failure),
                attempts: Set(i32::from(attempts)),
                error_code: Set(Some(error.code.to_string())),
                error_message: Set(Some(error.message.clone())),
                finished_at: Set(Some(at)),
                ..Default::default()
            };
            update.update(&txn).await?;
            warn!(
                task_id = %row.id,
                kind = %row.kind,
                code = %error.code,
                error = %error.message,
                "Task failed"
            );
        }
    }

    txn.commit().await?;
    Ok(())
}

/// Entity mutation for a completed task.
async fn apply_outcome(
    txn: &DatabaseTransaction,
    row: &task::Model,
    data: OutcomeData,
    provider: Option<String>,
    model: Option<String>,
    at: DateTime<Utc>,
) -> anyhow::Result<()> {
    let now = Utc::now();
    match data {
        OutcomeData::Topics { topics } => {
            let theme_id = row
                .theme_id
                .ok_or_else(|| anyhow::anyhow!("Topics outcome without a theme_id"))?;
            let stored = SuggestedTopics::new(topics, at);
            let update = theme::ActiveModel {
                id: Set(theme_id),
                suggested_topics: Set(Some(serde_json::to_value(&stored)?)),
                topics_generated_at: Set(Some(at)),
                processing_status: Set(ProcessingStatus::Completed),
                updated_at: Set(now),
                ..Default::default()
            };
            update.update(txn).await?;
        }
        OutcomeData::Post {
            post_type,
            topic,
            title,
            content,
            promotional_post,
            cover_image_prompt,
            seo_title,
            seo_description,
        } => {
            let theme_id = row
                .theme_id
                .ok_or_else(|| anyhow::anyhow!("Post outcome without a theme_id"))?;

            let existing = post::Entity::find()
                .filter(post::Column::ThemeId.eq(theme_id))
                .filter(post::Column::PostType.eq(post_type))
                .filter(post::Column::Topic.eq(topic.clone()))
                .one(txn)
                .await?;
            if let Some(existing) = existing {
                info!(
                    task_id = %row.id,
                    post_id = existing.id,
                    "Post already materialized, skipping insert"
                );
            } else {
                let new_post = post::ActiveModel {
                    theme_id: Set(theme_id),
                    post_type: Set(post_type),
                    title: Set(title),
                    content: Set(content),
                    promotional_post: Set(promotional_post),
                    cover_image_prompt: Set(cover_image_prompt),
                    topic: Set(topic.clone()),
                    seo_title: Set(seo_title),
                    seo_description: Set(seo_description),
                    link: Set(None),
                    post_date: Set(now),
                    scheduled_date: Set(None),
                    status: Set(PostStatus::Generated),
                    processing_status: Set(ProcessingStatus::Completed),
                    generation_prompt: Set(Some(format!("Topic: {topic}, type: {post_type}"))),
                    ai_model_used: Set(model),
                    ai_provider_used: Set(provider),
                    created_at: Set(now),
                    updated_at: Set(now),
                    generated_at: Set(Some(at)),
                    ..Default::default()
                };
                new_post.insert(txn).await?;
            }

            let theme_update = theme::ActiveModel {
                id: Set(theme_id),
                processing_status: Set(ProcessingStatus::Completed),
                updated_at: Set(now),
                ..Default::default()
            };
            theme_update.update(txn).await?;
        }
        OutcomeData::Improved { content, improvement_summary } => {
            let post_id = row
                .post_id
                .ok_or_else(|| anyhow::anyhow!("Improved outcome without a post_id"))?;
            let current = post::Entity::find_by_id(post_id)
                .one(txn)
                .await?
                .ok_or_else(|| anyhow::anyhow!("Post {post_id} not found"))?;

            let audit = append_audit(
                current.generation_prompt.as_deref(),
                &format!("Improved: {improvement_summary}"),
            );
            let update = post::ActiveModel {
                id: Set(post_id),
                content: Set(content),
                generation_prompt: Set(Some(audit)),
                processing_status: Set(ProcessingStatus::Completed),
                ai_model_used: Set(model.or(current.ai_model_used)),
                ai_provider_used: Set(provider.or(current.ai_provider_used)),
                updated_at: Set(now),
                ..Default::default()
            };
            update.update(txn).await?;
        }
        OutcomeData::ImagePrompt { cover_image_prompt, style_notes } => {
            let post_id = row
                .post_id
                .ok_or_else(|| anyhow::anyhow!("ImagePrompt outcome without a post_id"))?;
            let current = post::Entity::find_by_id(post_id)
                .one(txn)
                .await?
                .ok_or_else(|| anyhow::anyhow!("Post {post_id} not found"))?;

            let audit = append_audit(
                current.generation_prompt.as_deref(),
                &format!("Image prompt regenerated: {style_notes}"),
            );
            let update = post::ActiveModel {
                id: Set(post_id),
                cover_image_prompt: Set(Some(cover_image_prompt)),
                generation_prompt: Set(Some(audit)),
                processing_status: Set(ProcessingStatus::Completed),
                updated_at: Set(now),
                ..Default::default()
            };
            update.update(txn).await?;
        }
        OutcomeData::Pong { .. } => {
            // Ping carries no entity; the task row's result is the outcome.
        }
    }
    Ok(())
}

/// A failed task leaves its owning entity marked `failed`.
async fn fail_owning_entity(txn: &DatabaseTransaction, row: &task::Model) -> anyhow::Result<()> {
    let now = Utc::now();
    if let Some(post_id) = row.post_id {
        let update = post::ActiveModel {
            id: Set(post_id),
            processing_status: Set(ProcessingStatus::Failed),
            updated_at: Set(now),
            ..Default::default()
        };
        update.update(txn).await?;
    } else if let Some(theme_id) = row.theme_id {
        let update = theme::ActiveModel {
            id: Set(theme_id),
            processing_status: Set(ProcessingStatus::Failed),
            updated_at: Set(now),
            ..Default::default()
        };
        update.update(txn).await?;
    }
    Ok(())
}

fn append_audit(existing: Option<&str>, entry: &str) -> String {
    match existing {
        Some(prior) if !prior.is_empty() => format!("{prior}\n{entry}"),
        _ => entry.to_string(),
    }
}
