use chrono::Utc;
use common::config::TaskPolicyConfig;
use common::status::ProcessingStatus;
use common::task::{TaskErrorCode, TaskState};
use sea_orm::sea_query::LockType;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QuerySelect, Set,
    TransactionTrait,
};
use tracing::{error, info, warn};

use crate::entity::{post, task, theme};

/// Run the stuck work sweeper as a background task.
///
/// Covers crashed workers and lost events: anything still marked processing
/// or non-terminal past the threshold is flipped to failed.
pub async fn run_stuck_sweeper(db: DatabaseConnection, config: TaskPolicyConfig) {
    info!(
        stuck_after_secs = config.stuck_after_secs,
        scan_interval_secs = config.stuck_scan_interval_secs,
        "Starting stuck work sweeper"
    );

    let mut interval = tokio::time::interval(config.stuck_scan_interval());

    loop {
        interval.tick().await;

        if let Err(e) = sweep_once(&db, &config).await {
            error!(error = %e, "Stuck work sweep failed");
        }
    }
}

pub async fn sweep_once(db: &DatabaseConnection, config: &TaskPolicyConfig) -> anyhow::Result<()> {
    let threshold = Utc::now() - chrono::Duration::seconds(config.stuck_after_secs as i64);

    let stuck_theme_ids: Vec<i32> = theme::Entity::find()
        .select_only()
        .column(theme::Column::Id)
        .filter(theme::Column::ProcessingStatus.eq(ProcessingStatus::Processing))
        .filter(theme::Column::UpdatedAt.lt(threshold))
        .into_tuple()
        .all(db)
        .await?;

    let stuck_post_ids: Vec<i32> = post::Entity::find()
        .select_only()
        .column(post::Column::Id)
        .filter(post::Column::ProcessingStatus.eq(ProcessingStatus::Processing))
        .filter(post::Column::UpdatedAt.lt(threshold))
        .into_tuple()
        .all(db)
        .await?;

    let stuck_task_ids: Vec<String> = task::Entity::find()
        .select_only()
        .column(task::Column::Id)
        .filter(task::Column::State.is_in([TaskState::Pending, TaskState::Started, TaskState::Retry]))
        .filter(task::Column::QueuedAt.lt(threshold))
        .into_tuple()
        .all(db)
        .await?;

    if stuck_theme_ids.is_empty() && stuck_post_ids.is_empty() && stuck_task_ids.is_empty() {
        return Ok(());
    }

    info!(
        themes = stuck_theme_ids.len(),
        posts = stuck_post_ids.len(),
        tasks = stuck_task_ids.len(),
        "Found stuck work, failing it"
    );

    for theme_id in stuck_theme_ids {
        if let Err(e) = fail_stuck_theme(db, theme_id).await {
            error!(theme_id, error = %e, "Failed to sweep stuck theme");
        }
    }
    for post_id in stuck_post_ids {
        if let Err(e) = fail_stuck_post(db, post_id).await {
            error!(post_id, error = %e, "Failed to sweep stuck post");
        }
    }
    for task_id in stuck_task_ids {
        if let Err(e) = fail_stuck_task(db, &task_id).await {
            error!(task_id = %task_id, error = %e, "Failed to sweep stuck task");
        }
    }

    Ok(())
}

async fn fail_stuck_theme(db: &DatabaseConnection, theme_id: i32) -> anyhow::Result<()> {
    let txn = db.begin().await?;

    let Some(model) = theme::Entity::find_by_id(theme_id)
        .lock(LockType::Update)
        .one(&txn)
        .await?
    else {
        txn.rollback().await?;
        return Ok(());
    };
    // Re-check under the lock; a terminal event may have landed meanwhile.
    if !model.processing_status.is_processing() {
        txn.rollback().await?;
        return Ok(());
    }

    let update = theme::ActiveModel {
        id: Set(theme_id),
        processing_status: Set(ProcessingStatus::Failed),
        updated_at: Set(Utc::now()),
        ..Default::default()
    };
    update.update(&txn).await?;
    txn.commit().await?;

    warn!(theme_id, "Stuck theme marked failed");
    Ok(())
}

async fn fail_stuck_post(db: &DatabaseConnection, post_id: i32) -> anyhow::Result<()> {
    let txn = db.begin().await?;

    let Some(model) = post::Entity::find_by_id(post_id)
        .lock(LockType::Update)
        .one(&txn)
        .await?
    else {
        txn.rollback().await?;
        return Ok(());
    };
    if !model.processing_status.is_processing() {
        txn.rollback().await?;
        return Ok(());
    }

    let update = post::ActiveModel {
        id: Set(post_id),
        processing_status: Set(ProcessingStatus::Failed),
        updated_at: Set(Utc::now()),
        ..Default::default()
    };
    update.update(&txn).await?;
    txn.commit().await?;

    warn!(post_id, "Stuck post marked failed");
    Ok(())
}

async fn fail_stuck_task(db: &DatabaseConnection, task_id: &str) -> anyhow::Result<()> {
    let txn = db.begin().await?;

    let Some(model) = task::Entity::find_by_id(task_id)
        .lock(LockType::Update)
        .one(&txn)
        .await?
    else {
        txn.rollback().await?;
        return Ok(());
    };
    if model.state.is_terminal() {
        txn.rollback().await?;
        return Ok(());
    }

    let update = task::ActiveModel {
        id: Set(model.id.clone()),
        state: Set(TaskState::Failure),
        error_code: Set(Some(TaskErrorCode::Timeout.to_string())),
        error_message: Set(Some("Task exceeded the stuck threshold".into())),
        finished_at: Set(Some(Utc::now())),
        ..Default::default()
    };
    update.update(&txn).await?;
    txn.commit().await?;

    warn!(task_id = %task_id, "Stuck task marked FAILURE");
    Ok(())
}
