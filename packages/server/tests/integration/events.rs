use chrono::{Duration, Utc};
use common::config::TaskPolicyConfig;
use common::event::{OutcomeData, TaskErrorInfo, TaskEvent};
use common::status::{PostStatus, PostType, ProcessingStatus};
use common::task::{TaskErrorCode, TaskKind, TaskState};
use common::topic::Topic;
use sea_orm::{ActiveModelTrait, EntityTrait, Set};
use server::entity::{post, task, theme};

use crate::common::{TestApp, mark_theme_processing, seed_post, seed_task, seed_theme};

fn sample_topic(title: &str) -> Topic {
    Topic {
        title: title.to_string(),
        hook: "Did you know?".to_string(),
        post_type: PostType::Simple,
        summary: "An angle.".to_string(),
        cta: "Comment below.".to_string(),
    }
}

mod event_application {
    use super::*;

    #[tokio::test]
    async fn completed_topics_event_updates_theme_and_task_atomically() {
        let app = TestApp::spawn().await;
        let theme_row = seed_theme(&app.db, "Rust").await;
        mark_theme_processing(&app.db, theme_row.id).await;
        seed_task(&app.db, "t-topics", TaskKind::GenerateTopics, TaskState::Started).await;
        task::ActiveModel {
            id: Set("t-topics".to_string()),
            theme_id: Set(Some(theme_row.id)),
            ..Default::default()
        }
        .update(&app.db)
        .await
        .unwrap();

        let topics = vec![sample_topic("A"), sample_topic("B"), sample_topic("C")];
        let event = TaskEvent::Completed {
            task_id: "t-topics".to_string(),
            kind: TaskKind::GenerateTopics,
            attempts: 1,
            theme_id: Some(theme_row.id),
            post_id: None,
            provider: Some("openai".to_string()),
            model: Some("gpt-4".to_string()),
            data: OutcomeData::Topics { topics },
            at: Utc::now(),
        };
        server::consumers::apply_task_event(&app.db, event).await.unwrap();

        let updated = theme::Entity::find_by_id(theme_row.id)
            .one(&app.db)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.processing_status.to_string(), "completed");
        assert!(updated.topics_generated_at.is_some());
        assert_eq!(updated.topics_count(), 3);

        let row = task::Entity::find_by_id("t-topics")
            .one(&app.db)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(row.state, TaskState::Success);
        assert!(row.result.is_some());
        assert!(row.finished_at.is_some());
    }

    #[tokio::test]
    async fn second_topics_generation_overwrites_the_first_list() {
        let app = TestApp::spawn().await;
        let theme_row = seed_theme(&app.db, "Rust").await;

        let completed = |task_id: &str, topics: Vec<Topic>| TaskEvent::Completed {
            task_id: task_id.to_string(),
            kind: TaskKind::GenerateTopics,
            attempts: 1,
            theme_id: Some(theme_row.id),
            post_id: None,
            provider: Some("openai".to_string()),
            model: Some("gpt-4".to_string()),
            data: OutcomeData::Topics { topics },
            at: Utc::now(),
        };

        for task_id in ["t-first", "t-second"] {
            seed_task(&app.db, task_id, TaskKind::GenerateTopics, TaskState::Started).await;
            task::ActiveModel {
                id: Set(task_id.to_string()),
                theme_id: Set(Some(theme_row.id)),
                ..Default::default()
            }
            .update(&app.db)
            .await
            .unwrap();
        }

        let first = vec![sample_topic("A"), sample_topic("B"), sample_topic("C")];
        server::consumers::apply_task_event(&app.db, completed("t-first", first))
            .await
            .unwrap();

        let second = vec![
            sample_topic("D"),
            sample_topic("E"),
            sample_topic("F"),
            sample_topic("G"),
        ];
        server::consumers::apply_task_event(&app.db, completed("t-second", second))
            .await
            .unwrap();

        // The stored list is exactly the second one, never a concatenation.
        let updated = theme::Entity::find_by_id(theme_row.id)
            .one(&app.db)
            .await
            .unwrap()
            .unwrap();
        let stored = updated.suggested().unwrap();
        assert_eq!(stored.topics.len(), 4);
        assert_eq!(stored.topics[0].title, "D");
    }

    #[tokio::test]
    async fn completed_post_event_materializes_the_post_once() {
        let app = TestApp::spawn().await;
        let theme_row = seed_theme(&app.db, "Rust").await;
        seed_task(&app.db, "t-post", TaskKind::GeneratePost, TaskState::Started).await;
        task::ActiveModel {
            id: Set("t-post".to_string()),
            theme_id: Set(Some(theme_row.id)),
            ..Default::default()
        }
        .update(&app.db)
        .await
        .unwrap();

        let event = TaskEvent::Completed {
            task_id: "t-post".to_string(),
            kind: TaskKind::GeneratePost,
            attempts: 1,
            theme_id: Some(theme_row.id),
            post_id: None,
            provider: Some("openai".to_string()),
            model: Some("gpt-4".to_string()),
            data: OutcomeData::Post {
                post_type: PostType::Simple,
                topic: "Ownership".to_string(),
                title: "Why ownership matters".to_string(),
                content: "Short post.".to_string(),
                promotional_post: None,
                cover_image_prompt: None,
                seo_title: "Ownership".to_string(),
                seo_description: "About ownership".to_string(),
            },
            at: Utc::now(),
        };
        server::consumers::apply_task_event(&app.db, event.clone()).await.unwrap();

        let posts = post::Entity::find().all(&app.db).await.unwrap();
        assert_eq!(posts.len(), 1);
        assert_eq!(posts[0].status, PostStatus::Generated);
        assert_eq!(posts[0].processing_status, ProcessingStatus::Completed);
        assert_eq!(posts[0].ai_provider_used.as_deref(), Some("openai"));
        assert!(posts[0].generated_at.is_some());

        // Terminal replay is a no-op: no duplicate post.
        server::consumers::apply_task_event(&app.db, event).await.unwrap();
        assert_eq!(post::Entity::find().all(&app.db).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn improved_event_replaces_content_and_completes_the_post() {
        let app = TestApp::spawn().await;
        let theme_row = seed_theme(&app.db, "Rust").await;
        let post_row = seed_post(&app.db, theme_row.id, PostType::Simple, "Ownership").await;
        post::ActiveModel {
            id: Set(post_row.id),
            processing_status: Set(ProcessingStatus::Processing),
            ..Default::default()
        }
        .update(&app.db)
        .await
        .unwrap();
        seed_task(&app.db, "t-improve", TaskKind::ImprovePost, TaskState::Started).await;
        task::ActiveModel {
            id: Set("t-improve".to_string()),
            post_id: Set(Some(post_row.id)),
            ..Default::default()
        }
        .update(&app.db)
        .await
        .unwrap();

        let event = TaskEvent::Completed {
            task_id: "t-improve".to_string(),
            kind: TaskKind::ImprovePost,
            attempts: 1,
            theme_id: None,
            post_id: Some(post_row.id),
            provider: Some("openai".to_string()),
            model: Some("gpt-4".to_string()),
            data: OutcomeData::Improved {
                content: "Sharper post.".to_string(),
                improvement_summary: "tightened the hook".to_string(),
            },
            at: Utc::now(),
        };
        server::consumers::apply_task_event(&app.db, event).await.unwrap();

        let updated = post::Entity::find_by_id(post_row.id)
            .one(&app.db)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.content, "Sharper post.");
        assert_eq!(updated.processing_status, ProcessingStatus::Completed);
        assert!(
            updated
                .generation_prompt
                .as_deref()
                .unwrap()
                .contains("Improved: tightened the hook")
        );
    }

    #[tokio::test]
    async fn image_prompt_event_completes_the_post() {
        let app = TestApp::spawn().await;
        let theme_row = seed_theme(&app.db, "Rust").await;
        let post_row = seed_post(&app.db, theme_row.id, PostType::Simple, "Lifetimes").await;
        post::ActiveModel {
            id: Set(post_row.id),
            processing_status: Set(ProcessingStatus::Processing),
            ..Default::default()
        }
        .update(&app.db)
        .await
        .unwrap();
        seed_task(&app.db, "t-image", TaskKind::RegenerateImagePrompt, TaskState::Started).await;
        task::ActiveModel {
            id: Set("t-image".to_string()),
            post_id: Set(Some(post_row.id)),
            ..Default::default()
        }
        .update(&app.db)
        .await
        .unwrap();

        let event = TaskEvent::Completed {
            task_id: "t-image".to_string(),
            kind: TaskKind::RegenerateImagePrompt,
            attempts: 1,
            theme_id: None,
            post_id: Some(post_row.id),
            provider: Some("openai".to_string()),
            model: Some("gpt-4".to_string()),
            data: OutcomeData::ImagePrompt {
                cover_image_prompt: "A crab holding a clock.".to_string(),
                style_notes: "flat illustration".to_string(),
            },
            at: Utc::now(),
        };
        server::consumers::apply_task_event(&app.db, event).await.unwrap();

        let updated = post::Entity::find_by_id(post_row.id)
            .one(&app.db)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(
            updated.cover_image_prompt.as_deref(),
            Some("A crab holding a clock.")
        );
        assert_eq!(updated.processing_status, ProcessingStatus::Completed);
    }

    #[tokio::test]
    async fn failed_event_marks_task_and_entity_failed() {
        let app = TestApp::spawn().await;
        let theme_row = seed_theme(&app.db, "Rust").await;
        mark_theme_processing(&app.db, theme_row.id).await;
        seed_task(&app.db, "t-fail", TaskKind::GenerateTopics, TaskState::Retry).await;
        task::ActiveModel {
            id: Set("t-fail".to_string()),
            theme_id: Set(Some(theme_row.id)),
            ..Default::default()
        }
        .update(&app.db)
        .await
        .unwrap();

        let event = TaskEvent::Failed {
            task_id: "t-fail".to_string(),
            kind: TaskKind::GenerateTopics,
            attempts: 3,
            theme_id: Some(theme_row.id),
            post_id: None,
            error: TaskErrorInfo::new(TaskErrorCode::ProviderError, "rate limited"),
            at: Utc::now(),
        };
        server::consumers::apply_task_event(&app.db, event).await.unwrap();

        let row = task::Entity::find_by_id("t-fail")
            .one(&app.db)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(row.state, TaskState::Failure);
        assert_eq!(row.error_code.as_deref(), Some("PROVIDER_ERROR"));
        assert_eq!(row.attempts, 3);

        let updated = theme::Entity::find_by_id(theme_row.id)
            .one(&app.db)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.processing_status.to_string(), "failed");
    }

    #[tokio::test]
    async fn started_and_retrying_update_progress() {
        let app = TestApp::spawn().await;
        seed_task(&app.db, "t-run", TaskKind::Ping, TaskState::Pending).await;

        let at = Utc::now();
        server::consumers::apply_task_event(
            &app.db,
            TaskEvent::Started {
                task_id: "t-run".to_string(),
                kind: TaskKind::Ping,
                attempt: 1,
                worker_id: "w1".to_string(),
                at,
            },
        )
        .await
        .unwrap();

        let row = task::Entity::find_by_id("t-run").one(&app.db).await.unwrap().unwrap();
        assert_eq!(row.state, TaskState::Started);
        assert_eq!(row.attempts, 1);
        assert!(row.started_at.is_some());

        server::consumers::apply_task_event(
            &app.db,
            TaskEvent::Retrying {
                task_id: "t-run".to_string(),
                kind: TaskKind::Ping,
                attempt: 1,
                error: TaskErrorInfo::new(TaskErrorCode::Timeout, "soft timeout"),
                next_delay_secs: 60,
                at: Utc::now(),
            },
        )
        .await
        .unwrap();

        let row = task::Entity::find_by_id("t-run").one(&app.db).await.unwrap().unwrap();
        assert_eq!(row.state, TaskState::Retry);
        assert_eq!(row.error_code.as_deref(), Some("TIMEOUT"));
    }
}

mod stuck_sweeper {
    use super::*;

    #[tokio::test]
    async fn sweeps_old_processing_work_to_failed() {
        let app = TestApp::spawn().await;
        let theme_row = seed_theme(&app.db, "Stuck").await;
        mark_theme_processing(&app.db, theme_row.id).await;
        seed_task(&app.db, "t-stuck", TaskKind::GenerateTopics, TaskState::Started).await;

        // Age both rows past the threshold.
        let old = Utc::now() - Duration::hours(1);
        theme::ActiveModel {
            id: Set(theme_row.id),
            updated_at: Set(old),
            ..Default::default()
        }
        .update(&app.db)
        .await
        .unwrap();
        task::ActiveModel {
            id: Set("t-stuck".to_string()),
            queued_at: Set(old),
            ..Default::default()
        }
        .update(&app.db)
        .await
        .unwrap();

        server::maintenance::sweep_once(&app.db, &TaskPolicyConfig::default())
            .await
            .unwrap();

        let swept = theme::Entity::find_by_id(theme_row.id)
            .one(&app.db)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(swept.processing_status.to_string(), "failed");

        let row = task::Entity::find_by_id("t-stuck").one(&app.db).await.unwrap().unwrap();
        assert_eq!(row.state, TaskState::Failure);
        assert_eq!(row.error_code.as_deref(), Some("TIMEOUT"));
    }

    #[tokio::test]
    async fn leaves_fresh_work_alone() {
        let app = TestApp::spawn().await;
        let theme_row = seed_theme(&app.db, "Fresh").await;
        mark_theme_processing(&app.db, theme_row.id).await;

        server::maintenance::sweep_once(&app.db, &TaskPolicyConfig::default())
            .await
            .unwrap();

        let untouched = theme::Entity::find_by_id(theme_row.id)
            .one(&app.db)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(untouched.processing_status.to_string(), "processing");
    }
}
