use common::status::PostType;
use serde_json::json;

use crate::common::{TestApp, ai_config_with_fake_openai, routes, seed_post, seed_theme};

async fn mark_post_processing(app: &TestApp, post_id: i32) {
    use common::status::ProcessingStatus;
    use sea_orm::{ActiveModelTrait, Set};
    use server::entity::post;

    post::ActiveModel {
        id: Set(post_id),
        processing_status: Set(ProcessingStatus::Processing),
        ..Default::default()
    }
    .update(&app.db)
    .await
    .expect("Failed to mark post processing");
}

mod post_crud {
    use super::*;

    #[tokio::test]
    async fn lists_posts_with_filters() {
        let app = TestApp::spawn().await;
        let rust = seed_theme(&app.db, "Rust").await;
        let go = seed_theme(&app.db, "Go").await;
        seed_post(&app.db, rust.id, PostType::Simple, "Ownership").await;
        seed_post(&app.db, rust.id, PostType::Article, "Lifetimes").await;
        seed_post(&app.db, go.id, PostType::Simple, "Channels").await;

        let res = app.get(routes::POSTS).await;
        assert_eq!(res.status, 200);
        assert_eq!(res.body.as_array().unwrap().len(), 3);

        let res = app.get(&format!("/api/posts/?theme={}", rust.id)).await;
        assert_eq!(res.body.as_array().unwrap().len(), 2);

        let res = app.get("/api/posts/?post_type=article").await;
        let listed = res.body.as_array().unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0]["topic"], "Lifetimes");
        assert_eq!(listed[0]["theme_title"], "Rust");

        let res = app.get("/api/posts/?status=draft").await;
        assert!(res.body.as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn get_includes_theme_title_and_preview() {
        let app = TestApp::spawn().await;
        let theme = seed_theme(&app.db, "Rust").await;
        let post = seed_post(&app.db, theme.id, PostType::Simple, "Ownership").await;

        let res = app.get(&routes::post(post.id)).await;
        assert_eq!(res.status, 200);
        assert_eq!(res.body["theme"], theme.id);
        assert_eq!(res.body["theme_title"], "Rust");
        assert_eq!(res.body["content_preview"], "Content about Ownership.");
    }

    #[tokio::test]
    async fn patches_editable_fields() {
        let app = TestApp::spawn().await;
        let theme = seed_theme(&app.db, "Rust").await;
        let post = seed_post(&app.db, theme.id, PostType::Simple, "Ownership").await;

        let res = app
            .patch(
                &routes::post(post.id),
                &json!({
                    "title": "Sharper title",
                    "link": "https://example.com/post",
                    "status": "scheduled",
                    "scheduled_date": "2099-01-01T09:00:00Z",
                }),
            )
            .await;

        assert_eq!(res.status, 200, "patch failed: {}", res.text);
        assert_eq!(res.body["title"], "Sharper title");
        assert_eq!(res.body["link"], "https://example.com/post");
        assert_eq!(res.body["status"], "scheduled");

        // Explicit null clears; omission keeps.
        let res = app.patch(&routes::post(post.id), &json!({"link": null})).await;
        assert!(res.body["link"].is_null());
        assert_eq!(res.body["title"], "Sharper title");
    }

    #[tokio::test]
    async fn rejects_overlong_simple_content() {
        let app = TestApp::spawn().await;
        let theme = seed_theme(&app.db, "Rust").await;
        let post = seed_post(&app.db, theme.id, PostType::Simple, "Ownership").await;

        let res = app
            .patch(&routes::post(post.id), &json!({"content": "x".repeat(1301)}))
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn delete_is_permanent() {
        let app = TestApp::spawn().await;
        let theme = seed_theme(&app.db, "Rust").await;
        let post = seed_post(&app.db, theme.id, PostType::Simple, "Ownership").await;

        let res = app.delete(&routes::post(post.id)).await;
        assert_eq!(res.status, 204);

        let res = app.get(&routes::post(post.id)).await;
        assert_eq!(res.status, 404);
    }
}

mod improvement {
    use super::*;

    #[tokio::test]
    async fn requires_a_configured_provider() {
        let app = TestApp::spawn().await;
        let theme = seed_theme(&app.db, "Rust").await;
        let post = seed_post(&app.db, theme.id, PostType::Simple, "Ownership").await;

        let res = app.post_empty(&routes::post_improve(post.id)).await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "PROVIDER_NOT_CONFIGURED");
    }

    #[tokio::test]
    async fn returns_conflict_while_processing() {
        let app = TestApp::spawn_with(ai_config_with_fake_openai()).await;
        let theme = seed_theme(&app.db, "Rust").await;
        let post = seed_post(&app.db, theme.id, PostType::Simple, "Ownership").await;
        mark_post_processing(&app, post.id).await;

        let res = app.post_empty(&routes::post_improve(post.id)).await;

        assert_eq!(res.status, 409);
        assert_eq!(res.body["code"], "CONFLICT");
    }

    #[tokio::test]
    async fn reverts_the_post_when_the_queue_is_down() {
        let app = TestApp::spawn_with(ai_config_with_fake_openai()).await;
        let theme = seed_theme(&app.db, "Rust").await;
        let post = seed_post(&app.db, theme.id, PostType::Simple, "Ownership").await;

        let res = app.post_empty(&routes::post_improve(post.id)).await;
        assert_eq!(res.status, 503);

        let res = app.get(&routes::post_status(post.id)).await;
        assert_eq!(res.body["is_processing"], false);
    }
}

mod image_prompt {
    use super::*;

    #[tokio::test]
    async fn only_articles_have_cover_image_prompts() {
        let app = TestApp::spawn_with(ai_config_with_fake_openai()).await;
        let theme = seed_theme(&app.db, "Rust").await;
        let simple = seed_post(&app.db, theme.id, PostType::Simple, "Ownership").await;

        let res = app
            .post_empty(&routes::post_regenerate_image_prompt(simple.id))
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn article_passes_the_type_check() {
        let app = TestApp::spawn_with(ai_config_with_fake_openai()).await;
        let theme = seed_theme(&app.db, "Rust").await;
        let article = seed_post(&app.db, theme.id, PostType::Article, "Lifetimes").await;

        // Past the sync checks; fails only at the disabled queue.
        let res = app
            .post_empty(&routes::post_regenerate_image_prompt(article.id))
            .await;
        assert_eq!(res.status, 503);
    }
}

mod publishing {
    use super::*;

    #[tokio::test]
    async fn publish_sets_status_and_stamps_post_date() {
        let app = TestApp::spawn().await;
        let theme = seed_theme(&app.db, "Rust").await;
        let post = seed_post(&app.db, theme.id, PostType::Simple, "Ownership").await;
        let before = post.post_date;

        let res = app.post_empty(&routes::post_publish(post.id)).await;

        assert_eq!(res.status, 200, "publish failed: {}", res.text);
        assert_eq!(res.body["status"], "published");
        let stamped: chrono::DateTime<chrono::Utc> =
            serde_json::from_value(res.body["post_date"].clone()).unwrap();
        assert!(stamped >= before);
    }

    #[tokio::test]
    async fn status_endpoint_reports_the_snapshot() {
        let app = TestApp::spawn().await;
        let theme = seed_theme(&app.db, "Rust").await;
        let post = seed_post(&app.db, theme.id, PostType::Simple, "Ownership").await;

        let res = app.get(&routes::post_status(post.id)).await;
        assert_eq!(res.status, 200);
        assert_eq!(res.body["post_id"], post.id);
        assert_eq!(res.body["status"], "generated");
        assert_eq!(res.body["is_processing"], false);
        assert_eq!(res.body["content_length"], post.content.chars().count());
    }
}
