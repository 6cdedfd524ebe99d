use common::status::PostType;
use serde_json::json;

use crate::common::{
    TestApp, ai_config_with_fake_openai, mark_theme_processing, routes, seed_post, seed_theme,
};

mod theme_crud {
    use super::*;

    #[tokio::test]
    async fn creates_a_theme() {
        let app = TestApp::spawn().await;

        let res = app.post(routes::THEMES, &json!({"title": "Rust at work"})).await;

        assert_eq!(res.status, 201, "create failed: {}", res.text);
        assert_eq!(res.body["title"], "Rust at work");
        assert_eq!(res.body["is_active"], true);
        assert_eq!(res.body["processing_status"], "idle");
        assert_eq!(res.body["posts_count"], 0);
        assert!(res.body["suggested_topics"].is_null());
    }

    #[tokio::test]
    async fn rejects_blank_and_overlong_titles() {
        let app = TestApp::spawn().await;

        let res = app.post(routes::THEMES, &json!({"title": "   "})).await;
        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");

        let res = app
            .post(routes::THEMES, &json!({"title": "x".repeat(201)}))
            .await;
        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn lists_themes_with_active_filter() {
        let app = TestApp::spawn().await;
        let active = seed_theme(&app.db, "Active").await;
        let retired = seed_theme(&app.db, "Retired").await;
        app.delete(&routes::theme(retired.id)).await;

        let res = app.get(routes::THEMES).await;
        assert_eq!(res.status, 200);
        assert_eq!(res.body.as_array().unwrap().len(), 2);

        let res = app.get("/api/themes/?active=true").await;
        let listed = res.body.as_array().unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0]["id"], active.id);

        let res = app.get("/api/themes/?active=false").await;
        let listed = res.body.as_array().unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0]["id"], retired.id);
    }

    #[tokio::test]
    async fn updates_title_and_activity() {
        let app = TestApp::spawn().await;
        let theme = seed_theme(&app.db, "Old title").await;

        let res = app
            .patch(
                &routes::theme(theme.id),
                &json!({"title": "New title", "is_active": false}),
            )
            .await;

        assert_eq!(res.status, 200);
        assert_eq!(res.body["title"], "New title");
        assert_eq!(res.body["is_active"], false);
    }

    #[tokio::test]
    async fn delete_is_a_soft_delete() {
        let app = TestApp::spawn().await;
        let theme = seed_theme(&app.db, "Keep my posts").await;
        seed_post(&app.db, theme.id, PostType::Simple, "Ownership").await;

        let res = app.delete(&routes::theme(theme.id)).await;
        assert_eq!(res.status, 204);

        // The theme and its posts are still readable.
        let res = app.get(&routes::theme(theme.id)).await;
        assert_eq!(res.status, 200);
        assert_eq!(res.body["is_active"], false);

        let res = app.get(&routes::theme_posts(theme.id)).await;
        assert_eq!(res.body.as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn returns_not_found_for_unknown_theme() {
        let app = TestApp::spawn().await;

        let res = app.get(&routes::theme(9999)).await;
        assert_eq!(res.status, 404);
        assert_eq!(res.body["code"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn counts_posts_per_type() {
        let app = TestApp::spawn().await;
        let theme = seed_theme(&app.db, "Counted").await;
        seed_post(&app.db, theme.id, PostType::Simple, "A").await;
        seed_post(&app.db, theme.id, PostType::Simple, "B").await;
        seed_post(&app.db, theme.id, PostType::Article, "C").await;

        let res = app.get(&routes::theme(theme.id)).await;
        assert_eq!(res.body["posts_count"], 3);
        assert_eq!(res.body["simple_posts_count"], 2);
        assert_eq!(res.body["articles_count"], 1);
    }
}

mod topic_generation {
    use super::*;

    #[tokio::test]
    async fn requires_a_configured_provider() {
        let app = TestApp::spawn().await;
        let theme = seed_theme(&app.db, "No provider").await;

        let res = app.post_empty(&routes::theme_generate_topics(theme.id)).await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "PROVIDER_NOT_CONFIGURED");
    }

    #[tokio::test]
    async fn returns_conflict_while_processing() {
        let app = TestApp::spawn_with(ai_config_with_fake_openai()).await;
        let theme = seed_theme(&app.db, "Busy").await;
        mark_theme_processing(&app.db, theme.id).await;

        let res = app.post_empty(&routes::theme_generate_topics(theme.id)).await;

        assert_eq!(res.status, 409);
        assert_eq!(res.body["code"], "CONFLICT");
    }

    #[tokio::test]
    async fn returns_503_when_the_queue_is_down() {
        // MQ is disabled in tests, so a request that passes the sync
        // checks surfaces the queue error and reverts the theme.
        let app = TestApp::spawn_with(ai_config_with_fake_openai()).await;
        let theme = seed_theme(&app.db, "Queueless").await;

        let res = app.post_empty(&routes::theme_generate_topics(theme.id)).await;

        assert_eq!(res.status, 503);
        assert_eq!(res.body["code"], "QUEUE_UNAVAILABLE");

        let res = app.get(&routes::theme_status(theme.id)).await;
        assert_eq!(res.body["processing_status"], "idle");
        assert_eq!(res.body["is_processing"], false);
    }

    #[tokio::test]
    async fn unknown_theme_is_404() {
        let app = TestApp::spawn().await;

        let res = app.post_empty(&routes::theme_generate_topics(424242)).await;
        assert_eq!(res.status, 404);
    }
}

mod post_generation {
    use super::*;

    #[tokio::test]
    async fn duplicate_topic_returns_existing_post() {
        let app = TestApp::spawn_with(ai_config_with_fake_openai()).await;
        let theme = seed_theme(&app.db, "Dupes").await;
        let existing = seed_post(&app.db, theme.id, PostType::Simple, "Ownership").await;

        let res = app
            .post(
                &routes::theme_generate_post(theme.id),
                &json!({"topic": "Ownership"}),
            )
            .await;

        assert_eq!(res.status, 200, "expected duplicate warning: {}", res.text);
        assert_eq!(res.body["post_id"], existing.id);
        assert!(res.body["warning"].as_str().unwrap().contains("Ownership"));
    }

    #[tokio::test]
    async fn same_topic_different_type_is_not_a_duplicate() {
        let app = TestApp::spawn_with(ai_config_with_fake_openai()).await;
        let theme = seed_theme(&app.db, "Types differ").await;
        seed_post(&app.db, theme.id, PostType::Simple, "Ownership").await;

        // An article for the same topic passes the duplicate guard and
        // reaches the (disabled) queue.
        let res = app
            .post(
                &routes::theme_generate_post(theme.id),
                &json!({"topic": "Ownership", "post_type": "article"}),
            )
            .await;

        assert_eq!(res.status, 503);
    }

    #[tokio::test]
    async fn rejects_blank_topic_and_bad_post_type() {
        let app = TestApp::spawn_with(ai_config_with_fake_openai()).await;
        let theme = seed_theme(&app.db, "Validated").await;

        let res = app
            .post(&routes::theme_generate_post(theme.id), &json!({"topic": "  "}))
            .await;
        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");

        let res = app
            .post(
                &routes::theme_generate_post(theme.id),
                &json!({"topic": "Ok", "post_type": "haiku"}),
            )
            .await;
        assert_eq!(res.status, 400);
    }
}

mod theme_status {
    use super::*;

    #[tokio::test]
    async fn reports_topics_and_processing_state() {
        let app = TestApp::spawn().await;
        let theme = seed_theme(&app.db, "Snapshot").await;

        let res = app.get(&routes::theme_status(theme.id)).await;
        assert_eq!(res.status, 200);
        assert_eq!(res.body["theme_id"], theme.id);
        assert_eq!(res.body["has_topics"], false);
        assert_eq!(res.body["topics_count"], 0);

        mark_theme_processing(&app.db, theme.id).await;
        let res = app.get(&routes::theme_status(theme.id)).await;
        assert_eq!(res.body["is_processing"], true);
    }
}
