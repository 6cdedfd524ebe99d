use common::status::{PostStatus, PostType};
use sea_orm::{ActiveModelTrait, Set};
use server::entity::post;

use crate::common::{TestApp, routes, seed_post, seed_theme};

mod dashboard_stats {
    use super::*;

    #[tokio::test]
    async fn aggregates_counts_and_recent_activity() {
        let app = TestApp::spawn().await;
        let theme = seed_theme(&app.db, "Rust").await;
        let published = seed_post(&app.db, theme.id, PostType::Simple, "Ownership").await;
        post::ActiveModel {
            id: Set(published.id),
            status: Set(PostStatus::Published),
            ..Default::default()
        }
        .update(&app.db)
        .await
        .unwrap();
        seed_post(&app.db, theme.id, PostType::Article, "Lifetimes").await;

        let res = app.get(routes::DASHBOARD_STATS).await;

        assert_eq!(res.status, 200, "stats failed: {}", res.text);
        assert_eq!(res.body["total_themes"], 1);
        assert_eq!(res.body["total_posts"], 2);
        assert_eq!(res.body["published_posts"], 1);
        assert_eq!(res.body["generated_posts"], 1);
        assert_eq!(res.body["draft_posts"], 0);
        assert_eq!(res.body["ai_provider"], "openai");
        assert_eq!(res.body["ai_model"], "gpt-4");
        assert_eq!(res.body["recent_posts"].as_array().unwrap().len(), 2);
        assert_eq!(res.body["recent_themes"].as_array().unwrap().len(), 1);
        assert_eq!(res.body["recent_themes"][0]["posts_count"], 2);
    }

    #[tokio::test]
    async fn health_endpoint_is_up() {
        let app = TestApp::spawn().await;

        let res = app.get(routes::HEALTH).await;
        assert_eq!(res.status, 200);
        assert_eq!(res.body["status"], "ok");
    }
}

