use common::task::{TaskKind, TaskState};
use sea_orm::{ActiveModelTrait, Set};
use serde_json::json;
use server::entity::task;

use crate::common::{TestApp, routes, seed_task};

mod task_check {
    use super::*;

    #[tokio::test]
    async fn missing_task_id_is_a_validation_error() {
        let app = TestApp::spawn().await;

        let res = app.get("/api/tasks/check/").await;
        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn unknown_task_id_reports_not_found_state() {
        let app = TestApp::spawn().await;

        let res = app.get(&routes::task_check("no-such-task")).await;

        // Unknown ids are a terminal state, not an HTTP error.
        assert_eq!(res.status, 200);
        assert_eq!(res.body["state"], "NOT_FOUND");
        assert_eq!(res.body["task_id"], "no-such-task");
    }

    #[tokio::test]
    async fn pending_task_exposes_progress_info() {
        let app = TestApp::spawn().await;
        seed_task(&app.db, "t-pending", TaskKind::Ping, TaskState::Pending).await;

        let res = app.get(&routes::task_check("t-pending")).await;

        assert_eq!(res.status, 200);
        assert_eq!(res.body["state"], "PENDING");
        assert_eq!(res.body["info"]["attempts"], 0);
        assert!(res.body.get("result").is_none());
        assert!(res.body.get("error").is_none());
    }

    #[tokio::test]
    async fn successful_task_carries_its_result() {
        let app = TestApp::spawn().await;
        seed_task(&app.db, "t-done", TaskKind::Ping, TaskState::Pending).await;
        task::ActiveModel {
            id: Set("t-done".to_string()),
            state: Set(TaskState::Success),
            result: Set(Some(json!({"type": "pong", "echo": "hi"}))),
            ..Default::default()
        }
        .update(&app.db)
        .await
        .unwrap();

        let res = app.get(&routes::task_check("t-done")).await;

        assert_eq!(res.body["state"], "SUCCESS");
        assert_eq!(res.body["result"]["echo"], "hi");
        assert!(res.body.get("info").is_none());
    }

    #[tokio::test]
    async fn failed_task_carries_its_error() {
        let app = TestApp::spawn().await;
        seed_task(&app.db, "t-failed", TaskKind::GenerateTopics, TaskState::Pending).await;
        task::ActiveModel {
            id: Set("t-failed".to_string()),
            state: Set(TaskState::Failure),
            error_code: Set(Some("TIMEOUT".to_string())),
            error_message: Set(Some("hard timeout".to_string())),
            ..Default::default()
        }
        .update(&app.db)
        .await
        .unwrap();

        let res = app.get(&routes::task_check("t-failed")).await;

        assert_eq!(res.body["state"], "FAILURE");
        assert_eq!(res.body["error"]["code"], "TIMEOUT");
        assert_eq!(res.body["error"]["message"], "hard timeout");
        assert!(res.body.get("result").is_none());
    }
}

mod task_ping {
    use super::*;

    #[tokio::test]
    async fn ping_without_a_queue_is_503() {
        let app = TestApp::spawn().await;

        let res = app.post(routes::TASK_PING, &json!({"echo": "hello"})).await;

        assert_eq!(res.status, 503);
        assert_eq!(res.body["code"], "QUEUE_UNAVAILABLE");
    }

    #[tokio::test]
    async fn ping_accepts_an_empty_body() {
        let app = TestApp::spawn().await;

        // No JSON body at all; still reaches the queue check.
        let res = app.post_empty(routes::TASK_PING).await;
        assert_eq!(res.status, 503);
    }
}
