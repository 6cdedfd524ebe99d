use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use common::config::TaskPolicyConfig;
use common::event::{TaskErrorInfo, TaskEvent};
use common::jobs::{ImagePromptJob, ImproveJob, PingJob, PostJob, TopicsJob};
use common::retry::{RetryDecision, RetryPolicy};
use common::task::{TaskErrorCode, TaskKind, TaskMessage};
use mq::Mq;
use providers::ProviderFactory;
use tracing::{error, info, instrument, warn};

use crate::handlers::{self, Execution, payload_error};

/// How a time-bounded attempt came out.
#[derive(Debug)]
enum Bounded {
    Finished(Result<Execution, TaskErrorInfo>),
    /// The attempt overran the soft limit; retryable.
    SoftTimeout,
    /// The attempt overran the hard limit; terminal.
    HardTimeout,
}

/// Run one attempt under both limits. Each attempt gets a fresh budget;
/// retry waits between attempts are never counted against either limit.
async fn bound_attempt<F>(soft: Duration, hard: Duration, attempt: F) -> Bounded
where
    F: Future<Output = Result<Execution, TaskErrorInfo>>,
{
    match tokio::time::timeout(hard, tokio::time::timeout(soft, attempt)).await {
        Err(_) => Bounded::HardTimeout,
        Ok(Err(_)) => Bounded::SoftTimeout,
        Ok(Ok(result)) => Bounded::Finished(result),
    }
}

/// Executes one task message end to end and reports progress as events.
///
/// The runner never touches the database; every observable effect goes
/// through the event queue.
pub struct TaskRunner {
    worker_id: String,
    policy: RetryPolicy,
    soft_timeout: Duration,
    hard_timeout: Duration,
    providers: Arc<ProviderFactory>,
    mq: Arc<Mq>,
    event_queue: String,
}

impl TaskRunner {
    pub fn new(
        worker_id: String,
        tasks: &TaskPolicyConfig,
        providers: Arc<ProviderFactory>,
        mq: Arc<Mq>,
        event_queue: String,
    ) -> Self {
        Self {
            worker_id,
            policy: tasks.retry_policy(),
            soft_timeout: tasks.soft_timeout(),
            hard_timeout: tasks.hard_timeout(),
            providers,
            mq,
            event_queue,
        }
    }

    /// Run a task to a terminal event. Always acknowledges the message;
    /// failures are reported as events, not broker errors.
    #[instrument(skip(self, message), fields(task_id = %message.id, kind = %message.kind))]
    pub async fn run(&self, message: TaskMessage) {
        let mut attempt: u8 = 1;
        loop {
            self.emit(TaskEvent::Started {
                task_id: message.id.clone(),
                kind: message.kind,
                attempt,
                worker_id: self.worker_id.clone(),
                at: Utc::now(),
            })
            .await;

            let bounded =
                bound_attempt(self.soft_timeout, self.hard_timeout, self.execute(&message)).await;
            let failure = match bounded {
                Bounded::Finished(Ok(execution)) => {
                    info!(task_id = %message.id, attempt, "Task completed");
                    self.emit(TaskEvent::Completed {
                        task_id: message.id.clone(),
                        kind: message.kind,
                        attempts: attempt,
                        theme_id: payload_i32(&message, "theme_id"),
                        post_id: payload_i32(&message, "post_id"),
                        provider: execution.provider,
                        model: execution.model,
                        data: execution.data,
                        at: Utc::now(),
                    })
                    .await;
                    return;
                }
                Bounded::Finished(Err(failure)) => failure,
                Bounded::SoftTimeout => TaskErrorInfo::new(
                    TaskErrorCode::Timeout,
                    format!(
                        "attempt exceeded the soft timeout of {}s",
                        self.soft_timeout.as_secs()
                    ),
                ),
                Bounded::HardTimeout => {
                    warn!(task_id = %message.id, attempt, "Hard timeout");
                    self.fail(&message, attempt, TaskErrorInfo::new(
                        TaskErrorCode::Timeout,
                        format!(
                            "attempt exceeded the hard timeout of {}s",
                            self.hard_timeout.as_secs()
                        ),
                    ))
                    .await;
                    return;
                }
            };

            let decision = if failure.code.is_retryable() {
                self.policy.after_failure(attempt)
            } else {
                RetryDecision::Exhausted
            };

            match decision {
                RetryDecision::Retry { next_attempt, delay } => {
                    warn!(
                        task_id = %message.id,
                        attempt,
                        delay_secs = delay.as_secs(),
                        error = %failure.message,
                        "Attempt failed, retrying"
                    );
                    self.emit(TaskEvent::Retrying {
                        task_id: message.id.clone(),
                        kind: message.kind,
                        attempt,
                        error: failure,
                        next_delay_secs: delay.as_secs(),
                        at: Utc::now(),
                    })
                    .await;
                    tokio::time::sleep(delay).await;
                    attempt = next_attempt;
                }
                RetryDecision::Exhausted => {
                    warn!(
                        task_id = %message.id,
                        attempts = attempt,
                        code = %failure.code,
                        error = %failure.message,
                        "Task failed"
                    );
                    self.fail(&message, attempt, failure).await;
                    return;
                }
            }
        }
    }

    async fn fail(&self, message: &TaskMessage, attempts: u8, error: TaskErrorInfo) {
        self.emit(TaskEvent::Failed {
            task_id: message.id.clone(),
            kind: message.kind,
            attempts,
            theme_id: payload_i32(message, "theme_id"),
            post_id: payload_i32(message, "post_id"),
            error,
            at: Utc::now(),
        })
        .await;
    }

    async fn execute(&self, message: &TaskMessage) -> Result<Execution, TaskErrorInfo> {
        let factory = self.providers.as_ref();
        match message.kind {
            TaskKind::GenerateTopics => {
                let job: TopicsJob =
                    serde_json::from_value(message.payload.clone()).map_err(payload_error)?;
                handlers::content::generate_topics(factory, job).await
            }
            TaskKind::GeneratePost => {
                let job: PostJob =
                    serde_json::from_value(message.payload.clone()).map_err(payload_error)?;
                handlers::content::generate_post(factory, job).await
            }
            TaskKind::ImprovePost => {
                let job: ImproveJob =
                    serde_json::from_value(message.payload.clone()).map_err(payload_error)?;
                handlers::content::improve_post(factory, job).await
            }
            TaskKind::RegenerateImagePrompt => {
                let job: ImagePromptJob =
                    serde_json::from_value(message.payload.clone()).map_err(payload_error)?;
                handlers::content::regenerate_image_prompt(factory, job).await
            }
            TaskKind::Ping => {
                let job: PingJob =
                    serde_json::from_value(message.payload.clone()).map_err(payload_error)?;
                handlers::maintenance::ping(job).await
            }
        }
    }

    async fn emit(&self, event: TaskEvent) {
        if let Err(e) = self.mq.publish(&self.event_queue, None, &event, None).await {
            // The server-side sweeper eventually fails tasks whose events
            // were lost.
            error!(task_id = %event.task_id(), error = %e, "Failed to publish task event");
        }
    }
}

/// Pull an entity id out of a job payload without knowing the job type.
fn payload_i32(message: &TaskMessage, key: &str) -> Option<i32> {
    message
        .payload
        .get(key)
        .and_then(|v| v.as_i64())
        .map(|v| v as i32)
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::event::OutcomeData;
    use serde_json::json;

    fn ok_execution() -> Result<Execution, TaskErrorInfo> {
        Ok(Execution::plain(OutcomeData::Pong { echo: "pong".into() }))
    }

    #[tokio::test]
    async fn test_soft_limit_fires_first_and_is_distinct() {
        let bounded = bound_attempt(
            Duration::from_millis(5),
            Duration::from_millis(200),
            std::future::pending(),
        )
        .await;
        assert!(matches!(bounded, Bounded::SoftTimeout));
    }

    #[tokio::test]
    async fn test_hard_limit_is_terminal_when_tighter() {
        let bounded = bound_attempt(
            Duration::from_millis(200),
            Duration::from_millis(5),
            std::future::pending(),
        )
        .await;
        assert!(matches!(bounded, Bounded::HardTimeout));
    }

    #[tokio::test]
    async fn test_each_attempt_gets_a_fresh_budget() {
        // Three attempts, each just under the limits, all finish; the
        // budget never carries over between attempts.
        for _ in 0..3 {
            let bounded = bound_attempt(
                Duration::from_millis(50),
                Duration::from_millis(100),
                async {
                    tokio::time::sleep(Duration::from_millis(10)).await;
                    ok_execution()
                },
            )
            .await;
            assert!(matches!(bounded, Bounded::Finished(Ok(_))));
        }
    }

    #[test]
    fn test_payload_id_extraction() {
        let message = TaskMessage::new(
            TaskKind::GenerateTopics,
            json!({"theme_id": 7, "theme_title": "Rust"}),
        );
        assert_eq!(payload_i32(&message, "theme_id"), Some(7));
        assert_eq!(payload_i32(&message, "post_id"), None);
    }

    #[test]
    fn test_non_numeric_id_is_ignored() {
        let message = TaskMessage::new(TaskKind::Ping, json!({"theme_id": "seven"}));
        assert_eq!(payload_i32(&message, "theme_id"), None);
    }
}
