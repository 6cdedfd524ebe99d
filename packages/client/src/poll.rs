use std::time::Duration;

use common::event::TaskErrorInfo;
use common::task::TaskState;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::api::PostPilotClient;

/// Timing knobs for a poller. Defaults: 0.5 s before the first read, one
/// read every 2 s, 150 reads at most.
#[derive(Clone, Debug)]
pub struct PollConfig {
    pub initial_delay: Duration,
    pub interval: Duration,
    pub max_attempts: u32,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            initial_delay: Duration::from_millis(500),
            interval: Duration::from_secs(2),
            max_attempts: 150,
        }
    }
}

/// Non-terminal observation of a task between failed attempts.
#[derive(Clone, Debug)]
pub struct RetryNotice {
    /// Attempts consumed so far.
    pub attempts: i32,
    pub last_error: Option<TaskErrorInfo>,
}

/// How a poll run ended.
#[derive(Debug)]
pub enum PollOutcome {
    Succeeded {
        result: Option<serde_json::Value>,
    },
    /// FAILURE or NOT_FOUND reading.
    Failed {
        state: TaskState,
        error: Option<TaskErrorInfo>,
    },
    /// The read budget ran out without a terminal state. An observation
    /// gap, not a statement about the task.
    TimedOut,
    Cancelled,
}

type NoticeHook = Box<dyn Fn(RetryNotice) + Send + Sync>;

/// Cancels the poller it was taken from.
#[derive(Clone)]
pub struct PollHandle {
    cancel: CancellationToken,
}

impl PollHandle {
    pub fn stop(&self) {
        self.cancel.cancel();
    }
}

/// Polls one task to a terminal outcome.
///
/// Each poller owns its cancellation token and counters; concurrent
/// pollers for different tasks never affect each other.
pub struct TaskPoller {
    client: PostPilotClient,
    task_id: String,
    config: PollConfig,
    cancel: CancellationToken,
    on_notice: Option<NoticeHook>,
}

impl TaskPoller {
    pub fn new(client: PostPilotClient, task_id: impl Into<String>) -> Self {
        Self {
            client,
            task_id: task_id.into(),
            config: PollConfig::default(),
            cancel: CancellationToken::new(),
            on_notice: None,
        }
    }

    pub fn with_config(mut self, config: PollConfig) -> Self {
        self.config = config;
        self
    }

    /// Hook fired on each RETRY reading.
    pub fn on_notice(mut self, hook: impl Fn(RetryNotice) + Send + Sync + 'static) -> Self {
        self.on_notice = Some(Box::new(hook));
        self
    }

    pub fn handle(&self) -> PollHandle {
        PollHandle {
            cancel: self.cancel.clone(),
        }
    }

    /// Poll until a terminal outcome. After `stop()` no hook fires and the
    /// outcome is `Cancelled`.
    pub async fn run(self) -> PollOutcome {
        if self.wait(self.config.initial_delay).await {
            return PollOutcome::Cancelled;
        }

        for attempt in 1..=self.config.max_attempts {
            if attempt > 1 && self.wait(self.config.interval).await {
                return PollOutcome::Cancelled;
            }

            let read = tokio::select! {
                _ = self.cancel.cancelled() => return PollOutcome::Cancelled,
                read = self.client.check_task(&self.task_id) => read,
            };

            match read {
                Ok(status) => match status.state {
                    TaskState::Success => {
                        return PollOutcome::Succeeded {
                            result: status.result,
                        };
                    }
                    TaskState::Failure | TaskState::NotFound => {
                        return PollOutcome::Failed {
                            state: status.state,
                            error: status.error,
                        };
                    }
                    TaskState::Retry => {
                        if let Some(ref hook) = self.on_notice {
                            let info = status.info.as_ref();
                            hook(RetryNotice {
                                attempts: info.map(|i| i.attempts).unwrap_or_default(),
                                last_error: info.and_then(|i| i.last_error.clone()),
                            });
                        }
                    }
                    TaskState::Pending | TaskState::Started => {
                        debug!(task_id = %self.task_id, state = %status.state, "Task still running");
                    }
                },
                // A single failed read proves nothing about the task.
                Err(e) => {
                    warn!(task_id = %self.task_id, error = %e, "Status read failed");
                }
            }
        }

        PollOutcome::TimedOut
    }

    /// True when cancelled while waiting.
    async fn wait(&self, duration: Duration) -> bool {
        tokio::select! {
            _ = self.cancel.cancelled() => true,
            _ = tokio::time::sleep(duration) => false,
        }
    }
}
