mod config;
mod error;
mod handlers;
mod runner;

use std::sync::Arc;

use common::task::TaskMessage;
use mq::{BroccoliError, BrokerMessage, Mq};
use providers::ProviderFactory;
use tracing::{error, info};

use crate::config::WorkerAppConfig;
use crate::runner::TaskRunner;

#[tokio::main]
async fn main() -> error::Result<()> {
    tracing_subscriber::fmt().with_target(false).init();

    let config = WorkerAppConfig::load()?;
    info!(worker_id = %config.worker.id, "Worker starting");

    let mq = Arc::new(mq::init_mq((&config.mq).into()).await?);
    info!(url = %config.mq.url, "MQ connected");

    let providers = Arc::new(ProviderFactory::new(config.ai.clone())?);

    let runner = Arc::new(TaskRunner::new(
        config.worker.id.clone(),
        &config.tasks,
        providers,
        Arc::clone(&mq),
        config.mq.event_queue_name.clone(),
    ));

    // Each lane gets its own consumer so AI work cannot starve pings.
    tokio::join!(
        consume_lane(
            Arc::clone(&mq),
            config.mq.ai_queue_name.clone(),
            config.worker.ai_concurrency,
            Arc::clone(&runner),
        ),
        consume_lane(
            Arc::clone(&mq),
            config.mq.general_queue_name.clone(),
            config.worker.general_concurrency,
            Arc::clone(&runner),
        ),
    );

    Ok(())
}

async fn consume_lane(mq: Arc<Mq>, queue: String, concurrency: usize, runner: Arc<TaskRunner>) {
    info!(queue = %queue, concurrency, "Consuming lane");

    let result = mq
        .process_messages(
            &queue,
            Some(concurrency),
            None,
            move |message: BrokerMessage<TaskMessage>| {
                let runner = Arc::clone(&runner);
                async move {
                    // Failures terminate in events, never in broker redelivery.
                    runner.run(message.payload).await;
                    Ok::<(), BroccoliError>(())
                }
            },
        )
        .await;

    if let Err(e) = result {
        error!(queue = %queue, error = %e, "Lane consumer stopped unexpectedly");
    }
}
