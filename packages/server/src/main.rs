use std::sync::Arc;

use providers::ProviderFactory;
use server::config::AppConfig;
use server::state::AppState;
use server::{consumers, database, maintenance};
use tracing::{info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_target(false).init();

    let config = AppConfig::load()?;
    let db = database::init_db(&config.database.url).await?;

    let mq = if config.mq.enabled {
        let queue = mq::init_mq((&config.mq).into()).await?;
        Some(Arc::new(queue))
    } else {
        warn!("MQ disabled; generation endpoints will return 503");
        None
    };

    let providers = Arc::new(ProviderFactory::new(config.ai.clone())?);

    if let Some(ref mq) = mq {
        tokio::spawn(consumers::consume_task_events(
            db.clone(),
            Arc::clone(mq),
            config.mq.event_queue_name.clone(),
        ));
    }
    tokio::spawn(maintenance::run_stuck_sweeper(db.clone(), config.tasks.clone()));

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let state = AppState {
        db,
        config,
        mq,
        providers,
    };
    let app = server::build_router(state);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Server running at http://{addr}");
    axum::serve(listener, app).await?;

    Ok(())
}
