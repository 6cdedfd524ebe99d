use common::event::{OutcomeData, TaskErrorInfo};
use common::jobs::PingJob;
use tracing::info;

use super::Execution;

/// Round-trip probe through the general lane; no provider, no entity.
pub async fn ping(job: PingJob) -> Result<Execution, TaskErrorInfo> {
    info!(echo = %job.echo, "Ping");
    Ok(Execution::plain(OutcomeData::pong(&job)))
}
