use std::sync::Arc;

use providers::ProviderFactory;
use sea_orm::DatabaseConnection;

use crate::config::AppConfig;

#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub config: AppConfig,
    /// None when MQ is disabled; enqueueing endpoints then return 503.
    pub mq: Option<Arc<mq::Mq>>,
    pub providers: Arc<ProviderFactory>,
}
