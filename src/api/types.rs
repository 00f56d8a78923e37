//! Shared state for the API router.

use std::sync::Arc;

use crate::config::AppConfig;
use crate::db::{DatabaseError, RecordStore, SqliteStore};
use crate::prediction::{mailer_from_config, PredictionPipeline, ProcessPredictor};

/// Shared context for all API routes and middleware.
#[derive(Clone)]
pub struct ApiContext {
    pub store: Arc<dyn RecordStore>,
    pub pipeline: Arc<PredictionPipeline>,
}

impl ApiContext {
    pub fn new(store: Arc<dyn RecordStore>, pipeline: Arc<PredictionPipeline>) -> Self {
        Self { store, pipeline }
    }

    /// Wire the production store, predictor and mail transport.
    pub fn from_config(config: &AppConfig) -> Result<Self, DatabaseError> {
        let store: Arc<dyn RecordStore> = Arc::new(SqliteStore::open(&config.database_path)?);
        let pipeline = PredictionPipeline::new(
            store.clone(),
            Arc::new(ProcessPredictor::from_config(config)),
            mailer_from_config(config),
            config.notification_timeout,
        );
        Ok(Self::new(store, Arc::new(pipeline)))
    }
}
