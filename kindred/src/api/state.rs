use std::sync::Arc;

use crate::config::Config;
use crate::db::Database;
use crate::scoring::ScoringWeights;
use crate::services::{AggregationService, IngestionService};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub db: Database,
    pub ingestion: IngestionService,
    pub aggregation: AggregationService,
}

impl AppState {
    pub fn new(config: Config, db: Database, weights: ScoringWeights) -> Self {
        let aggregation = AggregationService::new(db.clone(), weights);
        let ingestion = IngestionService::new(db.clone(), aggregation.clone());

        Self {
            config: Arc::new(config),
            db,
            ingestion,
            aggregation,
        }
    }
}
