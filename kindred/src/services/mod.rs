mod aggregation;
mod ingestion;

pub use aggregation::AggregationService;
pub use ingestion::IngestionService;
