use crate::db::repository::{ClusterRepository, CollectionRepository, SimilarityRepository};
use crate::db::Database;
use crate::error::{KindredError, Result};
use crate::models::{ClusterRecord, ClusterSimilarity, InterestCluster, MatchedCluster};
use crate::services::AggregationService;

/// Persists a user's freshly clustered interests and links cross-user
/// matches. All writes for one batch happen in a single transaction; on
/// commit the aggregation step is invoked for the same user.
#[derive(Clone)]
pub struct IngestionService {
    db: Database,
    aggregation: AggregationService,
}

/// A batch element whose declared counterpart resolved to a stored cluster.
struct ResolvedMatch<'a> {
    cluster_id: String,
    counterpart: InterestCluster,
    record: &'a ClusterRecord,
    matched: &'a MatchedCluster,
}

impl IngestionService {
    pub fn new(db: Database, aggregation: AggregationService) -> Self {
        Self { db, aggregation }
    }

    /// Handle one "clustering pipeline finished" delivery.
    ///
    /// Re-running with an identical batch reproduces the same state:
    /// clusters insert duplicate-safe, and prior similarities touching the
    /// re-ingested matched clusters are deleted before the new ones are
    /// written.
    pub async fn ingest(&self, user_id: &str, batch: &[ClusterRecord]) -> Result<()> {
        for record in batch {
            if record.activity_dates.is_empty() {
                return Err(KindredError::InvalidInput(format!(
                    "cluster {} has an empty activity-date history",
                    record.external_id
                )));
            }
        }

        let conn = self.db.connect()?;
        let tx = conn.transaction().await?;

        let collection_id = CollectionRepository::ensure(&tx, user_id).await?;
        ClusterRepository::insert_batch(&tx, &collection_id, batch).await?;
        let internal_ids = ClusterRepository::map_external_ids(&tx, &collection_id).await?;

        // Every cluster that declares a match sheds its old similarities,
        // even when the counterpart no longer resolves.
        let touched: Vec<String> = batch
            .iter()
            .filter(|record| record.matched.is_some())
            .filter_map(|record| internal_ids.get(&record.external_id).cloned())
            .collect();
        SimilarityRepository::delete_for_clusters(&tx, &touched).await?;

        let mut resolved: Vec<ResolvedMatch<'_>> = Vec::new();
        for record in batch {
            let Some(matched) = &record.matched else {
                continue;
            };
            let Some(cluster_id) = internal_ids.get(&record.external_id) else {
                continue;
            };
            if matched.user_id == user_id {
                tracing::warn!(
                    user_id = %user_id,
                    external_id = record.external_id,
                    "Cluster declares a match with its own user, dropping match"
                );
                continue;
            }
            let Some(other_collection) =
                CollectionRepository::get_id_by_user(&tx, &matched.user_id).await?
            else {
                tracing::warn!(
                    user_id = %user_id,
                    matched_user = %matched.user_id,
                    "Matched user has no interest collection, dropping match"
                );
                continue;
            };
            let Some(counterpart) =
                ClusterRepository::get_by_external(&tx, &other_collection, matched.external_id)
                    .await?
            else {
                tracing::warn!(
                    user_id = %user_id,
                    matched_user = %matched.user_id,
                    matched_external_id = matched.external_id,
                    "Matched cluster not found, dropping match"
                );
                continue;
            };

            resolved.push(ResolvedMatch {
                cluster_id: cluster_id.clone(),
                counterpart,
                record,
                matched,
            });
        }

        for m in &resolved {
            let similarity = ClusterSimilarity::new(
                m.cluster_id.clone(),
                m.counterpart.id.clone(),
                m.matched.cosine_similarity,
                (m.record.social_likelihood + m.counterpart.social_likelihood) / 2.0,
                m.matched.combined_summary.clone(),
                m.matched.combined_title.clone(),
            );
            SimilarityRepository::create(&tx, &similarity).await?;
        }

        tx.commit().await?;
        tracing::info!(
            user_id = %user_id,
            clusters = batch.len(),
            matches = resolved.len(),
            "Cluster batch ingested"
        );

        self.aggregation.recompute(user_id).await
    }
}
