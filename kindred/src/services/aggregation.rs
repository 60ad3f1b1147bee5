use std::collections::HashMap;

use crate::db::repository::{PairwiseRepository, SimilarityRepository, TraitRepository};
use crate::db::Database;
use crate::error::Result;
use crate::scoring::ScoringWeights;

#[derive(Default)]
struct DirectionBuckets {
    proactive: Vec<f64>,
    reactive: Vec<f64>,
}

/// Recomputes the aggregate match score between a user and every other user
/// sharing at least one matching cluster. Reads cluster-level data, never
/// writes it; the only writes are the pairwise upserts.
#[derive(Clone)]
pub struct AggregationService {
    db: Database,
    weights: ScoringWeights,
}

impl AggregationService {
    pub fn new(db: Database, weights: ScoringWeights) -> Self {
        Self { db, weights }
    }

    pub async fn recompute(&self, user_id: &str) -> Result<()> {
        let conn = self.db.connect()?;
        let tx = conn.transaction().await?;

        let similarities = SimilarityRepository::list_for_user(&tx, user_id).await?;
        if similarities.is_empty() {
            return Ok(());
        }

        let Some(own_traits) = TraitRepository::get_latest(&tx, user_id).await? else {
            tracing::warn!(
                user_id = %user_id,
                "No trait snapshot, skipping similarity aggregation"
            );
            return Ok(());
        };

        let mut groups: HashMap<String, DirectionBuckets> = HashMap::new();
        for sim in similarities {
            let other = if sim.user_a == user_id {
                sim.user_b.clone()
            } else {
                sim.user_a.clone()
            };
            // The join cannot produce self-pairs, but a malformed row must
            // not score a user against themselves.
            if other == user_id {
                continue;
            }

            let proactive = sim.is_proactive();
            let buckets = groups.entry(other).or_default();
            if proactive {
                buckets.proactive.push(sim.cosine_similarity);
            } else {
                buckets.reactive.push(sim.cosine_similarity);
            }
        }

        let mut scored = 0usize;
        for (other_user, buckets) in groups {
            let Some(other_traits) = TraitRepository::get_latest(&tx, &other_user).await? else {
                tracing::warn!(
                    user_id = %user_id,
                    other_user = %other_user,
                    "Pair skipped: other side has no trait snapshot"
                );
                continue;
            };

            let score = self.weights.overall_score(
                &own_traits,
                &other_traits,
                &buckets.proactive,
                &buckets.reactive,
            )?;
            PairwiseRepository::upsert_score(&tx, user_id, &other_user, score).await?;
            scored += 1;
        }

        tx.commit().await?;
        tracing::info!(user_id = %user_id, pairs = scored, "Pairwise similarity recomputed");

        Ok(())
    }
}
