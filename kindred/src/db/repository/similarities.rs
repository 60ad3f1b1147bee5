use libsql::{params, Connection};

use crate::error::Result;
use crate::models::{ClusterSimilarity, SharedClusterMatch, SimilarityWithParticipants};

pub struct SimilarityRepository;

impl SimilarityRepository {
    /// Insert one similarity row. The (cluster_a, cluster_b) pair is unique,
    /// so an exact duplicate within a batch is skipped rather than erroring.
    pub async fn create(conn: &Connection, similarity: &ClusterSimilarity) -> Result<()> {
        conn.execute(
            r#"
            INSERT OR IGNORE INTO cluster_similarities (
                id, cluster_a_id, cluster_b_id, cosine_similarity,
                social_likelihood, combined_summary, combined_title, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
            params![
                similarity.id.clone(),
                similarity.cluster_a_id.clone(),
                similarity.cluster_b_id.clone(),
                similarity.cosine_similarity,
                similarity.social_likelihood,
                similarity.combined_summary.clone(),
                similarity.combined_title.clone(),
                similarity.created_at.to_rfc3339(),
            ],
        )
        .await?;

        Ok(())
    }

    /// Delete every similarity with a member in `cluster_ids`, on either
    /// side. Run before rebuilding matches so re-ingestion replaces rather
    /// than accumulates.
    pub async fn delete_for_clusters(conn: &Connection, cluster_ids: &[String]) -> Result<u64> {
        if cluster_ids.is_empty() {
            return Ok(0);
        }

        let mut placeholders = String::new();
        for i in 0..cluster_ids.len() {
            if i > 0 {
                placeholders.push_str(", ");
            }
            placeholders.push('?');
            placeholders.push_str(&(i + 1).to_string());
        }

        // Numbered placeholders let the same id list serve both IN clauses.
        let sql = format!(
            "DELETE FROM cluster_similarities \
             WHERE cluster_a_id IN ({placeholders}) OR cluster_b_id IN ({placeholders})"
        );
        let params: Vec<libsql::Value> = cluster_ids
            .iter()
            .map(|id| libsql::Value::from(id.clone()))
            .collect();

        let deleted = conn.execute(&sql, libsql::params_from_iter(params)).await?;
        Ok(deleted)
    }

    /// Every similarity touching one of the user's clusters, joined with
    /// both member clusters' directions and owning users. Input to
    /// aggregation.
    pub async fn list_for_user(
        conn: &Connection,
        user_id: &str,
    ) -> Result<Vec<SimilarityWithParticipants>> {
        let mut rows = conn
            .query(
                r#"
                SELECT s.cosine_similarity, ca.direction, cb.direction,
                       col_a.user_id, col_b.user_id
                FROM cluster_similarities s
                JOIN interest_clusters ca ON ca.id = s.cluster_a_id
                JOIN interest_clusters cb ON cb.id = s.cluster_b_id
                JOIN interest_collections col_a ON col_a.id = ca.collection_id
                JOIN interest_collections col_b ON col_b.id = cb.collection_id
                WHERE col_a.user_id = ?1 OR col_b.user_id = ?1
                "#,
                params![user_id],
            )
            .await?;

        let mut results = Vec::new();
        while let Some(row) = rows.next().await? {
            results.push(SimilarityWithParticipants {
                cosine_similarity: row.get(0)?,
                direction_a: row.get::<String>(1)?.parse().unwrap_or_default(),
                direction_b: row.get::<String>(2)?.parse().unwrap_or_default(),
                user_a: row.get(3)?,
                user_b: row.get(4)?,
            });
        }
        Ok(results)
    }

    /// Displayable shared matches between two users, strongest first.
    pub async fn list_shared_for_pair(
        conn: &Connection,
        user_a: &str,
        user_b: &str,
        threshold: f64,
    ) -> Result<Vec<SharedClusterMatch>> {
        let mut rows = conn
            .query(
                r#"
                SELECT s.cosine_similarity, s.social_likelihood,
                       s.combined_summary, s.combined_title
                FROM cluster_similarities s
                JOIN interest_clusters ca ON ca.id = s.cluster_a_id
                JOIN interest_clusters cb ON cb.id = s.cluster_b_id
                JOIN interest_collections col_a ON col_a.id = ca.collection_id
                JOIN interest_collections col_b ON col_b.id = cb.collection_id
                WHERE ((col_a.user_id = ?1 AND col_b.user_id = ?2)
                    OR (col_a.user_id = ?2 AND col_b.user_id = ?1))
                  AND s.cosine_similarity >= ?3
                ORDER BY s.cosine_similarity DESC
                "#,
                params![user_a, user_b, threshold],
            )
            .await?;

        let mut results = Vec::new();
        while let Some(row) = rows.next().await? {
            results.push(SharedClusterMatch {
                cosine_similarity: row.get(0)?,
                social_likelihood: row.get(1)?,
                combined_summary: row.get(2)?,
                combined_title: row.get(3)?,
            });
        }
        Ok(results)
    }
}
