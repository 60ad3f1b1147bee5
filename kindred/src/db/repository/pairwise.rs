use chrono::{DateTime, Utc};
use libsql::{params, Connection};
use nanoid::nanoid;

use crate::error::Result;
use crate::models::PairwiseSimilarity;

pub struct PairwiseRepository;

impl PairwiseRepository {
    /// Atomically write the aggregate score for an unordered user pair.
    ///
    /// The pair key is normalized to (low, high) and the write is a single
    /// insert-or-update on that unique key, so two recomputes discovering
    /// the pair at the same time cannot create a second row. An existing
    /// row keeps its id.
    pub async fn upsert_score(
        conn: &Connection,
        user_a: &str,
        user_b: &str,
        score: f64,
    ) -> Result<()> {
        let (user_low, user_high) = PairwiseSimilarity::pair_key(user_a, user_b);
        let now = Utc::now().to_rfc3339();

        conn.execute(
            r#"
            INSERT INTO pairwise_similarities (id, user_low, user_high, score, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?5)
            ON CONFLICT(user_low, user_high) DO UPDATE SET
                score = excluded.score,
                updated_at = excluded.updated_at
            "#,
            params![nanoid!(), user_low, user_high, score, now],
        )
        .await?;

        Ok(())
    }

    pub async fn get_for_pair(
        conn: &Connection,
        user_a: &str,
        user_b: &str,
    ) -> Result<Option<PairwiseSimilarity>> {
        let (user_low, user_high) = PairwiseSimilarity::pair_key(user_a, user_b);

        let mut rows = conn
            .query(
                "SELECT id, user_low, user_high, score, created_at, updated_at
                 FROM pairwise_similarities WHERE user_low = ?1 AND user_high = ?2",
                params![user_low, user_high],
            )
            .await?;

        if let Some(row) = rows.next().await? {
            Ok(Some(Self::row_to_pairwise(&row)?))
        } else {
            Ok(None)
        }
    }

    /// All aggregate scores involving a user, best match first.
    pub async fn list_for_user(
        conn: &Connection,
        user_id: &str,
    ) -> Result<Vec<PairwiseSimilarity>> {
        let mut rows = conn
            .query(
                "SELECT id, user_low, user_high, score, created_at, updated_at
                 FROM pairwise_similarities
                 WHERE user_low = ?1 OR user_high = ?1
                 ORDER BY score DESC",
                params![user_id],
            )
            .await?;

        let mut results = Vec::new();
        while let Some(row) = rows.next().await? {
            results.push(Self::row_to_pairwise(&row)?);
        }
        Ok(results)
    }

    fn row_to_pairwise(row: &libsql::Row) -> Result<PairwiseSimilarity> {
        Ok(PairwiseSimilarity {
            id: row.get(0)?,
            user_low: row.get(1)?,
            user_high: row.get(2)?,
            score: row.get(3)?,
            created_at: DateTime::parse_from_rfc3339(&row.get::<String>(4)?)
                .map(|dt| dt.with_timezone(&Utc))
                .unwrap_or_else(|_| Utc::now()),
            updated_at: DateTime::parse_from_rfc3339(&row.get::<String>(5)?)
                .map(|dt| dt.with_timezone(&Utc))
                .unwrap_or_else(|_| Utc::now()),
        })
    }
}
