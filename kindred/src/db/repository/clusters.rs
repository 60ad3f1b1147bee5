use std::collections::HashMap;

use chrono::{DateTime, Utc};
use libsql::{params, Connection};

use crate::error::Result;
use crate::models::{ClusterRecord, InterestCluster};

pub struct ClusterRepository;

impl ClusterRepository {
    /// Insert a pipeline batch for one collection, skipping any record whose
    /// external id already exists there. Re-running the same batch is a
    /// no-op for this table.
    pub async fn insert_batch(
        conn: &Connection,
        collection_id: &str,
        records: &[ClusterRecord],
    ) -> Result<()> {
        for record in records {
            let cluster = InterestCluster::from_record(collection_id, record);
            conn.execute(
                r#"
                INSERT OR IGNORE INTO interest_clusters (
                    id, collection_id, external_id, direction, summary, title,
                    activity_dates, is_sensitive, timeline_items, social_likelihood, created_at
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
                "#,
                params![
                    cluster.id,
                    cluster.collection_id,
                    cluster.external_id,
                    cluster.direction.to_string(),
                    cluster.summary,
                    cluster.title,
                    serde_json::to_string(&cluster.activity_dates)?,
                    cluster.is_sensitive as i32,
                    serde_json::to_string(&cluster.timeline_items)?,
                    cluster.social_likelihood,
                    cluster.created_at.to_rfc3339(),
                ],
            )
            .await?;
        }

        Ok(())
    }

    /// Internal ids of every cluster in a collection, keyed by the
    /// externally-assigned cluster id.
    pub async fn map_external_ids(
        conn: &Connection,
        collection_id: &str,
    ) -> Result<HashMap<i64, String>> {
        let mut rows = conn
            .query(
                "SELECT external_id, id FROM interest_clusters WHERE collection_id = ?1",
                params![collection_id],
            )
            .await?;

        let mut map = HashMap::new();
        while let Some(row) = rows.next().await? {
            map.insert(row.get::<i64>(0)?, row.get::<String>(1)?);
        }
        Ok(map)
    }

    pub async fn get_by_external(
        conn: &Connection,
        collection_id: &str,
        external_id: i64,
    ) -> Result<Option<InterestCluster>> {
        let mut rows = conn
            .query(
                r#"
                SELECT id, collection_id, external_id, direction, summary, title,
                       activity_dates, is_sensitive, timeline_items, social_likelihood, created_at
                FROM interest_clusters
                WHERE collection_id = ?1 AND external_id = ?2
                "#,
                params![collection_id, external_id],
            )
            .await?;

        if let Some(row) = rows.next().await? {
            Ok(Some(Self::row_to_cluster(&row)?))
        } else {
            Ok(None)
        }
    }

    fn row_to_cluster(row: &libsql::Row) -> Result<InterestCluster> {
        Ok(InterestCluster {
            id: row.get(0)?,
            collection_id: row.get(1)?,
            external_id: row.get(2)?,
            direction: row.get::<String>(3)?.parse().unwrap_or_default(),
            summary: row.get(4)?,
            title: row.get(5)?,
            activity_dates: serde_json::from_str(&row.get::<String>(6)?).unwrap_or_default(),
            is_sensitive: row.get::<i32>(7)? != 0,
            timeline_items: serde_json::from_str(&row.get::<String>(8)?).unwrap_or_default(),
            social_likelihood: row.get(9)?,
            created_at: DateTime::parse_from_rfc3339(&row.get::<String>(10)?)
                .map(|dt| dt.with_timezone(&Utc))
                .unwrap_or_else(|_| Utc::now()),
        })
    }
}
