use chrono::{DateTime, Utc};
use libsql::{params, Connection};

use crate::error::Result;
use crate::models::TraitSnapshot;

pub struct TraitRepository;

impl TraitRepository {
    pub async fn record(conn: &Connection, snapshot: &TraitSnapshot) -> Result<()> {
        conn.execute(
            r#"
            INSERT INTO trait_snapshots (id, user_id, big_five, moral_foundations, recorded_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
            params![
                snapshot.id.clone(),
                snapshot.user_id.clone(),
                serde_json::to_string(&snapshot.big_five)?,
                serde_json::to_string(&snapshot.moral_foundations)?,
                snapshot.recorded_at.to_rfc3339(),
            ],
        )
        .await?;

        Ok(())
    }

    /// The user's most recent snapshot, or None if they have not completed
    /// the questionnaires yet.
    pub async fn get_latest(conn: &Connection, user_id: &str) -> Result<Option<TraitSnapshot>> {
        let mut rows = conn
            .query(
                r#"
                SELECT id, user_id, big_five, moral_foundations, recorded_at
                FROM trait_snapshots
                WHERE user_id = ?1
                ORDER BY recorded_at DESC
                LIMIT 1
                "#,
                params![user_id],
            )
            .await?;

        if let Some(row) = rows.next().await? {
            Ok(Some(TraitSnapshot {
                id: row.get(0)?,
                user_id: row.get(1)?,
                big_five: serde_json::from_str(&row.get::<String>(2)?)?,
                moral_foundations: serde_json::from_str(&row.get::<String>(3)?)?,
                recorded_at: DateTime::parse_from_rfc3339(&row.get::<String>(4)?)
                    .map(|dt| dt.with_timezone(&Utc))
                    .unwrap_or_else(|_| Utc::now()),
            }))
        } else {
            Ok(None)
        }
    }
}
