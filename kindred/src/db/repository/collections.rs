use chrono::Utc;
use libsql::{params, Connection};
use nanoid::nanoid;

use crate::error::Result;

pub struct CollectionRepository;

impl CollectionRepository {
    /// Create the user's interest collection if it does not exist yet and
    /// return its id. Safe to call on every ingestion.
    pub async fn ensure(conn: &Connection, user_id: &str) -> Result<String> {
        conn.execute(
            "INSERT OR IGNORE INTO interest_collections (id, user_id, created_at) VALUES (?1, ?2, ?3)",
            params![nanoid!(), user_id, Utc::now().to_rfc3339()],
        )
        .await?;

        let mut rows = conn
            .query(
                "SELECT id FROM interest_collections WHERE user_id = ?1",
                params![user_id],
            )
            .await?;

        match rows.next().await? {
            Some(row) => Ok(row.get(0)?),
            None => Err(crate::error::KindredError::Internal(format!(
                "interest collection missing after ensure for user {user_id}"
            ))),
        }
    }

    pub async fn get_id_by_user(conn: &Connection, user_id: &str) -> Result<Option<String>> {
        let mut rows = conn
            .query(
                "SELECT id FROM interest_collections WHERE user_id = ?1",
                params![user_id],
            )
            .await?;

        if let Some(row) = rows.next().await? {
            Ok(Some(row.get(0)?))
        } else {
            Ok(None)
        }
    }

    pub async fn list_user_ids(conn: &Connection) -> Result<Vec<String>> {
        let mut rows = conn
            .query(
                "SELECT user_id FROM interest_collections ORDER BY created_at ASC",
                (),
            )
            .await?;

        let mut user_ids = Vec::new();
        while let Some(row) = rows.next().await? {
            user_ids.push(row.get(0)?);
        }
        Ok(user_ids)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::schema;

    async fn setup_test_db() -> Connection {
        let conn = libsql::Builder::new_local(":memory:")
            .build()
            .await
            .unwrap()
            .connect()
            .unwrap();
        schema::init_schema(&conn).await.unwrap();
        conn
    }

    #[tokio::test]
    async fn test_ensure_is_idempotent() {
        let conn = setup_test_db().await;

        let first = CollectionRepository::ensure(&conn, "user_a").await.unwrap();
        let second = CollectionRepository::ensure(&conn, "user_a").await.unwrap();
        assert_eq!(first, second);

        let users = CollectionRepository::list_user_ids(&conn).await.unwrap();
        assert_eq!(users, vec!["user_a".to_string()]);
    }

    #[tokio::test]
    async fn test_get_id_by_user_missing() {
        let conn = setup_test_db().await;
        let id = CollectionRepository::get_id_by_user(&conn, "nobody")
            .await
            .unwrap();
        assert!(id.is_none());
    }
}
