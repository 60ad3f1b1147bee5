use libsql::Connection;

use crate::error::Result;

pub async fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        -- One interest collection per user, created lazily on first ingestion
        CREATE TABLE IF NOT EXISTS interest_collections (
            id TEXT PRIMARY KEY,
            user_id TEXT NOT NULL UNIQUE,
            created_at TEXT NOT NULL
        );

        -- Interest clusters, recreated wholesale on every pipeline delivery
        CREATE TABLE IF NOT EXISTS interest_clusters (
            id TEXT PRIMARY KEY,
            collection_id TEXT NOT NULL,
            external_id INTEGER NOT NULL,
            direction TEXT NOT NULL DEFAULT 'unknown',
            summary TEXT NOT NULL,
            title TEXT NOT NULL,
            activity_dates TEXT NOT NULL DEFAULT '[]',
            is_sensitive INTEGER NOT NULL DEFAULT 0,
            timeline_items TEXT NOT NULL DEFAULT '[]',
            social_likelihood REAL NOT NULL DEFAULT 0,
            created_at TEXT NOT NULL,
            UNIQUE (collection_id, external_id),
            FOREIGN KEY (collection_id) REFERENCES interest_collections(id) ON DELETE CASCADE
        );

        CREATE INDEX IF NOT EXISTS idx_interest_clusters_collection_id
            ON interest_clusters(collection_id);

        -- Pairwise cluster matches; the two member references are required
        -- columns, so a similarity always has exactly two members. Member
        -- ids are written sorted, making the unique key order-independent
        CREATE TABLE IF NOT EXISTS cluster_similarities (
            id TEXT PRIMARY KEY,
            cluster_a_id TEXT NOT NULL,
            cluster_b_id TEXT NOT NULL,
            cosine_similarity REAL NOT NULL,
            social_likelihood REAL NOT NULL DEFAULT 0,
            combined_summary TEXT,
            combined_title TEXT,
            created_at TEXT NOT NULL,
            UNIQUE (cluster_a_id, cluster_b_id),
            FOREIGN KEY (cluster_a_id) REFERENCES interest_clusters(id) ON DELETE CASCADE,
            FOREIGN KEY (cluster_b_id) REFERENCES interest_clusters(id) ON DELETE CASCADE
        );

        CREATE INDEX IF NOT EXISTS idx_cluster_similarities_cluster_a
            ON cluster_similarities(cluster_a_id);
        CREATE INDEX IF NOT EXISTS idx_cluster_similarities_cluster_b
            ON cluster_similarities(cluster_b_id);

        -- Questionnaire trait snapshots; reads always take the latest per user
        CREATE TABLE IF NOT EXISTS trait_snapshots (
            id TEXT PRIMARY KEY,
            user_id TEXT NOT NULL,
            big_five TEXT NOT NULL,
            moral_foundations TEXT NOT NULL,
            recorded_at TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_trait_snapshots_user_recorded
            ON trait_snapshots(user_id, recorded_at);

        -- Aggregate match score per unordered user pair. The sorted
        -- (user_low, user_high) key is unique, so concurrent recomputes for
        -- both sides of a new pair converge on a single row
        CREATE TABLE IF NOT EXISTS pairwise_similarities (
            id TEXT PRIMARY KEY,
            user_low TEXT NOT NULL,
            user_high TEXT NOT NULL,
            score REAL NOT NULL,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL,
            UNIQUE (user_low, user_high)
        );

        CREATE INDEX IF NOT EXISTS idx_pairwise_similarities_user_high
            ON pairwise_similarities(user_high);
        "#,
    )
    .await?;

    Ok(())
}
