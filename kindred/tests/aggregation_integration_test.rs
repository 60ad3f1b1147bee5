use chrono::NaiveDate;
use pretty_assertions::assert_eq;
use tempfile::TempDir;

use kindred::config::DatabaseConfig;
use kindred::db::repository::{PairwiseRepository, TraitRepository};
use kindred::db::Database;
use kindred::models::{
    BigFiveScores, ClusterRecord, InteractionDirection, MatchedCluster, MoralFoundationScores,
    TraitSnapshot,
};
use kindred::scoring::ScoringWeights;
use kindred::services::{AggregationService, IngestionService};

// ── Test Helpers ──────────────────────────────────────────────────────────

async fn test_database(name: &str) -> (Database, TempDir) {
    let temp_dir = tempfile::tempdir().expect("failed to create temp dir");
    let db_path = temp_dir.path().join(format!("{name}.db"));

    let config = DatabaseConfig {
        url: db_path.display().to_string(),
        auth_token: None,
        local_path: None,
    };
    let db = Database::new(&config).await.expect("database should initialize");

    (db, temp_dir)
}

fn services(db: &Database) -> (IngestionService, AggregationService) {
    let weights = ScoringWeights::new(0.2, 0.1, 0.4, 0.3).unwrap();
    let aggregation = AggregationService::new(db.clone(), weights);
    let ingestion = IngestionService::new(db.clone(), aggregation.clone());
    (ingestion, aggregation)
}

fn flat_snapshot(user_id: &str, big_five: f64, moral: f64) -> TraitSnapshot {
    TraitSnapshot::new(
        user_id.to_string(),
        BigFiveScores {
            openness: big_five,
            conscientiousness: big_five,
            extraversion: big_five,
            agreeableness: big_five,
            neuroticism: big_five,
        },
        MoralFoundationScores {
            care: moral,
            fairness: moral,
            loyalty: moral,
            authority: moral,
            purity: moral,
            attention_check: 1.0,
            response_consistency: 1.0,
        },
    )
}

fn cluster(external_id: i64, direction: InteractionDirection) -> ClusterRecord {
    ClusterRecord {
        external_id,
        direction,
        summary: format!("Talks about topic {external_id}"),
        title: format!("Topic {external_id}"),
        activity_dates: vec![NaiveDate::from_ymd_opt(2026, 6, 1).unwrap()],
        is_sensitive: false,
        timeline_items: Vec::new(),
        social_likelihood: 0.5,
        matched: None,
    }
}

fn matched_cluster(
    external_id: i64,
    direction: InteractionDirection,
    other_user: &str,
    other_external_id: i64,
    cosine: f64,
) -> ClusterRecord {
    let mut record = cluster(external_id, direction);
    record.matched = Some(MatchedCluster {
        user_id: other_user.to_string(),
        external_id: other_external_id,
        cosine_similarity: cosine,
        combined_summary: None,
        combined_title: None,
    });
    record
}

async fn pairwise_count(db: &Database) -> i64 {
    let conn = db.connect().unwrap();
    let mut rows = conn
        .query("SELECT COUNT(*) FROM pairwise_similarities", ())
        .await
        .unwrap();
    rows.next().await.unwrap().unwrap().get(0).unwrap()
}

// ── Tests ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_at_most_one_pairwise_row_after_both_sides_ingest() {
    let (db, _tmp) = test_database("both_sides").await;
    let (ingestion, _) = services(&db);

    let conn = db.connect().unwrap();
    TraitRepository::record(&conn, &flat_snapshot("alice", 0.5, 0.5))
        .await
        .unwrap();
    TraitRepository::record(&conn, &flat_snapshot("bob", 0.5, 0.5))
        .await
        .unwrap();

    ingestion
        .ingest("bob", &[cluster(1, InteractionDirection::Reactive)])
        .await
        .unwrap();
    // Alice discovers the pair first, then bob's re-run discovers it again
    // from the other side.
    ingestion
        .ingest(
            "alice",
            &[matched_cluster(1, InteractionDirection::Proactive, "bob", 1, 0.93)],
        )
        .await
        .unwrap();
    ingestion
        .ingest(
            "bob",
            &[matched_cluster(1, InteractionDirection::Reactive, "alice", 1, 0.93)],
        )
        .await
        .unwrap();

    assert_eq!(pairwise_count(&db).await, 1);
}

#[tokio::test]
async fn test_concurrent_first_discovery_yields_one_row() {
    let (db, _tmp) = test_database("concurrent_discovery").await;
    let (ingestion, aggregation) = services(&db);

    let conn = db.connect().unwrap();
    TraitRepository::record(&conn, &flat_snapshot("alice", 0.5, 0.5))
        .await
        .unwrap();
    TraitRepository::record(&conn, &flat_snapshot("bob", 0.5, 0.5))
        .await
        .unwrap();

    ingestion
        .ingest("bob", &[cluster(1, InteractionDirection::Reactive)])
        .await
        .unwrap();
    ingestion
        .ingest(
            "alice",
            &[matched_cluster(1, InteractionDirection::Proactive, "bob", 1, 0.93)],
        )
        .await
        .unwrap();

    // Drop the score written by ingestion so both in-flight recomputes see
    // the pair as undiscovered, the way two pipelines finishing at the same
    // time would.
    conn.execute("DELETE FROM pairwise_similarities", ())
        .await
        .unwrap();

    let (alice_side, bob_side) =
        tokio::join!(aggregation.recompute("alice"), aggregation.recompute("bob"));
    alice_side.unwrap();
    bob_side.unwrap();

    assert_eq!(pairwise_count(&db).await, 1);
}

#[tokio::test]
async fn test_reingestion_after_trait_change_updates_in_place() {
    let (db, _tmp) = test_database("trait_change").await;
    let (ingestion, _) = services(&db);

    let conn = db.connect().unwrap();
    TraitRepository::record(&conn, &flat_snapshot("alice", 0.5, 0.5))
        .await
        .unwrap();
    TraitRepository::record(&conn, &flat_snapshot("bob", 0.5, 0.5))
        .await
        .unwrap();

    ingestion
        .ingest("bob", &[cluster(1, InteractionDirection::Reactive)])
        .await
        .unwrap();
    let batch = vec![matched_cluster(1, InteractionDirection::Proactive, "bob", 1, 0.95)];
    ingestion.ingest("alice", &batch).await.unwrap();

    let before = PairwiseRepository::get_for_pair(&conn, "alice", "bob")
        .await
        .unwrap()
        .unwrap();

    // Bob retakes the questionnaires, then alice's pipeline re-delivers.
    TraitRepository::record(&conn, &flat_snapshot("bob", 0.8, 0.9))
        .await
        .unwrap();
    ingestion.ingest("alice", &batch).await.unwrap();

    let after = PairwiseRepository::get_for_pair(&conn, "alice", "bob")
        .await
        .unwrap()
        .unwrap();

    assert_eq!(before.id, after.id, "row must be updated in place");
    assert!(after.score < before.score);
    assert_eq!(pairwise_count(&db).await, 1);
}

#[tokio::test]
async fn test_recompute_without_shared_clusters_is_a_noop() {
    let (db, _tmp) = test_database("noop").await;
    let (ingestion, aggregation) = services(&db);

    let conn = db.connect().unwrap();
    TraitRepository::record(&conn, &flat_snapshot("alice", 0.5, 0.5))
        .await
        .unwrap();

    ingestion
        .ingest("alice", &[cluster(1, InteractionDirection::Proactive)])
        .await
        .unwrap();
    aggregation.recompute("alice").await.unwrap();

    assert_eq!(pairwise_count(&db).await, 0);
}

#[tokio::test]
async fn test_direction_buckets_follow_either_member_rule() {
    let (db, _tmp) = test_database("direction_rule").await;
    let (ingestion, _) = services(&db);

    let conn = db.connect().unwrap();
    TraitRepository::record(&conn, &flat_snapshot("alice", 0.5, 0.5))
        .await
        .unwrap();
    TraitRepository::record(&conn, &flat_snapshot("bob", 0.5, 0.5))
        .await
        .unwrap();

    // Bob's side is proactive; alice's matching cluster is reactive. The
    // similarity must land in the proactive bucket anyway.
    ingestion
        .ingest("bob", &[cluster(1, InteractionDirection::Proactive)])
        .await
        .unwrap();
    ingestion
        .ingest(
            "alice",
            &[matched_cluster(1, InteractionDirection::Reactive, "bob", 1, 0.9)],
        )
        .await
        .unwrap();

    let pairwise = PairwiseRepository::get_for_pair(&conn, "alice", "bob")
        .await
        .unwrap()
        .unwrap();

    // Identical traits: 0.2 + 0.1; proactive bucket 0.4*0.9; reactive empty.
    assert!((pairwise.score - 0.66).abs() < 1e-9, "got {}", pairwise.score);
}

#[tokio::test]
async fn test_multiple_other_users_each_get_one_row() {
    let (db, _tmp) = test_database("fanout").await;
    let (ingestion, _) = services(&db);

    let conn = db.connect().unwrap();
    for user in ["alice", "bob", "carol"] {
        TraitRepository::record(&conn, &flat_snapshot(user, 0.5, 0.5))
            .await
            .unwrap();
    }

    ingestion
        .ingest("bob", &[cluster(1, InteractionDirection::Reactive)])
        .await
        .unwrap();
    ingestion
        .ingest("carol", &[cluster(1, InteractionDirection::Reactive)])
        .await
        .unwrap();
    ingestion
        .ingest(
            "alice",
            &[
                matched_cluster(1, InteractionDirection::Proactive, "bob", 1, 0.95),
                matched_cluster(2, InteractionDirection::Reactive, "carol", 1, 0.91),
            ],
        )
        .await
        .unwrap();

    assert_eq!(pairwise_count(&db).await, 2);
    assert!(PairwiseRepository::get_for_pair(&conn, "alice", "bob")
        .await
        .unwrap()
        .is_some());
    assert!(PairwiseRepository::get_for_pair(&conn, "alice", "carol")
        .await
        .unwrap()
        .is_some());
}
