use axum::extract::{Path, State};
use axum::Json;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::db::repository::{PairwiseRepository, SimilarityRepository, TraitRepository};
use crate::error::{KindredError, Result};
use crate::models::{
    BigFiveScores, ClusterRecord, MoralFoundationScores, SharedClusterMatch, TraitSnapshot,
    MATCH_DISPLAY_THRESHOLD,
};

use super::AppState;

pub async fn health_check() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

#[derive(Debug, Serialize)]
pub struct IngestResponse {
    pub user_id: String,
    pub clusters: usize,
}

/// `POST /api/v1/users/{userId}/clusters`
///
/// Pipeline-completion trigger: persists the delivered cluster batch, links
/// declared cross-user matches, and recomputes the user's pairwise scores.
pub async fn ingest_clusters(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Json(batch): Json<Vec<ClusterRecord>>,
) -> Result<Json<IngestResponse>> {
    state.ingestion.ingest(&user_id, &batch).await?;

    Ok(Json(IngestResponse {
        clusters: batch.len(),
        user_id,
    }))
}

#[derive(Debug, Deserialize)]
pub struct RecordTraitsRequest {
    pub big_five: BigFiveScores,
    pub moral_foundations: MoralFoundationScores,
}

#[derive(Debug, Serialize)]
pub struct RecordTraitsResponse {
    pub id: String,
    pub recorded_at: DateTime<Utc>,
}

/// `PUT /api/v1/users/{userId}/traits`
///
/// Stores a freshly scored questionnaire snapshot. Scoring the raw answers
/// happens upstream; values arrive normalized to [0, 1].
pub async fn record_traits(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Json(req): Json<RecordTraitsRequest>,
) -> Result<Json<RecordTraitsResponse>> {
    let snapshot = TraitSnapshot::new(user_id, req.big_five, req.moral_foundations);

    let conn = state.db.connect()?;
    TraitRepository::record(&conn, &snapshot).await?;

    Ok(Json(RecordTraitsResponse {
        id: snapshot.id,
        recorded_at: snapshot.recorded_at,
    }))
}

/// `GET /api/v1/users/{userId}/traits`
///
/// The most recent snapshot, or 404 while the user has not completed the
/// questionnaires.
pub async fn get_traits(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<TraitSnapshot>> {
    let conn = state.db.connect()?;

    match TraitRepository::get_latest(&conn, &user_id).await? {
        Some(snapshot) => Ok(Json(snapshot)),
        None => Err(KindredError::MissingTraits(format!(
            "user {user_id} has no trait snapshot"
        ))),
    }
}

#[derive(Debug, Serialize)]
pub struct MatchSummary {
    pub other_user_id: String,
    pub score: f64,
    pub updated_at: DateTime<Utc>,
}

/// `GET /api/v1/users/{userId}/matches`
///
/// The user's aggregate match list, best first.
pub async fn list_matches(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<Vec<MatchSummary>>> {
    let conn = state.db.connect()?;
    let rows = PairwiseRepository::list_for_user(&conn, &user_id).await?;

    let matches = rows
        .into_iter()
        .map(|row| {
            let other_user_id = if row.user_low == user_id {
                row.user_high
            } else {
                row.user_low
            };
            MatchSummary {
                other_user_id,
                score: row.score,
                updated_at: row.updated_at,
            }
        })
        .collect();

    Ok(Json(matches))
}

#[derive(Debug, Serialize)]
pub struct MatchDetailResponse {
    pub user_a: String,
    pub user_b: String,
    pub score: f64,
    pub updated_at: DateTime<Utc>,
    pub shared_clusters: Vec<SharedClusterMatch>,
}

/// `GET /api/v1/matches/{userA}/{userB}`
///
/// The aggregate score for one pair plus their displayable shared cluster
/// matches. 404 until the pair has been scored.
pub async fn get_match(
    State(state): State<AppState>,
    Path((user_a, user_b)): Path<(String, String)>,
) -> Result<Json<MatchDetailResponse>> {
    let conn = state.db.connect()?;

    let Some(pairwise) = PairwiseRepository::get_for_pair(&conn, &user_a, &user_b).await? else {
        return Err(KindredError::NotFound(format!(
            "no match score for {user_a} and {user_b}"
        )));
    };

    let shared = SimilarityRepository::list_shared_for_pair(
        &conn,
        &user_a,
        &user_b,
        MATCH_DISPLAY_THRESHOLD,
    )
    .await?;

    Ok(Json(MatchDetailResponse {
        user_a,
        user_b,
        score: pairwise.score,
        updated_at: pairwise.updated_at,
        shared_clusters: shared,
    }))
}
