use chrono::{DateTime, Utc};
use nanoid::nanoid;
use serde::{Deserialize, Serialize};

use super::InteractionDirection;

/// Cosine threshold above which a cluster similarity is surfaced as a real
/// match in read endpoints. Rows below it are still stored and still feed
/// the aggregate score.
pub const MATCH_DISPLAY_THRESHOLD: f64 = 0.9;

/// A discovered semantic match between exactly two clusters belonging to two
/// different users. The two member references are required fields, so a
/// similarity with fewer or more than two members cannot be represented.
/// Member ids are stored in sorted order, making the schema's unique pair
/// key cover the unordered pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClusterSimilarity {
    pub id: String,
    pub cluster_a_id: String,
    pub cluster_b_id: String,
    pub cosine_similarity: f64,
    /// Average of the two member clusters' social-likelihood scores.
    pub social_likelihood: f64,
    pub combined_summary: Option<String>,
    pub combined_title: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl ClusterSimilarity {
    pub fn new(
        cluster_a_id: String,
        cluster_b_id: String,
        cosine_similarity: f64,
        social_likelihood: f64,
        combined_summary: Option<String>,
        combined_title: Option<String>,
    ) -> Self {
        let (cluster_a_id, cluster_b_id) = if cluster_a_id <= cluster_b_id {
            (cluster_a_id, cluster_b_id)
        } else {
            (cluster_b_id, cluster_a_id)
        };

        Self {
            id: nanoid!(),
            cluster_a_id,
            cluster_b_id,
            cosine_similarity,
            social_likelihood,
            combined_summary,
            combined_title,
            created_at: Utc::now(),
        }
    }
}

/// One cluster similarity joined with both member clusters' directions and
/// their owning users, as loaded for aggregation.
#[derive(Debug, Clone)]
pub struct SimilarityWithParticipants {
    pub cosine_similarity: f64,
    pub direction_a: InteractionDirection,
    pub direction_b: InteractionDirection,
    pub user_a: String,
    pub user_b: String,
}

impl SimilarityWithParticipants {
    /// Bucketing rule for aggregation: a similarity counts as proactive when
    /// either member cluster is tagged proactive, reactive otherwise.
    pub fn is_proactive(&self) -> bool {
        self.direction_a == InteractionDirection::Proactive
            || self.direction_b == InteractionDirection::Proactive
    }
}

/// The single aggregate match score between two users. `user_low` and
/// `user_high` are the lexicographically sorted pair, unique at the schema
/// level, so at most one row can exist per unordered pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PairwiseSimilarity {
    pub id: String,
    pub user_low: String,
    pub user_high: String,
    pub score: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl PairwiseSimilarity {
    /// Normalize an unordered user pair into its canonical (low, high) form.
    pub fn pair_key<'a>(user_a: &'a str, user_b: &'a str) -> (&'a str, &'a str) {
        if user_a <= user_b {
            (user_a, user_b)
        } else {
            (user_b, user_a)
        }
    }
}

/// A displayable shared match between two users' clusters, read by match
/// detail pages. Only similarities at or above `MATCH_DISPLAY_THRESHOLD`
/// qualify.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SharedClusterMatch {
    pub cosine_similarity: f64,
    pub social_likelihood: f64,
    pub combined_summary: Option<String>,
    pub combined_title: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pair_key_is_order_independent() {
        assert_eq!(
            PairwiseSimilarity::pair_key("alice", "bob"),
            PairwiseSimilarity::pair_key("bob", "alice")
        );
        assert_eq!(PairwiseSimilarity::pair_key("bob", "alice"), ("alice", "bob"));
    }

    #[test]
    fn test_new_sorts_member_ids() {
        let sim = ClusterSimilarity::new(
            "zzz".to_string(),
            "aaa".to_string(),
            0.92,
            0.5,
            None,
            None,
        );
        assert_eq!(sim.cluster_a_id, "aaa");
        assert_eq!(sim.cluster_b_id, "zzz");
    }

    #[test]
    fn test_is_proactive_when_either_member_is() {
        let mut sim = SimilarityWithParticipants {
            cosine_similarity: 0.95,
            direction_a: InteractionDirection::Reactive,
            direction_b: InteractionDirection::Proactive,
            user_a: "a".to_string(),
            user_b: "b".to_string(),
        };
        assert!(sim.is_proactive());

        sim.direction_b = InteractionDirection::Unknown;
        assert!(!sim.is_proactive());
    }
}
