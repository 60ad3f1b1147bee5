use chrono::{DateTime, NaiveDate, Utc};
use nanoid::nanoid;
use serde::{Deserialize, Serialize};

/// Which way the user engages with the topic behind a cluster, as tagged by
/// the upstream clustering pipeline.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum InteractionDirection {
    Proactive,
    Reactive,
    #[default]
    Unknown,
}

impl std::fmt::Display for InteractionDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Proactive => write!(f, "proactive"),
            Self::Reactive => write!(f, "reactive"),
            Self::Unknown => write!(f, "unknown"),
        }
    }
}

impl std::str::FromStr for InteractionDirection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "proactive" => Ok(Self::Proactive),
            "reactive" => Ok(Self::Reactive),
            "unknown" => Ok(Self::Unknown),
            _ => Err(format!("Unknown interaction direction: {s}")),
        }
    }
}

/// A stored interest cluster, owned by one user's interest collection.
/// Clusters are recreated wholesale on every pipeline delivery for a user
/// and never partially mutated afterward.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InterestCluster {
    pub id: String,
    pub collection_id: String,
    /// Cluster id assigned upstream, unique within the owning collection.
    pub external_id: i64,
    pub direction: InteractionDirection,
    pub summary: String,
    pub title: String,
    pub activity_dates: Vec<NaiveDate>,
    pub is_sensitive: bool,
    pub timeline_items: Vec<String>,
    pub social_likelihood: f64,
    pub created_at: DateTime<Utc>,
}

impl InterestCluster {
    pub fn from_record(collection_id: &str, record: &ClusterRecord) -> Self {
        Self {
            id: nanoid!(),
            collection_id: collection_id.to_string(),
            external_id: record.external_id,
            direction: record.direction,
            summary: record.summary.clone(),
            title: record.title.clone(),
            activity_dates: record.activity_dates.clone(),
            is_sensitive: record.is_sensitive,
            timeline_items: record.timeline_items.clone(),
            social_likelihood: record.social_likelihood,
            created_at: Utc::now(),
        }
    }
}

/// One element of a pipeline-completion batch: the cluster's own data plus an
/// optional cross-user match discovered upstream.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClusterRecord {
    pub external_id: i64,
    #[serde(default)]
    pub direction: InteractionDirection,
    pub summary: String,
    pub title: String,
    pub activity_dates: Vec<NaiveDate>,
    #[serde(default)]
    pub is_sensitive: bool,
    #[serde(default)]
    pub timeline_items: Vec<String>,
    #[serde(default)]
    pub social_likelihood: f64,
    #[serde(default)]
    pub matched: Option<MatchedCluster>,
}

/// Reference to a semantically similar cluster on another user's side,
/// with the cosine similarity precomputed upstream.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchedCluster {
    pub user_id: String,
    pub external_id: i64,
    pub cosine_similarity: f64,
    #[serde(default)]
    pub combined_summary: Option<String>,
    #[serde(default)]
    pub combined_title: Option<String>,
}
