use chrono::{DateTime, Utc};
use nanoid::nanoid;
use serde::{Deserialize, Serialize};

/// Big Five questionnaire result, each dimension normalized to [0, 1].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BigFiveScores {
    pub openness: f64,
    pub conscientiousness: f64,
    pub extraversion: f64,
    pub agreeableness: f64,
    pub neuroticism: f64,
}

impl BigFiveScores {
    pub fn as_vector(&self) -> Vec<f64> {
        vec![
            self.openness,
            self.conscientiousness,
            self.extraversion,
            self.agreeableness,
            self.neuroticism,
        ]
    }
}

/// Moral Foundations questionnaire result, each dimension normalized to
/// [0, 1]. `attention_check` and `response_consistency` exist only to
/// validate questionnaire answers and never enter scoring.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MoralFoundationScores {
    pub care: f64,
    pub fairness: f64,
    pub loyalty: f64,
    pub authority: f64,
    pub purity: f64,
    #[serde(default)]
    pub attention_check: f64,
    #[serde(default)]
    pub response_consistency: f64,
}

impl MoralFoundationScores {
    /// The five dimensions that participate in similarity scoring.
    pub fn scored_vector(&self) -> Vec<f64> {
        vec![self.care, self.fairness, self.loyalty, self.authority, self.purity]
    }
}

/// A user's most recent questionnaire results. The questionnaire scoring
/// itself happens outside this engine; snapshots arrive already normalized.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TraitSnapshot {
    pub id: String,
    pub user_id: String,
    pub big_five: BigFiveScores,
    pub moral_foundations: MoralFoundationScores,
    pub recorded_at: DateTime<Utc>,
}

impl TraitSnapshot {
    pub fn new(
        user_id: String,
        big_five: BigFiveScores,
        moral_foundations: MoralFoundationScores,
    ) -> Self {
        Self {
            id: nanoid!(),
            user_id,
            big_five,
            moral_foundations,
            recorded_at: Utc::now(),
        }
    }
}
