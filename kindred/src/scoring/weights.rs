use crate::config::ScoringConfig;
use crate::error::{KindredError, Result};
use crate::models::TraitSnapshot;

use super::{aggregate_similarities, euclidean_similarity};

const WEIGHT_SUM_TOLERANCE: f64 = 1e-6;

/// Validated weights for the overall match score. Construction fails unless
/// the four weights sum to 1.0, so a wired `ScoringWeights` is always safe
/// to score with.
#[derive(Debug, Clone, Copy)]
pub struct ScoringWeights {
    big_five: f64,
    moral_foundations: f64,
    proactive: f64,
    reactive: f64,
}

impl ScoringWeights {
    pub fn new(
        big_five: f64,
        moral_foundations: f64,
        proactive: f64,
        reactive: f64,
    ) -> Result<Self> {
        let sum = big_five + moral_foundations + proactive + reactive;
        if (sum - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
            return Err(KindredError::InvalidConfiguration(format!(
                "scoring weights must sum to 1.0, got {sum}"
            )));
        }

        Ok(Self {
            big_five,
            moral_foundations,
            proactive,
            reactive,
        })
    }

    pub fn from_config(config: &ScoringConfig) -> Result<Self> {
        Self::new(
            config.big_five_weight,
            config.moral_foundations_weight,
            config.proactive_weight,
            config.reactive_weight,
        )
    }

    /// Blend trait similarity and bucketed cluster similarities into the
    /// single aggregate score for a user pair.
    pub fn overall_score(
        &self,
        current: &TraitSnapshot,
        other: &TraitSnapshot,
        proactive_scores: &[f64],
        reactive_scores: &[f64],
    ) -> Result<f64> {
        let big_five_similarity = euclidean_similarity(
            &current.big_five.as_vector(),
            &other.big_five.as_vector(),
        )?;
        let moral_similarity = euclidean_similarity(
            &current.moral_foundations.scored_vector(),
            &other.moral_foundations.scored_vector(),
        )?;

        Ok(self.big_five * big_five_similarity
            + self.moral_foundations * moral_similarity
            + self.proactive * aggregate_similarities(proactive_scores)
            + self.reactive * aggregate_similarities(reactive_scores))
    }
}
