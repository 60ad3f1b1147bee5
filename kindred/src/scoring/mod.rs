mod formulas;
mod weights;

pub use formulas::{aggregate_similarities, euclidean_similarity};
pub use weights::ScoringWeights;
