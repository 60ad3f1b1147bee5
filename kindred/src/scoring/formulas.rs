use crate::error::{KindredError, Result};

/// Smoothed aggregate of per-cluster cosine similarities.
///
/// Computes `ln(mean(exp(score)))`: a log-mean-exp that weights strong
/// individual overlaps more heavily than a plain arithmetic mean, so one
/// very strong topical overlap among several weak ones still scores well.
/// The result sits between the arithmetic mean and the maximum, and equals
/// the score itself for a single-element list.
///
/// An empty list yields 0.0: a direction with no similarities contributes
/// nothing to the weighted blend.
pub fn aggregate_similarities(scores: &[f64]) -> f64 {
    if scores.is_empty() {
        return 0.0;
    }

    let mean_exp = scores.iter().map(|s| s.exp()).sum::<f64>() / scores.len() as f64;
    mean_exp.ln()
}

/// Normalized Euclidean similarity between two equal-length trait vectors.
///
/// `1 - dist(a, b) / sqrt(len)`, where `sqrt(len)` is the distance between
/// two antipodal vectors whose coordinates are each 0 or 1. The result is in
/// [0, 1] only if inputs are already normalized to [0, 1]; no clamping is
/// performed, callers guarantee normalization upstream.
pub fn euclidean_similarity(a: &[f64], b: &[f64]) -> Result<f64> {
    if a.len() != b.len() {
        return Err(KindredError::InvalidInput(format!(
            "trait vector length mismatch: {} vs {}",
            a.len(),
            b.len()
        )));
    }

    let distance = a
        .iter()
        .zip(b.iter())
        .map(|(x, y)| (x - y).powi(2))
        .sum::<f64>()
        .sqrt();
    let max_distance = (a.len() as f64).sqrt();

    Ok(1.0 - distance / max_distance)
}
