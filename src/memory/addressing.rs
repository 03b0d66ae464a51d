//! Content-based addressing: cosine similarity against every slot, sharpened
//! by a per-key strength and normalized with a softmax over slots.

use ndarray::{Array3, ArrayView2, ArrayView3, ArrayViewMut1, Axis, Zip};

/// Guards cosine-similarity denominators against zero-norm vectors.
pub const EPSILON: f32 = 1e-6;

/// Cosine similarity between each slot `[B,N,W]` and each key `[B,W,K]`,
/// returned as `[B,N,K]`.
pub fn cosine_similarity(memory: ArrayView3<f32>, keys: ArrayView3<f32>) -> Array3<f32> {
    let (batch, slots, _) = memory.dim();
    let key_count = keys.dim().2;
    let mut similarity = Array3::zeros((batch, slots, key_count));

    Zip::from(similarity.outer_iter_mut())
        .and(memory.outer_iter())
        .and(keys.outer_iter())
        .par_for_each(|mut out, memory, keys| {
            let dots = memory.dot(&keys);
            let slot_norms = memory.map_axis(Axis(1), |word| word.dot(&word).sqrt());
            let key_norms = keys.map_axis(Axis(0), |key| key.dot(&key).sqrt());

            Zip::indexed(&mut out)
                .and(&dots)
                .for_each(|(slot, key), out, &dot| {
                    *out = dot / (slot_norms[slot] * key_norms[key] + EPSILON);
                });
        });

    similarity
}

/// Numerically stable softmax of a single lane, in place.
pub fn softmax_in_place(mut lane: ArrayViewMut1<f32>) {
    let max = lane.fold(f32::NEG_INFINITY, |acc, &x| acc.max(x));
    lane.mapv_inplace(|x| (x - max).exp());
    let total = lane.sum();
    lane /= total;
}

/// Content weighting `[B,N,K]`: every `[b, :, k]` column is a distribution
/// over slots.
///
/// A strength of zero yields the uniform distribution.
pub fn content_weighting(
    memory: ArrayView3<f32>,
    keys: ArrayView3<f32>,
    strengths: ArrayView2<f32>,
) -> Array3<f32> {
    let mut scores = cosine_similarity(memory, keys);

    Zip::from(scores.outer_iter_mut())
        .and(strengths.outer_iter())
        .par_for_each(|mut scores, strengths| scores *= &strengths);

    Zip::from(scores.lanes_mut(Axis(1))).par_for_each(softmax_in_place);

    scores
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{array, Array2};

    fn memory() -> Array3<f32> {
        array![[[1.0, 0.0], [0.0, 1.0], [0.7, 0.7], [-1.0, 0.0]]]
    }

    #[test]
    fn test_columns_sum_to_one() {
        let keys = array![[[1.0, 0.2], [0.0, 0.9]]];
        let strengths = array![[3.0, 10.0]];
        let weights = content_weighting(memory().view(), keys.view(), strengths.view());

        assert_eq!(weights.dim(), (1, 4, 2));
        for column in weights.lanes(Axis(1)) {
            assert!((column.sum() - 1.0).abs() < 1e-5);
        }
    }

    #[test]
    fn test_zero_strength_is_uniform() {
        let keys = array![[[1.0], [0.0]]];
        let strengths = array![[0.0]];
        let weights = content_weighting(memory().view(), keys.view(), strengths.view());

        for &w in weights.iter() {
            assert!((w - 0.25).abs() < 1e-6);
        }
    }

    #[test]
    fn test_best_match_wins_with_high_strength() {
        let keys = array![[[0.0], [2.0]]];
        let strengths = array![[50.0]];
        let weights = content_weighting(memory().view(), keys.view(), strengths.view());

        assert!(weights[[0, 1, 0]] > 0.99);
    }

    #[test]
    fn test_zero_norm_vectors_stay_finite() {
        let memory = Array3::<f32>::zeros((1, 3, 2));
        let keys = Array3::<f32>::zeros((1, 2, 1));
        let strengths = Array2::from_elem((1, 1), 5.0);

        let similarity = cosine_similarity(memory.view(), keys.view());
        assert!(similarity.iter().all(|&s| s == 0.0));

        let weights = content_weighting(memory.view(), keys.view(), strengths.view());
        assert!(weights.iter().all(|w| w.is_finite()));
        assert!((weights.sum() - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_collinear_vectors_do_not_overflow() {
        let memory = array![[[1e-3, 1e-3], [1e3, 1e3]]];
        let keys = array![[[5.0], [5.0]]];
        let strengths = array![[1000.0]];

        let weights = content_weighting(memory.view(), keys.view(), strengths.view());
        assert!(weights.iter().all(|w| w.is_finite()));
        assert!((weights.sum() - 1.0).abs() < 1e-5);
    }
}
