use ndarray::{Array3, ArrayView3, Axis, Zip};

/// Index of each read strategy along the mode axis of `read_modes`.
pub const BACKWARD_MODE: usize = 0;
pub const LOOKUP_MODE: usize = 1;
pub const FORWARD_MODE: usize = 2;

/// Read weights `[B,N,R]`: per head, the mode-weighted sum of the backward,
/// lookup and forward candidates. `read_modes` is `[B,3,R]`.
pub fn read_weighting(
    lookup: ArrayView3<f32>,
    forward: ArrayView3<f32>,
    backward: ArrayView3<f32>,
    read_modes: ArrayView3<f32>,
) -> Array3<f32> {
    let mut weights = Array3::zeros(lookup.raw_dim());

    Zip::from(weights.outer_iter_mut())
        .and(lookup.outer_iter())
        .and(forward.outer_iter())
        .and(backward.outer_iter())
        .and(read_modes.outer_iter())
        .par_for_each(|mut out, lookup, forward, backward, modes| {
            let backward_mode = modes.index_axis(Axis(0), BACKWARD_MODE);
            let lookup_mode = modes.index_axis(Axis(0), LOOKUP_MODE);
            let forward_mode = modes.index_axis(Axis(0), FORWARD_MODE);

            out.assign(&(&backward * &backward_mode));
            out += &(&lookup * &lookup_mode);
            out += &(&forward * &forward_mode);
        });

    weights
}

/// Read vectors `[B,W,R]`: the memory words averaged under each head's weights.
pub fn read_vectors(memory: ArrayView3<f32>, read_weights: ArrayView3<f32>) -> Array3<f32> {
    let (batch, _, word_size) = memory.dim();
    let heads = read_weights.dim().2;
    let mut vectors = Array3::zeros((batch, word_size, heads));

    Zip::from(vectors.outer_iter_mut())
        .and(memory.outer_iter())
        .and(read_weights.outer_iter())
        .par_for_each(|mut out, memory, weights| out.assign(&memory.t().dot(&weights)));

    vectors
}
