//! Temporal links: the precedence vector and link matrix that record write
//! order, and the forward/backward traversal of that order.

use ndarray::{Array2, Array3, ArrayView2, ArrayView3, Zip};

/// Precedence `[B,N]`: decays by the total amount just written, then takes
/// on the new write weighting.
pub fn update_precedence(
    precedence: ArrayView2<f32>,
    write_weight: ArrayView2<f32>,
) -> Array2<f32> {
    let mut updated = Array2::zeros(precedence.raw_dim());

    Zip::from(updated.outer_iter_mut())
        .and(precedence.outer_iter())
        .and(write_weight.outer_iter())
        .par_for_each(|mut out, precedence, writes| {
            let reset = 1.0 - writes.sum();
            Zip::from(&mut out)
                .and(&precedence)
                .and(&writes)
                .for_each(|out, &prev, &written| *out = reset * prev + written);
        });

    updated
}

/// Link matrix `[B,N,N]` where `link[b, i, j]` approximates "slot `i` was
/// written right after slot `j`". Uses the precedence from *before* this write.
///
/// The diagonal is always exactly zero.
pub fn update_link(
    precedence: ArrayView2<f32>,
    link: ArrayView3<f32>,
    write_weight: ArrayView2<f32>,
) -> Array3<f32> {
    let mut updated = Array3::zeros(link.raw_dim());

    Zip::from(updated.outer_iter_mut())
        .and(link.outer_iter())
        .and(precedence.outer_iter())
        .and(write_weight.outer_iter())
        .par_for_each(|mut out, link, precedence, writes| {
            Zip::indexed(&mut out)
                .and(&link)
                .for_each(|(i, j), out, &prev| {
                    *out = if i == j {
                        0.0
                    } else {
                        (1.0 - (writes[i] + writes[j])) * prev + writes[i] * precedence[j]
                    };
                });
        });

    updated
}

/// Forward and backward weightings `[B,N,R]` obtained by pushing the previous
/// read weights through the link matrix and its transpose.
pub fn directional_weights(
    read_weights: ArrayView3<f32>,
    link: ArrayView3<f32>,
) -> (Array3<f32>, Array3<f32>) {
    let mut forward = Array3::zeros(read_weights.raw_dim());
    let mut backward = Array3::zeros(read_weights.raw_dim());

    Zip::from(forward.outer_iter_mut())
        .and(backward.outer_iter_mut())
        .and(read_weights.outer_iter())
        .and(link.outer_iter())
        .par_for_each(|mut forward, mut backward, reads, link| {
            forward.assign(&link.dot(&reads));
            backward.assign(&link.t().dot(&reads));
        });

    (forward, backward)
}
