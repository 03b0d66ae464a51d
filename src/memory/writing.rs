use ndarray::{Array2, Array3, ArrayView1, ArrayView2, ArrayView3, Zip};

/// Write weighting `[B,N]`: the write gate scales a blend of allocation and
/// content lookup selected by the allocation gate.
pub fn write_weighting(
    lookup: ArrayView2<f32>,
    allocation: ArrayView2<f32>,
    write_gate: ArrayView1<f32>,
    allocation_gate: ArrayView1<f32>,
) -> Array2<f32> {
    let mut weights = Array2::zeros(lookup.raw_dim());

    Zip::from(weights.outer_iter_mut())
        .and(lookup.outer_iter())
        .and(allocation.outer_iter())
        .and(&write_gate)
        .and(&allocation_gate)
        .par_for_each(|mut out, lookup, allocation, &write, &allocate| {
            Zip::from(&mut out)
                .and(&lookup)
                .and(&allocation)
                .for_each(|out, &looked_up, &allocated| {
                    *out = write * (allocate * allocated + (1.0 - allocate) * looked_up);
                });
        });

    weights
}

/// Erase-then-add update of the memory bank `[B,N,W]`.
///
/// Each word is scaled by `1 - w[i] * erase` and receives `w[i] * write`.
/// With an all-zero write weighting the bank comes back unchanged.
pub fn update_memory(
    memory: ArrayView3<f32>,
    write_weight: ArrayView2<f32>,
    write_vector: ArrayView2<f32>,
    erase_vector: ArrayView2<f32>,
) -> Array3<f32> {
    let mut updated = memory.to_owned();

    Zip::from(updated.outer_iter_mut())
        .and(write_weight.outer_iter())
        .and(write_vector.outer_iter())
        .and(erase_vector.outer_iter())
        .par_for_each(|mut bank, weights, write, erase| {
            for (mut word, &weight) in bank.outer_iter_mut().zip(weights.iter()) {
                Zip::from(&mut word)
                    .and(&write)
                    .and(&erase)
                    .for_each(|cell, &add, &remove| {
                        *cell = *cell * (1.0 - weight * remove) + weight * add;
                    });
            }
        });

    updated
}
