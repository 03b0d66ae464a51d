//! Usage tracking and the usage-sorted free list that drives allocation.

use ndarray::{Array2, ArrayView1, ArrayView2, ArrayView3, ArrayViewMut1, Zip};
use tracing::trace;

/// Updated usage `[B,N]`.
///
/// Writes raise usage; a slot read by a head whose free gate is open is
/// released in proportion to that head's read weight on it.
pub fn update_usage(
    usage: ArrayView2<f32>,
    read_weights: ArrayView3<f32>,
    write_weight: ArrayView2<f32>,
    free_gates: ArrayView2<f32>,
) -> Array2<f32> {
    let mut updated = Array2::zeros(usage.raw_dim());

    Zip::from(updated.outer_iter_mut())
        .and(usage.outer_iter())
        .and(read_weights.outer_iter())
        .and(write_weight.outer_iter())
        .and(free_gates.outer_iter())
        .par_for_each(|mut updated, usage, reads, writes, gates| {
            Zip::from(&mut updated)
                .and(&usage)
                .and(&writes)
                .and(reads.outer_iter())
                .for_each(|out, &used, &written, slot_reads| {
                    let retention: f32 = slot_reads
                        .iter()
                        .zip(gates.iter())
                        .map(|(&read, &gate)| 1.0 - read * gate)
                        .product();
                    *out = (used + written - used * written) * retention;
                });
        });

    updated
}

/// Slot indices ordered by ascending usage. Ties keep slot order.
pub fn free_list(usage: ArrayView1<f32>) -> Vec<usize> {
    let mut slots: Vec<usize> = (0..usage.len()).collect();
    slots.sort_by(|&a, &b| usage[a].total_cmp(&usage[b]));
    slots
}

/// Allocation weighting for one batch row, written into `out`.
///
/// Walks the free list keeping the exclusive cumulative product of the usages
/// already visited, and scatters each weight back to its slot.
fn allocate_row(usage: ArrayView1<f32>, mut out: ArrayViewMut1<f32>) {
    let mut unclaimed = 1.0f32;
    for slot in free_list(usage) {
        let used = usage[slot];
        out[slot] = (1.0 - used) * unclaimed;
        unclaimed *= used;
    }
}

/// Allocation weighting `[B,N]` favouring the least used slots.
pub fn allocation_weighting(usage: ArrayView2<f32>) -> Array2<f32> {
    let mut allocation = Array2::zeros(usage.raw_dim());

    Zip::from(allocation.outer_iter_mut())
        .and(usage.outer_iter())
        .par_for_each(|out, usage| allocate_row(usage, out));

    if tracing::enabled!(tracing::Level::TRACE) {
        for (row, weights) in allocation.outer_iter().enumerate() {
            let total = weights.sum();
            if total < 1e-6 {
                trace!(row, total, "memory saturated, no slot left to allocate");
            }
        }
    }

    allocation
}
