use dnc_memory::memory::addressing::content_weighting;
use dnc_memory::memory::allocation::{allocation_weighting, update_usage};
use dnc_memory::memory::writing::update_memory;
use dnc_memory::{MemoryConfig, MemoryEngine, ReadInterface, WriteInterface};
use ndarray::{Array, Array2, Axis, Dimension, ShapeBuilder};
use proptest::prelude::*;
use proptest::test_runner::Config as ProptestConfig;

/// Hands out values from a generated pool, wrapping around when exhausted.
struct Feed {
    values: Vec<f32>,
    next: usize,
}

impl Feed {
    fn new(values: Vec<f32>) -> Self {
        Self { values, next: 0 }
    }

    fn take(&mut self) -> f32 {
        let value = self.values[self.next % self.values.len()];
        self.next += 1;
        value
    }

    fn array<Sh: ShapeBuilder>(&mut self, shape: Sh) -> Array<f32, Sh::Dim>
    where
        Sh::Dim: Dimension,
    {
        Array::from_shape_fn(shape, |_| self.take())
    }
}

fn arb_config() -> impl Strategy<Value = MemoryConfig> {
    (1usize..=6, 1usize..=4, 1usize..=3, 1usize..=2)
        .prop_map(|(slots, word, heads, batch)| MemoryConfig::new(slots, word, heads, batch))
}

fn arb_unit_pool() -> impl Strategy<Value = Vec<f32>> {
    prop::collection::vec(
        prop_oneof![Just(0.0f32), Just(1.0f32), 0.0f32..=1.0],
        1..64,
    )
}

fn arb_usage() -> impl Strategy<Value = Array2<f32>> {
    (1usize..=3, 1usize..=12).prop_flat_map(|(batch, slots)| {
        prop::collection::vec(
            prop_oneof![Just(0.0f32), Just(1.0f32), 0.0f32..=1.0],
            batch * slots,
        )
        .prop_map(move |values| Array2::from_shape_vec((batch, slots), values).unwrap())
    })
}

/// Random write interface with gates in `[0,1]`
fn write_interface(config: &MemoryConfig, unit: &mut Feed, signed: &mut Feed) -> WriteInterface {
    WriteInterface {
        key: signed.array(config.word_shape()),
        strength: unit.array(config.batch_size).mapv(|s| s * 10.0),
        free_gates: unit.array(config.head_shape()),
        allocation_gate: unit.array(config.batch_size),
        write_gate: unit.array(config.batch_size),
        write_vector: signed.array(config.word_shape()),
        erase_vector: unit.array(config.word_shape()),
    }
}

/// Random read interface whose modes are normalized per head
fn read_interface(config: &MemoryConfig, unit: &mut Feed, signed: &mut Feed) -> ReadInterface {
    let mut read_modes = unit
        .array((config.batch_size, 3, config.read_heads))
        .mapv(|m| m + 1e-3);
    let totals = read_modes.sum_axis(Axis(1)).insert_axis(Axis(1));
    read_modes /= &totals;

    ReadInterface {
        keys: signed.array(config.read_vector_shape()),
        strengths: unit.array(config.head_shape()).mapv(|s| s * 10.0),
        read_modes,
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn allocation_is_a_sub_distribution(usage in arb_usage()) {
        let allocation = allocation_weighting(usage.view());

        for (weights, used) in allocation.outer_iter().zip(usage.outer_iter()) {
            prop_assert!(weights.iter().all(|&w| w.is_finite() && w >= 0.0));
            prop_assert!(weights.sum() <= 1.0 + 1e-5);
            for (&w, &u) in weights.iter().zip(used.iter()) {
                if u == 1.0 {
                    prop_assert_eq!(w, 0.0);
                }
            }
        }
    }

    #[test]
    fn usage_stays_in_unit_interval(
        config in arb_config(),
        pool in arb_unit_pool(),
    ) {
        let mut unit = Feed::new(pool);
        let usage = unit.array(config.slot_shape());
        let read_weights = unit.array(config.read_weight_shape());
        let write_weight = unit.array(config.slot_shape());
        let free_gates = unit.array(config.head_shape());

        let updated = update_usage(
            usage.view(),
            read_weights.view(),
            write_weight.view(),
            free_gates.view(),
        );
        prop_assert!(updated.iter().all(|&u| (0.0f32..=1.0 + 1e-6).contains(&u)));
    }

    #[test]
    fn content_weights_are_distributions(
        config in arb_config(),
        pool in prop::collection::vec(-1.0f32..=1.0, 1..64),
        strengths in prop::collection::vec(0.0f32..=20.0, 1..8),
    ) {
        let mut signed = Feed::new(pool);
        let mut strength = Feed::new(strengths);
        let memory = signed.array(config.memory_shape());
        let keys = signed.array(config.read_vector_shape());
        let strengths = strength.array(config.head_shape());

        let weights = content_weighting(memory.view(), keys.view(), strengths.view());
        for column in weights.lanes(Axis(1)) {
            prop_assert!(column.iter().all(|&w| w.is_finite() && w >= 0.0));
            prop_assert!((column.sum() - 1.0).abs() < 1e-5);
        }
    }

    #[test]
    fn zero_write_weight_is_a_no_op(
        config in arb_config(),
        pool in prop::collection::vec(-5.0f32..=5.0, 1..64),
    ) {
        let mut signed = Feed::new(pool);
        let memory = signed.array(config.memory_shape());
        let write_vector = signed.array(config.word_shape());
        let erase_vector = signed.array(config.word_shape()).mapv(f32::abs);
        let write_weight = Array2::zeros(config.slot_shape());

        let updated = update_memory(
            memory.view(),
            write_weight.view(),
            write_vector.view(),
            erase_vector.view(),
        );
        prop_assert_eq!(updated, memory);
    }

    #[test]
    fn temporal_state_stays_bounded(
        config in arb_config(),
        unit_pool in arb_unit_pool(),
        signed_pool in prop::collection::vec(-1.0f32..=1.0, 1..64),
        steps in 1usize..6,
    ) {
        let engine = MemoryEngine::new(config).unwrap();
        let mut unit = Feed::new(unit_pool);
        let mut signed = Feed::new(signed_pool);
        let mut state = engine.init_state();

        for _ in 0..steps {
            let write = write_interface(&config, &mut unit, &mut signed);
            let read = read_interface(&config, &mut unit, &mut signed);
            state = engine.write(&state, &write).unwrap();

            for link in state.link.outer_iter() {
                prop_assert!(link.diag().iter().all(|&d| d == 0.0));
            }
            prop_assert!(state.link.iter().all(|&l| (-1e-5f32..=1.0 + 1e-5).contains(&l)));
            for precedence in state.precedence.outer_iter() {
                prop_assert!(precedence.iter().all(|&p| p >= -1e-5));
                prop_assert!(precedence.sum() <= 1.0 + 1e-5);
            }
            prop_assert!(state.usage.iter().all(|&u| (-1e-5f32..=1.0 + 1e-5).contains(&u)));

            state = engine.read(&state, &read).unwrap();
            prop_assert!(state.read_vectors.iter().all(|v| v.is_finite()));
        }
    }
}
