//! Property-based tests for the codec, enumerator, and fingerprint
//!
//! Synthetic schemas with distinct candidate values drive the round-trip
//! laws; run with `ProptestConfig::with_cases(100)`.

use proptest::prelude::*;
use rustc_hash::FxHashMap;
use varpath::codec::{AssignmentCodec, RuleCodec};
use varpath::fingerprint::fingerprint;
use varpath::schema::{Assignment, ExperimentDef, ParamAssignment, Schema};
use varpath::variations::VariationEnumerator;

// ============================================================================
// Generators
// ============================================================================

/// Schema shape: candidate count per (experiment, parameter).
fn arb_shape() -> impl Strategy<Value = Vec<Vec<usize>>> {
    prop::collection::vec(prop::collection::vec(1usize..=4, 1..=3), 1..=3)
}

/// A shape plus one seed per (experiment, parameter); a seed modulo the
/// candidate count picks the chosen value index.
fn arb_shape_and_seeds() -> impl Strategy<Value = (Vec<Vec<usize>>, Vec<usize>)> {
    arb_shape().prop_flat_map(|shape| {
        let total: usize = shape.iter().map(Vec::len).sum();
        let seeds = prop::collection::vec(any::<usize>(), total);
        (Just(shape), seeds)
    })
}

/// A shape, seeds, and a per-parameter inclusion mask for sparse
/// assignments.
fn arb_sparse_case() -> impl Strategy<Value = (Vec<Vec<usize>>, Vec<usize>, Vec<bool>)> {
    arb_shape().prop_flat_map(|shape| {
        let total: usize = shape.iter().map(Vec::len).sum();
        let seeds = prop::collection::vec(any::<usize>(), total);
        let mask = prop::collection::vec(any::<bool>(), total);
        (Just(shape), seeds, mask)
    })
}

fn build_schema(shape: &[Vec<usize>]) -> Schema {
    let mut builder = Schema::builder();
    for (e, params) in shape.iter().enumerate() {
        let mut def = ExperimentDef::new();
        for (p, &candidates) in params.iter().enumerate() {
            def = def.param(
                format!("param{p}"),
                (0..candidates).map(|v| format!("value{v}")),
            );
        }
        builder = builder.experiment(format!("exp{e}"), def);
    }
    builder.build()
}

/// Build an assignment choosing `seeds[k] % candidates` for every parameter
/// the mask includes. Experiments whose mask excludes every parameter are
/// omitted.
fn build_assignment(
    schema: &Schema,
    shape: &[Vec<usize>],
    seeds: &[usize],
    mask: Option<&[bool]>,
) -> Assignment {
    let mut assignment = Assignment::new();
    let mut k = 0;
    for (e, params) in shape.iter().enumerate() {
        let (experiment, def) = schema.experiment_at(e).expect("shape matches schema");
        let mut chosen = ParamAssignment::new();
        for (p, &candidates) in params.iter().enumerate() {
            let included = mask.map_or(true, |m| m[k]);
            let value_index = seeds[k] % candidates;
            k += 1;
            if !included {
                continue;
            }
            let (parameter, values) = def.param_at(p).expect("shape matches schema");
            chosen.insert(parameter.to_string(), values[value_index].clone());
        }
        if !chosen.is_empty() {
            assignment.insert(experiment.to_string(), chosen);
        }
    }
    assignment
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Property: decode inverts encode for full assignments, and re-encoding
    /// reproduces the string byte-for-byte.
    #[test]
    fn prop_full_assignment_round_trip((shape, seeds) in arb_shape_and_seeds()) {
        let schema = build_schema(&shape);
        let codec = AssignmentCodec::new(&schema).unwrap();
        let assignment = build_assignment(&schema, &shape, &seeds, None);

        let encoded = codec.encode(&assignment).unwrap();
        let decoded = codec.decode(&encoded).unwrap();
        prop_assert_eq!(&decoded, &assignment);
        prop_assert_eq!(codec.encode(&decoded).unwrap(), encoded);
    }

    /// Property: sparse assignments (any non-empty subset of parameters)
    /// round-trip unchanged.
    #[test]
    fn prop_sparse_assignment_round_trip((shape, seeds, mask) in arb_sparse_case()) {
        let schema = build_schema(&shape);
        let codec = AssignmentCodec::new(&schema).unwrap();
        let assignment = build_assignment(&schema, &shape, &seeds, Some(&mask));
        prop_assume!(!assignment.is_empty());

        let encoded = codec.encode(&assignment).unwrap();
        let decoded = codec.decode(&encoded).unwrap();
        prop_assert_eq!(decoded, assignment);
    }

    /// Property: the enumerator yields exactly min(cap, total combinations)
    /// routes, each of which re-encodes to itself.
    #[test]
    fn prop_enumerator_length_law(
        (shape, _) in arb_shape_and_seeds(),
        cap in 1usize..=40
    ) {
        let schema = build_schema(&shape);
        let routes = VariationEnumerator::new(&schema)
            .unwrap()
            .with_max(cap)
            .encode_all()
            .unwrap();

        prop_assert_eq!(routes.len(), schema.total_combinations().min(cap));

        let codec = AssignmentCodec::new(&schema).unwrap();
        for route in &routes {
            let decoded = codec.decode(route).unwrap();
            prop_assert_eq!(&codec.encode(&decoded).unwrap(), route);
        }
    }

    /// Property: the fingerprint is stable across calls and across clones.
    #[test]
    fn prop_fingerprint_deterministic((shape, _) in arb_shape_and_seeds()) {
        let schema = build_schema(&shape);
        let copy = schema.clone();
        prop_assert_eq!(fingerprint(&schema).unwrap(), fingerprint(&copy).unwrap());
    }

    /// Property: every originally-present (experiment, rule) pair survives a
    /// rule-vector round trip.
    #[test]
    fn prop_rule_round_trip(
        (shape, _) in arb_shape_and_seeds(),
        rules in prop::collection::vec("[A-Za-z0-9_]{1,8}", 0..4)
    ) {
        let schema = build_schema(&shape);
        let codec = RuleCodec::new(&schema);

        let mut rules_by_name = FxHashMap::default();
        for (i, rule) in rules.iter().enumerate().take(schema.len()) {
            let (experiment, _) = schema.experiment_at(i).unwrap();
            rules_by_name.insert(experiment.to_string(), rule.clone());
        }

        let decoded = codec.decode(&codec.encode(&rules_by_name));
        for (experiment, rule) in &rules_by_name {
            prop_assert_eq!(decoded.get(experiment), Some(rule));
        }
    }
}
