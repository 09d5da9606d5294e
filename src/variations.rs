//! Variation Enumerator - bounded enumeration of the reachable assignment space
//!
//! Static route pre-generation needs the set of every encoded assignment a
//! visitor could be served. The enumerator walks the cartesian product of
//! all `(experiment, parameter, value-index)` choices in schema order,
//! truncated at a caller-supplied cap (default 100) so a combinatorially
//! large schema cannot blow up build cost - truncation is a policy choice,
//! not a defect. Each retained combination is materialized over the schema
//! defaults and fed through the assignment codec.
//!
//! ```rust
//! use varpath::schema::{ExperimentDef, Schema};
//! use varpath::variations::VariationEnumerator;
//!
//! let schema = Schema::builder()
//!     .experiment("a", ExperimentDef::new().param("x", ["1", "2"]))
//!     .experiment("b", ExperimentDef::new().param("y", ["p", "q", "r"]))
//!     .build();
//!
//! let routes = VariationEnumerator::new(&schema)?.encode_all()?;
//! assert_eq!(routes.len(), 6); // 2 x 3 combinations, under the cap
//! # Ok::<(), varpath::Error>(())
//! ```

use tracing::warn;

use crate::codec::AssignmentCodec;
use crate::error::Result;
use crate::schema::{Assignment, Schema};

/// Default cap on generated variations.
pub const DEFAULT_MAX_VARIATIONS: usize = 100;

/// Pull-based cartesian product over a list of choice sequences.
///
/// Yields one selection per input sequence, driven by an odometer over index
/// counters; the first sequence varies fastest. The order is deterministic
/// but not contractual. An empty input list, or any empty sequence, yields
/// nothing.
#[derive(Debug, Clone)]
pub struct CartesianProduct<T> {
    dims: Vec<Vec<T>>,
    indices: Vec<usize>,
    exhausted: bool,
}

impl<T: Clone> CartesianProduct<T> {
    /// Create the product sequence over `dims`.
    #[must_use]
    pub fn new(dims: Vec<Vec<T>>) -> Self {
        let exhausted = dims.is_empty() || dims.iter().any(Vec::is_empty);
        Self {
            indices: vec![0; dims.len()],
            dims,
            exhausted,
        }
    }

    /// Rewind to the first combination. The sequence is restartable: after a
    /// reset it replays identically.
    pub fn reset(&mut self) {
        self.indices.iter_mut().for_each(|i| *i = 0);
        self.exhausted = self.dims.is_empty() || self.dims.iter().any(Vec::is_empty);
    }
}

impl<T: Clone> Iterator for CartesianProduct<T> {
    type Item = Vec<T>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.exhausted {
            return None;
        }
        let combination: Vec<T> = self
            .indices
            .iter()
            .zip(&self.dims)
            .map(|(&index, dim)| dim[index].clone())
            .collect();

        // Advance the odometer; carry rolls toward the last dimension.
        for (position, index) in self.indices.iter_mut().enumerate() {
            *index += 1;
            if *index < self.dims[position].len() {
                return Some(combination);
            }
            *index = 0;
        }
        self.exhausted = true;
        Some(combination)
    }
}

impl<T: Clone> std::iter::FusedIterator for CartesianProduct<T> {}

/// One candidate selection: an experiment, one of its parameters, and an
/// index into that parameter's candidate list.
#[derive(Debug, Clone, Copy)]
struct Choice<'a> {
    experiment: &'a str,
    parameter: &'a str,
    value_index: usize,
}

/// Enumerates the bounded set of reachable encoded assignment strings.
#[derive(Debug, Clone, Copy)]
pub struct VariationEnumerator<'a> {
    schema: &'a Schema,
    max_variations: usize,
}

impl<'a> VariationEnumerator<'a> {
    /// Create an enumerator over a schema with the default cap.
    ///
    /// # Errors
    ///
    /// Returns a schema-family error if the registry declares an experiment
    /// with no parameters or a parameter with no candidate values.
    pub fn new(schema: &'a Schema) -> Result<Self> {
        schema.validate()?;
        Ok(Self {
            schema,
            max_variations: DEFAULT_MAX_VARIATIONS,
        })
    }

    /// Override the variation cap.
    #[must_use]
    pub const fn with_max(self, max_variations: usize) -> Self {
        Self {
            schema: self.schema,
            max_variations,
        }
    }

    /// Number of combinations this enumerator will produce:
    /// `min(cap, total combinations)`.
    #[must_use]
    pub fn combination_count(&self) -> usize {
        self.schema.total_combinations().min(self.max_variations)
    }

    /// Enumerate every reachable combination, up to the cap, as encoded
    /// assignment strings in enumeration order. Duplicate strings appear
    /// only if the schema itself declares duplicate candidate values; they
    /// are not deduplicated.
    ///
    /// # Errors
    ///
    /// Returns an encode-family error only if the schema is inconsistent
    /// with itself, which [`Schema::validate`] has already ruled out for
    /// the emptiness cases.
    pub fn encode_all(&self) -> Result<Vec<String>> {
        let codec = AssignmentCodec::new(self.schema)?;

        let dims: Vec<Vec<Choice<'_>>> = self
            .schema
            .experiments()
            .iter()
            .flat_map(|(experiment, def)| {
                def.params().iter().map(move |(parameter, values)| {
                    (0..values.len())
                        .map(|value_index| Choice {
                            experiment,
                            parameter,
                            value_index,
                        })
                        .collect()
                })
            })
            .collect();

        let mut encoded = Vec::with_capacity(self.combination_count());
        for combination in CartesianProduct::new(dims).take(self.max_variations) {
            encoded.push(codec.encode(&self.materialize(&combination))?);
        }
        Ok(encoded)
    }

    /// Build a full assignment from schema defaults, overwriting the
    /// parameters named by the combination.
    fn materialize(&self, combination: &[Choice<'_>]) -> Assignment {
        let mut assignment = self.schema.defaults();
        for choice in combination {
            let Some(value) = self
                .schema
                .experiment(choice.experiment)
                .and_then(|def| def.values(choice.parameter))
                .and_then(|values| values.get(choice.value_index))
            else {
                continue;
            };
            if let Some(slot) = assignment
                .get_mut(choice.experiment)
                .and_then(|chosen| chosen.get_mut(choice.parameter))
            {
                *slot = value.clone();
            }
        }
        assignment
    }
}

/// Resolve the assignment for a request, from an encoded path segment if one
/// is present and decodable, otherwise from schema defaults.
///
/// The result always covers every declared parameter: decoded values overlay
/// the defaults, so a stale encoding whose tolerated-skip tokens left gaps
/// still yields a fully-resolved assignment. Decode failures are logged and
/// absorbed - the visitor is served defaults, never an error.
#[must_use]
pub fn resolve_route_assignment(schema: &Schema, encoded: Option<&str>) -> Assignment {
    let mut resolved = schema.defaults();
    let Some(encoded) = encoded else {
        return resolved;
    };

    let decoded = AssignmentCodec::new(schema).and_then(|codec| codec.decode(encoded));
    match decoded {
        Ok(assignment) => {
            for (experiment, chosen) in assignment {
                let Some(slots) = resolved.get_mut(&experiment) else {
                    continue;
                };
                for (parameter, value) in chosen {
                    if let Some(slot) = slots.get_mut(&parameter) {
                        *slot = value;
                    }
                }
            }
        }
        Err(error) => {
            warn!(%error, "encoded path segment failed to decode, serving default values");
        }
    }
    resolved
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{ExperimentDef, ParamValue};

    fn two_experiment_schema() -> Schema {
        Schema::builder()
            .experiment("a", ExperimentDef::new().param("x", ["1", "2"]))
            .experiment("b", ExperimentDef::new().param("y", ["p", "q", "r"]))
            .build()
    }

    #[test]
    fn test_cartesian_first_dimension_varies_fastest() {
        let product = CartesianProduct::new(vec![vec![1, 2], vec![10, 20]]);
        let combos: Vec<Vec<i32>> = product.collect();
        assert_eq!(
            combos,
            vec![vec![1, 10], vec![2, 10], vec![1, 20], vec![2, 20]]
        );
    }

    #[test]
    fn test_cartesian_is_restartable() {
        let mut product = CartesianProduct::new(vec![vec!['a', 'b'], vec!['x', 'y']]);
        let first_pass: Vec<_> = product.by_ref().collect();
        product.reset();
        let second_pass: Vec<_> = product.collect();
        assert_eq!(first_pass, second_pass);
    }

    #[test]
    fn test_cartesian_empty_inputs_yield_nothing() {
        assert_eq!(CartesianProduct::<i32>::new(vec![]).count(), 0);
        assert_eq!(CartesianProduct::new(vec![vec![1], vec![]]).count(), 0);
    }

    #[test]
    fn test_enumerator_covers_all_combinations_under_cap() {
        let schema = two_experiment_schema();
        let routes = VariationEnumerator::new(&schema)
            .unwrap()
            .with_max(10)
            .encode_all()
            .unwrap();

        assert_eq!(routes.len(), 6);
        // All distinct for a schema without duplicate candidates.
        let unique: std::collections::HashSet<&String> = routes.iter().collect();
        assert_eq!(unique.len(), 6);
    }

    #[test]
    fn test_enumerator_truncates_at_cap() {
        let schema = two_experiment_schema();
        let routes = VariationEnumerator::new(&schema)
            .unwrap()
            .with_max(4)
            .encode_all()
            .unwrap();
        assert_eq!(routes.len(), 4);
    }

    #[test]
    fn test_enumerator_routes_decode_to_full_assignments() {
        let schema = two_experiment_schema();
        let codec = AssignmentCodec::new(&schema).unwrap();
        for route in VariationEnumerator::new(&schema).unwrap().encode_all().unwrap() {
            let assignment = codec.decode(&route).unwrap();
            assert_eq!(assignment.len(), 2);
            assert!(assignment["a"].contains_key("x"));
            assert!(assignment["b"].contains_key("y"));
        }
    }

    #[test]
    fn test_enumerator_rejects_malformed_schema() {
        let schema = Schema::builder()
            .experiment("empty", ExperimentDef::new())
            .build();
        assert!(VariationEnumerator::new(&schema).is_err());
    }

    #[test]
    fn test_resolve_route_assignment_decodes() {
        let schema = two_experiment_schema();
        let resolved = resolve_route_assignment(&schema, Some("0p0v1e1p0v2"));
        assert_eq!(resolved["a"]["x"], ParamValue::from("2"));
        assert_eq!(resolved["b"]["y"], ParamValue::from("r"));
    }

    #[test]
    fn test_resolve_route_assignment_falls_back_to_defaults() {
        let schema = two_experiment_schema();
        let defaults = schema.defaults();

        assert_eq!(resolve_route_assignment(&schema, None), defaults);
        assert_eq!(resolve_route_assignment(&schema, Some("garbage")), defaults);
        assert_eq!(resolve_route_assignment(&schema, Some("9p0v0")), defaults);
    }

    #[test]
    fn test_resolve_route_assignment_fills_gaps_with_defaults() {
        let schema = two_experiment_schema();
        // Only experiment "b" is encoded; "a" must still be present.
        let resolved = resolve_route_assignment(&schema, Some("1p0v1"));
        assert_eq!(resolved["a"]["x"], ParamValue::from("1"));
        assert_eq!(resolved["b"]["y"], ParamValue::from("q"));
    }
}
