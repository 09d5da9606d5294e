//! Rule Codec - positional encoding of backend rule identifiers
//!
//! Rule identifiers are opaque tags from the experimentation backend
//! explaining why an assignment was produced (targeted rule, default
//! allocation, holdout). They ride alongside the assignment cookie in a
//! parallel positional vector: one slot per schema experiment, joined with
//! `,`. The codec is advisory and best-effort by design - malformed input
//! degrades to partial or empty output, never an error.

use rustc_hash::FxHashMap;

use crate::schema::Schema;

/// Joins rule segments.
pub const RULE_DELIMITER: char = ',';

/// Rule identifier recorded when the backend supplied no targeted rule.
pub const ALLOCATION_RULE: &str = "allocation";

/// Encodes and decodes rule vectors against a schema's experiment order.
#[derive(Debug, Clone, Copy)]
pub struct RuleCodec<'a> {
    schema: &'a Schema,
}

impl<'a> RuleCodec<'a> {
    /// Create a rule codec over a schema.
    #[must_use]
    pub const fn new(schema: &'a Schema) -> Self {
        Self { schema }
    }

    /// Encode a rule map into its positional string form.
    ///
    /// Each rule lands at its experiment's schema position; names the schema
    /// does not declare are ignored; unoccupied positions encode as empty
    /// segments. The segment count always equals the schema's experiment
    /// count.
    #[must_use]
    pub fn encode(&self, rules_by_name: &FxHashMap<String, String>) -> String {
        let mut slots = vec![String::new(); self.schema.len()];
        for (name, rule) in rules_by_name {
            if let Some(index) = self.schema.experiment_index(name) {
                slots[index].clone_from(rule);
            }
        }
        slots.join(&RULE_DELIMITER.to_string())
    }

    /// Decode a positional rule string back into a rule map.
    ///
    /// Segments are zipped with the schema's experiment names; segments
    /// beyond the schema's experiment count are dropped. Empty segments
    /// decode to empty rule identifiers.
    #[must_use]
    pub fn decode(&self, rules: &str) -> FxHashMap<String, String> {
        let mut decoded = FxHashMap::default();
        for (segment, name) in rules.split(RULE_DELIMITER).zip(self.schema.experiment_names()) {
            decoded.insert(name.to_string(), segment.to_string());
        }
        decoded
    }
}

/// The default rule vector: every schema experiment mapped to
/// [`ALLOCATION_RULE`]. Used whenever the backend could not be consulted.
#[must_use]
pub fn default_rules(schema: &Schema) -> FxHashMap<String, String> {
    schema
        .experiment_names()
        .map(|name| (name.to_string(), ALLOCATION_RULE.to_string()))
        .collect()
}
