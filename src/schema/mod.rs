//! Schema Registry - the ordered experiment/parameter/value vocabulary
//!
//! Everything else in the crate indexes into this structure positionally:
//! experiment order, parameter order within an experiment, and value order
//! within a parameter are the only means the compact encoding has of
//! referring to them. Reordering or renaming entries therefore invalidates
//! every previously issued encoding; the schema [`fingerprint`] embedded in
//! cookie names makes that staleness detectable.
//!
//! The registry is immutable process-wide configuration: build it once at
//! startup (from JSON or via [`Schema::builder`]) and hand shared references
//! to the codecs and the enumerator. All operations on it are read-only, so
//! it is safe to use from concurrent request handlers without locking.
//!
//! ```rust
//! use varpath::schema::Schema;
//!
//! let schema = Schema::from_json(
//!     r#"{
//!         "button_text": { "params": { "button_text": ["Buy now", "Add to cart"] } },
//!         "image":       { "params": { "image_url": ["tshirt", "tshirtgroup"] } }
//!     }"#,
//! )?;
//! assert_eq!(schema.len(), 2);
//! assert_eq!(schema.experiment_index("image"), Some(1));
//! # Ok::<(), varpath::Error>(())
//! ```
//!
//! [`fingerprint`]: crate::fingerprint::fingerprint

mod value;

pub use value::ParamValue;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// One visitor's chosen values for a single experiment, keyed by parameter
/// name in insertion order.
pub type ParamAssignment = IndexMap<String, ParamValue>;

/// One visitor's chosen values across experiments, keyed by experiment name
/// in insertion order.
pub type Assignment = IndexMap<String, ParamAssignment>;

/// Definition of a single experiment: its parameters and their ordered
/// candidate values.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ExperimentDef {
    params: IndexMap<String, Vec<ParamValue>>,
}

impl ExperimentDef {
    /// Create an empty definition. Chain [`param`](Self::param) calls to
    /// populate it.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a parameter with its ordered candidate values.
    #[must_use]
    pub fn param<I, V>(mut self, name: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<ParamValue>,
    {
        self.params
            .insert(name.into(), values.into_iter().map(Into::into).collect());
        self
    }

    /// The ordered parameter map.
    #[must_use]
    pub const fn params(&self) -> &IndexMap<String, Vec<ParamValue>> {
        &self.params
    }

    /// Number of declared parameters.
    #[must_use]
    pub fn param_count(&self) -> usize {
        self.params.len()
    }

    /// Candidate values for a parameter, by name.
    #[must_use]
    pub fn values(&self, parameter: &str) -> Option<&[ParamValue]> {
        self.params.get(parameter).map(Vec::as_slice)
    }

    /// Positional `(name, candidates)` entry, by declared parameter order.
    #[must_use]
    pub fn param_at(&self, index: usize) -> Option<(&str, &[ParamValue])> {
        self.params
            .get_index(index)
            .map(|(name, values)| (name.as_str(), values.as_slice()))
    }

    /// Declared position of a parameter, by name.
    #[must_use]
    pub fn param_index(&self, parameter: &str) -> Option<usize> {
        self.params.get_index_of(parameter)
    }
}

/// The ordered experiment registry.
///
/// Serializes transparently as the experiment map itself, so the JSON form
/// is the same object shape the registry is authored in (and the same bytes
/// the fingerprint is computed over).
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Schema {
    experiments: IndexMap<String, ExperimentDef>,
}

impl Schema {
    /// Create a builder for assembling a schema in code.
    #[must_use]
    pub fn builder() -> SchemaBuilder {
        SchemaBuilder::default()
    }

    /// Parse a schema from its JSON form.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SchemaParse`] if the input is not a valid schema
    /// document. Emptiness constraints are checked separately by
    /// [`validate`](Self::validate) at the point of use.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| Error::SchemaParse(e.to_string()))
    }

    /// The ordered experiment map.
    #[must_use]
    pub const fn experiments(&self) -> &IndexMap<String, ExperimentDef> {
        &self.experiments
    }

    /// Iterate experiment names in declaration order.
    pub fn experiment_names(&self) -> impl Iterator<Item = &str> {
        self.experiments.keys().map(String::as_str)
    }

    /// Number of declared experiments.
    #[must_use]
    pub fn len(&self) -> usize {
        self.experiments.len()
    }

    /// Whether the registry declares no experiments.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.experiments.is_empty()
    }

    /// Look up an experiment definition by name.
    #[must_use]
    pub fn experiment(&self, name: &str) -> Option<&ExperimentDef> {
        self.experiments.get(name)
    }

    /// Declared position of an experiment, by name.
    #[must_use]
    pub fn experiment_index(&self, name: &str) -> Option<usize> {
        self.experiments.get_index_of(name)
    }

    /// Positional `(name, definition)` entry, by declared experiment order.
    #[must_use]
    pub fn experiment_at(&self, index: usize) -> Option<(&str, &ExperimentDef)> {
        self.experiments
            .get_index(index)
            .map(|(name, def)| (name.as_str(), def))
    }

    /// Look up an experiment's declared position and definition in one step.
    #[must_use]
    pub fn experiment_full(&self, name: &str) -> Option<(usize, &ExperimentDef)> {
        self.experiments.get_full(name).map(|(i, _, def)| (i, def))
    }

    /// Check the emptiness constraints: every experiment has at least one
    /// parameter and every parameter at least one candidate value.
    ///
    /// Codec and enumerator constructors call this, so a malformed registry
    /// fails at the point of use rather than mid-operation.
    ///
    /// # Errors
    ///
    /// Returns [`Error::EmptyParams`] or [`Error::EmptyValues`] naming the
    /// first offending entry.
    pub fn validate(&self) -> Result<()> {
        for (experiment, def) in &self.experiments {
            if def.params.is_empty() {
                return Err(Error::EmptyParams {
                    experiment: experiment.clone(),
                });
            }
            for (parameter, values) in &def.params {
                if values.is_empty() {
                    return Err(Error::EmptyValues {
                        experiment: experiment.clone(),
                        parameter: parameter.clone(),
                    });
                }
            }
        }
        Ok(())
    }

    /// Build the default assignment: the first candidate value of every
    /// parameter, in schema order.
    ///
    /// Parameters with no candidates are skipped; [`validate`](Self::validate)
    /// rejects such schemas before any codec use.
    #[must_use]
    pub fn defaults(&self) -> Assignment {
        let mut assignment = Assignment::with_capacity(self.experiments.len());
        for (experiment, def) in &self.experiments {
            let mut chosen = ParamAssignment::with_capacity(def.params.len());
            for (parameter, values) in &def.params {
                let Some(first) = values.first() else { continue };
                chosen.insert(parameter.clone(), first.clone());
            }
            assignment.insert(experiment.clone(), chosen);
        }
        assignment
    }

    /// Total number of distinct assignments reachable from this schema: the
    /// product over every `(experiment, parameter)` pair of that parameter's
    /// candidate count. Saturates at `usize::MAX`.
    #[must_use]
    pub fn total_combinations(&self) -> usize {
        self.experiments
            .values()
            .flat_map(|def| def.params.values())
            .fold(1usize, |acc, values| acc.saturating_mul(values.len()))
    }

    /// Stable 32-bit fingerprint of the registry's canonical JSON form.
    ///
    /// Changes whenever an experiment name, parameter name, candidate value,
    /// or any of their orderings change.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Fingerprint`] if serialization fails.
    pub fn fingerprint(&self) -> Result<u32> {
        crate::fingerprint::fingerprint(self)
    }
}

/// Builder for [`Schema`].
#[derive(Debug, Default)]
pub struct SchemaBuilder {
    experiments: IndexMap<String, ExperimentDef>,
}

impl SchemaBuilder {
    /// Add an experiment definition. Declaration order is preserved and
    /// becomes the experiment's positional index in encodings.
    #[must_use]
    pub fn experiment(mut self, name: impl Into<String>, def: ExperimentDef) -> Self {
        self.experiments.insert(name.into(), def);
        self
    }

    /// Build the schema.
    #[must_use]
    pub fn build(self) -> Schema {
        Schema {
            experiments: self.experiments,
        }
    }
}
