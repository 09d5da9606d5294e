//! Experimentation backend interface
//!
//! The backend that actually buckets visitors is external; this module
//! models it as an opaque provider of per-experiment values and rule
//! identifiers, plus a resolver that turns provider responses into a full
//! assignment.
//!
//! The partial-failure policy is all-or-defaults: if any fetch fails, the
//! resolver discards partial work and returns the complete schema-default
//! assignment with `allocation` rules, so a half-populated assignment never
//! reaches the codec or the visitor.
//!
//! # Example
//!
//! ```rust,no_run
//! use varpath::provider::{resolve_assignments, ExperimentProvider};
//! use varpath::schema::Schema;
//!
//! # async fn example<P: ExperimentProvider>(provider: P, schema: Schema) {
//! let resolved = resolve_assignments(&provider, &schema, "visitor-1").await;
//! assert_eq!(resolved.assignment.len(), schema.len());
//! # }
//! ```

use std::future::Future;

use rustc_hash::FxHashMap;
use tracing::error;

use crate::codec::default_rules;
use crate::error::Result;
use crate::schema::{Assignment, ParamValue, Schema};

/// One experiment's backend response: effective parameter values plus the
/// rule identifier explaining the bucketing decision.
#[derive(Debug, Clone)]
pub struct ProviderAssignment {
    values: FxHashMap<String, ParamValue>,
    rule_id: String,
}

impl ProviderAssignment {
    /// Create a response carrying only a rule identifier. Chain
    /// [`value`](Self::value) calls to add parameter overrides.
    #[must_use]
    pub fn new(rule_id: impl Into<String>) -> Self {
        Self {
            values: FxHashMap::default(),
            rule_id: rule_id.into(),
        }
    }

    /// Add an effective value for a parameter.
    #[must_use]
    pub fn value(mut self, parameter: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.values.insert(parameter.into(), value.into());
        self
    }

    /// Effective value for a parameter: the backend's override if present,
    /// otherwise the supplied fallback.
    #[must_use]
    pub fn get(&self, parameter: &str, fallback: &ParamValue) -> ParamValue {
        self.values
            .get(parameter)
            .cloned()
            .unwrap_or_else(|| fallback.clone())
    }

    /// The rule identifier for this bucketing decision.
    #[must_use]
    pub fn rule_id(&self) -> &str {
        &self.rule_id
    }
}

/// Opaque experimentation backend.
///
/// `fetch` returns `Ok(None)` when the backend has no assignment for the
/// visitor/experiment pair (the visitor is served defaults for it), and
/// `Err` when the backend could not be consulted at all.
pub trait ExperimentProvider: Send + Sync {
    /// Fetch the backend's assignment for one visitor and experiment.
    fn fetch(
        &self,
        visitor_id: &str,
        experiment: &str,
    ) -> impl Future<Output = Result<Option<ProviderAssignment>>> + Send;
}

/// A fully resolved visitor: one value per declared parameter, plus the rule
/// identifiers for the experiments the backend actually bucketed.
#[derive(Debug, Clone)]
pub struct ResolvedAssignments {
    /// Complete assignment, schema defaults wherever no override applied.
    pub assignment: Assignment,
    /// Rule identifiers keyed by experiment name.
    pub rules: FxHashMap<String, String>,
}

/// Resolve a visitor's assignment across every schema experiment.
///
/// Starts from [`Schema::defaults`] and overlays each backend response onto
/// the experiment's declared parameters; parameters the backend does not
/// mention keep their defaults, and experiments the backend has no
/// assignment for record no rule. Any fetch error triggers the
/// all-or-defaults policy described at the module level.
pub async fn resolve_assignments<P: ExperimentProvider>(
    provider: &P,
    schema: &Schema,
    visitor_id: &str,
) -> ResolvedAssignments {
    let mut assignment = schema.defaults();
    let mut rules = FxHashMap::default();

    for experiment in schema.experiment_names() {
        match provider.fetch(visitor_id, experiment).await {
            Ok(Some(response)) => {
                if let Some(chosen) = assignment.get_mut(experiment) {
                    for (parameter, value) in chosen.iter_mut() {
                        let effective = response.get(parameter, value);
                        *value = effective;
                    }
                }
                rules.insert(experiment.to_string(), response.rule_id().to_string());
            }
            Ok(None) => {}
            Err(err) => {
                error!(
                    error = %err,
                    experiment,
                    "experimentation backend failed, serving default values"
                );
                return ResolvedAssignments {
                    assignment: schema.defaults(),
                    rules: default_rules(schema),
                };
            }
        }
    }

    ResolvedAssignments { assignment, rules }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::ALLOCATION_RULE;
    use crate::error::Error;
    use crate::schema::{ExperimentDef, ParamValue};

    fn schema() -> Schema {
        Schema::builder()
            .experiment(
                "button_text",
                ExperimentDef::new().param("button_text", ["Buy now", "Add to cart"]),
            )
            .experiment(
                "image",
                ExperimentDef::new().param("image_url", ["tshirt", "tshirtgroup"]),
            )
            .build()
    }

    struct StaticProvider {
        responses: FxHashMap<String, ProviderAssignment>,
    }

    impl ExperimentProvider for StaticProvider {
        fn fetch(
            &self,
            _visitor_id: &str,
            experiment: &str,
        ) -> impl Future<Output = Result<Option<ProviderAssignment>>> + Send {
            let response = self.responses.get(experiment).cloned();
            async move { Ok(response) }
        }
    }

    struct FailingProvider;

    impl ExperimentProvider for FailingProvider {
        fn fetch(
            &self,
            _visitor_id: &str,
            _experiment: &str,
        ) -> impl Future<Output = Result<Option<ProviderAssignment>>> + Send {
            async move { Err(Error::Backend("edge config unreachable".into())) }
        }
    }

    #[tokio::test]
    async fn test_resolve_overlays_backend_values() {
        let mut responses = FxHashMap::default();
        responses.insert(
            "button_text".to_string(),
            ProviderAssignment::new("targeting").value("button_text", "Add to cart"),
        );
        let provider = StaticProvider { responses };

        let resolved = resolve_assignments(&provider, &schema(), "visitor-1").await;

        assert_eq!(
            resolved.assignment["button_text"]["button_text"],
            ParamValue::from("Add to cart")
        );
        // No response for "image": defaults, and no rule recorded.
        assert_eq!(
            resolved.assignment["image"]["image_url"],
            ParamValue::from("tshirt")
        );
        assert_eq!(resolved.rules.get("button_text").unwrap(), "targeting");
        assert!(!resolved.rules.contains_key("image"));
    }

    #[tokio::test]
    async fn test_resolve_ignores_undeclared_backend_parameters() {
        let mut responses = FxHashMap::default();
        responses.insert(
            "image".to_string(),
            ProviderAssignment::new("rule-1")
                .value("image_url", "tshirtgroup")
                .value("surprise", "ignored"),
        );
        let provider = StaticProvider { responses };

        let resolved = resolve_assignments(&provider, &schema(), "visitor-2").await;

        assert_eq!(
            resolved.assignment["image"]["image_url"],
            ParamValue::from("tshirtgroup")
        );
        assert_eq!(resolved.assignment["image"].len(), 1);
    }

    #[tokio::test]
    async fn test_resolve_falls_back_entirely_on_backend_failure() {
        let schema = schema();
        let resolved = resolve_assignments(&FailingProvider, &schema, "visitor-3").await;

        assert_eq!(resolved.assignment, schema.defaults());
        assert_eq!(resolved.rules.len(), schema.len());
        assert!(resolved.rules.values().all(|rule| rule == ALLOCATION_RULE));
    }
}
