//! Assignment Codec - compact positional encoding of assignments
//!
//! An assignment is serialized as one segment per experiment, joined with
//! `e`; a segment is the experiment's schema position followed by one
//! `{param}v{value}` token per parameter, joined with `p`:
//!
//! ```text
//! assignment-string  := experiment-segment ("e" experiment-segment)*
//! experiment-segment := experiment-index ("p" param-token)+
//! param-token        := param-position "v" value-index
//! ```
//!
//! All three positions index into the schema's declared orderings, so the
//! string is only meaningful against the exact schema that issued it; the
//! schema fingerprint embedded in cookie names keeps stale strings out.
//! Parameter tokens always carry the *schema's* declared position of the
//! parameter (resolved by name at encode time), never the input map's
//! iteration index, so hand-built assignments with unusual key order encode
//! correctly.
//!
//! ```rust
//! use varpath::codec::AssignmentCodec;
//! use varpath::schema::{ExperimentDef, Schema};
//!
//! let schema = Schema::builder()
//!     .experiment(
//!         "button_text",
//!         ExperimentDef::new().param("button_text", ["Buy now", "Add to cart"]),
//!     )
//!     .experiment(
//!         "image",
//!         ExperimentDef::new().param("image_url", ["tshirt", "tshirtgroup"]),
//!     )
//!     .build();
//!
//! let codec = AssignmentCodec::new(&schema)?;
//! let mut assignment = schema.defaults();
//! assignment["button_text"]["button_text"] = "Add to cart".into();
//! assignment["image"]["image_url"] = "tshirtgroup".into();
//!
//! assert_eq!(codec.encode(&assignment)?, "0p0v1e1p0v1");
//! assert_eq!(codec.decode("0p0v1e1p0v1")?, assignment);
//! # Ok::<(), varpath::Error>(())
//! ```

mod rules;

pub use rules::{default_rules, RuleCodec, ALLOCATION_RULE};

use tracing::debug;

use crate::error::{Error, Result};
use crate::schema::{Assignment, ParamAssignment, Schema};

/// Joins experiment segments.
pub const EXPERIMENT_DELIMITER: char = 'e';
/// Joins the experiment index and its parameter tokens.
pub const PARAMETER_DELIMITER: char = 'p';
/// Separates a token's parameter position from its value index.
pub const VALUE_DELIMITER: char = 'v';

/// Encodes assignments into delimited strings and decodes them back,
/// validating every index against the schema it was constructed with.
#[derive(Debug, Clone, Copy)]
pub struct AssignmentCodec<'a> {
    schema: &'a Schema,
}

impl<'a> AssignmentCodec<'a> {
    /// Create a codec over a schema.
    ///
    /// # Errors
    ///
    /// Returns a schema-family error if the registry declares an experiment
    /// with no parameters or a parameter with no candidate values.
    pub fn new(schema: &'a Schema) -> Result<Self> {
        schema.validate()?;
        Ok(Self { schema })
    }

    /// Encode an assignment into its compact string form.
    ///
    /// Experiments are emitted in the assignment's iteration order;
    /// parameter tokens carry the schema's declared position of each
    /// parameter. Re-encoding a decoded assignment reproduces the original
    /// string byte-for-byte.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownExperiment`], [`Error::EmptyParameterSet`],
    /// [`Error::UnknownParameter`], or [`Error::UnknownValue`] when the
    /// assignment is inconsistent with the schema.
    pub fn encode(&self, assignment: &Assignment) -> Result<String> {
        let mut segments = Vec::with_capacity(assignment.len());

        for (experiment, chosen) in assignment {
            let (exp_index, def) = self
                .schema
                .experiment_full(experiment)
                .ok_or_else(|| Error::UnknownExperiment(experiment.clone()))?;
            if chosen.is_empty() {
                return Err(Error::EmptyParameterSet(experiment.clone()));
            }

            let mut segment = exp_index.to_string();
            for (parameter, value) in chosen {
                let Some((param_index, _, candidates)) = def.params().get_full(parameter) else {
                    return Err(Error::UnknownParameter {
                        experiment: experiment.clone(),
                        parameter: parameter.clone(),
                    });
                };
                let value_index = candidates
                    .iter()
                    .position(|candidate| candidate == value)
                    .ok_or_else(|| Error::UnknownValue {
                        experiment: experiment.clone(),
                        parameter: parameter.clone(),
                        value: value.to_json(),
                    })?;
                segment.push(PARAMETER_DELIMITER);
                segment.push_str(&format!("{param_index}{VALUE_DELIMITER}{value_index}"));
            }
            segments.push(segment);
        }

        Ok(segments.join(&EXPERIMENT_DELIMITER.to_string()))
    }

    /// Decode an encoded string back into a typed assignment.
    ///
    /// Parameter positions beyond the schema's declared parameter count are
    /// skipped without error: a newer schema revision may encode parameters
    /// this schema view does not know about. An experiment position beyond
    /// the schema's experiment count is a hard error.
    ///
    /// # Errors
    ///
    /// Returns a decode-family error ([`Error::EmptyInput`],
    /// [`Error::InvalidSegment`], [`Error::InvalidIndex`],
    /// [`Error::MissingParameterIndex`], [`Error::MissingValueIndex`],
    /// [`Error::UnknownExperimentIndex`], [`Error::UnknownValueIndex`]) for
    /// malformed or stale input. Callers at the request boundary should
    /// treat these as recoverable and fall back to [`Schema::defaults`].
    pub fn decode(&self, encoded: &str) -> Result<Assignment> {
        if encoded.is_empty() {
            return Err(Error::EmptyInput);
        }

        let segments: Vec<&str> = encoded.split(EXPERIMENT_DELIMITER).collect();
        if segments.is_empty() {
            return Err(Error::NoExperiments);
        }

        let mut assignment = Assignment::new();
        for segment in segments {
            let (experiment, chosen) = self.decode_segment(segment)?;
            assignment.insert(experiment, chosen);
        }
        Ok(assignment)
    }

    fn decode_segment(&self, segment: &str) -> Result<(String, ParamAssignment)> {
        let tokens: Vec<&str> = segment.split(PARAMETER_DELIMITER).collect();
        if tokens.len() < 2 {
            return Err(Error::InvalidSegment(segment.to_string()));
        }

        let exp_index = parse_index(tokens[0])?;
        let Some((experiment, def)) = self.schema.experiment_at(exp_index) else {
            return Err(Error::UnknownExperimentIndex(exp_index));
        };

        let mut chosen = ParamAssignment::new();
        for token in &tokens[1..] {
            let (param_part, value_part) = split_token(token, experiment)?;
            let param_index = parse_index(param_part)?;
            let value_index = parse_index(value_part)?;

            let Some((parameter, candidates)) = def.param_at(param_index) else {
                // Encoded against a newer schema revision that declares more
                // parameters than this view; skip rather than reject.
                debug!(
                    experiment,
                    param_index, "skipping parameter token beyond declared parameters"
                );
                continue;
            };
            let Some(value) = candidates.get(value_index) else {
                return Err(Error::UnknownValueIndex {
                    experiment: experiment.to_string(),
                    parameter: parameter.to_string(),
                    index: value_index,
                });
            };
            chosen.insert(parameter.to_string(), value.clone());
        }

        Ok((experiment.to_string(), chosen))
    }
}

fn split_token<'t>(token: &'t str, experiment: &str) -> Result<(&'t str, &'t str)> {
    let mut halves = token.split(VALUE_DELIMITER);
    let param_part = halves.next().unwrap_or_default();
    let value_part = halves.next();

    if param_part.is_empty() {
        return Err(Error::MissingParameterIndex {
            experiment: experiment.to_string(),
        });
    }
    match value_part {
        Some(value_part) if !value_part.is_empty() => Ok((param_part, value_part)),
        _ => Err(Error::MissingValueIndex {
            experiment: experiment.to_string(),
        }),
    }
}

fn parse_index(token: &str) -> Result<usize> {
    token
        .parse::<usize>()
        .map_err(|_| Error::InvalidIndex(token.to_string()))
}
