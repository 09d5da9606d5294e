//! Error types for varpath
//!
//! Variants cover the three failure families of the engine: malformed schema
//! registries, assignments inconsistent with the schema (encode), and
//! malformed or stale encoded strings (decode). Decode-family errors are
//! recoverable at the boundary: callers fall back to schema defaults rather
//! than surfacing them to the visitor.

use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// varpath error types
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Schema registry could not be parsed from JSON
    #[error("schema parse error: {0}")]
    SchemaParse(String),

    /// Experiment declared with an empty parameter map
    #[error("experiment '{experiment}' declares no parameters")]
    EmptyParams {
        /// Offending experiment name
        experiment: String,
    },

    /// Parameter declared with an empty candidate-value list
    #[error("parameter '{parameter}' of experiment '{experiment}' declares no candidate values")]
    EmptyValues {
        /// Experiment name
        experiment: String,
        /// Offending parameter name
        parameter: String,
    },

    /// Assignment names an experiment absent from the schema
    #[error("experiment '{0}' is not defined in the schema")]
    UnknownExperiment(String),

    /// Assignment carries an experiment with no parameter entries
    #[error("no parameters were provided for experiment '{0}'")]
    EmptyParameterSet(String),

    /// Assignment names a parameter absent from its experiment definition
    #[error("parameter '{parameter}' does not exist for experiment '{experiment}'")]
    UnknownParameter {
        /// Experiment name
        experiment: String,
        /// Offending parameter name
        parameter: String,
    },

    /// Assigned value is not in the parameter's candidate list
    #[error(
        "value {value} for parameter '{parameter}' of experiment '{experiment}' is not a declared candidate"
    )]
    UnknownValue {
        /// Experiment name
        experiment: String,
        /// Parameter name
        parameter: String,
        /// Rejected value, rendered as JSON
        value: String,
    },

    /// Encoded assignment string is empty
    #[error("encoded assignment string is empty")]
    EmptyInput,

    /// Encoded assignment string contains no experiment segments
    #[error("no experiments are encoded")]
    NoExperiments,

    /// Experiment segment lacks the mandatory index + parameter tokens
    #[error("invalid experiment segment '{0}'")]
    InvalidSegment(String),

    /// Positional token is not a non-negative base-10 integer
    #[error("invalid index '{0}'")]
    InvalidIndex(String),

    /// Parameter token has no parameter-position half
    #[error("no parameter index was provided for experiment '{experiment}'")]
    MissingParameterIndex {
        /// Experiment name resolved from the segment
        experiment: String,
    },

    /// Parameter token has no value-index half
    #[error("no value index was provided for experiment '{experiment}'")]
    MissingValueIndex {
        /// Experiment name resolved from the segment
        experiment: String,
    },

    /// Experiment index is beyond the schema's experiment count
    #[error("experiment index {0} is out of range for the schema")]
    UnknownExperimentIndex(usize),

    /// Value index is beyond the parameter's candidate count
    #[error(
        "value index {index} for parameter '{parameter}' of experiment '{experiment}' does not exist"
    )]
    UnknownValueIndex {
        /// Experiment name
        experiment: String,
        /// Parameter name resolved from the token position
        parameter: String,
        /// Out-of-range candidate index
        index: usize,
    },

    /// Fingerprint input could not be serialized
    #[error("fingerprint serialization failed: {0}")]
    Fingerprint(String),

    /// Experimentation backend call failed
    #[error("experimentation backend error: {0}")]
    Backend(String),
}

impl Error {
    /// Whether this error came from decoding a malformed or stale encoded
    /// string, in which case the recommended caller policy is to fall back
    /// to schema defaults instead of propagating.
    #[must_use]
    pub const fn is_decode_error(&self) -> bool {
        matches!(
            self,
            Self::EmptyInput
                | Self::NoExperiments
                | Self::InvalidSegment(_)
                | Self::InvalidIndex(_)
                | Self::MissingParameterIndex { .. }
                | Self::MissingValueIndex { .. }
                | Self::UnknownExperimentIndex(_)
                | Self::UnknownValueIndex { .. }
        )
    }
}
