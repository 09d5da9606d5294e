//! # varpath: A/B Experiment Assignment Codec
//!
//! varpath assigns each visitor to one variant of several independent A/B
//! experiments and represents that assignment as an opaque ASCII string
//! short enough to live in a URL path segment and a cookie value.
//!
//! ## Building Blocks
//!
//! - **Schema registry** ([`schema`]): the ordered experiment → parameter →
//!   candidate-value vocabulary everything else indexes into positionally.
//! - **Identity hasher** ([`fingerprint`]): stable FNV-1a 32-bit fingerprint
//!   of the schema's canonical JSON, used to version cookie names so stale
//!   encodings are never read back.
//! - **Assignment codec** ([`codec`]): bijective delimited encoding of an
//!   assignment, with full validating decode.
//! - **Rule codec** ([`codec::RuleCodec`]): best-effort positional vector of
//!   backend rule identifiers.
//! - **Variation enumerator** ([`variations`]): bounded cartesian-product
//!   enumeration of every reachable encoded assignment, for static route
//!   pre-generation.
//! - **Boundary plumbing**: cookie naming ([`cookies`]), visitor identity
//!   ([`identity`]), and the async backend interface ([`provider`]).
//!
//! ## Example
//!
//! ```rust
//! use varpath::codec::AssignmentCodec;
//! use varpath::schema::{ExperimentDef, Schema};
//! use varpath::variations::VariationEnumerator;
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
//! // Pre-generate every reachable route.
//! let routes = VariationEnumerator::new(&schema)?.encode_all()?;
//! assert_eq!(routes.len(), 4);
//!
//! // Round-trip a visitor's assignment.
//! let codec = AssignmentCodec::new(&schema)?;
//! let mut assignment = schema.defaults();
//! assignment["image"]["image_url"] = "tshirtgroup".into();
//! let encoded = codec.encode(&assignment)?;
//! assert_eq!(codec.decode(&encoded)?, assignment);
//! # Ok::<(), varpath::Error>(())
//! ```
//!
//! All codec and enumerator operations are synchronous, pure computations
//! over the read-only schema; they are safe to call concurrently from
//! request handlers without locking.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

pub mod codec;
pub mod cookies;
pub mod error;
pub mod fingerprint;
pub mod identity;
pub mod provider;
pub mod schema;
pub mod variations;

pub use error::{Error, Result};
