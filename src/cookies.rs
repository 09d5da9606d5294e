//! Cookie naming and lifetimes
//!
//! The assignment and rule cookies carry the schema fingerprint in their
//! names: when the registry changes, the cookie name changes with it, so
//! encodings issued against an older vocabulary are simply never read back.
//! The identity cookie is versioned by an explicit format constant instead,
//! bumped whenever the visitor-ID format changes.

use chrono::Duration;

use crate::error::Result;
use crate::schema::Schema;

/// Prefix shared by every cookie this engine issues.
pub const COOKIE_PREFIX: &str = "ab";

/// Version of the visitor-ID format; bump to rotate identity cookies.
pub const IDENTITY_VERSION: u32 = 1;

/// Cookie holding a manual variation overwrite.
pub const OVERWRITE_COOKIE: &str = "ab_ovrw";

/// Name of the cookie carrying the encoded assignment string.
///
/// # Errors
///
/// Returns [`crate::Error::Fingerprint`] if the schema cannot be serialized.
pub fn experiments_cookie_name(schema: &Schema) -> Result<String> {
    Ok(format!("{COOKIE_PREFIX}_exp_{}", schema.fingerprint()?))
}

/// Name of the cookie carrying the encoded rule vector.
///
/// # Errors
///
/// Returns [`crate::Error::Fingerprint`] if the schema cannot be serialized.
pub fn rules_cookie_name(schema: &Schema) -> Result<String> {
    Ok(format!("{COOKIE_PREFIX}_exp_rules_{}", schema.fingerprint()?))
}

/// Name of the cookie carrying the visitor identity.
#[must_use]
pub fn identity_cookie_name() -> String {
    format!("{COOKIE_PREFIX}_i_{IDENTITY_VERSION}")
}

/// Lifetime of the assignment and rule cookies.
#[must_use]
pub fn experiments_cookie_lifetime() -> Duration {
    Duration::days(30)
}

/// Lifetime of the identity cookie.
#[must_use]
pub fn identity_cookie_lifetime() -> Duration {
    Duration::weeks(36)
}
