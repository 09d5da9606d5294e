//! Visitor identity
//!
//! Assignments are keyed by a visitor ID stored in the identity cookie.
//! Anonymous visitors get a random ID; authenticated visitors get a stable
//! prefixed form of their account ID so assignments follow them across
//! devices.

use uuid::Uuid;

/// Prefix marking an authenticated visitor ID.
pub const AUTHENTICATED_PREFIX: &str = "auth.";

/// Generate a fresh random visitor ID for an anonymous visitor.
#[must_use]
pub fn generate_visitor_id() -> String {
    Uuid::new_v4().simple().to_string()
}

/// Derive the stable visitor ID for an authenticated account.
#[must_use]
pub fn format_authenticated_id(uid: &str) -> String {
    format!("{AUTHENTICATED_PREFIX}{uid}")
}

/// Whether a visitor ID belongs to an authenticated account.
#[must_use]
pub fn is_authenticated_id(id: &str) -> bool {
    id.starts_with(AUTHENTICATED_PREFIX)
}
