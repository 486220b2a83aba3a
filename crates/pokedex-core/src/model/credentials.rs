// pokedex-core/src/model/credentials.rs
// ============================================================================
// Module: Credential Check
// Description: Fixed username/password comparison for the login endpoint.
// Purpose: Provide the boolean login gate with no state or side effects.
// Dependencies: subtle
// ============================================================================

//! ## Overview
//! Login is a comparison against one configured username/password pair. It
//! issues no session and nothing else consults its result; it is a stand-in
//! for real authentication and must not be mistaken for one. Comparisons run
//! in constant time per field so response timing does not leak prefixes.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use subtle::ConstantTimeEq;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default expected username.
pub const DEFAULT_USERNAME: &str = "admin";
/// Default expected password.
pub const DEFAULT_PASSWORD: &str = "12345";

// ============================================================================
// SECTION: Credentials
// ============================================================================

/// Expected login credential pair.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    /// Expected username.
    username: String,
    /// Expected password.
    password: String,
}

impl Credentials {
    /// Builds a credential pair.
    #[must_use]
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    /// Returns the expected username.
    #[must_use]
    pub fn username(&self) -> &str {
        &self.username
    }

    /// Returns true only when both submitted values match exactly.
    #[must_use]
    pub fn authenticate(&self, username: &str, password: &str) -> bool {
        let user_ok = self.username.as_bytes().ct_eq(username.as_bytes());
        let pass_ok = self.password.as_bytes().ct_eq(password.as_bytes());
        bool::from(user_ok & pass_ok)
    }
}

impl Default for Credentials {
    fn default() -> Self {
        Self::new(DEFAULT_USERNAME, DEFAULT_PASSWORD)
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Checks a submitted pair against the default credentials.
#[must_use]
pub fn authenticate(username: &str, password: &str) -> bool {
    Credentials::default().authenticate(username, password)
}
