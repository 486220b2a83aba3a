// pokedex-cli/src/i18n.rs
// ============================================================================
// Module: CLI Message Catalog
// Description: Message catalog and placeholder substitution for CLI output.
// Purpose: Keep every user-facing string in one table.
// Dependencies: Standard library collections.
// ============================================================================

//! ## Overview
//! User-facing CLI strings live in a static catalog keyed by dotted names.
//! Runtime output is formatted through the [`t!`](crate::t) macro, which
//! substitutes `{name}` placeholders with preformatted values.
//!
//! ## Invariants
//! - The catalog is built once and read-only thereafter.
//! - Missing keys fall back to the key itself.
//! - Placeholders are substituted in argument order.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::HashMap;
use std::sync::OnceLock;

// ============================================================================
// SECTION: Types
// ============================================================================

/// A formatted message argument captured by the [`macro@crate::t`] macro.
#[derive(Clone)]
pub struct MessageArg {
    /// The placeholder name used in message templates (e.g., `"name"`).
    pub key: &'static str,
    /// The formatted string value to substitute for this placeholder.
    pub value: String,
}

impl MessageArg {
    /// Constructs a new [`MessageArg`] from a key and displayable value.
    pub fn new(key: &'static str, value: impl Into<String>) -> Self {
        Self {
            key,
            value: value.into(),
        }
    }
}

// ============================================================================
// SECTION: Catalog
// ============================================================================

/// Static catalog entries.
const CATALOG: &[(&str, &str)] = &[
    ("main.version", "pokedex {version}"),
    ("output.stream.stdout", "stdout"),
    ("output.stream.stderr", "stderr"),
    ("output.stream.unknown", "output"),
    ("output.write_failed", "Failed to write to {stream}: {error}"),
    ("config.load_failed", "Failed to load config: {error}"),
    ("config.validate.ok", "Config validated successfully."),
    ("serve.init_failed", "Failed to initialize server: {error}"),
    ("serve.listening", "Pokedex API listening on http://{bind}"),
    ("serve.failed", "Server failed: {error}"),
    ("serve.stopped", "Server stopped."),
    ("client.init_failed", "Failed to initialize HTTP client: {error}"),
    ("login.rejected", "Login failed: {message}"),
    ("login.failed", "Login request failed: {error}"),
    ("search.empty", "Enter a Pokemon name to search."),
    ("search.not_found", "Pokemon not found: {name}"),
    ("search.api_error", "API error: {status}"),
    ("search.failed", "Search failed: {error}"),
    ("search.log_failed", "Warning: failed to log search: {error}"),
    ("search.log_timeout", "Warning: search log did not finish within {ms} ms."),
    ("roster.limit_invalid", "Invalid roster limit: {error}"),
    ("roster.failed", "Could not load Pokemon. Please try again later. ({error})"),
    ("roster.empty", "No Pokemon found."),
    ("roster.skipped", "Warning: skipped {count} Pokemon whose details could not be loaded."),
    ("history.failed", "Failed to fetch search history: {error}"),
    ("history.empty", "No search history found."),
    ("history.entry", "{timestamp}  {term}"),
    ("card.name", "{name}"),
    ("card.types", "  Type: {types}"),
    ("card.image", "  Image: {url}"),
    ("card.image.none", "  Image: (none)"),
];

/// Returns the message catalog.
fn catalog() -> &'static HashMap<&'static str, &'static str> {
    static CATALOG_MAP: OnceLock<HashMap<&'static str, &'static str>> = OnceLock::new();
    CATALOG_MAP.get_or_init(|| CATALOG.iter().copied().collect())
}

/// Returns true when `key` has a catalog entry.
#[must_use]
pub fn has_key(key: &str) -> bool {
    catalog().contains_key(key)
}

// ============================================================================
// SECTION: Translation
// ============================================================================

/// Resolves `key` in the catalog while substituting `args`.
#[must_use]
pub fn translate(key: &str, args: Vec<MessageArg>) -> String {
    let template = catalog().get(key).copied().unwrap_or(key);
    if args.is_empty() {
        return template.to_string();
    }

    let mut result = template.to_string();
    for arg in args {
        let placeholder = format!("{{{}}}", arg.key);
        result = result.replace(&placeholder, &arg.value);
    }
    result
}

// ============================================================================
// SECTION: Macro
// ============================================================================

/// Formats a catalog message from a key and named arguments.
///
/// # Arguments
///
/// - `$key` must match a catalog entry.
/// - Named arguments are substituted into `{placeholder}` positions.
///
/// # Returns
///
/// A [`String`] with placeholders substituted.
#[macro_export]
macro_rules! t {
    ($key:literal $(, $name:ident = $value:expr )* $(,)?) => {{
        let args = ::std::vec![
            $(
                $crate::i18n::MessageArg::new(stringify!($name), $value.to_string()),
            )*
        ];
        $crate::i18n::translate($key, args)
    }};
}
