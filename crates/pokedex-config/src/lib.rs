// pokedex-config/src/lib.rs
// ============================================================================
// Module: Pokedex Config Library
// Description: Canonical config model, validation, and example generation.
// Purpose: Single source of truth for pokedex.toml semantics.
// Dependencies: pokedex-core, pokedex-store-sqlite, serde, toml
// ============================================================================

//! ## Overview
//! `pokedex-config` defines the configuration model shared by the server and
//! the client commands. Loading is strict: size, encoding, and path limits
//! are enforced before parsing, and every section validates its ranges.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod config;
pub mod examples;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use config::*;
pub use examples::config_toml_example;
