// pokedex-server/src/lib.rs
// ============================================================================
// Module: Pokedex Server
// Description: HTTP boundary for the Pokedex search log.
// Purpose: Expose login, search logging, and history listing over HTTP.
// Dependencies: pokedex-core, pokedex-config, pokedex-store-sqlite, axum, tokio
// ============================================================================

//! ## Overview
//! The server exposes three JSON endpoints (`POST /api/login`,
//! `POST /api/search`, `GET /api/history`) as thin wrappers over
//! [`pokedex_core::HistoryService`] and the fixed credential check. Every
//! handled request emits one structured audit event.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod audit;
pub mod server;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use audit::ApiAuditEvent;
pub use audit::ApiAuditEventParams;
pub use audit::ApiAuditSink;
pub use audit::ApiFileAuditSink;
pub use audit::ApiNoopAuditSink;
pub use audit::ApiOutcome;
pub use audit::ApiRoute;
pub use audit::ApiStderrAuditSink;
pub use audit::LifecycleAuditEvent;
pub use server::ApiError;
pub use server::ApiServer;
pub use server::ApiServerError;
pub use server::ApiState;
pub use server::build_router;
