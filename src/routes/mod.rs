//! Router Module Index
//!
//! Routing is split by access level so protection is decided per module.

/// Routes accessible to all clients (anonymous, no data access).
pub mod public;

/// Moderation panel routes. Handlers enforce token and role checks.
pub mod admin;
