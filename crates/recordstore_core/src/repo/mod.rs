//! Stored-procedure backed record access.
//!
//! # Responsibility
//! - Translate record operations into one procedure call each.
//! - Keep parameter shapes explicit per procedure.
//!
//! # Invariants
//! - Every operation acquires exactly one connection and releases it on
//!   every exit path.
//! - Database failures propagate unchanged; nothing is retried.

pub mod params;
pub mod record_store;
