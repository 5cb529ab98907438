//! Domain model for stored records.
//!
//! # Invariants
//! - A record is addressed by its database-assigned `RecordId`.
//! - Deletion is a hard delete; there is no tombstone state.

pub mod record;
