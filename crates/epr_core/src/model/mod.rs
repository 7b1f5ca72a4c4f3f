//! Domain model for performance review records.
//!
//! # Responsibility
//! - Define canonical data structures used by the store and the exporter.
//!
//! # Invariants
//! - Every record is identified by a store-assigned `RatingId`.
//! - Deletion is a hard delete; there are no tombstones.

pub mod rating;
