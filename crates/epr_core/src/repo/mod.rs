//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define use-case oriented data access contracts.
//! - Isolate SQLite query details from service orchestration and export.
//!
//! # Invariants
//! - Lookups report absence as `Ok(None)`; writes against a missing id
//!   report `RepoError::NotFound`.

pub mod rating_repo;
