//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls into use-case level APIs.
//! - Keep CLI and other boundary layers decoupled from storage details.

pub mod rating_service;
