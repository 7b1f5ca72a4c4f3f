//! Core domain logic for employee performance ratings.
//! This crate owns the rating store, the template registry and PDF export.

pub mod boundary;
pub mod config;
pub mod db;
pub mod export;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use boundary::{ErrorBody, ErrorKind};
pub use config::{AppConfig, ConfigError};
pub use export::template::{TemplateDescriptor, TemplateRegistry, DEFAULT_TEMPLATE_KEY};
pub use export::{ExportError, ExportResult, ExportedPdf, PdfExporter};
pub use logging::{default_log_level, init_logging, init_stderr_logging, logging_status};
pub use model::rating::{RatingField, RatingFields, RatingId, RatingRecord};
pub use repo::rating_repo::{RatingRepository, RepoError, RepoResult, SqliteRatingRepository};
pub use service::rating_service::RatingService;

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
