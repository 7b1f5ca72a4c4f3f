//! Rating use-case service.
//!
//! # Responsibility
//! - Provide stable CRUD and export entry points for core callers.
//! - Delegate persistence to repository implementations.
//!
//! # Invariants
//! - Service APIs never bypass repository persistence contracts.
//! - Service layer remains storage-agnostic.

use crate::export::{ExportResult, ExportedPdf, PdfExporter};
use crate::model::rating::{RatingFields, RatingId, RatingRecord};
use crate::repo::rating_repo::{RatingRepository, RepoResult};
use log::info;

/// Use-case service wrapper for rating operations.
pub struct RatingService<R: RatingRepository> {
    repo: R,
}

impl<R: RatingRepository> RatingService<R> {
    /// Creates a service using the provided repository implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Creates a rating; absent fields are stored as empty text.
    pub fn create_rating(&self, fields: &RatingFields) -> RepoResult<RatingRecord> {
        let created = self.repo.create_rating(fields)?;
        info!(
            "event=rating_create module=service status=ok id={}",
            created.id
        );
        Ok(created)
    }

    /// Gets one rating by id.
    pub fn get_rating(&self, id: RatingId) -> RepoResult<Option<RatingRecord>> {
        self.repo.get_rating(id)
    }

    /// Lists all ratings, newest first.
    pub fn list_ratings(&self) -> RepoResult<Vec<RatingRecord>> {
        self.repo.list_ratings()
    }

    /// Applies a merge-if-non-empty update.
    ///
    /// Returns repository-level not-found errors unchanged.
    pub fn update_rating(&self, id: RatingId, fields: &RatingFields) -> RepoResult<RatingRecord> {
        let updated = self.repo.update_rating(id, fields)?;
        info!(
            "event=rating_update module=service status=ok id={} noop={}",
            id,
            fields.is_noop_update()
        );
        Ok(updated)
    }

    /// Permanently deletes a rating.
    pub fn delete_rating(&self, id: RatingId) -> RepoResult<()> {
        self.repo.delete_rating(id)?;
        info!("event=rating_delete module=service status=ok id={}", id);
        Ok(())
    }

    /// Exports a rating through `exporter` using this service's repository.
    pub fn export_pdf(
        &self,
        exporter: &PdfExporter<'_>,
        id: RatingId,
        template_key: Option<&str>,
    ) -> ExportResult<ExportedPdf> {
        exporter.export(&self.repo, id, template_key)
    }
}
