//! Rating -> PDF export use-case.
//!
//! # Responsibility
//! - Look up a record, resolve its template and stamp the record onto it.
//! - Map store, asset and document failures onto distinct error kinds.
//!
//! # Invariants
//! - A missing record fails before any template is resolved or read.
//! - Export never writes to the rating store.
//! - Document library errors are logged in full and surfaced as the opaque
//!   `GenerationFailed` kind.

use super::error::{ExportError, ExportResult};
use super::layout::{compose_lines, OverlayLayout};
use super::overlay::render_overlay;
use super::template::TemplateRegistry;
use crate::model::rating::RatingId;
use crate::repo::rating_repo::RatingRepository;
use log::{error, info, warn};
use std::time::Instant;

/// A filled document ready to be sent to the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportedPdf {
    pub bytes: Vec<u8>,
    /// Suggested download name, see [`suggested_file_name`].
    pub file_name: String,
    /// Key of the template actually used after fallback.
    pub template_key: String,
}

impl ExportedPdf {
    pub const CONTENT_TYPE: &'static str = "application/pdf";
}

/// Stamps rating records onto registry templates.
#[derive(Debug, Clone)]
pub struct PdfExporter<'r> {
    registry: &'r TemplateRegistry,
    layout: OverlayLayout,
}

impl<'r> PdfExporter<'r> {
    pub fn new(registry: &'r TemplateRegistry) -> Self {
        Self {
            registry,
            layout: OverlayLayout::default(),
        }
    }

    /// Replaces the overlay geometry.
    pub fn with_layout(mut self, layout: OverlayLayout) -> Self {
        self.layout = layout;
        self
    }

    pub fn registry(&self) -> &TemplateRegistry {
        self.registry
    }

    /// Exports record `id` using `template_key` (default template when absent
    /// or unknown).
    ///
    /// # Errors
    /// - `NotFound` when the record does not exist.
    /// - `Store` when the lookup itself fails.
    /// - `TemplateUnavailable` when the template asset cannot be read.
    /// - `GenerationFailed` when the template cannot be parsed, stamped or
    ///   serialized.
    pub fn export<R>(
        &self,
        repo: &R,
        id: RatingId,
        template_key: Option<&str>,
    ) -> ExportResult<ExportedPdf>
    where
        R: RatingRepository + ?Sized,
    {
        let started_at = Instant::now();
        let record = repo.get_rating(id)?.ok_or(ExportError::NotFound(id))?;

        let descriptor = self.registry.resolve(template_key);
        if let Some(requested) = template_key {
            if !self.registry.contains(requested) {
                warn!(
                    "event=pdf_export module=export status=fallback id={} requested_key={:?} template={}",
                    id, requested, descriptor.key
                );
            }
        }

        let asset_path = self.registry.asset_path(descriptor);
        let template = std::fs::read(&asset_path).map_err(|source| {
            error!(
                "event=pdf_export module=export status=error id={} template={} error_code=template_unavailable path={} error={}",
                id,
                descriptor.key,
                asset_path.display(),
                source
            );
            ExportError::TemplateUnavailable {
                key: descriptor.key.clone(),
                file_name: descriptor.file_name.clone(),
                source,
            }
        })?;

        let layout = self.layout;
        let bytes = render_overlay(&template, &layout, |page_height| {
            layout.place(page_height, compose_lines(&record))
        })
        .map_err(|err| {
            error!(
                "event=pdf_export module=export status=error id={} template={} error_code=generation_failed duration_ms={} error={}",
                id,
                descriptor.key,
                started_at.elapsed().as_millis(),
                err
            );
            ExportError::GenerationFailed(err)
        })?;

        info!(
            "event=pdf_export module=export status=ok id={} template={} bytes={} duration_ms={}",
            id,
            descriptor.key,
            bytes.len(),
            started_at.elapsed().as_millis()
        );

        Ok(ExportedPdf {
            bytes,
            file_name: suggested_file_name(id, &descriptor.key),
            template_key: descriptor.key.clone(),
        })
    }
}

/// Download name for an export: `rating-<id>-<key>.pdf`.
pub fn suggested_file_name(id: RatingId, template_key: &str) -> String {
    format!("rating-{id}-{template_key}.pdf")
}
