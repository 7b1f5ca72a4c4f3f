use crate::model::rating::RatingId;
use crate::repo::rating_repo::RepoError;
use thiserror::Error;

pub type ExportResult<T> = Result<T, ExportError>;

/// Failure while stamping record text onto a template document.
///
/// Never shown to callers verbatim; it is logged and wrapped in
/// [`ExportError::GenerationFailed`].
#[derive(Error, Debug)]
pub enum OverlayError {
    #[error("PDF error: {0}")]
    Pdf(#[from] lopdf::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("template document has no pages")]
    NoPages,

    #[error("{0}")]
    InvalidPage(String),
}

/// Export failure kinds surfaced to callers.
#[derive(Error, Debug)]
pub enum ExportError {
    #[error("rating not found: {0}")]
    NotFound(RatingId),

    #[error("PDF template not found: {file_name}")]
    TemplateUnavailable {
        key: String,
        file_name: String,
        #[source]
        source: std::io::Error,
    },

    #[error("PDF generation failed")]
    GenerationFailed(#[source] OverlayError),

    #[error("rating store error: {0}")]
    Store(#[from] RepoError),
}
