//! Error payloads for boundary collaborators (CLI, HTTP layer).
//!
//! # Responsibility
//! - Classify store and export failures into stable, user-visible codes.
//! - Render the `{"error": {"code", "message"}}` payload.
//!
//! # Invariants
//! - Not-found, template-unavailable and generation-failed never share a code.
//! - Generation failures expose no document-library detail.

use crate::export::ExportError;
use crate::repo::rating_repo::RepoError;
use serde::{Serialize, Serializer};

/// Stable failure classification shown to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    TemplateUnavailable,
    GenerationFailed,
    StorageError,
}

impl ErrorKind {
    pub const ALL: [ErrorKind; 4] = [
        Self::NotFound,
        Self::TemplateUnavailable,
        Self::GenerationFailed,
        Self::StorageError,
    ];

    /// Wire code; also the serialized form.
    pub fn code(self) -> &'static str {
        match self {
            Self::NotFound => "not_found",
            Self::TemplateUnavailable => "template_unavailable",
            Self::GenerationFailed => "generation_failed",
            Self::StorageError => "storage_error",
        }
    }

    /// Status code an HTTP collaborator should answer with.
    pub fn http_status(self) -> u16 {
        match self {
            Self::NotFound => 404,
            Self::TemplateUnavailable | Self::GenerationFailed | Self::StorageError => 500,
        }
    }
}

impl Serialize for ErrorKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.code())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorDetail {
    pub code: ErrorKind,
    pub message: String,
}

impl ErrorBody {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            error: ErrorDetail {
                code: kind,
                message: message.into(),
            },
        }
    }

    pub fn kind(&self) -> ErrorKind {
        self.error.code
    }
}

impl From<&RepoError> for ErrorBody {
    fn from(err: &RepoError) -> Self {
        match err {
            RepoError::NotFound(_) => Self::new(ErrorKind::NotFound, err.to_string()),
            _ => Self::new(ErrorKind::StorageError, "rating storage failed"),
        }
    }
}

impl From<&ExportError> for ErrorBody {
    fn from(err: &ExportError) -> Self {
        match err {
            ExportError::NotFound(_) => Self::new(ErrorKind::NotFound, err.to_string()),
            ExportError::TemplateUnavailable { .. } => {
                Self::new(ErrorKind::TemplateUnavailable, err.to_string())
            }
            ExportError::GenerationFailed(_) => {
                Self::new(ErrorKind::GenerationFailed, err.to_string())
            }
            ExportError::Store(inner) => Self::from(inner),
        }
    }
}
