//! PDF export of rating records.
//!
//! # Responsibility
//! - Resolve template keys to pre-existing PDF assets.
//! - Overlay record fields as fixed-position text on the first page.
//!
//! # Invariants
//! - The template registry is immutable and passed by reference.
//! - Exports are read-only with respect to the rating store.

mod engine;
mod error;
pub mod layout;
mod overlay;
pub mod template;

pub use engine::{suggested_file_name, ExportedPdf, PdfExporter};
pub use error::{ExportError, ExportResult, OverlayError};
pub use overlay::{encode_win_ansi, render_overlay};
