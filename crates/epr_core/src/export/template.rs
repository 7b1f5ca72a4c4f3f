//! Template key registry.
//!
//! # Responsibility
//! - Map short template keys to pre-existing PDF assets.
//! - Locate assets under one configured directory.
//!
//! # Invariants
//! - The mapping is fixed at construction and never mutated.
//! - `resolve` never fails: unknown or absent keys fall back to `default`.
//! - The registry never opens, validates or writes asset files.

use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Key used when a caller supplies none or an unknown one.
pub const DEFAULT_TEMPLATE_KEY: &str = "default";

const BUILTIN_TEMPLATES: [(&str, &str); 4] = [
    (DEFAULT_TEMPLATE_KEY, "new performance rating pdf.pdf"),
    ("workplan", "Employee Work Plan form.pdf"),
    (
        "blanker",
        "Blanker  - Supervisory and Administrative 02-13 .pdf",
    ),
    ("outside", "Outside Employment.pdf"),
];

/// One known template and the asset file it points at.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TemplateDescriptor {
    /// Lowercase lookup key, also used in suggested export filenames.
    pub key: String,
    /// File name relative to the registry asset directory.
    pub file_name: String,
}

/// Immutable key -> template mapping, shared by reference with exporters.
#[derive(Debug, Clone)]
pub struct TemplateRegistry {
    asset_dir: PathBuf,
    default: TemplateDescriptor,
    templates: BTreeMap<String, TemplateDescriptor>,
}

impl TemplateRegistry {
    /// Builds the registry of built-in templates rooted at `asset_dir`.
    pub fn builtin(asset_dir: impl Into<PathBuf>) -> Self {
        let templates: BTreeMap<String, TemplateDescriptor> = BUILTIN_TEMPLATES
            .iter()
            .map(|(key, file_name)| {
                (
                    (*key).to_string(),
                    TemplateDescriptor {
                        key: (*key).to_string(),
                        file_name: (*file_name).to_string(),
                    },
                )
            })
            .collect();
        let default = TemplateDescriptor {
            key: BUILTIN_TEMPLATES[0].0.to_string(),
            file_name: BUILTIN_TEMPLATES[0].1.to_string(),
        };

        Self {
            asset_dir: asset_dir.into(),
            default,
            templates,
        }
    }

    /// Case-insensitive lookup with fallback to the default template.
    pub fn resolve(&self, key: Option<&str>) -> &TemplateDescriptor {
        key.map(normalize_key)
            .and_then(|normalized| self.templates.get(&normalized))
            .unwrap_or(&self.default)
    }

    /// Returns whether `key` names a known template (ignoring case).
    pub fn contains(&self, key: &str) -> bool {
        self.templates.contains_key(&normalize_key(key))
    }

    /// Full path of the asset backing `descriptor`.
    pub fn asset_path(&self, descriptor: &TemplateDescriptor) -> PathBuf {
        self.asset_dir.join(&descriptor.file_name)
    }

    pub fn asset_dir(&self) -> &Path {
        &self.asset_dir
    }

    /// Known templates ordered by key.
    pub fn descriptors(&self) -> impl Iterator<Item = &TemplateDescriptor> {
        self.templates.values()
    }

    /// Known template keys in sorted order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.templates.keys().map(String::as_str)
    }
}

fn normalize_key(key: &str) -> String {
    key.trim().to_ascii_lowercase()
}
