use serde::Serialize;
use std::collections::BTreeSet;

use crate::registry::{HandlerApp, ResolvedType, TypeFamily};

/// One file extension known to the catalog.
///
/// The extension is the record's key. Type identifier and display name are
/// fixed at construction; only the default handler changes afterwards.
#[derive(Debug, Clone, Serialize)]
pub struct FileTypeRecord {
    extension: String,
    type_identifier: String,
    families: BTreeSet<TypeFamily>,
    resolved: bool,
    display_name: String,
    default_handler: Option<HandlerApp>,
}

impl FileTypeRecord {
    /// Build a record for an already-normalized extension.
    ///
    /// Without a resolved type the identifier becomes the `dyn.<extension>`
    /// placeholder and the record belongs to no type family.
    pub fn new(extension: impl Into<String>, resolved: Option<ResolvedType>) -> Self {
        let extension = extension.into();
        let display_name = extension.to_uppercase();

        let (type_identifier, families, resolved) = match resolved {
            Some(ResolvedType {
                identifier,
                families,
            }) => (identifier, families, true),
            None => (format!("dyn.{extension}"), BTreeSet::new(), false),
        };

        Self {
            extension,
            type_identifier,
            families,
            resolved,
            display_name,
            default_handler: None,
        }
    }

    pub fn with_default_handler(mut self, handler: Option<HandlerApp>) -> Self {
        self.default_handler = handler;
        self
    }

    pub fn extension(&self) -> &str {
        &self.extension
    }

    pub fn type_identifier(&self) -> &str {
        &self.type_identifier
    }

    /// Whether the platform mapped this extension to a type
    pub fn is_resolved(&self) -> bool {
        self.resolved
    }

    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    pub fn default_handler(&self) -> Option<&HandlerApp> {
        self.default_handler.as_ref()
    }

    pub fn families(&self) -> &BTreeSet<TypeFamily> {
        &self.families
    }

    pub fn conforms_to(&self, family: TypeFamily) -> bool {
        self.families.contains(&family)
    }

    pub(crate) fn set_default_handler(&mut self, handler: HandlerApp) {
        self.default_handler = Some(handler);
    }
}

/// Normalize user input into a catalog key.
///
/// Trims whitespace, strips a single leading dot and lowercases. Returns
/// `None` when nothing is left.
pub fn normalize_extension(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    let ext = trimmed.strip_prefix('.').unwrap_or(trimmed);
    if ext.is_empty() {
        return None;
    }
    Some(ext.to_lowercase())
}
