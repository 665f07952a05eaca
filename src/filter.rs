//! Category filtering and fuzzy search over catalog records.
//!
//! Both filters are applied to the full record list without modifying it;
//! a view is the intersection of the selection filter and the search filter.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::catalog::FileTypeRecord;
use crate::registry::{HandlerApp, TypeFamily};

/// Broad grouping of file types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Category {
    #[default]
    All,
    /// Records without a default handler, whatever their type
    NoDefault,
    Documents,
    Code,
    Images,
    Audio,
    Video,
    Archives,
}

impl Category {
    pub const ALL: [Category; 8] = [
        Category::All,
        Category::NoDefault,
        Category::Documents,
        Category::Code,
        Category::Images,
        Category::Audio,
        Category::Video,
        Category::Archives,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::All => "all",
            Category::NoDefault => "no-default",
            Category::Documents => "documents",
            Category::Code => "code",
            Category::Images => "images",
            Category::Audio => "audio",
            Category::Video => "video",
            Category::Archives => "archives",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Category::All => "All",
            Category::NoDefault => "No Default",
            Category::Documents => "Documents",
            Category::Code => "Code",
            Category::Images => "Images",
            Category::Audio => "Audio",
            Category::Video => "Video",
            Category::Archives => "Archives",
        }
    }

    /// Type families a record must conform to (any of) to match.
    ///
    /// Empty for the two structural categories.
    pub fn families(&self) -> &'static [TypeFamily] {
        match self {
            Category::All | Category::NoDefault => &[],
            Category::Documents => &[
                TypeFamily::Pdf,
                TypeFamily::Presentation,
                TypeFamily::Spreadsheet,
                TypeFamily::Text,
            ],
            Category::Code => &[TypeFamily::SourceCode],
            Category::Images => &[TypeFamily::Image],
            Category::Audio => &[TypeFamily::Audio],
            Category::Video => &[TypeFamily::Movie, TypeFamily::Video],
            Category::Archives => &[TypeFamily::Archive],
        }
    }

    pub fn matches(&self, record: &FileTypeRecord) -> bool {
        match self {
            Category::All => true,
            Category::NoDefault => record.default_handler().is_none(),
            _ => self
                .families()
                .iter()
                .any(|family| record.conforms_to(*family)),
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
#[error("unknown category '{0}' (expected one of: all, no-default, documents, code, images, audio, video, archives)")]
pub struct ParseCategoryError(String);

impl FromStr for Category {
    type Err = ParseCategoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase().replace([' ', '_'], "-");
        Category::ALL
            .into_iter()
            .find(|category| category.as_str() == wanted)
            .ok_or_else(|| ParseCategoryError(s.to_string()))
    }
}

/// What the view is narrowed to before searching.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Selection {
    Category(Category),
    /// Records whose default handler has this bundle id
    App(String),
}

impl Default for Selection {
    fn default() -> Self {
        Selection::Category(Category::All)
    }
}

impl Selection {
    pub fn matches(&self, record: &FileTypeRecord) -> bool {
        match self {
            Selection::Category(category) => category.matches(record),
            Selection::App(bundle_id) => record
                .default_handler()
                .is_some_and(|handler| &handler.bundle_id == bundle_id),
        }
    }
}

/// Subsequence match: every character of `needle` appears in `candidate`
/// in order, not necessarily adjacent. An empty needle matches anything.
///
/// Comparison is exact; callers fold case beforehand.
pub fn fuzzy_match(candidate: &str, needle: &str) -> bool {
    let mut remaining = needle.chars().peekable();
    if remaining.peek().is_none() {
        return true;
    }

    for c in candidate.chars() {
        if remaining.peek() == Some(&c) {
            remaining.next();
            if remaining.peek().is_none() {
                return true;
            }
        }
    }
    false
}

/// Lowercase a search query and drop one leading dot.
pub fn normalize_query(query: &str) -> String {
    let lowered = query.to_lowercase();
    match lowered.strip_prefix('.') {
        Some(rest) => rest.to_string(),
        None => lowered,
    }
}

/// Selection plus search text, evaluated against catalog records.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViewQuery {
    pub selection: Selection,
    search: String,
}

impl ViewQuery {
    pub fn new(selection: Selection, search: &str) -> Self {
        Self {
            selection,
            search: normalize_query(search),
        }
    }

    pub fn category(category: Category) -> Self {
        Self::new(Selection::Category(category), "")
    }

    pub fn with_search(mut self, search: &str) -> Self {
        self.search = normalize_query(search);
        self
    }

    /// Normalized search text
    pub fn search(&self) -> &str {
        &self.search
    }

    /// A record matches the search when the query fuzzily matches its
    /// extension, type identifier, or default handler name.
    pub fn matches_search(&self, record: &FileTypeRecord) -> bool {
        if self.search.is_empty() {
            return true;
        }

        fuzzy_match(&record.extension().to_lowercase(), &self.search)
            || fuzzy_match(&record.type_identifier().to_lowercase(), &self.search)
            || record
                .default_handler()
                .is_some_and(|handler| fuzzy_match(&handler.name.to_lowercase(), &self.search))
    }

    pub fn matches(&self, record: &FileTypeRecord) -> bool {
        self.selection.matches(record) && self.matches_search(record)
    }

    /// Matching records in catalog order
    pub fn apply<'a>(&self, records: &'a [FileTypeRecord]) -> Vec<&'a FileTypeRecord> {
        records.iter().filter(|record| self.matches(record)).collect()
    }
}

/// Distinct default handlers across `records`, sorted by display name
/// ignoring case.
pub fn unique_apps(records: &[FileTypeRecord]) -> Vec<HandlerApp> {
    let mut seen = HashSet::new();
    let mut apps = Vec::new();
    for app in records.iter().filter_map(FileTypeRecord::default_handler) {
        if seen.insert(app.bundle_id.as_str()) {
            apps.push(app.clone());
        }
    }
    apps.sort_by_cached_key(|app| app.name.to_lowercase());
    apps
}
