use chrono::{DateTime, Utc};
use serde::Serialize;

use super::record::FileTypeRecord;
use crate::registry::HandlerApp;

/// Immutable view of the catalog at one point in time.
///
/// Records are kept sorted by extension with no duplicates. Every catalog
/// command publishes a fresh snapshot instead of mutating a shared one.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CatalogSnapshot {
    records: Vec<FileTypeRecord>,
    loading: bool,
    refreshed_at: Option<DateTime<Utc>>,
}

impl CatalogSnapshot {
    /// Build from an unordered record list; later duplicates are dropped
    pub fn from_records(
        records: impl IntoIterator<Item = FileTypeRecord>,
        refreshed_at: Option<DateTime<Utc>>,
    ) -> Self {
        let mut records: Vec<_> = records.into_iter().collect();
        // Stable sort keeps the first occurrence ahead of its duplicates
        records.sort_by(|a, b| a.extension().cmp(b.extension()));
        records.dedup_by(|later, earlier| later.extension() == earlier.extension());

        Self {
            records,
            loading: false,
            refreshed_at,
        }
    }

    pub fn records(&self) -> &[FileTypeRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// A refresh is in flight; the records are from the previous one
    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn refreshed_at(&self) -> Option<DateTime<Utc>> {
        self.refreshed_at
    }

    pub fn get(&self, extension: &str) -> Option<&FileTypeRecord> {
        self.position(extension)
            .ok()
            .map(|index| &self.records[index])
    }

    pub fn contains(&self, extension: &str) -> bool {
        self.position(extension).is_ok()
    }

    pub(crate) fn as_loading(&self) -> Self {
        Self {
            loading: true,
            ..self.clone()
        }
    }

    /// Copy with `record` inserted in order. An existing record with the same
    /// extension wins.
    pub(crate) fn with_record(&self, record: FileTypeRecord) -> Self {
        let mut next = self.clone();
        if let Err(index) = next.position(record.extension()) {
            next.records.insert(index, record);
        }
        next
    }

    /// Copy with one record's default handler replaced, or `None` when no
    /// record has that extension.
    pub(crate) fn with_default_handler(&self, extension: &str, handler: HandlerApp) -> Option<Self> {
        let index = self.position(extension).ok()?;
        let mut next = self.clone();
        next.records[index].set_default_handler(handler);
        Some(next)
    }

    fn position(&self, extension: &str) -> Result<usize, usize> {
        self.records
            .binary_search_by(|record| record.extension().cmp(extension))
    }
}
