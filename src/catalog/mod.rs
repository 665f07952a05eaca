//! Extension catalog and handler cache.
//!
//! [`Catalog`] owns the working set of [`FileTypeRecord`]s and publishes it as
//! immutable [`CatalogSnapshot`]s through a `tokio::sync::watch` channel.
//!
//! Flow:
//! 1. `refresh()` marks the current snapshot as loading and spawns one
//!    background task that runs discovery plus per-extension default lookups
//! 2. The task publishes the rebuilt snapshot in one step, replacing whatever
//!    was there (including patches made while it ran)
//! 3. `set_handler()` writes through the registry and patches the published
//!    snapshot only after the write is acknowledged
//! 4. `add_custom_extension()` inserts one record and warms the handler cache
//!
//! Two overlapping refreshes are not coordinated; the last to finish wins.

mod cache;
mod error;
mod record;
mod snapshot;

pub use cache::HandlerCache;
pub use error::{CatalogError, Result};
pub use record::{FileTypeRecord, normalize_extension};
pub use snapshot::CatalogSnapshot;

use chrono::Utc;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::observability::Metrics;
use crate::registry::{HandlerApp, RegistryClient};

/// Working set of file types plus the handler cache.
///
/// Mutating commands take `&mut self` or publish through the watch sender, so
/// all catalog and cache state changes happen on the caller's task. Only the
/// read-only discovery sequence runs elsewhere.
pub struct Catalog {
    client: RegistryClient,
    state: Arc<watch::Sender<Arc<CatalogSnapshot>>>,
    cache: HandlerCache,
    metrics: Arc<Metrics>,
}

impl Catalog {
    /// Create an empty catalog over an injected registry client
    pub fn new(client: RegistryClient) -> Self {
        let (state, _) = watch::channel(Arc::new(CatalogSnapshot::default()));
        Self {
            client,
            state: Arc::new(state),
            cache: HandlerCache::new(),
            metrics: Arc::new(Metrics::new()),
        }
    }

    pub fn with_metrics(mut self, metrics: Arc<Metrics>) -> Self {
        self.metrics = metrics;
        self
    }

    pub fn client(&self) -> &RegistryClient {
        &self.client
    }

    pub fn metrics(&self) -> &Arc<Metrics> {
        &self.metrics
    }

    /// Currently published snapshot
    pub fn snapshot(&self) -> Arc<CatalogSnapshot> {
        self.state.borrow().clone()
    }

    /// Observe every snapshot published from now on
    pub fn subscribe(&self) -> watch::Receiver<Arc<CatalogSnapshot>> {
        self.state.subscribe()
    }

    /// Rebuild the catalog from the registry in the background.
    ///
    /// Returns immediately with the task handle; the published snapshot keeps
    /// its previous records and reports `is_loading()` until the task
    /// finishes.
    pub fn refresh(&self) -> JoinHandle<()> {
        self.state
            .send_modify(|snapshot| *snapshot = Arc::new(snapshot.as_loading()));

        let client = self.client.clone();
        let state = Arc::clone(&self.state);
        let metrics = Arc::clone(&self.metrics);

        tokio::spawn(async move {
            let started = Instant::now();
            let records = build_records(&client).await;
            let snapshot = CatalogSnapshot::from_records(records, Some(Utc::now()));

            let resolved_defaults = snapshot
                .records()
                .iter()
                .filter(|record| record.default_handler().is_some())
                .count();
            info!(
                extensions = snapshot.len(),
                resolved_defaults,
                elapsed_ms = started.elapsed().as_millis() as u64,
                "Catalog refreshed"
            );

            state.send_replace(Arc::new(snapshot));
            metrics.refresh_completed();
        })
    }

    /// Add an extension that discovery did not report.
    ///
    /// A leading dot is ignored. Fails when the input is empty or the
    /// extension is already catalogued; otherwise the new record (with its
    /// current default handler) is published and returned.
    pub async fn add_custom_extension(&mut self, raw: &str) -> Result<FileTypeRecord> {
        let extension = normalize_extension(raw).ok_or(CatalogError::EmptyExtension)?;
        if self.snapshot().contains(&extension) {
            return Err(CatalogError::DuplicateExtension(extension));
        }

        let record = resolve_record(&self.client, extension).await;
        self.handlers_for(record.type_identifier()).await;

        let published = record.clone();
        self.state
            .send_modify(|snapshot| *snapshot = Arc::new(snapshot.with_record(published)));

        info!(
            extension = record.extension(),
            type_identifier = record.type_identifier(),
            "Custom extension added"
        );
        Ok(record)
    }

    /// Make `app` the default handler for `extension`.
    ///
    /// The catalog record is patched only after the registry acknowledges the
    /// write; on failure nothing local changes.
    pub async fn set_handler(&self, app: &HandlerApp, extension: &str) -> Result<()> {
        let extension = normalize_extension(extension).ok_or(CatalogError::EmptyExtension)?;

        if let Err(error) = self.client.set_default_handler(&app.bundle_id, &extension).await {
            warn!(%error, %extension, bundle_id = %app.bundle_id, "Handler write rejected");
            self.metrics.handler_write_failed();
            return Err(error.into());
        }
        self.metrics.handler_written();

        self.state.send_if_modified(|snapshot| {
            match snapshot.with_default_handler(&extension, app.clone()) {
                Some(next) => {
                    *snapshot = Arc::new(next);
                    true
                }
                None => false,
            }
        });

        info!(%extension, bundle_id = %app.bundle_id, "Default handler set");
        Ok(())
    }

    /// Applications able to open a type, queried once and then cached for
    /// the lifetime of the catalog.
    pub async fn handlers_for(&mut self, type_identifier: &str) -> &[HandlerApp] {
        if self.cache.contains(type_identifier) {
            self.metrics.handler_cache_hit();
            debug!(type_identifier, "Handler cache hit");
        } else {
            self.metrics.handler_cache_miss();
            debug!(type_identifier, "Handler cache miss");
            let handlers = self.client.all_handlers(type_identifier).await;
            self.cache.insert(type_identifier, handlers);
        }

        self.cache.get(type_identifier).unwrap_or_default()
    }

    pub fn cache(&self) -> &HandlerCache {
        &self.cache
    }
}

async fn build_records(client: &RegistryClient) -> Vec<FileTypeRecord> {
    let extensions = client.discover_extensions().await;
    let mut records = Vec::with_capacity(extensions.len());
    for extension in extensions {
        records.push(resolve_record(client, extension).await);
    }
    records
}

async fn resolve_record(client: &RegistryClient, extension: String) -> FileTypeRecord {
    let resolved = client.resolve_type(&extension).await;
    let default_handler = match &resolved {
        Some(resolved) => client.default_handler_for_type(&resolved.identifier).await,
        None => None,
    };
    FileTypeRecord::new(extension, resolved).with_default_handler(default_handler)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::{InMemoryRegistry, ResolvedType, TypeFamily};

    fn backend() -> InMemoryRegistry {
        InMemoryRegistry::new()
            .with_type(
                "txt",
                ResolvedType::new("public.plain-text").with_families([TypeFamily::Text]),
            )
            .with_type(
                "pdf",
                ResolvedType::new("com.adobe.pdf").with_families([TypeFamily::Pdf]),
            )
            .with_default("public.plain-text", "com.apple.TextEdit")
            .with_handlers(
                "public.plain-text",
                ["com.apple.TextEdit", "com.microsoft.VSCode"],
            )
    }

    fn catalog(backend: Arc<InMemoryRegistry>) -> Catalog {
        Catalog::new(RegistryClient::new(backend))
    }

    #[tokio::test]
    async fn test_refresh_builds_sorted_records() {
        let catalog = catalog(Arc::new(backend()));
        catalog.refresh().await.unwrap();

        let snapshot = catalog.snapshot();
        assert!(!snapshot.is_loading());
        assert!(snapshot.refreshed_at().is_some());

        let extensions: Vec<_> = snapshot.records().iter().map(|r| r.extension()).collect();
        assert_eq!(extensions, vec!["pdf", "txt"]);

        let txt = snapshot.get("txt").unwrap();
        assert_eq!(txt.default_handler().unwrap().bundle_id, "com.apple.TextEdit");
        assert!(snapshot.get("pdf").unwrap().default_handler().is_none());
        assert_eq!(catalog.metrics().snapshot().refreshes, 1);
    }

    #[tokio::test]
    async fn test_refresh_with_failed_discovery_is_empty() {
        let catalog = catalog(Arc::new(backend().failing_dump()));
        catalog.refresh().await.unwrap();

        let snapshot = catalog.snapshot();
        assert!(snapshot.is_empty());
        assert!(!snapshot.is_loading());
    }

    #[tokio::test]
    async fn test_add_custom_extension_rejects_empty_and_duplicates() {
        let mut catalog = catalog(Arc::new(backend()));

        catalog.add_custom_extension("txt").await.unwrap();
        assert!(matches!(
            catalog.add_custom_extension(".txt").await,
            Err(CatalogError::DuplicateExtension(ext)) if ext == "txt"
        ));
        assert!(matches!(
            catalog.add_custom_extension(".").await,
            Err(CatalogError::EmptyExtension)
        ));
        assert_eq!(catalog.snapshot().len(), 1);
    }

    #[tokio::test]
    async fn test_add_custom_extension_warms_cache() {
        let backend = Arc::new(backend());
        let mut catalog = catalog(backend.clone());

        let record = catalog.add_custom_extension(".TXT").await.unwrap();
        assert_eq!(record.extension(), "txt");
        assert_eq!(record.default_handler().unwrap().name, "TextEdit");
        assert!(catalog.cache().contains("public.plain-text"));
        assert_eq!(backend.role_handler_calls(), 1);

        let handlers = catalog.handlers_for("public.plain-text").await;
        assert_eq!(handlers.len(), 2);
        assert_eq!(backend.role_handler_calls(), 1);
    }

    #[tokio::test]
    async fn test_add_unresolvable_extension() {
        let mut catalog = catalog(Arc::new(backend()));

        let record = catalog.add_custom_extension("qqq").await.unwrap();
        assert_eq!(record.type_identifier(), "dyn.qqq");
        assert!(record.default_handler().is_none());
        assert!(catalog.snapshot().contains("qqq"));
    }

    #[tokio::test]
    async fn test_set_handler_patches_record() {
        let catalog = catalog(Arc::new(backend()));
        catalog.refresh().await.unwrap();

        let vscode = catalog.client().application("com.microsoft.VSCode").await;
        catalog.set_handler(&vscode, "txt").await.unwrap();

        let snapshot = catalog.snapshot();
        assert_eq!(
            snapshot.get("txt").unwrap().default_handler().unwrap().bundle_id,
            "com.microsoft.VSCode"
        );
        assert_eq!(catalog.metrics().snapshot().handler_writes, 1);
    }

    #[tokio::test]
    async fn test_set_handler_failure_leaves_record() {
        let catalog = catalog(Arc::new(backend().reject_writes(-10814)));
        catalog.refresh().await.unwrap();

        let before = catalog.snapshot();
        let vscode = HandlerApp::new("com.microsoft.VSCode", None, None);
        let result = catalog.set_handler(&vscode, "txt").await;

        assert!(matches!(result, Err(CatalogError::Registry(_))));
        let after = catalog.snapshot();
        assert!(Arc::ptr_eq(&before, &after));
        assert_eq!(catalog.metrics().snapshot().handler_write_failures, 1);
    }
}
