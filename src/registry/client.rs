use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::{debug, warn};

use super::dump::{DEFAULT_MAX_EXTENSION_LEN, parse_extensions};
use super::traits::{LaunchRegistry, RegistryError};
use super::types::{HandlerApp, ResolvedType};
use crate::config::RegistryConfig;

/// Client for the host handler registry.
///
/// This is the only path through which the rest of the crate reads or writes
/// handler assignments. The backend is injected so tests can substitute
/// [`InMemoryRegistry`](super::InMemoryRegistry) for the real OS service.
#[derive(Clone)]
pub struct RegistryClient {
    backend: Arc<dyn LaunchRegistry>,
    max_extension_len: usize,
}

impl RegistryClient {
    pub fn new(backend: Arc<dyn LaunchRegistry>) -> Self {
        Self {
            backend,
            max_extension_len: DEFAULT_MAX_EXTENSION_LEN,
        }
    }

    pub fn from_config(backend: Arc<dyn LaunchRegistry>, config: &RegistryConfig) -> Self {
        Self::new(backend).with_max_extension_len(config.max_extension_len)
    }

    /// Override the discovery length cutoff
    pub fn with_max_extension_len(mut self, max_extension_len: usize) -> Self {
        self.max_extension_len = max_extension_len;
        self
    }

    pub async fn resolve_type(&self, extension: &str) -> Option<ResolvedType> {
        self.backend.resolve_type(extension).await
    }

    /// Current default handler for an extension.
    ///
    /// `None` when the extension has no platform type or no default is set.
    pub async fn default_handler(&self, extension: &str) -> Option<HandlerApp> {
        let resolved = self.backend.resolve_type(extension).await?;
        self.default_handler_for_type(&resolved.identifier).await
    }

    pub async fn default_handler_for_type(&self, type_identifier: &str) -> Option<HandlerApp> {
        let bundle_id = self.backend.default_role_handler(type_identifier).await?;
        Some(self.application(bundle_id).await)
    }

    /// Every application able to open the type, in registry order.
    ///
    /// An unregistered type yields an empty list rather than an error.
    pub async fn all_handlers(&self, type_identifier: &str) -> Vec<HandlerApp> {
        let bundle_ids = self.backend.role_handlers(type_identifier).await;
        let mut handlers = Vec::with_capacity(bundle_ids.len());
        for bundle_id in bundle_ids {
            handlers.push(self.application(bundle_id).await);
        }
        handlers
    }

    /// Make `bundle_id` the default handler for an extension.
    ///
    /// Fails with [`RegistryError::UnresolvedExtension`] when the extension
    /// has no platform type, or with whatever the backend reports when the
    /// registry does not acknowledge the write.
    pub async fn set_default_handler(
        &self,
        bundle_id: &str,
        extension: &str,
    ) -> Result<(), RegistryError> {
        let resolved = self
            .backend
            .resolve_type(extension)
            .await
            .ok_or_else(|| RegistryError::UnresolvedExtension(extension.to_string()))?;

        self.backend
            .set_default_role_handler(&resolved.identifier, bundle_id)
            .await?;

        debug!(
            extension,
            bundle_id,
            type_identifier = %resolved.identifier,
            "Default handler updated"
        );
        Ok(())
    }

    /// Every extension the registry knows about.
    ///
    /// Fails open: a dump error is logged and yields an empty set.
    pub async fn discover_extensions(&self) -> BTreeSet<String> {
        match self.backend.dump().await {
            Ok(dump) => parse_extensions(&dump, self.max_extension_len),
            Err(error) => {
                warn!(%error, "Extension discovery failed, treating registry as empty");
                BTreeSet::new()
            }
        }
    }

    /// Describe an application by bundle id, locating it on disk if possible
    pub async fn application(&self, bundle_id: impl Into<String>) -> HandlerApp {
        let bundle_id = bundle_id.into();
        let path = self.backend.application_path(&bundle_id).await;
        HandlerApp::new(bundle_id, None, path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::{InMemoryRegistry, TypeFamily};
    use std::path::PathBuf;

    fn registry() -> InMemoryRegistry {
        InMemoryRegistry::new()
            .with_type(
                "txt",
                ResolvedType::new("public.plain-text").with_families([TypeFamily::Text]),
            )
            .with_type("pdf", ResolvedType::new("com.adobe.pdf"))
            .with_default("public.plain-text", "com.apple.TextEdit")
            .with_handlers(
                "public.plain-text",
                ["com.apple.TextEdit", "com.microsoft.VSCode"],
            )
            .with_app_path(
                "com.microsoft.VSCode",
                PathBuf::from("/Applications/Visual Studio Code.app"),
            )
    }

    #[tokio::test]
    async fn test_default_handler_resolves_through_type() {
        let client = RegistryClient::new(Arc::new(registry()));

        let handler = client.default_handler("txt").await.unwrap();
        assert_eq!(handler.bundle_id, "com.apple.TextEdit");
        assert_eq!(handler.name, "TextEdit");
        assert!(handler.path.is_none());
    }

    #[tokio::test]
    async fn test_default_handler_absent() {
        let client = RegistryClient::new(Arc::new(registry()));

        // Resolvable type without a default
        assert!(client.default_handler("pdf").await.is_none());
        // No type at all
        assert!(client.default_handler("zzz").await.is_none());
    }

    #[tokio::test]
    async fn test_all_handlers_keeps_registry_order() {
        let client = RegistryClient::new(Arc::new(registry()));

        let handlers = client.all_handlers("public.plain-text").await;
        let names: Vec<_> = handlers.iter().map(|h| h.name.as_str()).collect();
        assert_eq!(names, vec!["TextEdit", "Visual Studio Code"]);

        assert!(client.all_handlers("public.unknown").await.is_empty());
    }

    #[tokio::test]
    async fn test_set_default_handler_unresolved_extension() {
        let backend = Arc::new(registry());
        let client = RegistryClient::new(backend.clone());

        let result = client.set_default_handler("com.apple.TextEdit", "zzz").await;
        assert!(matches!(result, Err(RegistryError::UnresolvedExtension(ext)) if ext == "zzz"));
        assert_eq!(backend.write_calls(), 0);
    }

    #[tokio::test]
    async fn test_set_default_handler_writes_type() {
        let backend = Arc::new(registry());
        let client = RegistryClient::new(backend.clone());

        client
            .set_default_handler("com.microsoft.VSCode", "txt")
            .await
            .unwrap();

        let handler = client.default_handler("txt").await.unwrap();
        assert_eq!(handler.bundle_id, "com.microsoft.VSCode");
    }

    #[tokio::test]
    async fn test_set_default_handler_rejected() {
        let backend = Arc::new(registry().reject_writes(-54));
        let client = RegistryClient::new(backend);

        let result = client.set_default_handler("com.microsoft.VSCode", "txt").await;
        assert!(matches!(result, Err(RegistryError::Rejected { status: -54, .. })));
    }

    #[tokio::test]
    async fn test_discovery_fails_open() {
        let client = RegistryClient::new(Arc::new(registry().failing_dump()));
        assert!(client.discover_extensions().await.is_empty());
    }

    #[tokio::test]
    async fn test_discovery_respects_length_limit() {
        let backend = InMemoryRegistry::new().with_dump("tags: .abc, .abcdef");
        let client = RegistryClient::new(Arc::new(backend)).with_max_extension_len(3);

        let extensions = client.discover_extensions().await;
        assert_eq!(extensions.into_iter().collect::<Vec<_>>(), vec!["abc"]);
    }
}
