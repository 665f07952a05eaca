use async_trait::async_trait;
use std::path::PathBuf;
use thiserror::Error;

use super::types::ResolvedType;

/// Registry errors
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("no platform type is registered for extension '{0}'")]
    UnresolvedExtension(String),
    #[error("registry rejected {bundle_id} as default for {type_identifier} (status {status})")]
    Rejected {
        bundle_id: String,
        type_identifier: String,
        status: i32,
    },
    #[error("registry dump failed: {0}")]
    Dump(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("no launch services registry is available on this platform")]
    Unsupported,
}

/// Platform handler registry backend.
///
/// Implementations expose the raw primitives of the host's content-type
/// registry. Everything above this trait (name derivation, discovery parsing,
/// fail-open policy) lives in [`RegistryClient`](super::RegistryClient), so a
/// backend stays a thin adapter and test doubles stay simple.
#[async_trait]
pub trait LaunchRegistry: Send + Sync {
    /// Map a normalized extension (no leading dot) to its platform type.
    async fn resolve_type(&self, extension: &str) -> Option<ResolvedType>;

    /// Bundle id of the default handler for all roles on a type.
    async fn default_role_handler(&self, type_identifier: &str) -> Option<String>;

    /// Bundle ids of every application registered for any role on a type.
    async fn role_handlers(&self, type_identifier: &str) -> Vec<String>;

    /// Make `bundle_id` the default handler for all roles on a type.
    async fn set_default_role_handler(
        &self,
        type_identifier: &str,
        bundle_id: &str,
    ) -> Result<(), RegistryError>;

    /// Filesystem location of an application, if one can be found.
    async fn application_path(&self, bundle_id: &str) -> Option<PathBuf>;

    /// Raw text export of the registry database.
    async fn dump(&self) -> Result<String, RegistryError>;
}
