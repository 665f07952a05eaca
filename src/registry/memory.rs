//! In-memory registry backend for tests and development.

use async_trait::async_trait;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::Notify;

use super::traits::{LaunchRegistry, RegistryError};
use super::types::ResolvedType;

#[derive(Debug, Clone, Default)]
enum DumpScript {
    /// `tags:` line per registered extension
    #[default]
    Synthesized,
    Text(String),
    Fail,
}

#[derive(Debug, Default)]
struct State {
    types: HashMap<String, ResolvedType>,
    defaults: HashMap<String, String>,
    handlers: HashMap<String, Vec<String>>,
    paths: HashMap<String, PathBuf>,
    dump: DumpScript,
    reject_status: Option<i32>,
}

/// Scriptable stand-in for the host registry.
///
/// Builder methods seed the initial contents; the `set_*` methods change
/// them while a test is running, to simulate the registry moving underneath
/// the catalog.
#[derive(Debug, Default)]
pub struct InMemoryRegistry {
    state: Mutex<State>,
    dump_gate: Option<Arc<Notify>>,
    role_handler_calls: AtomicUsize,
    write_calls: AtomicUsize,
}

impl InMemoryRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_type(self, extension: &str, resolved: ResolvedType) -> Self {
        self.lock().types.insert(extension.to_string(), resolved);
        self
    }

    pub fn with_default(self, type_identifier: &str, bundle_id: &str) -> Self {
        self.set_default(type_identifier, bundle_id);
        self
    }

    pub fn with_handlers<I, S>(self, type_identifier: &str, bundle_ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.set_handlers(type_identifier, bundle_ids);
        self
    }

    pub fn with_app_path(self, bundle_id: &str, path: PathBuf) -> Self {
        self.lock().paths.insert(bundle_id.to_string(), path);
        self
    }

    /// Serve a fixed dump text instead of one synthesized from the types
    pub fn with_dump(self, dump: impl Into<String>) -> Self {
        self.lock().dump = DumpScript::Text(dump.into());
        self
    }

    pub fn failing_dump(self) -> Self {
        self.lock().dump = DumpScript::Fail;
        self
    }

    /// Hold every `dump` call until the gate is notified
    pub fn with_dump_gate(mut self, gate: Arc<Notify>) -> Self {
        self.dump_gate = Some(gate);
        self
    }

    /// Refuse all writes with the given status code
    pub fn reject_writes(self, status: i32) -> Self {
        self.lock().reject_status = Some(status);
        self
    }

    pub fn set_default(&self, type_identifier: &str, bundle_id: &str) {
        self.lock()
            .defaults
            .insert(type_identifier.to_string(), bundle_id.to_string());
    }

    pub fn set_handlers<I, S>(&self, type_identifier: &str, bundle_ids: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let bundle_ids = bundle_ids.into_iter().map(Into::into).collect();
        self.lock()
            .handlers
            .insert(type_identifier.to_string(), bundle_ids);
    }

    /// Number of `role_handlers` queries served so far
    pub fn role_handler_calls(&self) -> usize {
        self.role_handler_calls.load(Ordering::Relaxed)
    }

    /// Number of `set_default_role_handler` calls received so far
    pub fn write_calls(&self) -> usize {
        self.write_calls.load(Ordering::Relaxed)
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl LaunchRegistry for InMemoryRegistry {
    async fn resolve_type(&self, extension: &str) -> Option<ResolvedType> {
        self.lock().types.get(extension).cloned()
    }

    async fn default_role_handler(&self, type_identifier: &str) -> Option<String> {
        self.lock().defaults.get(type_identifier).cloned()
    }

    async fn role_handlers(&self, type_identifier: &str) -> Vec<String> {
        self.role_handler_calls.fetch_add(1, Ordering::Relaxed);
        self.lock()
            .handlers
            .get(type_identifier)
            .cloned()
            .unwrap_or_default()
    }

    async fn set_default_role_handler(
        &self,
        type_identifier: &str,
        bundle_id: &str,
    ) -> Result<(), RegistryError> {
        self.write_calls.fetch_add(1, Ordering::Relaxed);
        let mut state = self.lock();
        if let Some(status) = state.reject_status {
            return Err(RegistryError::Rejected {
                bundle_id: bundle_id.to_string(),
                type_identifier: type_identifier.to_string(),
                status,
            });
        }
        state
            .defaults
            .insert(type_identifier.to_string(), bundle_id.to_string());
        Ok(())
    }

    async fn application_path(&self, bundle_id: &str) -> Option<PathBuf> {
        self.lock().paths.get(bundle_id).cloned()
    }

    async fn dump(&self) -> Result<String, RegistryError> {
        if let Some(gate) = &self.dump_gate {
            gate.notified().await;
        }

        let state = self.lock();
        match &state.dump {
            DumpScript::Synthesized => Ok(state
                .types
                .keys()
                .map(|ext| format!("tags:                       .{ext}\n"))
                .collect()),
            DumpScript::Text(text) => Ok(text.clone()),
            DumpScript::Fail => Err(RegistryError::Dump("scripted failure".to_string())),
        }
    }
}
