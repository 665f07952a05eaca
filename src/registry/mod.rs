//! Boundary to the host's handler registry.
//!
//! ## Key Components
//!
//! - [`LaunchRegistry`] - backend trait over the platform primitives
//! - [`RegistryClient`] - lookups, writes and discovery built on a backend
//! - [`InMemoryRegistry`] - scriptable backend for tests
//! - `LaunchServicesRegistry` - the macOS backend (macOS builds only)

mod client;
pub mod dump;
#[cfg(target_os = "macos")]
mod launch_services;
mod memory;
mod traits;
mod types;

pub use client::RegistryClient;
#[cfg(target_os = "macos")]
pub use launch_services::LaunchServicesRegistry;
pub use memory::InMemoryRegistry;
pub use traits::{LaunchRegistry, RegistryError};
pub use types::{HandlerApp, ResolvedType, TypeFamily};
