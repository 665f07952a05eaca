use thiserror::Error;

use crate::registry::RegistryError;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Extension is empty")]
    EmptyExtension,

    #[error("Extension already in catalog: {0}")]
    DuplicateExtension(String),

    #[error("Registry error: {0}")]
    Registry(#[from] RegistryError),
}

pub type Result<T> = std::result::Result<T, CatalogError>;
