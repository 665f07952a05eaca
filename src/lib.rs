pub mod catalog;
pub mod config;
pub mod filter;
pub mod observability;
pub mod registry;
