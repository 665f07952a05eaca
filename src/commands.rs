use serde::Serialize;
use std::sync::Arc;
use tracing::{info, warn};

use crate::cli::{Commands, HandlersArgs, ListArgs, SetArgs};
use openwith::catalog::{Catalog, CatalogError, FileTypeRecord};
use openwith::config::Config;
use openwith::filter::{Selection, ViewQuery, unique_apps};
use openwith::registry::{HandlerApp, LaunchRegistry, RegistryClient, RegistryError};

type AnyError = Box<dyn std::error::Error + Send + Sync + 'static>;

pub async fn run(command: Commands, config: Config) -> Result<(), AnyError> {
    match command {
        Commands::List(args) => list(args, &config).await,
        Commands::Apps(args) => apps(args.json, &config).await,
        Commands::Handlers(args) => handlers(args, &config).await,
        Commands::Set(args) => set(args, &config).await,
        Commands::Config => {
            print!("{}", toml::to_string_pretty(&config)?);
            Ok(())
        }
    }
}

#[cfg(target_os = "macos")]
fn platform_registry(config: &Config) -> Result<Arc<dyn LaunchRegistry>, RegistryError> {
    use openwith::registry::LaunchServicesRegistry;

    Ok(Arc::new(LaunchServicesRegistry::new(
        config.registry.lsregister_path.clone(),
    )))
}

#[cfg(not(target_os = "macos"))]
fn platform_registry(_config: &Config) -> Result<Arc<dyn LaunchRegistry>, RegistryError> {
    Err(RegistryError::Unsupported)
}

fn catalog(config: &Config) -> Result<Catalog, AnyError> {
    let backend = platform_registry(config)?;
    Ok(Catalog::new(RegistryClient::from_config(
        backend,
        &config.registry,
    )))
}

async fn refreshed_catalog(config: &Config) -> Result<Catalog, AnyError> {
    let catalog = catalog(config)?;
    catalog.refresh().await?;
    Ok(catalog)
}

async fn list(args: ListArgs, config: &Config) -> Result<(), AnyError> {
    let mut catalog = refreshed_catalog(config).await?;

    for extension in &args.add {
        match catalog.add_custom_extension(extension).await {
            Ok(_) | Err(CatalogError::DuplicateExtension(_)) => {}
            Err(error) => warn!(%error, extension = %extension, "Skipping extension"),
        }
    }

    let selection = match args.app {
        Some(bundle_id) => Selection::App(bundle_id),
        None => Selection::Category(args.category),
    };
    let query = ViewQuery::new(selection, args.search.as_deref().unwrap_or_default());

    let snapshot = catalog.snapshot();
    let view = query.apply(snapshot.records());
    info!(shown = view.len(), total = snapshot.len(), "Listing file types");

    if args.output.json {
        println!("{}", serde_json::to_string_pretty(&view)?);
    } else if view.is_empty() {
        println!("No file types found");
    } else {
        print_records(&view);
    }
    Ok(())
}

async fn apps(json: bool, config: &Config) -> Result<(), AnyError> {
    let catalog = refreshed_catalog(config).await?;
    let apps = unique_apps(catalog.snapshot().records());

    if json {
        println!("{}", serde_json::to_string_pretty(&apps)?);
    } else {
        for app in &apps {
            println!("{:<32} {}", app.name, app.bundle_id);
        }
    }
    Ok(())
}

#[derive(Serialize)]
struct HandlersReport<'a> {
    record: &'a FileTypeRecord,
    handlers: &'a [HandlerApp],
}

async fn handlers(args: HandlersArgs, config: &Config) -> Result<(), AnyError> {
    // A one-record catalog is enough; no discovery needed
    let mut catalog = catalog(config)?;
    let record = catalog.add_custom_extension(&args.extension).await?;
    let handlers = catalog.handlers_for(record.type_identifier()).await;

    if args.output.json {
        let report = HandlersReport {
            record: &record,
            handlers,
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    print_records(&[&record]);
    println!();
    if handlers.is_empty() {
        println!("No registered handlers");
    }
    let current = record.default_handler();
    for handler in handlers {
        let marker = if Some(handler) == current { "*" } else { " " };
        println!("{marker} {:<32} {}", handler.name, handler.bundle_id);
    }
    Ok(())
}

async fn set(args: SetArgs, config: &Config) -> Result<(), AnyError> {
    let catalog = catalog(config)?;
    let app = catalog.client().application(args.bundle_id).await;

    catalog.set_handler(&app, &args.extension).await?;
    println!("{} now opens .{}", app, args.extension.trim_start_matches('.'));
    Ok(())
}

fn print_records(records: &[&FileTypeRecord]) {
    println!("{:<12} {:<40} {}", "EXTENSION", "TYPE", "DEFAULT");
    for record in records {
        let default = record
            .default_handler()
            .map(|handler| handler.to_string())
            .unwrap_or_else(|| "-".to_string());
        println!(
            "{:<12} {:<40} {}",
            format!(".{}", record.extension()),
            record.type_identifier(),
            default
        );
    }
}
