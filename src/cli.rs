use clap::{Parser, Subcommand};
use std::path::PathBuf;

use openwith::filter::Category;

#[derive(Parser, Debug)]
#[command(name = "openwith")]
#[command(about = "Inspect and change default applications for file extensions", long_about = None)]
pub struct Cli {
    /// Configuration file (overrides OPENWITH_CONFIG)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List known extensions with their default handlers
    List(ListArgs),
    /// List applications that are the default for at least one extension
    Apps(OutputArgs),
    /// Show the default and all capable handlers for one extension
    Handlers(HandlersArgs),
    /// Make an application the default handler for an extension
    Set(SetArgs),
    /// Print the effective configuration
    Config,
}

#[derive(clap::Args, Debug)]
pub struct OutputArgs {
    /// Print JSON instead of a table
    #[arg(long)]
    pub json: bool,
}

#[derive(clap::Args, Debug)]
pub struct ListArgs {
    /// Category filter
    #[arg(long, default_value_t = Category::All)]
    pub category: Category,

    /// Only extensions whose default handler has this bundle id
    #[arg(long, conflicts_with = "category")]
    pub app: Option<String>,

    /// Fuzzy search over extension, type identifier and handler name
    #[arg(long, short)]
    pub search: Option<String>,

    /// Extra extensions to include even if discovery misses them
    #[arg(long = "add", value_name = "EXT")]
    pub add: Vec<String>,

    #[command(flatten)]
    pub output: OutputArgs,
}

#[derive(clap::Args, Debug)]
pub struct HandlersArgs {
    /// File extension, with or without the leading dot
    pub extension: String,

    #[command(flatten)]
    pub output: OutputArgs,
}

#[derive(clap::Args, Debug)]
pub struct SetArgs {
    /// File extension, with or without the leading dot
    pub extension: String,

    /// Bundle identifier of the new default application
    pub bundle_id: String,
}
