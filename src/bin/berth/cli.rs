//! CLI definitions using clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// berth - dependency resolution for Go workspaces
#[derive(Parser)]
#[command(name = "berth")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Display the import tree of a package
    Tree(TreeArgs),

    /// Read dependencies from another tool's metadata files
    Import(ImportArgs),

    /// Show where an import name resolves to
    Locate(LocateArgs),

    /// Report release information for the project's dependencies
    Versions(VersionsArgs),

    /// Manage the shared repository cache
    Cache(CacheArgs),
}

#[derive(Args)]
pub struct TreeArgs {
    /// Package directory (defaults to the current directory)
    pub dir: Option<PathBuf>,

    /// Include standard library packages
    #[arg(long)]
    pub core: bool,
}

#[derive(Args)]
pub struct ImportArgs {
    /// Project directory (defaults to the current directory)
    pub dir: Option<PathBuf>,

    /// Merge the imported dependencies into berth.yaml
    #[arg(long)]
    pub write: bool,
}

#[derive(Args)]
pub struct LocateArgs {
    /// Import name to resolve
    pub name: String,

    /// Directory the import is made from (defaults to the current directory)
    #[arg(long)]
    pub from: Option<PathBuf>,
}

#[derive(Args)]
pub struct VersionsArgs {
    /// Project directory (defaults to the current directory)
    pub dir: Option<PathBuf>,
}

#[derive(Args)]
pub struct CacheArgs {
    #[command(subcommand)]
    pub command: CacheCommands,
}

#[derive(Subcommand)]
pub enum CacheCommands {
    /// Show the cache location
    Path,

    /// Show the cache key of a repository
    Key {
        /// Repository URL or import name
        repo: String,
    },

    /// Remove all cached repositories
    Clean,
}
