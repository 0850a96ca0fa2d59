//! CLI argument definitions using clap derive

use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// jlink-online - minimized Java runtimes on demand
///
/// Serves custom runtime images built with jlink from Adoptium releases,
/// or builds one directly to a file.
#[derive(Parser, Debug)]
#[command(name = "jlink-online")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity (-v info, -vv debug)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Configuration file path
    #[arg(short, long, global = true, env = "JLINK_ONLINE_CONFIG")]
    pub config: Option<PathBuf>,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the HTTP service
    Serve(ServeArgs),

    /// Build one runtime image to a file
    Build(BuildArgs),

    /// Query or refresh release metadata
    Releases(ReleasesArgs),

    /// Manage the base runtime cache
    Cache(CacheArgs),

    /// Show configuration
    Config(ConfigArgs),
}

/// Arguments for the serve command
#[derive(Parser, Debug)]
pub struct ServeArgs {
    /// Port to listen on (overrides config and PORT)
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Address to bind
    #[arg(long)]
    pub bind: Option<String>,
}

/// Arguments for the build command
#[derive(Parser, Debug)]
pub struct BuildArgs {
    /// Java version: 11, 11.0.8, 11.0.8+10, lts, ga or ea
    pub java_version: String,

    /// Target architecture
    #[arg(long, default_value = "x64")]
    pub arch: String,

    /// Target operating system
    #[arg(long, default_value = "linux")]
    pub os: String,

    /// JVM implementation
    #[arg(long, default_value = "hotspot")]
    pub implementation: String,

    /// Byte order of the image (default depends on the architecture)
    #[arg(long)]
    pub endian: Option<String>,

    /// Modules to include (comma-separated or repeated)
    #[arg(short, long, value_delimiter = ',')]
    pub modules: Vec<String>,

    /// Maven artifacts to add (group:artifact:version)
    #[arg(short, long, value_delimiter = ',')]
    pub artifacts: Vec<String>,

    /// Read modules from a module-info.java file
    #[arg(long)]
    pub module_info: Option<PathBuf>,

    /// Output directory or file (default: the archive name in the current directory)
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// Arguments for the releases command
#[derive(Parser, Debug)]
pub struct ReleasesArgs {
    #[command(subcommand)]
    pub action: ReleasesAction,
}

/// Release metadata actions
#[derive(Subcommand, Debug)]
pub enum ReleasesAction {
    /// Resolve a version for one platform
    Lookup {
        /// Java version or alias
        java_version: String,

        /// Architecture
        #[arg(long, default_value = "x64")]
        arch: String,

        /// Operating system
        #[arg(long, default_value = "linux")]
        os: String,

        /// JVM implementation
        #[arg(long, default_value = "hotspot")]
        implementation: String,

        /// Output format
        #[arg(short, long, value_enum, default_value = "table")]
        format: OutputFormat,
    },

    /// Rebuild the release cache from the index
    Refresh {
        /// Major versions to index (default: release.refresh_majors)
        #[arg(long, value_delimiter = ',')]
        majors: Vec<u32>,
    },
}

/// Arguments for the cache command
#[derive(Parser, Debug)]
pub struct CacheArgs {
    #[command(subcommand)]
    pub action: CacheAction,
}

/// Cache actions
#[derive(Subcommand, Debug)]
pub enum CacheAction {
    /// List cached base runtimes
    List {
        /// Output format
        #[arg(short, long, value_enum, default_value = "table")]
        format: OutputFormat,
    },

    /// Remove every cached base runtime
    Clear {
        /// Skip confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

/// Arguments for the config command
#[derive(Parser, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: Option<ConfigAction>,
}

/// Config actions
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show the effective configuration
    Show,

    /// Show the configuration file path
    Path,

    /// Write a default configuration file
    Init {
        /// Overwrite an existing file
        #[arg(short, long)]
        force: bool,
    },
}

/// Output format for list commands
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable table
    #[default]
    Table,
    /// JSON output
    Json,
    /// Plain text, one entry per line
    Plain,
}
