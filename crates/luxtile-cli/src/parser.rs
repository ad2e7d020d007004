//! CLI parser and top-level argument handling.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use luxtile_axum::bootstrap::DEFAULT_PORT;

/// Command-line interface for the offline map backend.
#[derive(Parser)]
#[command(name = "luxtile")]
#[command(about = "Offline map backend for the Geoportail Luxembourg app")]
#[command(version)]
pub struct Cli {
    /// Override the base directory for this invocation
    #[arg(long = "base-dir", global = true)]
    pub base_dir: Option<PathBuf>,

    /// Enable verbose/debug output
    #[arg(short = 'v', long = "verbose", global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the HTTP backend
    Serve {
        /// Listen port
        #[arg(long, default_value_t = DEFAULT_PORT)]
        port: u16,

        /// Override the remote catalog URL
        #[arg(long = "catalog-url", env = "LUXTILE_CATALOG_URL")]
        catalog_url: Option<String>,

        /// Override the remote CDN base URL
        #[arg(long = "cdn-base", env = "LUXTILE_CDN_BASE")]
        cdn_base: Option<String>,

        /// Restrict CORS to these origins (repeatable; default allows all)
        #[arg(long = "allow-origin")]
        allow_origins: Vec<String>,
    },
    /// Print the resolved on-disk layout
    Paths,
}
