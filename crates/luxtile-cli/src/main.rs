//! CLI entry point - the composition root.
//!
//! Command dispatch only; all wiring happens in the web adapter's bootstrap.

mod parser;

use clap::Parser;

use luxtile_axum::{ServerConfig, start_server};
use luxtile_catalog::CatalogConfig;
use luxtile_core::BasePaths;

use parser::{Cli, Commands};

fn init_tracing(verbose: bool) {
    use tracing_subscriber::EnvFilter;

    let default_filter = if verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let Some(command) = cli.command else {
        use clap::CommandFactory;
        Cli::command().print_help()?;
        return Ok(());
    };

    match command {
        Commands::Serve {
            port,
            catalog_url,
            cdn_base,
            allow_origins,
        } => {
            let mut catalog = CatalogConfig::default();
            if let Some(url) = catalog_url {
                catalog = catalog.with_catalog_url(url);
            }
            if let Some(base) = cdn_base {
                catalog = catalog.with_cdn_base(base);
            }

            let mut config = ServerConfig::with_defaults()?
                .with_port(port)
                .with_catalog(catalog);
            if let Some(base_dir) = cli.base_dir {
                config = config.with_base_dir(base_dir);
            }
            if !allow_origins.is_empty() {
                config = config.with_allowed_origins(allow_origins);
            }

            start_server(config).await?;
        }
        Commands::Paths => {
            let base_dir = match cli.base_dir {
                Some(dir) => dir,
                None => luxtile_core::default_base_dir()
                    .ok_or_else(|| anyhow::anyhow!("no platform data directory available"))?,
            };
            let paths = BasePaths::new(&base_dir);

            println!("base:            {}", paths.base().display());
            println!("live tree:       {}", paths.live_root().display());
            println!("staging area:    {}", paths.staging_root().display());
            println!("version records: {}", paths.versions_dir().display());
            println!("tile archives:   {}", paths.mbtiles_dir().display());
        }
    }

    Ok(())
}
