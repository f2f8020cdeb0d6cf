use anyhow::{bail, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, level_filters::LevelFilter};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use bandaweb3_catalog_server::catalog::{build_catalog, load_catalog, DatasetSource, EpisodeStore};
use bandaweb3_catalog_server::config::{self, parse_path};
use bandaweb3_catalog_server::render::PageRenderer;
use bandaweb3_catalog_server::server::{run_server, RequestsLoggingLevel, ServerConfig};

#[derive(Parser, Debug)]
struct CliArgs {
    /// Path to TOML configuration file. Values in the file override CLI arguments.
    #[clap(long, value_parser = parse_path)]
    pub config: Option<PathBuf>,

    /// Episodes dataset to load instead of the one bundled in the binary.
    #[clap(long, value_parser = parse_path)]
    pub dataset: Option<PathBuf>,

    /// Directory with the public assets (flyers/, audio/).
    #[clap(long, value_parser = parse_path)]
    pub public_dir: Option<PathBuf>,

    /// The port to listen on.
    #[clap(short, long, default_value_t = 3000)]
    pub port: u16,

    /// The level of logging to perform on each request.
    #[clap(long, default_value = "path")]
    pub logging_level: RequestsLoggingLevel,

    /// How long clients may reuse pages, in seconds.
    #[clap(long, default_value_t = 60)]
    pub content_cache_age_sec: usize,

    /// Check the dataset, report its problems and exit.
    #[clap(long)]
    pub check_only: bool,
}

impl From<&CliArgs> for config::CliConfig {
    fn from(args: &CliArgs) -> Self {
        config::CliConfig {
            dataset_path: args.dataset.clone(),
            public_dir: args.public_dir.clone(),
            port: args.port,
            logging_level: args.logging_level.clone(),
            content_cache_age_sec: args.content_cache_age_sec,
        }
    }
}

fn check_only(source: &DatasetSource) -> Result<()> {
    let catalog_result = build_catalog(source);
    let problems = catalog_result.problems;
    let catalog = catalog_result.catalog;

    if !problems.is_empty() {
        println!("Found {} problems:", problems.len());
        for problem in problems.iter() {
            println!("- {:?}", problem);
        }
        println!();
    }

    match (&catalog, problems.is_empty()) {
        (Some(_), true) => println!("Catalog checked, no issues found."),
        (Some(_), false) => println!("Catalog was built, but check the issues above."),
        (None, _) => bail!("Check the problems above, the catalog could not be initialized."),
    }
    if let Some(catalog) = catalog {
        println!(
            "Catalog has:\n{} episodes ({} declared)\n{} hosted\n{} co-hosted\n{} scheduled",
            catalog.get_loaded_count(),
            catalog.get_count(),
            catalog.get_hosted().len(),
            catalog.get_cohosted().len(),
            catalog.get_scheduled().len()
        );
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli_args = CliArgs::parse();

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .with_env_var("LOG_LEVEL")
                .from_env_lossy(),
        )
        .try_init()?;

    let file_config = match &cli_args.config {
        Some(path) => {
            info!("Loading configuration from {:?}", path);
            Some(config::FileConfig::load(path)?)
        }
        None => None,
    };

    // Resolve final configuration (TOML overrides CLI)
    let cli_config: config::CliConfig = (&cli_args).into();
    let app_config = config::AppConfig::resolve(&cli_config, file_config)?;
    let source = DatasetSource::from_optional_path(app_config.dataset_path.as_deref());

    if cli_args.check_only {
        return check_only(&source);
    }

    info!("Configuration loaded:");
    info!("  dataset: {}", source);
    info!("  public_dir: {:?}", app_config.public_dir);
    info!("  port: {}", app_config.port);

    let catalog = load_catalog(&source)?;
    let renderer = PageRenderer::new(app_config.site.clone())?;

    let server_config = ServerConfig {
        requests_logging_level: app_config.logging_level,
        port: app_config.port,
        content_cache_age_sec: app_config.content_cache_age_sec,
        public_dir: app_config.public_dir,
    };

    info!("Ready to serve at port {}!", server_config.port);
    run_server(server_config, Arc::new(catalog), renderer).await
}
