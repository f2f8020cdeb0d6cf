use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::{info, level_filters::LevelFilter};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use bandaweb3_catalog_server::catalog::{
    bundled_catalog, load_catalog, sorted_by_date_desc, DatasetSource, Episode, EpisodeCatalog,
    EpisodeStore, StatusGroup,
};
use bandaweb3_catalog_server::config::{parse_path, AppConfig, CliConfig, FileConfig};
use bandaweb3_catalog_server::export::export_site;
use bandaweb3_catalog_server::render::PageRenderer;

#[derive(Parser, Debug)]
struct CliArgs {
    /// Path to TOML configuration file, the same one `catalog-server` reads.
    /// Values in the file override CLI arguments.
    #[clap(long, global = true, value_parser = parse_path)]
    pub config: Option<PathBuf>,

    /// Episodes dataset to use instead of the one bundled in the binary.
    #[clap(long, global = true, value_parser = parse_path)]
    pub dataset: Option<PathBuf>,

    #[clap(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the episodes, most recent first.
    List {
        /// Only list episodes in this group.
        #[clap(long, value_enum)]
        group: Option<StatusGroup>,
    },
    /// Print one episode as JSON.
    Show { id: String },
    /// Render the whole site into a directory.
    Export {
        out_dir: PathBuf,

        /// Directory with the public assets (flyers/, audio/) to copy along.
        #[clap(long, value_parser = parse_path)]
        public_dir: Option<PathBuf>,
    },
}

fn print_list(store: &dyn EpisodeStore, group: Option<StatusGroup>) {
    let episodes: Vec<&Episode> = match group {
        Some(group) => store.get_by_status(group),
        None => store.get_all().iter().collect(),
    };
    let episodes = sorted_by_date_desc(episodes);

    println!(
        "Episodes: {} ({} declared)\n",
        episodes.len(),
        store.get_count()
    );
    println!("{:<12} | {:<8} | {:<10} | Title", "Date", "#", "Status");
    println!("{}", "-".repeat(80));
    for episode in episodes {
        let status = episode
            .status
            .as_ref()
            .map(|s| s.as_str())
            .unwrap_or("-");
        println!(
            "{:<12} | {:<8} | {:<10} | {}",
            episode.date, episode.number, status, episode.title
        );
    }
}

fn main() -> Result<()> {
    let cli_args = CliArgs::parse();

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::WARN.into())
                .with_env_var("LOG_LEVEL")
                .from_env_lossy(),
        )
        .try_init()?;

    let file_config = match &cli_args.config {
        Some(path) => {
            info!("Loading configuration from {:?}", path);
            Some(FileConfig::load(path)?)
        }
        None => None,
    };
    let cli_config = CliConfig {
        dataset_path: cli_args.dataset.clone(),
        public_dir: match &cli_args.command {
            Command::Export { public_dir, .. } => public_dir.clone(),
            _ => None,
        },
        ..CliConfig::default()
    };
    let app_config = AppConfig::resolve(&cli_config, file_config)?;

    let loaded: EpisodeCatalog;
    let store: &dyn EpisodeStore = match &app_config.dataset_path {
        Some(path) => {
            loaded = load_catalog(&DatasetSource::File(path.clone()))?;
            &loaded
        }
        None => bundled_catalog(),
    };

    match cli_args.command {
        Command::List { group } => print_list(store, group),
        Command::Show { id } => {
            let episode = store
                .get_by_id(&id)
                .with_context(|| format!("No episode with number \"{}\".", id))?;
            println!("{}", serde_json::to_string_pretty(episode)?);
        }
        Command::Export { out_dir, .. } => {
            let renderer = PageRenderer::new(app_config.site)?;
            let summary = export_site(
                store,
                &renderer,
                &out_dir,
                app_config.public_dir.as_deref(),
            )?;
            info!("{:?}", summary);
            println!(
                "Exported {} pages and {} assets to {}.",
                summary.html_pages,
                summary.assets,
                out_dir.display()
            );
            if !summary.skipped_episodes.is_empty() {
                println!("Skipped episodes: {}", summary.skipped_episodes.join(", "));
            }
        }
    }
    Ok(())
}
