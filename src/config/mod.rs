mod file_config;

pub use file_config::{FileConfig, SiteConfig};

use crate::server::RequestsLoggingLevel;
use anyhow::{bail, Result};
use clap::ValueEnum;
use std::path::PathBuf;

/// Texts shared by every rendered page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteSettings {
    pub title: String,
    pub tagline: String,
    pub twitter_url: String,
    /// Absolute address the site is published at, used by the RSS feed.
    pub base_url: String,
    pub language: String,
}

impl SiteSettings {
    /// Values of the `[site]` table, defaults for the ones it leaves out.
    pub fn resolve(site_config: Option<SiteConfig>) -> SiteSettings {
        let defaults = SiteSettings::default();
        let site_config = site_config.unwrap_or_default();
        SiteSettings {
            title: site_config.title.unwrap_or(defaults.title),
            tagline: site_config.tagline.unwrap_or(defaults.tagline),
            twitter_url: site_config.twitter_url.unwrap_or(defaults.twitter_url),
            base_url: site_config
                .base_url
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or(defaults.base_url),
            language: site_config.language.unwrap_or(defaults.language),
        }
    }
}

impl Default for SiteSettings {
    fn default() -> Self {
        Self {
            title: "BandaWeb3".to_string(),
            tagline: "Conversaciones sobre Web3, Blockchain y el futuro descentralizado"
                .to_string(),
            twitter_url: "https://twitter.com/BandaWeb3".to_string(),
            base_url: "https://bandaweb3.com".to_string(),
            language: "es".to_string(),
        }
    }
}

/// CLI arguments that can be used for config resolution.
/// This struct mirrors the CLI arguments that can be overridden by TOML config.
#[derive(Debug, Clone, Default)]
pub struct CliConfig {
    pub dataset_path: Option<PathBuf>,
    pub public_dir: Option<PathBuf>,
    pub port: u16,
    pub logging_level: RequestsLoggingLevel,
    pub content_cache_age_sec: usize,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    /// `None` means the dataset bundled in the binary.
    pub dataset_path: Option<PathBuf>,
    /// Directory holding `flyers/` and `audio/`, served and exported as is.
    pub public_dir: Option<PathBuf>,
    pub port: u16,
    pub logging_level: RequestsLoggingLevel,
    pub content_cache_age_sec: usize,
    pub site: SiteSettings,
}

impl AppConfig {
    /// Resolve configuration from CLI arguments and optional TOML file config.
    /// TOML values override CLI values where present.
    pub fn resolve(cli: &CliConfig, file_config: Option<FileConfig>) -> Result<Self> {
        let file = file_config.unwrap_or_default();

        let dataset_path = file
            .dataset_path
            .map(PathBuf::from)
            .or_else(|| cli.dataset_path.clone());
        if let Some(path) = &dataset_path {
            if !path.is_file() {
                bail!("Dataset file does not exist: {:?}", path);
            }
        }

        let public_dir = file
            .public_dir
            .map(PathBuf::from)
            .or_else(|| cli.public_dir.clone());
        if let Some(dir) = &public_dir {
            if !dir.is_dir() {
                bail!("public_dir is not a directory: {:?}", dir);
            }
        }

        let port = file.port.unwrap_or(cli.port);

        let logging_level = file
            .logging_level
            .and_then(|s| parse_logging_level(&s))
            .unwrap_or_else(|| cli.logging_level.clone());

        let content_cache_age_sec = file
            .content_cache_age_sec
            .unwrap_or(cli.content_cache_age_sec);

        let site = SiteSettings::resolve(file.site);

        Ok(AppConfig {
            dataset_path,
            public_dir,
            port,
            logging_level,
            content_cache_age_sec,
            site,
        })
    }
}

fn parse_logging_level(s: &str) -> Option<RequestsLoggingLevel> {
    RequestsLoggingLevel::from_str(s, true).ok()
}

/// Clap value parser for path arguments, resolved against the working directory.
pub fn parse_path(s: &str) -> Result<PathBuf, String> {
    let path_buf = PathBuf::from(s);
    let resolved_path = match path_buf.canonicalize() {
        Ok(path) => path,
        Err(msg) => {
            if msg.kind() == std::io::ErrorKind::NotFound {
                path_buf
            } else {
                return Err(format!("Error resolving path '{}': {}", s, msg));
            }
        }
    };
    if resolved_path.is_absolute() {
        return Ok(resolved_path);
    }
    let cwd = std::env::current_dir().map_err(|e| format!("Failed to get current dir: {}", e))?;
    Ok(cwd.join(resolved_path))
}
