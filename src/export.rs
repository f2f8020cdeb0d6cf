//! Static site export: every page rendered once into a directory that any
//! static host can serve.

use crate::catalog::{is_safe_path_segment, Episode, EpisodeStore};
use crate::render::PageRenderer;
use anyhow::{Context, Result};
use serde::Serialize;
use std::path::Path;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

#[derive(Debug, Default, PartialEq, Eq)]
pub struct ExportSummary {
    /// HTML pages written. `rss.xml` and `episodes.json` are not counted.
    pub html_pages: usize,
    pub skipped_episodes: Vec<String>,
    pub assets: usize,
}

#[derive(Serialize)]
struct ExportedMetadata<'a> {
    total_episodes: u64,
    last_updated: &'a str,
}

/// Same layout as the input dataset, so the export can be loaded back.
#[derive(Serialize)]
struct ExportedDataset<'a> {
    metadata: ExportedMetadata<'a>,
    episodes: &'a [Episode],
}

fn write_file(path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory {}", parent.display()))?;
    }
    std::fs::write(path, contents).with_context(|| format!("Failed to write {}", path.display()))
}

fn copy_public_dir(public_dir: &Path, out_dir: &Path) -> Result<usize> {
    let mut copied = 0;
    for entry in WalkDir::new(public_dir) {
        let entry = entry?;
        let relative = entry.path().strip_prefix(public_dir)?;
        let target = out_dir.join(relative);
        if entry.file_type().is_dir() {
            std::fs::create_dir_all(&target)
                .with_context(|| format!("Failed to create directory {}", target.display()))?;
        } else if entry.file_type().is_file() {
            std::fs::copy(entry.path(), &target).with_context(|| {
                format!(
                    "Failed to copy {} to {}",
                    entry.path().display(),
                    target.display()
                )
            })?;
            debug!("Copied {}", relative.display());
            copied += 1;
        }
    }
    Ok(copied)
}

pub fn export_site(
    store: &dyn EpisodeStore,
    renderer: &PageRenderer,
    out_dir: &Path,
    public_dir: Option<&Path>,
) -> Result<ExportSummary> {
    let mut summary = ExportSummary::default();
    std::fs::create_dir_all(out_dir)
        .with_context(|| format!("Failed to create output directory {}", out_dir.display()))?;

    // Assets first, generated pages win on name clashes.
    if let Some(public_dir) = public_dir {
        info!("Copying public assets from {}...", public_dir.display());
        summary.assets = copy_public_dir(public_dir, out_dir)?;
    }

    write_file(&out_dir.join("index.html"), &renderer.render_home(store)?)?;
    write_file(&out_dir.join("404.html"), &renderer.render_not_found(None)?)?;
    write_file(
        &out_dir.join("cohosted").join("index.html"),
        &renderer.render_cohosted(store)?,
    )?;
    summary.html_pages += 3;
    write_file(&out_dir.join("rss.xml"), &renderer.render_feed(store)?)?;

    for episode in store.get_all() {
        if !is_safe_path_segment(&episode.number) {
            warn!(
                "Skipping episode \"{}\", its number can't be used as a path",
                episode.number
            );
            summary.skipped_episodes.push(episode.number.clone());
            continue;
        }
        let page_path = out_dir
            .join("episodes")
            .join(&episode.number)
            .join("index.html");
        write_file(&page_path, &renderer.render_episode(store, episode)?)?;
        summary.html_pages += 1;
    }

    let dataset = ExportedDataset {
        metadata: ExportedMetadata {
            total_episodes: store.get_count(),
            last_updated: store.get_last_updated(),
        },
        episodes: store.get_all(),
    };
    write_file(
        &out_dir.join("episodes.json"),
        &serde_json::to_string_pretty(&dataset)?,
    )?;

    info!(
        "Exported {} pages and {} assets to {}",
        summary.html_pages,
        summary.assets,
        out_dir.display()
    );
    Ok(summary)
}
