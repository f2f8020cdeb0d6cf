use super::{CatalogBuildResult, EpisodeCatalog, EpisodeStore};
use anyhow::{bail, Result};
use lazy_static::lazy_static;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// The dataset shipped inside the binary.
pub const BUNDLED_DATASET: &str = include_str!("../../data/episodes_database.json");

lazy_static! {
    static ref BUNDLED_CATALOG: EpisodeCatalog = EpisodeCatalog::from_json_str(BUNDLED_DATASET)
        .expect("The bundled episodes dataset does not parse, fix data/episodes_database.json.");
}

/// Process-wide catalog built from [`BUNDLED_DATASET`] on first access.
pub fn bundled_catalog() -> &'static EpisodeCatalog {
    &BUNDLED_CATALOG
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DatasetSource {
    Bundled,
    File(PathBuf),
}

impl DatasetSource {
    pub fn from_optional_path(path: Option<&Path>) -> DatasetSource {
        match path {
            Some(path) => DatasetSource::File(path.to_owned()),
            None => DatasetSource::Bundled,
        }
    }
}

impl std::fmt::Display for DatasetSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DatasetSource::Bundled => write!(f, "bundled dataset"),
            DatasetSource::File(path) => write!(f, "{}", path.display()),
        }
    }
}

pub fn build_catalog(source: &DatasetSource) -> CatalogBuildResult {
    match source {
        DatasetSource::Bundled => EpisodeCatalog::build_from_str(BUNDLED_DATASET),
        DatasetSource::File(path) => EpisodeCatalog::build(path),
    }
}

/// Loads the catalog, logging a summary and every problem found.
/// Fails only when the dataset could not be read or parsed.
pub fn load_catalog(source: &DatasetSource) -> Result<EpisodeCatalog> {
    info!("Loading episodes from {}...", source);
    let catalog_result = build_catalog(source);
    let problems = catalog_result.problems;
    let catalog = catalog_result.catalog;

    if !problems.is_empty() {
        warn!("Found {} problems:", problems.len());
        for problem in problems.iter() {
            warn!("- {:?}", problem);
        }
    }

    match (&catalog, problems.is_empty()) {
        (Some(_), true) => info!("Catalog checked, no issues found."),
        (Some(_), false) => info!(
            "Catalog was built, but check the {} non-fatal issues above.",
            problems.len()
        ),
        (None, _) => {
            info!(
                "Check the {} problems above, the catalog could not be initialized.",
                problems.len()
            )
        }
    }

    if let Some(catalog) = catalog {
        info!(
            "Catalog has:\n{} episodes ({} declared)\n{} hosted\n{} co-hosted\n{} scheduled\nlast updated {}",
            catalog.get_loaded_count(),
            catalog.get_count(),
            catalog.get_hosted().len(),
            catalog.get_cohosted().len(),
            catalog.get_scheduled().len(),
            catalog.get_last_updated(),
        );
        return Ok(catalog);
    }

    bail!("Could not load episodes from {}", source);
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn loads_bundled_dataset() {
        let catalog = load_catalog(&DatasetSource::Bundled).unwrap();
        assert_eq!(&catalog, bundled_catalog());
    }

    #[test]
    fn loads_dataset_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{
                "metadata": {{ "total_episodes": 1, "last_updated": "2024-01-01" }},
                "episodes": [{{ "number": "1", "title": "A", "date": "2024-01-01" }}]
            }}"#
        )
        .unwrap();

        let source = DatasetSource::from_optional_path(Some(file.path()));
        let catalog = load_catalog(&source).unwrap();
        assert_eq!(catalog.get_loaded_count(), 1);
    }

    #[test]
    fn fails_on_unparsable_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();
        let source = DatasetSource::File(file.path().to_owned());
        assert!(load_catalog(&source).is_err());
    }
}
