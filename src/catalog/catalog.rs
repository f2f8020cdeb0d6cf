use super::{Episode, StatusGroup};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

#[derive(Clone, Serialize, Deserialize, Debug, PartialEq, Eq)]
pub struct Metadata {
    pub total_episodes: u64,
    pub last_updated: String,
}

/// The whole dataset, loaded once and never mutated afterwards.
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq, Eq)]
pub struct EpisodeCatalog {
    metadata: Metadata,
    episodes: Vec<Episode>,
}

#[derive(Debug, PartialEq, Eq)]
pub enum Problem {
    CantReadDataset(String),
    InvalidDataset(String),
    DuplicateNumber(String),
    DeclaredCountMismatch { declared: u64, actual: usize },
    EmptyRequiredField { index: usize, field: &'static str },
    InvalidDate { number: String, date: String },
    UnknownStatus { number: String, status: String },
    UnsafeNumber(String),
}

pub struct CatalogBuildResult {
    pub catalog: Option<EpisodeCatalog>,
    pub problems: Vec<Problem>,
}

/// Read-only queries over an episode collection.
pub trait EpisodeStore: Send + Sync {
    fn get_all(&self) -> &[Episode];

    /// Declared `total_episodes`, which is not checked against `get_all().len()`.
    fn get_count(&self) -> u64;

    fn get_last_updated(&self) -> &str;

    fn get_by_id(&self, id: &str) -> Option<&Episode> {
        self.get_all().iter().find(|episode| episode.number == id)
    }

    fn get_by_status(&self, group: StatusGroup) -> Vec<&Episode> {
        self.get_all()
            .iter()
            .filter(|episode| episode.has_status_in(group))
            .collect()
    }

    fn get_hosted(&self) -> Vec<&Episode> {
        self.get_by_status(StatusGroup::Hosted)
    }

    fn get_cohosted(&self) -> Vec<&Episode> {
        self.get_by_status(StatusGroup::Cohosted)
    }

    fn get_scheduled(&self) -> Vec<&Episode> {
        self.get_by_status(StatusGroup::Scheduled)
    }
}

impl EpisodeStore for EpisodeCatalog {
    fn get_all(&self) -> &[Episode] {
        &self.episodes
    }

    fn get_count(&self) -> u64 {
        self.metadata.total_episodes
    }

    fn get_last_updated(&self) -> &str {
        &self.metadata.last_updated
    }
}

/// Whether `number` can be used verbatim as a single URL/filesystem path segment.
pub fn is_safe_path_segment(number: &str) -> bool {
    !number.is_empty()
        && number != "."
        && number != ".."
        && !number.contains(['/', '\\', '?', '#'])
}

fn check_episodes(catalog: &EpisodeCatalog) -> Vec<Problem> {
    let mut problems = vec![];

    let actual = catalog.episodes.len();
    if catalog.metadata.total_episodes != actual as u64 {
        problems.push(Problem::DeclaredCountMismatch {
            declared: catalog.metadata.total_episodes,
            actual,
        });
    }

    let mut seen_numbers = HashSet::new();
    for (index, episode) in catalog.episodes.iter().enumerate() {
        for (field, value) in [
            ("number", &episode.number),
            ("title", &episode.title),
            ("date", &episode.date),
        ] {
            if value.trim().is_empty() {
                problems.push(Problem::EmptyRequiredField { index, field });
            }
        }

        if !seen_numbers.insert(episode.number.as_str()) {
            problems.push(Problem::DuplicateNumber(episode.number.clone()));
        }

        if !episode.number.is_empty() && !is_safe_path_segment(&episode.number) {
            problems.push(Problem::UnsafeNumber(episode.number.clone()));
        }

        if !episode.date.is_empty() && episode.parsed_date().is_none() {
            problems.push(Problem::InvalidDate {
                number: episode.number.clone(),
                date: episode.date.clone(),
            });
        }

        if let Some(status) = episode.status.as_ref().filter(|s| !s.is_known()) {
            problems.push(Problem::UnknownStatus {
                number: episode.number.clone(),
                status: status.to_string(),
            });
        }
    }

    problems
}

impl EpisodeCatalog {
    pub fn new(metadata: Metadata, episodes: Vec<Episode>) -> EpisodeCatalog {
        EpisodeCatalog { metadata, episodes }
    }

    pub fn from_json_str(json: &str) -> serde_json::Result<EpisodeCatalog> {
        serde_json::from_str(json)
    }

    /// Number of episodes actually loaded, as opposed to [`EpisodeStore::get_count`].
    pub fn get_loaded_count(&self) -> usize {
        self.episodes.len()
    }

    pub fn build_from_str(json: &str) -> CatalogBuildResult {
        match EpisodeCatalog::from_json_str(json) {
            Ok(catalog) => {
                let problems = if cfg!(feature = "no_checks") {
                    vec![]
                } else {
                    check_episodes(&catalog)
                };
                CatalogBuildResult {
                    catalog: Some(catalog),
                    problems,
                }
            }
            Err(err) => CatalogBuildResult {
                catalog: None,
                problems: vec![Problem::InvalidDataset(err.to_string())],
            },
        }
    }

    pub fn build(dataset_path: &Path) -> CatalogBuildResult {
        match std::fs::read_to_string(dataset_path) {
            Ok(json) => EpisodeCatalog::build_from_str(&json),
            Err(err) => CatalogBuildResult {
                catalog: None,
                problems: vec![Problem::CantReadDataset(format!(
                    "{}: {}",
                    dataset_path.display(),
                    err
                ))],
            },
        }
    }

    #[cfg(test)]
    pub fn dummy() -> EpisodeCatalog {
        EpisodeCatalog::from_json_str(tests::SAMPLE_DATASET).unwrap()
    }
}
