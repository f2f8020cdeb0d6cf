mod catalog;
mod episode;
mod load;

pub use catalog::{is_safe_path_segment, CatalogBuildResult, EpisodeCatalog, EpisodeStore, Metadata};
pub use episode::{sorted_by_date_desc, Episode, EpisodeStatus, StatusGroup, DATE_FORMAT};
pub use load::{build_catalog, bundled_catalog, load_catalog, DatasetSource, BUNDLED_DATASET};
