use std::borrow::Cow;

/// Where the dataset tooling stores flyers, relative to the old static site.
pub const DATASET_FLYER_PREFIX: &str = "../static/images/";

/// Where flyers are published, relative to the site root.
pub const PUBLIC_FLYER_PREFIX: &str = "/flyers/";

/// Maps a flyer URL from the dataset to the path it is served from.
/// URLs that don't start with [`DATASET_FLYER_PREFIX`] are returned unchanged.
pub fn public_flyer_path(url: &str) -> Cow<'_, str> {
    match url.strip_prefix(DATASET_FLYER_PREFIX) {
        Some(file) => Cow::Owned(format!("{PUBLIC_FLYER_PREFIX}{file}")),
        None => Cow::Borrowed(url),
    }
}
