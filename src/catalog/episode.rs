use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Lifecycle status of an episode as stored in the dataset.
///
/// The set of values is open: anything not recognized is kept verbatim in
/// [`EpisodeStatus::Other`] so that it serializes back unchanged.
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq, Eq, Hash)]
#[serde(from = "String", into = "String")]
pub enum EpisodeStatus {
    Published,
    Archived,
    CoHosted,
    Scheduled,
    Other(String),
}

impl EpisodeStatus {
    pub fn as_str(&self) -> &str {
        match self {
            EpisodeStatus::Published => "published",
            EpisodeStatus::Archived => "archived",
            EpisodeStatus::CoHosted => "co-hosted",
            EpisodeStatus::Scheduled => "scheduled",
            EpisodeStatus::Other(value) => value,
        }
    }

    pub fn group(&self) -> StatusGroup {
        match self {
            EpisodeStatus::Published | EpisodeStatus::Archived => StatusGroup::Hosted,
            EpisodeStatus::CoHosted => StatusGroup::Cohosted,
            EpisodeStatus::Scheduled => StatusGroup::Scheduled,
            EpisodeStatus::Other(_) => StatusGroup::Unclassified,
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, EpisodeStatus::Other(_))
    }
}

impl From<String> for EpisodeStatus {
    fn from(value: String) -> Self {
        match value.as_str() {
            "published" => EpisodeStatus::Published,
            "archived" => EpisodeStatus::Archived,
            "co-hosted" => EpisodeStatus::CoHosted,
            "scheduled" => EpisodeStatus::Scheduled,
            _ => EpisodeStatus::Other(value),
        }
    }
}

impl From<EpisodeStatus> for String {
    fn from(status: EpisodeStatus) -> Self {
        match status {
            EpisodeStatus::Other(value) => value,
            known => known.as_str().to_owned(),
        }
    }
}

impl std::fmt::Display for EpisodeStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The partition of the catalog used by the listing pages.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, clap::ValueEnum)]
pub enum StatusGroup {
    /// `published` or `archived`.
    Hosted,
    Cohosted,
    Scheduled,
    /// No status, or a status outside the known set.
    Unclassified,
}

#[derive(Clone, Serialize, Deserialize, Debug, PartialEq, Eq)]
pub struct Episode {
    pub number: String,
    pub title: String,
    pub date: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guests: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guest_links: Option<HashMap<String, String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub space_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unlock_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub opensea_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contract_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub topics: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<EpisodeStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transcript_available: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_generated: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flyer_urls: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub listeners: Option<String>,
}

// The dataset tooling writes "" where a link is missing.
fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.trim().is_empty())
}

impl Episode {
    pub fn status_group(&self) -> StatusGroup {
        self.status
            .as_ref()
            .map(EpisodeStatus::group)
            .unwrap_or(StatusGroup::Unclassified)
    }

    /// `date` as a calendar date, when it is in `YYYY-MM-DD` form.
    pub fn parsed_date(&self) -> Option<NaiveDate> {
        NaiveDate::parse_from_str(&self.date, DATE_FORMAT).ok()
    }

    pub fn has_status_in(&self, group: StatusGroup) -> bool {
        self.status_group() == group
    }

    pub fn first_flyer(&self) -> Option<&str> {
        self.flyer_urls
            .as_ref()
            .and_then(|urls| urls.iter().map(String::as_str).find(|u| !u.is_empty()))
    }

    pub fn audio_url(&self) -> Option<&str> {
        non_empty(&self.audio_url)
    }

    pub fn space_url(&self) -> Option<&str> {
        non_empty(&self.space_url)
    }

    pub fn description(&self) -> Option<&str> {
        non_empty(&self.description)
    }

    pub fn duration(&self) -> Option<&str> {
        non_empty(&self.duration)
    }

    pub fn listeners(&self) -> Option<&str> {
        non_empty(&self.listeners)
    }

    pub fn topics(&self) -> &[String] {
        self.topics.as_deref().unwrap_or_default()
    }

    pub fn guests(&self) -> &[String] {
        self.guests.as_deref().unwrap_or_default()
    }

    /// Profile URL for a guest, if the dataset has a non-empty one.
    pub fn guest_link(&self, guest: &str) -> Option<&str> {
        self.guest_links
            .as_ref()
            .and_then(|links| links.get(guest))
            .map(String::as_str)
            .filter(|url| !url.is_empty())
    }
}

/// Most recent first. Episodes whose date doesn't parse go last, in their given order.
pub fn sorted_by_date_desc(mut episodes: Vec<&Episode>) -> Vec<&Episode> {
    // Option orders None first, so reversing the comparison puts it last.
    episodes.sort_by(|a, b| b.parsed_date().cmp(&a.parsed_date()));
    episodes
}
