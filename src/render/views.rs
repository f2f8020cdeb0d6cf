//! Serializable view models handed to the page templates.
//!
//! Templates can't look up map entries by a dynamic key nor reason about empty
//! strings, so everything they need is resolved here.

use super::flyer::public_flyer_path;
use crate::catalog::Episode;
use crate::config::SiteSettings;
use serde::Serialize;

/// Topics shown on a home page card.
pub const CARD_TOPICS_LIMIT: usize = 3;

/// Items in the RSS feed.
pub const FEED_ITEMS_LIMIT: usize = 10;

const RFC_822_DATE_FORMAT: &str = "%a, %d %b %Y 00:00:00 +0000";

#[derive(Serialize)]
pub struct SiteView<'a> {
    pub title: &'a str,
    pub tagline: &'a str,
    pub twitter_url: &'a str,
    pub base_url: &'a str,
    pub language: &'a str,
}

impl<'a> From<&'a SiteSettings> for SiteView<'a> {
    fn from(site: &'a SiteSettings) -> Self {
        SiteView {
            title: &site.title,
            tagline: &site.tagline,
            twitter_url: &site.twitter_url,
            base_url: &site.base_url,
            language: &site.language,
        }
    }
}

pub fn episode_href(episode: &Episode) -> String {
    format!("/episodes/{}", episode.number)
}

#[derive(Serialize)]
pub struct EpisodeCardView<'a> {
    pub number: &'a str,
    pub date: &'a str,
    pub title: &'a str,
    pub href: String,
    pub flyer: Option<String>,
    pub description: Option<&'a str>,
    pub topics: Vec<&'a str>,
    pub has_topics: bool,
}

impl<'a> From<&'a Episode> for EpisodeCardView<'a> {
    fn from(episode: &'a Episode) -> Self {
        let topics: Vec<&str> = episode
            .topics()
            .iter()
            .take(CARD_TOPICS_LIMIT)
            .map(String::as_str)
            .collect();
        EpisodeCardView {
            number: &episode.number,
            date: &episode.date,
            title: &episode.title,
            href: episode_href(episode),
            flyer: episode.first_flyer().map(|f| public_flyer_path(f).into_owned()),
            description: episode.description(),
            has_topics: !topics.is_empty(),
            topics,
        }
    }
}

#[derive(Serialize)]
pub struct HomeView<'a> {
    pub site: SiteView<'a>,
    pub episodes: Vec<EpisodeCardView<'a>>,
    pub has_episodes: bool,
}

#[derive(Serialize)]
pub struct CohostedView<'a> {
    pub site: SiteView<'a>,
    pub episodes: Vec<EpisodeCardView<'a>>,
    pub has_episodes: bool,
    pub total_episodes: usize,
}

#[derive(Serialize)]
pub struct EpisodeLinkView<'a> {
    pub number: &'a str,
    pub title: &'a str,
    pub href: String,
}

impl<'a> From<&'a Episode> for EpisodeLinkView<'a> {
    fn from(episode: &'a Episode) -> Self {
        EpisodeLinkView {
            number: &episode.number,
            title: &episode.title,
            href: episode_href(episode),
        }
    }
}

/// Previous and next episode around `episode` in a newest-first sequence, so
/// the previous one is the entry right after it.
pub fn neighbours<'a>(
    episodes: &'a [Episode],
    episode: &Episode,
) -> (Option<&'a Episode>, Option<&'a Episode>) {
    let index = episodes
        .iter()
        .position(|e| std::ptr::eq(e, episode))
        .or_else(|| episodes.iter().position(|e| e.number == episode.number));
    match index {
        Some(index) => (
            episodes.get(index + 1),
            index.checked_sub(1).and_then(|i| episodes.get(i)),
        ),
        None => (None, None),
    }
}

/// How an episode can be listened to, in order of preference.
#[derive(Debug, PartialEq, Eq)]
pub enum Listen<'a> {
    Audio(String),
    Space(&'a str),
    Unavailable,
}

impl<'a> Listen<'a> {
    pub fn for_episode(episode: &'a Episode) -> Listen<'a> {
        if let Some(audio) = episode.audio_url() {
            return Listen::Audio(format!("/audio/{audio}"));
        }
        match episode.space_url() {
            Some(space) => Listen::Space(space),
            None => Listen::Unavailable,
        }
    }
}

#[derive(Serialize)]
pub struct GuestView<'a> {
    pub name: &'a str,
    pub url: Option<&'a str>,
}

#[derive(Serialize)]
pub struct EpisodeDetailView<'a> {
    pub number: &'a str,
    pub title: &'a str,
    pub date: &'a str,
    pub duration: Option<&'a str>,
    pub listeners: Option<&'a str>,
    pub flyer: Option<String>,
    pub audio_src: Option<String>,
    pub listen_space_url: Option<&'a str>,
    pub space_url: Option<&'a str>,
    pub description: Option<&'a str>,
    pub guests: Vec<GuestView<'a>>,
    pub has_guests: bool,
    pub topics: Vec<&'a str>,
    pub has_topics: bool,
    pub previous: Option<EpisodeLinkView<'a>>,
    pub next: Option<EpisodeLinkView<'a>>,
}

impl<'a> EpisodeDetailView<'a> {
    pub fn with_neighbours(
        mut self,
        previous: Option<&'a Episode>,
        next: Option<&'a Episode>,
    ) -> Self {
        self.previous = previous.map(EpisodeLinkView::from);
        self.next = next.map(EpisodeLinkView::from);
        self
    }
}

impl<'a> From<&'a Episode> for EpisodeDetailView<'a> {
    fn from(episode: &'a Episode) -> Self {
        let (audio_src, listen_space_url) = match Listen::for_episode(episode) {
            Listen::Audio(src) => (Some(src), None),
            Listen::Space(url) => (None, Some(url)),
            Listen::Unavailable => (None, None),
        };
        let guests: Vec<GuestView> = episode
            .guests()
            .iter()
            .map(|name| GuestView {
                name,
                url: episode.guest_link(name),
            })
            .collect();
        let topics: Vec<&str> = episode.topics().iter().map(String::as_str).collect();
        EpisodeDetailView {
            number: &episode.number,
            title: &episode.title,
            date: &episode.date,
            duration: episode.duration(),
            listeners: episode.listeners(),
            flyer: episode.first_flyer().map(|f| public_flyer_path(f).into_owned()),
            audio_src,
            listen_space_url,
            space_url: episode.space_url(),
            description: episode.description(),
            has_guests: !guests.is_empty(),
            guests,
            has_topics: !topics.is_empty(),
            topics,
            previous: None,
            next: None,
        }
    }
}

#[derive(Serialize)]
pub struct EpisodePageView<'a> {
    pub site: SiteView<'a>,
    pub episode: EpisodeDetailView<'a>,
}

#[derive(Serialize)]
pub struct NotFoundView<'a> {
    pub site: SiteView<'a>,
    pub id: Option<&'a str>,
}

#[derive(Serialize)]
pub struct FeedItemView<'a> {
    pub number: &'a str,
    pub title: &'a str,
    pub link: String,
    pub description: Option<&'a str>,
    /// Absent when the dataset date isn't a calendar date.
    pub pub_date: Option<String>,
}

impl<'a> FeedItemView<'a> {
    pub fn new(site: &SiteSettings, episode: &'a Episode) -> Self {
        FeedItemView {
            number: &episode.number,
            title: &episode.title,
            link: format!("{}{}", site.base_url, episode_href(episode)),
            description: episode.description(),
            pub_date: episode
                .parsed_date()
                .map(|date| date.format(RFC_822_DATE_FORMAT).to_string()),
        }
    }
}

#[derive(Serialize)]
pub struct FeedView<'a> {
    pub site: SiteView<'a>,
    pub items: Vec<FeedItemView<'a>>,
}
