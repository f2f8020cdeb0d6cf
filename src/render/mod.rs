//! HTML pages for the episode catalog.
//!
//! Pages are [upon] templates compiled once into a [`PageRenderer`]. The
//! engine's default formatter HTML-escapes every interpolated value.

mod flyer;
mod views;

pub use flyer::{public_flyer_path, DATASET_FLYER_PREFIX, PUBLIC_FLYER_PREFIX};
pub use views::{episode_href, neighbours, Listen, CARD_TOPICS_LIMIT, FEED_ITEMS_LIMIT};

use crate::catalog::{sorted_by_date_desc, Episode, EpisodeStore};
use crate::config::SiteSettings;
use thiserror::Error;
use upon::Engine;
use views::{
    CohostedView, EpisodeCardView, EpisodeDetailView, EpisodePageView, FeedItemView, FeedView,
    HomeView, NotFoundView, SiteView,
};

const TEMPLATES: [(&str, &str); 7] = [
    ("nav", include_str!("../../templates/nav.html")),
    ("footer", include_str!("../../templates/footer.html")),
    ("home", include_str!("../../templates/home.html")),
    ("cohosted", include_str!("../../templates/cohosted.html")),
    ("episode", include_str!("../../templates/episode.html")),
    ("not_found", include_str!("../../templates/not_found.html")),
    ("feed", include_str!("../../templates/feed.xml")),
];

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Invalid template \"{name}\": {source}")]
    Template {
        name: &'static str,
        #[source]
        source: upon::Error,
    },
    #[error("Could not render \"{name}\": {source}")]
    Render {
        name: &'static str,
        #[source]
        source: upon::Error,
    },
}

pub struct PageRenderer {
    engine: Engine<'static>,
    site: SiteSettings,
}

impl PageRenderer {
    pub fn new(site: SiteSettings) -> Result<PageRenderer, RenderError> {
        let mut engine = Engine::new();
        addons::configure(&mut engine);
        for (name, source) in TEMPLATES {
            engine
                .add_template(name, source)
                .map_err(|source| RenderError::Template { name, source })?;
        }
        Ok(PageRenderer { engine, site })
    }

    fn render<S: serde::Serialize>(&self, name: &'static str, view: &S) -> Result<String, RenderError> {
        self.engine
            .template(name)
            .render(view)
            .to_string()
            .map_err(|source| RenderError::Render { name, source })
    }

    /// Home page: one card per hosted episode, in dataset order.
    pub fn render_home(&self, store: &dyn EpisodeStore) -> Result<String, RenderError> {
        let episodes: Vec<EpisodeCardView> = store
            .get_hosted()
            .into_iter()
            .map(EpisodeCardView::from)
            .collect();
        let view = HomeView {
            site: SiteView::from(&self.site),
            has_episodes: !episodes.is_empty(),
            episodes,
        };
        self.render("home", &view)
    }

    /// Co-hosted spaces, most recent first.
    pub fn render_cohosted(&self, store: &dyn EpisodeStore) -> Result<String, RenderError> {
        let episodes: Vec<EpisodeCardView> = sorted_by_date_desc(store.get_cohosted())
            .into_iter()
            .map(EpisodeCardView::from)
            .collect();
        let view = CohostedView {
            site: SiteView::from(&self.site),
            has_episodes: !episodes.is_empty(),
            total_episodes: episodes.len(),
            episodes,
        };
        self.render("cohosted", &view)
    }

    /// Detail page of an episode of `store`, linked to its neighbours in dataset order.
    pub fn render_episode(
        &self,
        store: &dyn EpisodeStore,
        episode: &Episode,
    ) -> Result<String, RenderError> {
        let (previous, next) = neighbours(store.get_all(), episode);
        let view = EpisodePageView {
            site: SiteView::from(&self.site),
            episode: EpisodeDetailView::from(episode).with_neighbours(previous, next),
        };
        self.render("episode", &view)
    }

    pub fn render_not_found(&self, id: Option<&str>) -> Result<String, RenderError> {
        let view = NotFoundView {
            site: SiteView::from(&self.site),
            id,
        };
        self.render("not_found", &view)
    }

    /// RSS feed of the latest hosted episodes, dataset order being newest first.
    pub fn render_feed(&self, store: &dyn EpisodeStore) -> Result<String, RenderError> {
        let items = store
            .get_hosted()
            .into_iter()
            .take(FEED_ITEMS_LIMIT)
            .map(|episode| FeedItemView::new(&self.site, episode))
            .collect();
        let view = FeedView {
            site: SiteView::from(&self.site),
            items,
        };
        self.render("feed", &view)
    }
}

pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}

mod addons {
    use super::escape_html;
    use std::fmt::Write;
    use upon::{fmt as upon_fmt, Engine, Value};

    fn escape_formatter(f: &mut upon_fmt::Formatter<'_>, value: &Value) -> upon_fmt::Result {
        match value {
            Value::String(s) => f.write_str(&escape_html(s))?,
            v => upon_fmt::default(f, v)?,
        };
        Ok(())
    }

    pub(crate) fn configure(engine: &mut Engine<'_>) {
        engine.set_default_formatter(&escape_formatter);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::EpisodeCatalog;

    fn renderer() -> PageRenderer {
        PageRenderer::new(SiteSettings::default()).unwrap()
    }

    #[test]
    fn escapes_html() {
        assert_eq!(
            escape_html(r#"<a href="x">Tom & Jerry's</a>"#),
            "&lt;a href=&quot;x&quot;&gt;Tom &amp; Jerry&#39;s&lt;/a&gt;"
        );
    }

    #[test]
    fn home_lists_only_hosted_episodes() {
        let catalog = EpisodeCatalog::dummy();
        let html = renderer().render_home(&catalog).unwrap();

        assert!(html.contains("href=\"/episodes/003\""));
        assert!(html.contains("href=\"/episodes/001\""));
        assert!(!html.contains("href=\"/episodes/002\""));
        assert!(!html.contains("href=\"/episodes/004\""));
        assert!(!html.contains("href=\"/episodes/SPECIAL\""));
        // Dataset order is kept.
        assert!(html.find("/episodes/003").unwrap() < html.find("/episodes/001").unwrap());
        assert!(html.contains("src=\"/flyers/flyer_003.png\""));
        // Only the first three topics make it to the card.
        assert!(html.contains("LatAm"));
        assert!(!html.contains("DeFi"));
    }

    #[test]
    fn home_escapes_dataset_text() {
        let catalog = EpisodeCatalog::dummy();
        let html = renderer().render_home(&catalog).unwrap();
        assert!(html.contains("Hablamos de &lt;stablecoins&gt; &amp; remesas."));
        assert!(!html.contains("<stablecoins>"));
    }

    #[test]
    fn episode_page_with_audio_and_guests() {
        let catalog = EpisodeCatalog::dummy();
        let html = renderer()
            .render_episode(&catalog, catalog.get_by_id("003").unwrap())
            .unwrap();

        assert!(html.contains("Episodio #003"));
        assert!(html.contains("<source src=\"/audio/ep003.mp3\""));
        assert!(html.contains("120 oyentes"));
        assert!(html.contains("58 min"));
        assert!(html.contains("href=\"https://x.com/xenonnel\""));
        assert!(html.contains("@xenonnel"));
        assert!(html.contains("anon"));
        assert!(!html.contains("@anon"));
        assert!(html.contains("DeFi"));
        assert!(html.contains("Space Original"));
    }

    #[test]
    fn episode_page_listen_fallbacks() {
        let catalog = EpisodeCatalog::dummy();
        let renderer = renderer();

        let html = renderer
            .render_episode(&catalog, catalog.get_by_id("001").unwrap())
            .unwrap();
        assert!(!html.contains("<audio"));
        assert!(html.contains("Escuchar en X Space"));

        let html = renderer
            .render_episode(&catalog, catalog.get_by_id("004").unwrap())
            .unwrap();
        assert!(!html.contains("<audio"));
        assert!(html.contains("Audio próximamente disponible"));
        assert!(!html.contains("Space Original"));
        assert!(!html.contains("oyentes"));
    }

    #[test]
    fn not_found_page_mentions_id() {
        let html = renderer().render_not_found(Some("<999>")).unwrap();
        assert!(html.contains("&lt;999&gt;"));
        assert!(html.contains("href=\"/\""));
    }

    #[test]
    fn uses_site_settings() {
        let site = SiteSettings {
            title: "Mi Podcast".to_string(),
            ..SiteSettings::default()
        };
        let renderer = PageRenderer::new(site).unwrap();
        let html = renderer.render_home(&EpisodeCatalog::dummy()).unwrap();
        assert!(html.contains("Mi Podcast"));
    }

    #[test]
    fn feed_lists_hosted_episodes_only() {
        let catalog = EpisodeCatalog::dummy();
        let xml = renderer().render_feed(&catalog).unwrap();

        assert!(xml.starts_with("<?xml"));
        assert!(xml.contains("<link>https://bandaweb3.com/episodes/003</link>"));
        assert!(xml.contains("<link>https://bandaweb3.com/episodes/001</link>"));
        assert!(!xml.contains("/episodes/002"));
        assert!(!xml.contains("/episodes/004"));
        assert!(xml.contains("Hablamos de &lt;stablecoins&gt; &amp; remesas."));
        assert!(xml.contains("<pubDate>Thu, 01 Feb 2024 00:00:00 +0000</pubDate>"));
    }

    #[test]
    fn cohosted_page_lists_cohosted_episodes_newest_first() {
        let episodes: Vec<Episode> = serde_json::from_str(
            r#"[
                { "number": "20230213", "title": "Viejo", "date": "2023-02-13", "status": "co-hosted" },
                { "number": "010", "title": "Propio", "date": "2024-01-01", "status": "published" },
                { "number": "20240301", "title": "Nuevo", "date": "2024-03-01", "status": "co-hosted" }
            ]"#,
        )
        .unwrap();
        let catalog = EpisodeCatalog::new(
            crate::catalog::Metadata {
                total_episodes: 3,
                last_updated: String::new(),
            },
            episodes,
        );

        let html = renderer().render_cohosted(&catalog).unwrap();
        assert!(html.contains("2 spaces"));
        assert!(!html.contains("href=\"/episodes/010\""));
        assert!(
            html.find("/episodes/20240301").unwrap() < html.find("/episodes/20230213").unwrap()
        );
    }

    #[test]
    fn episode_page_links_neighbours() {
        let catalog = EpisodeCatalog::dummy();
        let renderer = renderer();

        let html = renderer
            .render_episode(&catalog, catalog.get_by_id("002").unwrap())
            .unwrap();
        assert!(html.contains("href=\"/episodes/001\" class=\"episode-nav-previous\""));
        assert!(html.contains("href=\"/episodes/003\" class=\"episode-nav-next\""));

        let html = renderer
            .render_episode(&catalog, catalog.get_by_id("003").unwrap())
            .unwrap();
        assert!(html.contains("episode-nav-previous"));
        assert!(!html.contains("episode-nav-next"));
    }

    #[test]
    fn every_value_is_escaped_and_language_is_configurable() {
        let site = SiteSettings {
            title: "<b>Banda</b>".to_string(),
            language: "en".to_string(),
            ..SiteSettings::default()
        };
        let renderer = PageRenderer::new(site).unwrap();
        let html = renderer.render_not_found(None).unwrap();
        assert!(html.contains("<html lang=\"en\">"));
        assert!(html.contains("&lt;b&gt;Banda&lt;/b&gt;"));
        assert!(!html.contains("<b>Banda"));
    }
}
