use anyhow::Result;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    extract::{Path, State},
    handler::Handler,
    http::{header, StatusCode},
    middleware,
    response::{Html, IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Serialize;
use tower_http::services::ServeDir;
use tracing::{error, info};

use super::state::{ServerState, SharedEpisodeStore, SharedRenderer};
use super::{http_cache, log_requests, ServerConfig};
use crate::render::{PageRenderer, RenderError};

#[derive(Serialize)]
struct ServerStats {
    pub uptime: String,
    pub total_episodes: u64,
    pub loaded_episodes: usize,
    pub last_updated: String,
}

fn format_uptime(duration: Duration) -> String {
    let total_seconds = duration.as_secs();

    let days = total_seconds / 86_400;
    let hours = (total_seconds % 86_400) / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;

    format!("{}d {:02}:{:02}:{:02}", days, hours, minutes, seconds)
}

fn html_response(status: StatusCode, rendered: Result<String, RenderError>) -> Response {
    match rendered {
        Ok(html) => (status, Html(html)).into_response(),
        Err(err) => {
            error!("Error rendering page: {}", err);
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

async fn stats(State(state): State<ServerState>) -> impl IntoResponse {
    let stats = ServerStats {
        uptime: format_uptime(state.start_time.elapsed()),
        total_episodes: state.store.get_count(),
        loaded_episodes: state.store.get_all().len(),
        last_updated: state.store.get_last_updated().to_owned(),
    };
    Json(stats)
}

async fn home(
    State(store): State<SharedEpisodeStore>,
    State(renderer): State<SharedRenderer>,
) -> Response {
    html_response(StatusCode::OK, renderer.render_home(store.as_ref()))
}

async fn cohosted_page(
    State(store): State<SharedEpisodeStore>,
    State(renderer): State<SharedRenderer>,
) -> Response {
    html_response(StatusCode::OK, renderer.render_cohosted(store.as_ref()))
}

async fn episode_page(
    State(store): State<SharedEpisodeStore>,
    State(renderer): State<SharedRenderer>,
    Path(id): Path<String>,
) -> Response {
    match store.get_by_id(&id) {
        Some(episode) => html_response(
            StatusCode::OK,
            renderer.render_episode(store.as_ref(), episode),
        ),
        None => html_response(
            StatusCode::NOT_FOUND,
            renderer.render_not_found(Some(id.as_str())),
        ),
    }
}

async fn rss_feed(
    State(store): State<SharedEpisodeStore>,
    State(renderer): State<SharedRenderer>,
) -> Response {
    match renderer.render_feed(store.as_ref()) {
        Ok(xml) => (
            [(header::CONTENT_TYPE, "application/rss+xml; charset=utf-8")],
            xml,
        )
            .into_response(),
        Err(err) => {
            error!("Error rendering feed: {}", err);
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

async fn not_found_page(State(renderer): State<SharedRenderer>) -> Response {
    html_response(StatusCode::NOT_FOUND, renderer.render_not_found(None))
}

async fn get_all_episodes(State(store): State<SharedEpisodeStore>) -> Response {
    Json(store.get_all()).into_response()
}

async fn get_hosted_episodes(State(store): State<SharedEpisodeStore>) -> Response {
    Json(store.get_hosted()).into_response()
}

async fn get_cohosted_episodes(State(store): State<SharedEpisodeStore>) -> Response {
    Json(store.get_cohosted()).into_response()
}

async fn get_scheduled_episodes(State(store): State<SharedEpisodeStore>) -> Response {
    Json(store.get_scheduled()).into_response()
}

async fn get_episode(
    State(store): State<SharedEpisodeStore>,
    Path(id): Path<String>,
) -> Response {
    match store.get_by_id(&id) {
        Some(episode) => Json(episode).into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

impl ServerState {
    fn new(config: ServerConfig, store: SharedEpisodeStore, renderer: PageRenderer) -> ServerState {
        ServerState {
            config,
            start_time: Instant::now(),
            store,
            renderer: Arc::new(renderer),
        }
    }
}

pub fn make_app(
    config: ServerConfig,
    store: SharedEpisodeStore,
    renderer: PageRenderer,
) -> Router {
    let state = ServerState::new(config.clone(), store, renderer);
    let cache_layer = middleware::from_fn_with_state(config.content_cache_age_sec, http_cache);

    let api_routes: Router<ServerState> = Router::new()
        .route("/episodes", get(get_all_episodes))
        .route("/episodes/hosted", get(get_hosted_episodes))
        .route("/episodes/cohosted", get(get_cohosted_episodes))
        .route("/episodes/scheduled", get(get_scheduled_episodes))
        .route("/episodes/{id}", get(get_episode))
        .layer(cache_layer.clone())
        .route("/stats", get(stats));

    let page_routes: Router<ServerState> = Router::new()
        .route("/", get(home))
        .route("/cohosted", get(cohosted_page))
        .route("/episodes/{id}", get(episode_page))
        .route("/rss.xml", get(rss_feed))
        .layer(cache_layer);

    let app: Router<ServerState> = Router::new()
        .merge(page_routes)
        .nest("/v1", api_routes);

    let app = match &config.public_dir {
        Some(public_dir) => {
            info!("Serving public assets from {}", public_dir.display());
            let not_found = not_found_page.with_state(state.clone());
            app.fallback_service(ServeDir::new(public_dir).not_found_service(not_found))
        }
        None => app.fallback(not_found_page),
    };

    app.layer(middleware::from_fn_with_state(state.clone(), log_requests))
        .with_state(state)
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Received Ctrl-C, shutting down..."),
        Err(err) => {
            error!("Could not listen for Ctrl-C: {}", err);
            std::future::pending::<()>().await
        }
    }
}

pub async fn run_server(
    config: ServerConfig,
    store: SharedEpisodeStore,
    renderer: PageRenderer,
) -> Result<()> {
    let port = config.port;
    let app = make_app(config, store, renderer);

    let listener = tokio::net::TcpListener::bind(format!("127.0.0.1:{}", port)).await?;
    info!("Listening on http://127.0.0.1:{}", port);

    Ok(axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::EpisodeCatalog;
    use crate::config::SiteSettings;
    use axum::{body::Body, http::Request};
    use tower::ServiceExt; // for `oneshot`

    fn test_app(config: ServerConfig) -> Router {
        let store: SharedEpisodeStore = Arc::new(EpisodeCatalog::dummy());
        let renderer = PageRenderer::new(SiteSettings::default()).unwrap();
        make_app(config, store, renderer)
    }

    async fn get(app: &Router, uri: &str) -> Response {
        let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
        app.clone().oneshot(request).await.unwrap()
    }

    async fn body_string(response: Response) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    async fn body_json(response: Response) -> serde_json::Value {
        serde_json::from_str(&body_string(response).await).unwrap()
    }

    fn numbers(value: &serde_json::Value) -> Vec<&str> {
        value
            .as_array()
            .unwrap()
            .iter()
            .map(|e| e["number"].as_str().unwrap())
            .collect()
    }

    #[test]
    fn formats_uptime() {
        assert_eq!(format_uptime(Duration::from_secs(0)), "0d 00:00:00");
        assert_eq!(format_uptime(Duration::from_secs(90_061)), "1d 01:01:01");
    }

    #[tokio::test]
    async fn serves_home_page_with_cache_header() {
        let app = test_app(ServerConfig::default());
        let response = get(&app, "/").await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()["cache-control"], "max-age=60");
        assert!(response.headers()["content-type"]
            .to_str()
            .unwrap()
            .starts_with("text/html"));
        let html = body_string(response).await;
        assert!(html.contains("/episodes/003"));
        assert!(!html.contains("/episodes/004"));
    }

    #[tokio::test]
    async fn serves_episode_pages() {
        let app = test_app(ServerConfig::default());

        let response = get(&app, "/episodes/004").await;
        assert_eq!(response.status(), StatusCode::OK);
        assert!(body_string(response).await.contains("Próximamente"));

        let response = get(&app, "/episodes/999").await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert!(response.headers().get("cache-control").is_none());
        assert!(body_string(response).await.contains("Episodio no encontrado"));
    }

    #[tokio::test]
    async fn serves_episodes_api() {
        let app = test_app(ServerConfig::default());

        let all = body_json(get(&app, "/v1/episodes").await).await;
        assert_eq!(
            numbers(&all),
            vec!["003", "002", "001", "004", "SPECIAL", "005"]
        );

        let hosted = body_json(get(&app, "/v1/episodes/hosted").await).await;
        assert_eq!(numbers(&hosted), vec!["003", "001"]);
        let cohosted = body_json(get(&app, "/v1/episodes/cohosted").await).await;
        assert_eq!(numbers(&cohosted), vec!["002"]);
        let scheduled = body_json(get(&app, "/v1/episodes/scheduled").await).await;
        assert_eq!(numbers(&scheduled), vec!["004"]);

        let episode = body_json(get(&app, "/v1/episodes/SPECIAL").await).await;
        assert_eq!(episode["title"], "Especial sin estado");

        let response = get(&app, "/v1/episodes/999").await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn serves_uncached_stats() {
        let app = test_app(ServerConfig::default());
        let response = get(&app, "/v1/stats").await;

        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().get("cache-control").is_none());
        let stats = body_json(response).await;
        assert_eq!(stats["total_episodes"], 6);
        assert_eq!(stats["loaded_episodes"], 6);
        assert_eq!(stats["last_updated"], "2025-09-01T12:00:00");
    }

    #[tokio::test]
    async fn serves_cohosted_page() {
        let app = test_app(ServerConfig::default());
        let response = get(&app, "/cohosted").await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()["cache-control"], "max-age=60");
        let html = body_string(response).await;
        assert!(html.contains("href=\"/episodes/002\""));
        assert!(!html.contains("href=\"/episodes/003\""));
    }

    #[tokio::test]
    async fn serves_rss_feed() {
        let app = test_app(ServerConfig::default());
        let response = get(&app, "/rss.xml").await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()["content-type"],
            "application/rss+xml; charset=utf-8"
        );
        assert_eq!(response.headers()["cache-control"], "max-age=60");
        let xml = body_string(response).await;
        assert!(xml.contains("<link>https://bandaweb3.com/episodes/003</link>"));
    }

    #[tokio::test]
    async fn unknown_paths_render_not_found() {
        let app = test_app(ServerConfig::default());
        let response = get(&app, "/flyers/flyer_003.png").await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn serves_public_assets() {
        let public_dir = tempfile::TempDir::new().unwrap();
        std::fs::create_dir(public_dir.path().join("flyers")).unwrap();
        std::fs::write(public_dir.path().join("flyers/flyer_003.png"), b"png").unwrap();

        let app = test_app(ServerConfig {
            public_dir: Some(public_dir.path().to_path_buf()),
            ..ServerConfig::default()
        });

        let response = get(&app, "/flyers/flyer_003.png").await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_string(response).await, "png");

        let response = get(&app, "/flyers/missing.png").await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let response = get(&app, "/no/such/page").await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert!(body_string(response).await.contains("Episodio no encontrado"));
    }
}
