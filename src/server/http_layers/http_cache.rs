//! HTTP caching middleware

use axum::{body::Body, extract::State, http::Request, middleware::Next, response::IntoResponse};

/// Sets `Cache-Control: max-age` so a host or browser can reuse pages for
/// that long before asking again.
pub async fn http_cache(
    State(max_age_sec): State<usize>,
    request: Request<Body>,
    next: Next,
) -> impl IntoResponse {
    let response = next.run(request).await.into_response();

    let (mut parts, body) = response.into_parts();
    if parts.status.is_success() {
        if let Ok(value) = format!("max-age={}", max_age_sec).parse() {
            parts.headers.insert("Cache-Control", value);
        }
    }

    axum::http::Response::from_parts(parts, body)
}
