use http_body_util::Full;
use hyper::body::Bytes;
use hyper::header::{HeaderValue, LOCATION};
use hyper::{Response, StatusCode};

use super::{respond, AppState};
use crate::models::Theme;

/// Drop every cached feed and send the browser back to a fresh dashboard
pub async fn execute(state: &AppState, theme: Theme) -> Response<Full<Bytes>> {
    tracing::info!("🔄 Refresh requested");
    state.dashboard.lock().await.refresh();

    let location = match theme {
        Theme::Light => "/?theme=light",
        Theme::Dark => "/?theme=dark",
    };
    let mut response = respond(StatusCode::SEE_OTHER, "text/plain", "See Other");
    response
        .headers_mut()
        .insert(LOCATION, HeaderValue::from_static(location));
    response
}
