use http_body_util::Full;
use hyper::body::Bytes;
use hyper::{Response, StatusCode};

use super::page::{self, PageContext};
use super::{respond, AppState};
use crate::models::{Notice, Theme};
use crate::services::chart_service;

/// Run the pipeline and render the full dashboard page
pub async fn execute(state: &AppState, theme: Theme) -> Response<Full<Bytes>> {
    let mut data = {
        let mut dashboard = state.dashboard.lock().await;
        dashboard.load().await
    };

    let chart_png = if data.has_data() {
        match chart_service::generate_chart(
            &data.temperature,
            &data.humidity,
            theme,
            state.config.chart_width,
            state.config.chart_height,
        ) {
            Ok(png) => {
                tracing::debug!("✓ Chart generated: {} bytes", png.len());
                Some(png)
            }
            Err(e) => {
                tracing::error!("Chart generation error: {}", e);
                data.notices.push(Notice::error(format!("Chart generation failed: {}", e)));
                None
            }
        }
    } else {
        None
    };

    let html = page::render(&PageContext {
        config: &state.config,
        data: &data,
        theme,
        chart_png: chart_png.as_deref(),
    });

    respond(StatusCode::OK, "text/html; charset=utf-8", html)
}
