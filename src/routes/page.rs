//! HTML rendering of the dashboard page

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};

use crate::config::Config;
use crate::models::{DashboardData, Series, Theme};
use crate::utils::html::escape;
use crate::utils::Table;

const TABLE_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S UTC";

const STYLE: &str = r#"
body { margin: 0; font-family: sans-serif; }
.theme-light { background: #fdf6e3; color: #586e75; }
.theme-dark { background: #0e1117; color: #fafafa; }
.layout { display: flex; min-height: 100vh; }
aside { width: 260px; padding: 1.5rem; background: rgba(127, 127, 127, 0.12); }
main { flex: 1; padding: 1.5rem 2rem; }
.notice { padding: 0.6rem 1rem; margin: 0.4rem 0; border-radius: 4px; }
.notice-error { background: rgba(255, 43, 43, 0.15); }
.notice-warning { background: rgba(255, 170, 0, 0.18); }
.notice-info { background: rgba(28, 131, 225, 0.15); }
.chart img { max-width: 100%; }
.columns { display: flex; gap: 2rem; }
.columns > section { flex: 1; }
.scroll { max-height: 300px; overflow-y: auto; }
table { border-collapse: collapse; width: 100%; }
th, td { text-align: left; padding: 0.2rem 0.6rem; border-bottom: 1px solid rgba(127, 127, 127, 0.3); }
.caption { opacity: 0.7; font-size: 0.85rem; margin-top: 2rem; }
"#;

pub struct PageContext<'a> {
    pub config: &'a Config,
    pub data: &'a DashboardData,
    pub theme: Theme,
    pub chart_png: Option<&'a [u8]>,
}

pub fn render(ctx: &PageContext<'_>) -> String {
    let mut body = String::new();
    body.push_str("<h1>🌡️💧 ESP32 DHT11 Temperature and Humidity Dashboard</h1>\n");
    body.push_str("<p>Real-time data from ESP32 via Adafruit IO. Visualized using Plotters.</p>\n");

    for notice in &ctx.data.notices {
        body.push_str(&format!(
            "<div class=\"notice notice-{}\">{}</div>\n",
            notice.level.as_str(),
            escape(&notice.message)
        ));
    }

    if ctx.data.has_data() {
        if let Some(png) = ctx.chart_png {
            body.push_str("<h2>📊 Temperature and Humidity Over Time</h2>\n");
            body.push_str(&format!(
                "<div class=\"chart\"><img alt=\"Temperature and humidity chart\" src=\"data:image/png;base64,{}\"></div>\n",
                BASE64.encode(png)
            ));
        }

        body.push_str("<h2>📄 Raw Data</h2>\n<div class=\"columns\">\n");
        body.push_str(&render_series_panel("🌡️ Temperature", &ctx.data.temperature));
        body.push_str(&render_series_panel("💧 Humidity", &ctx.data.humidity));
        body.push_str("</div>\n");
    }

    body.push_str("<p class=\"caption\">Data Source: Adafruit IO</p>\n");

    format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
         <title>DHT11 Dashboard</title>\n<style>{}</style>\n</head>\n\
         <body class=\"theme-{}\">\n<div class=\"layout\">\n{}<main>\n{}</main>\n</div>\n</body>\n</html>\n",
        STYLE,
        ctx.theme.as_str(),
        render_sidebar(ctx),
        body
    )
}

fn render_sidebar(ctx: &PageContext<'_>) -> String {
    let theme_link = |theme: Theme, label: &str| {
        if theme == ctx.theme {
            format!("<strong>{}</strong>", label)
        } else {
            format!("<a href=\"/?theme={}\">{}</a>", theme.as_str(), label)
        }
    };
    let key_status = if ctx.config.has_api_key() { "✅ Yes" } else { "❌ Missing" };

    format!(
        "<aside>\n<h3>Settings</h3>\n\
         <p>Showing last {limit} data points</p>\n\
         <p>Plot theme: {light} | {dark}</p>\n\
         <form method=\"post\" action=\"/refresh?theme={theme}\"><button type=\"submit\">🔄 Refresh Data</button></form>\n\
         <details><summary>🔍 Debug Info</summary>\n\
         <p>Username: {username}</p>\n<p>Key loaded: {key_status}</p>\n</details>\n\
         </aside>\n",
        limit = ctx.config.feed_limit,
        light = theme_link(Theme::Light, "Light"),
        dark = theme_link(Theme::Dark, "Dark"),
        theme = ctx.theme.as_str(),
        username = escape(&ctx.config.username),
        key_status = key_status,
    )
}

/// One raw data table, newest reading first
fn render_series_panel(title: &str, series: &Series) -> String {
    let mut table = Table::new(vec!["time", "value"]);
    for point in series.newest_first() {
        table.add_row(vec![
            point.timestamp.format(TABLE_TIME_FORMAT).to_string(),
            point.value.to_string(),
        ]);
    }

    format!(
        "<section>\n<h3>{}</h3>\n<p>{} readings</p>\n<div class=\"scroll\">\n{}\n</div>\n</section>\n",
        title,
        table.row_count(),
        table.render()
    )
}
