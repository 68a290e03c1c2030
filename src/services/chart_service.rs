use plotters::prelude::*;
use chrono::{DateTime, Duration, Utc};
use std::ops::Range;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use crate::models::{Series, Theme};

const CHART_TITLE: &str = "ESP32 DHT11 Sensor Readings Over Time";
const TIME_LABEL_FORMAT: &str = "%Y-%m-%d %H:%M";

/// Keeps temp file names unique between concurrent renders
static CHART_FILE_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Left axis, °C
const TEMPERATURE_RANGE: Range<f64> = 20.0..50.0;
/// Right axis, %
const HUMIDITY_RANGE: Range<f64> = 60.0..90.0;

/// Colors for one chart theme
struct ChartColors {
    background: RGBColor,
    text: RGBColor,
    grid: RGBColor,
}

impl ChartColors {
    fn for_theme(theme: Theme) -> Self {
        match theme {
            // solarized light
            Theme::Light => ChartColors {
                background: RGBColor(253, 246, 227),
                text: RGBColor(88, 110, 117),
                grid: RGBColor(147, 161, 161),
            },
            Theme::Dark => ChartColors {
                background: RGBColor(0, 0, 0),
                text: RGBColor(255, 255, 255),
                grid: RGBColor(110, 110, 110),
            },
        }
    }
}

/// Shared time axis covering both series.
/// A single instant is widened by half an hour on each side.
pub fn time_range(temperature: &Series, humidity: &Series) -> Option<Range<DateTime<Utc>>> {
    let start = [temperature.first_timestamp(), humidity.first_timestamp()]
        .into_iter()
        .flatten()
        .min()?;
    let end = [temperature.last_timestamp(), humidity.last_timestamp()]
        .into_iter()
        .flatten()
        .max()?;

    if start == end {
        return Some(start - Duration::minutes(30)..end + Duration::minutes(30));
    }
    Some(start..end)
}

fn plottable(series: &Series) -> impl Iterator<Item = (DateTime<Utc>, f64)> + '_ {
    series
        .points
        .iter()
        .filter(|p| p.value.is_finite())
        .map(|p| (p.timestamp, p.value))
}

/// Render temperature (left axis) and humidity (right axis) over a shared
/// time axis as PNG bytes
pub fn generate_chart(
    temperature: &Series,
    humidity: &Series,
    theme: Theme,
    width: u32,
    height: u32,
) -> Result<Vec<u8>, String> {
    let x_range = time_range(temperature, humidity)
        .ok_or_else(|| "Not enough data to generate chart.".to_string())?;

    // BitMapBackend encodes PNG only when writing to a path
    render_via_temp_file(|path| {
        draw_chart(path, x_range, temperature, humidity, theme, (width, height))
    })
}

/// Run `draw` against a fresh temp file and return what it wrote.
/// The file is removed whether or not drawing succeeded.
fn render_via_temp_file<F>(draw: F) -> Result<Vec<u8>, String>
where
    F: FnOnce(&Path) -> Result<(), String>,
{
    let temp_file = chart_file_path();
    let result = draw(&temp_file).and_then(|_| {
        std::fs::read(&temp_file).map_err(|e| format!("Failed to read chart file: {}", e))
    });
    let _ = std::fs::remove_file(&temp_file);
    result
}

fn chart_file_path() -> std::path::PathBuf {
    std::env::temp_dir().join(format!(
        "dht_chart_{}_{}_{}.png",
        std::process::id(),
        Utc::now().timestamp_millis(),
        CHART_FILE_COUNTER.fetch_add(1, Ordering::Relaxed)
    ))
}

fn draw_chart(
    path: &Path,
    x_range: Range<DateTime<Utc>>,
    temperature: &Series,
    humidity: &Series,
    theme: Theme,
    size: (u32, u32),
) -> Result<(), String> {
    let colors = ChartColors::for_theme(theme);
    {
        let backend = BitMapBackend::new(path, size);
        let root = backend.into_drawing_area();
        root.fill(&colors.background)
            .map_err(|e| format!("Failed to fill canvas: {}", e))?;

        let mut chart = ChartBuilder::on(&root)
            .caption(
                CHART_TITLE,
                ("sans-serif", 28.0)
                    .into_font()
                    .style(FontStyle::Bold)
                    .color(&colors.text),
            )
            .margin(15)
            .x_label_area_size(70)
            .y_label_area_size(60)
            .right_y_label_area_size(60)
            .build_cartesian_2d(x_range.clone(), TEMPERATURE_RANGE)
            .map_err(|e| format!("Failed to build chart: {}", e))?
            .set_secondary_coord(x_range, HUMIDITY_RANGE);

        chart
            .configure_mesh()
            .x_desc("Time (UTC)")
            .y_desc("Temperature (°C)")
            .x_labels(8)
            .x_label_formatter(&|t: &DateTime<Utc>| t.format(TIME_LABEL_FORMAT).to_string())
            .label_style(("sans-serif", 13.0).into_font().color(&colors.text))
            .axis_desc_style(("sans-serif", 16.0).into_font().color(&colors.text))
            .axis_style(colors.text)
            .bold_line_style(colors.grid.mix(0.6))
            .light_line_style(TRANSPARENT)
            .draw()
            .map_err(|e| format!("Failed to draw mesh: {}", e))?;

        chart
            .configure_secondary_axes()
            .y_desc("Humidity (%)")
            .label_style(("sans-serif", 13.0).into_font().color(&colors.text))
            .axis_desc_style(("sans-serif", 16.0).into_font().color(&colors.text))
            .axis_style(colors.text)
            .draw()
            .map_err(|e| format!("Failed to draw secondary axis: {}", e))?;

        if !temperature.is_empty() {
            chart
                .draw_series(LineSeries::new(plottable(temperature), RED.stroke_width(2)))
                .map_err(|e| format!("Failed to draw temperature line: {}", e))?
                .label("Temperature (°C)")
                .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], RED.stroke_width(2)));
            chart
                .draw_series(plottable(temperature).map(|p| Circle::new(p, 3, RED.filled())))
                .map_err(|e| format!("Failed to draw temperature points: {}", e))?;
        }

        if !humidity.is_empty() {
            chart
                .draw_secondary_series(LineSeries::new(plottable(humidity), BLUE.stroke_width(2)))
                .map_err(|e| format!("Failed to draw humidity line: {}", e))?
                .label("Humidity (%)")
                .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], BLUE.stroke_width(2)));
            chart
                .draw_secondary_series(plottable(humidity).map(|p| Cross::new(p, 4, BLUE.stroke_width(2))))
                .map_err(|e| format!("Failed to draw humidity points: {}", e))?;
        }

        chart
            .configure_series_labels()
            .position(SeriesLabelPosition::UpperLeft)
            .background_style(colors.background.mix(0.9))
            .border_style(colors.text)
            .label_font(("sans-serif", 14.0).into_font().color(&colors.text))
            .draw()
            .map_err(|e| format!("Failed to draw legend: {}", e))?;

        root.present()
            .map_err(|e| format!("Failed to render chart: {}", e))?;
    }
    Ok(())
}
