use crate::comparatif::{ColumnSchema, EnergyType};
use crate::http::ApiError;
use crate::utils::{is_blank, json_f64, json_text, parse_axis_date};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use chrono::NaiveDate;
use plotters::prelude::*;
use serde_json::Value;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

pub const AXIS_DATE_FORMAT: &str = "%d/%m/%Y";
pub const PRICE_AXIS_LABEL: &str = "Prix €/MWh";

/// black, royal blue, green, red
pub const PALETTE: [RGBColor; 4] = [
    RGBColor(0, 0, 0),
    RGBColor(65, 105, 225),
    RGBColor(0, 128, 0),
    RGBColor(255, 0, 0),
];

#[derive(Debug, Clone, Error, PartialEq)]
pub enum ChartError {
    #[error("Missing or empty field: {0}")]
    Missing(String),

    #[error("Invalid chart data: {0}")]
    Invalid(String),

    #[error("Chart backend failure: {0}")]
    Backend(String),
}

impl From<ChartError> for ApiError {
    fn from(err: ChartError) -> Self {
        ApiError::Chart(err.to_string())
    }
}

fn backend_error<E: fmt::Display>(err: E) -> ChartError {
    ChartError::Backend(err.to_string())
}

/// What to do when chart input is unusable.
///
/// The gas presentation aborts (`Strict`), the electricity one renders
/// without the chart (`Lenient`); both defaults are overridable in config.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartPolicy {
    Strict,
    Lenient,
}

impl FromStr for ChartPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "strict" => Ok(ChartPolicy::Strict),
            "lenient" => Ok(ChartPolicy::Lenient),
            other => Err(format!("Invalid chart policy '{}': expected strict or lenient", other)),
        }
    }
}

impl ChartPolicy {
    /// Strict surfaces the error, lenient degrades to "no chart".
    pub fn apply<T>(self, result: Result<T, ChartError>) -> Result<Option<T>, ApiError> {
        match (result, self) {
            (Ok(value), _) => Ok(Some(value)),
            (Err(err), ChartPolicy::Strict) => Err(err.into()),
            (Err(err), ChartPolicy::Lenient) => {
                tracing::warn!("⚠️ Chart skipped: {}", err);
                Ok(None)
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PriceSeries {
    pub label: String,
    pub color: RGBColor,
    pub values: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LineChartSpec {
    pub title: String,
    pub y_label: String,
    pub dates: Vec<NaiveDate>,
    pub series: Vec<PriceSeries>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BarSeries {
    pub label: String,
    pub values: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StackedBarSpec {
    pub categories: Vec<String>,
    pub series: Vec<BarSeries>,
}

fn non_empty_array<'a>(value: Option<&'a Value>, name: &str) -> Result<&'a Vec<Value>, ChartError> {
    match value {
        Some(Value::Array(items)) if !items.is_empty() => Ok(items),
        _ => Err(ChartError::Missing(name.to_string())),
    }
}

/// Validates and aligns the price-evolution series against the date axis.
/// Series longer than the axis are truncated; shorter ones cover the
/// leading dates only.
pub fn prepare_line_series(
    x_axis_dates: &[Value],
    series: &[Value],
    date_format: &str,
    title: &str,
) -> Result<LineChartSpec, ChartError> {
    if x_axis_dates.is_empty() {
        return Err(ChartError::Missing("xAxis[0].data".to_string()));
    }
    if series.is_empty() {
        return Err(ChartError::Missing("series".to_string()));
    }

    let dates = x_axis_dates
        .iter()
        .enumerate()
        .map(|(idx, raw)| {
            raw.as_str()
                .and_then(|s| parse_axis_date(s, date_format))
                .ok_or_else(|| ChartError::Invalid(format!("invalid date in xAxis data at {}: {}", idx, raw)))
        })
        .collect::<Result<Vec<_>, _>>()?;

    let mut prepared = Vec::with_capacity(series.len());
    for (idx, entry) in series.iter().enumerate() {
        let data = non_empty_array(entry.get("data"), &format!("series[{}].data", idx))?;
        let mut values = data
            .iter()
            .map(|v| {
                json_f64(v).ok_or_else(|| {
                    ChartError::Invalid(format!("invalid numeric data in series[{}]: {}", idx, v))
                })
            })
            .collect::<Result<Vec<f64>, _>>()?;
        values.truncate(dates.len());

        let label = json_text(entry.get("label")).unwrap_or_else(|| format!("Series {}", idx + 1));
        prepared.push(PriceSeries {
            label,
            color: PALETTE[idx % PALETTE.len()],
            values,
        });
    }

    Ok(LineChartSpec {
        title: title.to_string(),
        y_label: PRICE_AXIS_LABEL.to_string(),
        dates,
        series: prepared,
    })
}

/// Extracts `chartDataDto` from the request payload.
pub fn prepare_price_chart(
    chart_data: Option<&Value>,
    energy_type: Option<EnergyType>,
) -> Result<LineChartSpec, ChartError> {
    if is_blank(chart_data) {
        return Err(ChartError::Missing("chartDataDto".to_string()));
    }
    let chart_data = chart_data.ok_or_else(|| ChartError::Missing("chartDataDto".to_string()))?;

    let x_axis = non_empty_array(chart_data.get("xAxis"), "xAxis")?;
    let series = non_empty_array(chart_data.get("series"), "series")?;
    let dates = non_empty_array(x_axis[0].get("data"), "xAxis[0].data")?;

    prepare_line_series(dates, series, AXIS_DATE_FORMAT, EnergyType::chart_title(energy_type))
}

/// Consumption bars. Returns `None` for absent, malformed or all-zero input.
/// With a column schema, series named after rate components follow the
/// schema order; other series keep their order after them.
pub fn prepare_stacked_bars(data: Option<&Value>, columns: Option<&ColumnSchema>) -> Option<StackedBarSpec> {
    let data = data?;
    let categories: Vec<String> = data
        .get("categories")?
        .as_array()?
        .iter()
        .map(|c| json_text(Some(c)).unwrap_or_default())
        .collect();
    if categories.is_empty() {
        return None;
    }

    let mut series = Vec::new();
    for entry in data.get("series")?.as_array()? {
        let label = json_text(entry.get("label"))?;
        let mut values = entry
            .get("data")?
            .as_array()?
            .iter()
            .map(json_f64)
            .collect::<Option<Vec<f64>>>()?;
        if values.iter().any(|v| *v < 0.0 || !v.is_finite()) {
            return None;
        }
        values.resize(categories.len(), 0.0);
        series.push(BarSeries { label, values });
    }

    if series.is_empty() || series.iter().all(|s| s.values.iter().all(|v| *v == 0.0)) {
        return None;
    }

    if let Some(schema) = columns {
        // sort_by_key is stable
        series.sort_by_key(|s| schema.position(&s.label).unwrap_or(usize::MAX));
    }

    Some(StackedBarSpec { categories, series })
}

/// Chart rasterizer. Output is deterministic for identical input.
pub trait ChartRenderer: Send + Sync {
    fn render_line_chart(&self, spec: &LineChartSpec) -> Result<Vec<u8>, ChartError>;

    fn render_stacked_bar_chart(&self, spec: &StackedBarSpec) -> Result<Vec<u8>, ChartError>;

    fn mime_type(&self) -> &'static str;
}

pub fn to_data_uri(bytes: &[u8], mime_type: &str) -> String {
    format!("data:{};base64,{}", mime_type, BASE64.encode(bytes))
}

/// Draws charts as SVG through plotters.
pub struct SvgChartRenderer {
    pub width: u32,
    pub height: u32,
}

impl Default for SvgChartRenderer {
    fn default() -> Self {
        Self {
            width: 1200,
            height: 700,
        }
    }
}

fn value_range(values: impl Iterator<Item = f64>) -> (f64, f64) {
    let (min, max) = values.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| (lo.min(v), hi.max(v)));
    if !min.is_finite() || !max.is_finite() {
        return (0.0, 1.0);
    }
    if (max - min).abs() < f64::EPSILON {
        return (min - 1.0, max + 1.0);
    }
    let pad = (max - min) * 0.05;
    (min - pad, max + pad)
}

impl ChartRenderer for SvgChartRenderer {
    fn render_line_chart(&self, spec: &LineChartSpec) -> Result<Vec<u8>, ChartError> {
        let mut svg = String::new();
        {
            let root = SVGBackend::with_string(&mut svg, (self.width, self.height)).into_drawing_area();
            root.fill(&WHITE).map_err(backend_error)?;

            let (y_min, y_max) = value_range(spec.series.iter().flat_map(|s| s.values.iter().copied()));
            let x_max = spec.dates.len().saturating_sub(1).max(1);
            let dates = &spec.dates;

            let mut chart = ChartBuilder::on(&root)
                .caption(spec.title.as_str(), ("sans-serif", 28))
                .margin(20)
                .x_label_area_size(50)
                .y_label_area_size(70)
                .build_cartesian_2d(0usize..x_max, y_min..y_max)
                .map_err(backend_error)?;

            chart
                .configure_mesh()
                .y_desc(spec.y_label.as_str())
                .x_labels(dates.len().min(12))
                .x_label_formatter(&|idx| {
                    dates
                        .get(*idx)
                        .map(|d| d.format("%d-%m-%Y").to_string())
                        .unwrap_or_default()
                })
                .x_label_style(("sans-serif", 12))
                .light_line_style(RGBColor(220, 220, 220))
                .draw()
                .map_err(backend_error)?;

            for series in &spec.series {
                let color = series.color;
                chart
                    .draw_series(LineSeries::new(
                        series.values.iter().enumerate().map(|(i, v)| (i, *v)),
                        color.stroke_width(2),
                    ))
                    .map_err(backend_error)?
                    .label(series.label.as_str())
                    .legend(move |(x, y)| Circle::new((x + 10, y), 5, color.filled()));
            }

            chart
                .configure_series_labels()
                .position(SeriesLabelPosition::LowerMiddle)
                .background_style(WHITE.mix(0.8))
                .border_style(TRANSPARENT)
                .draw()
                .map_err(backend_error)?;

            root.present().map_err(backend_error)?;
        }
        Ok(svg.into_bytes())
    }

    fn render_stacked_bar_chart(&self, spec: &StackedBarSpec) -> Result<Vec<u8>, ChartError> {
        let mut svg = String::new();
        {
            let root = SVGBackend::with_string(&mut svg, (self.width, self.height)).into_drawing_area();
            root.fill(&WHITE).map_err(backend_error)?;

            let n = spec.categories.len() as u32;
            let totals: Vec<f64> = (0..spec.categories.len())
                .map(|i| spec.series.iter().map(|s| s.values.get(i).copied().unwrap_or(0.0)).sum())
                .collect();
            let y_max = totals.iter().copied().fold(0.0, f64::max) * 1.1;
            let categories = &spec.categories;

            let mut chart = ChartBuilder::on(&root)
                .margin(20)
                .x_label_area_size(50)
                .y_label_area_size(70)
                .build_cartesian_2d((0u32..n).into_segmented(), 0f64..y_max.max(1.0))
                .map_err(backend_error)?;

            chart
                .configure_mesh()
                .disable_x_mesh()
                .y_desc("MWh")
                .x_label_formatter(&|v| match v {
                    SegmentValue::CenterOf(i) => categories.get(*i as usize).cloned().unwrap_or_default(),
                    _ => String::new(),
                })
                .draw()
                .map_err(backend_error)?;

            let mut base = vec![0.0; spec.categories.len()];
            for (idx, series) in spec.series.iter().enumerate() {
                let color = PALETTE[idx % PALETTE.len()];
                let bars: Vec<Rectangle<(SegmentValue<u32>, f64)>> = series
                    .values
                    .iter()
                    .enumerate()
                    .map(|(i, value)| {
                        let bottom = base[i];
                        let top = bottom + value;
                        base[i] = top;
                        let mut bar = Rectangle::new(
                            [
                                (SegmentValue::Exact(i as u32), bottom),
                                (SegmentValue::Exact(i as u32 + 1), top),
                            ],
                            color.mix(0.85).filled(),
                        );
                        bar.set_margin(0, 0, 8, 8);
                        bar
                    })
                    .collect();

                chart
                    .draw_series(bars)
                    .map_err(backend_error)?
                    .label(series.label.as_str())
                    .legend(move |(x, y)| Rectangle::new([(x, y - 5), (x + 15, y + 5)], color.filled()));
            }

            chart
                .configure_series_labels()
                .position(SeriesLabelPosition::UpperRight)
                .background_style(WHITE.mix(0.8))
                .border_style(BLACK)
                .draw()
                .map_err(backend_error)?;

            root.present().map_err(backend_error)?;
        }
        Ok(svg.into_bytes())
    }

    fn mime_type(&self) -> &'static str {
        "image/svg+xml"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::comparatif::resolve_columns;
    use serde_json::json;

    fn chart_dto() -> Value {
        json!({
            "xAxis": [{"data": ["01/01/2024", "01/02/2024", "01/03/2024"]}],
            "series": [
                {"label": "Marché", "data": [101.5, 98.2, 96.0, 94.1]},
                {"data": ["88,5", 90]}
            ]
        })
    }

    #[test]
    fn test_prepare_price_chart_aligns_series() {
        let spec = prepare_price_chart(Some(&chart_dto()), Some(EnergyType::Gas)).unwrap();
        assert_eq!(spec.title, "Évolution Gaz");
        assert_eq!(spec.dates.len(), 3);
        assert_eq!(spec.series[0].values, vec![101.5, 98.2, 96.0]);
        assert_eq!(spec.series[1].label, "Series 2");
        assert_eq!(spec.series[1].values, vec![88.5, 90.0]);
        assert_eq!(spec.series[1].color, PALETTE[1]);
    }

    #[test]
    fn test_missing_pieces_are_reported() {
        assert_eq!(
            prepare_price_chart(None, None).unwrap_err(),
            ChartError::Missing("chartDataDto".into())
        );
        let no_series = json!({"xAxis": [{"data": ["01/01/2024"]}], "series": []});
        assert_eq!(
            prepare_price_chart(Some(&no_series), None).unwrap_err(),
            ChartError::Missing("series".into())
        );
        let no_dates = json!({"xAxis": [{"data": []}], "series": [{"data": [1]}]});
        assert_eq!(
            prepare_price_chart(Some(&no_dates), None).unwrap_err(),
            ChartError::Missing("xAxis[0].data".into())
        );
    }

    #[test]
    fn test_numeric_failure_invalidates_chart() {
        let bad = json!({
            "xAxis": [{"data": ["01/01/2024"]}],
            "series": [{"label": "x", "data": ["oops"]}]
        });
        let err = prepare_price_chart(Some(&bad), None).unwrap_err();
        assert!(matches!(err, ChartError::Invalid(_)));

        assert_eq!(ChartPolicy::Lenient.apply::<()>(Err(err.clone())).unwrap(), None);
        assert!(matches!(
            ChartPolicy::Strict.apply::<()>(Err(err)),
            Err(ApiError::Chart(_))
        ));
    }

    #[test]
    fn test_stacked_bars_none_cases() {
        assert!(prepare_stacked_bars(None, None).is_none());
        let zeros = json!({"categories": ["Jan", "Fév"], "series": [{"label": "HP", "data": [0, 0]}]});
        assert!(prepare_stacked_bars(Some(&zeros), None).is_none());
        let malformed = json!({"categories": ["Jan"], "series": [{"label": "HP", "data": ["x"]}]});
        assert!(prepare_stacked_bars(Some(&malformed), None).is_none());
        let empty = json!({"categories": [], "series": []});
        assert!(prepare_stacked_bars(Some(&empty), None).is_none());
    }

    #[test]
    fn test_stacked_bars_follow_column_schema() {
        let data = json!({
            "categories": ["Jan", "Fév", "Mar"],
            "series": [
                {"label": "Autre", "data": [1, 1, 1]},
                {"label": "HC", "data": [2, 3]},
                {"label": "HP", "data": [4, 5, 6]}
            ]
        });
        let schema = resolve_columns("C5", "", "C5HP");
        let spec = prepare_stacked_bars(Some(&data), Some(&schema)).unwrap();
        let labels: Vec<&str> = spec.series.iter().map(|s| s.label.as_str()).collect();
        assert_eq!(labels, vec!["HP", "HC", "Autre"]);
        assert_eq!(spec.series[1].values, vec![2.0, 3.0, 0.0]);
    }

    #[test]
    fn test_svg_renderer_outputs_svg() {
        let renderer = SvgChartRenderer::default();
        let spec = prepare_price_chart(Some(&chart_dto()), Some(EnergyType::Electricity)).unwrap();
        let bytes = renderer.render_line_chart(&spec).unwrap();
        let svg = String::from_utf8(bytes).unwrap();
        assert!(svg.contains("<svg"));

        let uri = to_data_uri(svg.as_bytes(), renderer.mime_type());
        assert!(uri.starts_with("data:image/svg+xml;base64,"));
    }
}
