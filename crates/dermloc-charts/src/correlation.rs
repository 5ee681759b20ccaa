//! UV index × cases correlation chart.
//!
//! Scatter plus a least-squares trend line when any year carries a mean UV
//! value; otherwise a plain cases-per-year line.

use serde::Deserialize;

use crate::adapter::SeriesSource;
use crate::types::{ChartKind, ChartSeries, Dataset, Point};
use crate::years::YearRange;

#[derive(Debug, Clone, Deserialize)]
pub struct CorrelationRow {
    pub ano: i32,
    #[serde(default)]
    pub uv_medio: Option<f64>,
    #[serde(default)]
    pub casos: Option<f64>,
}

#[derive(Debug, Clone, Copy)]
pub struct UvCorrelation {
    pub range: YearRange,
}

impl UvCorrelation {
    #[must_use]
    pub fn new(range: YearRange) -> Self {
        Self {
            range: range.observed(),
        }
    }
}

impl SeriesSource for UvCorrelation {
    type Row = CorrelationRow;

    fn name(&self) -> String {
        format!("uv correlation {}-{}", self.range.start, self.range.end)
    }

    fn path(&self) -> &'static str {
        "api/correlacao/uv-incidencia"
    }

    fn query(&self) -> Vec<(&'static str, String)> {
        self.range.query_pairs()
    }

    fn shape(&self, rows: Vec<CorrelationRow>) -> ChartSeries {
        let points: Vec<Point> = rows
            .iter()
            .filter_map(|row| {
                row.uv_medio.map(|uv| Point {
                    x: uv,
                    y: row.casos.unwrap_or(0.0),
                    year: Some(row.ano),
                })
            })
            .collect();

        if points.is_empty() {
            let (labels, values) = rows
                .into_iter()
                .map(|row| (row.ano.to_string(), Some(row.casos.unwrap_or(0.0))))
                .unzip();
            return ChartSeries {
                kind: ChartKind::Line,
                title: "UV index × cases".to_string(),
                x_title: "Year".to_string(),
                y_title: "Cases".to_string(),
                labels,
                datasets: vec![Dataset::values("Cases/year", values)],
            };
        }

        let mut datasets = Vec::with_capacity(2);
        let trend = trendline(&points);
        datasets.push(Dataset::points("Years", points));
        if let Some(line) = trend {
            datasets.push(Dataset {
                overlay_line: true,
                ..Dataset::points("Trend", line.to_vec())
            });
        }

        ChartSeries {
            kind: ChartKind::Scatter,
            title: "UV index × cases".to_string(),
            x_title: "Mean annual UV index".to_string(),
            y_title: "Annual cases".to_string(),
            labels: Vec::new(),
            datasets,
        }
    }
}

/// Least-squares line through `points`, as its two endpoints at the
/// smallest and largest x. A vertical spread of zero gives a flat line.
#[must_use]
pub fn trendline(points: &[Point]) -> Option<[Point; 2]> {
    if points.is_empty() {
        return None;
    }

    #[allow(clippy::cast_precision_loss)]
    let n = points.len() as f64;
    let mean_x = points.iter().map(|p| p.x).sum::<f64>() / n;
    let mean_y = points.iter().map(|p| p.y).sum::<f64>() / n;

    let (num, den) = points.iter().fold((0.0, 0.0), |(num, den), p| {
        let dx = p.x - mean_x;
        (num + dx * (p.y - mean_y), den + dx * dx)
    });
    let slope = if den.abs() < f64::EPSILON { 0.0 } else { num / den };
    let intercept = mean_y - slope * mean_x;

    let x0 = points.iter().map(|p| p.x).fold(f64::INFINITY, f64::min);
    let x1 = points.iter().map(|p| p.x).fold(f64::NEG_INFINITY, f64::max);
    let at = |x: f64| Point {
        x,
        y: slope * x + intercept,
        year: None,
    };
    Some([at(x0), at(x1)])
}
