//! Chart-ready series shapes consumed by the charting surface.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartKind {
    Bar,
    Line,
    Scatter,
}

/// An (x, y) point, optionally tagged with the year it came from.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub year: Option<i32>,
}

/// Dataset payload: either values aligned with the series labels or free
/// (x, y) points for scatter plots.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum DataPoints {
    Values(Vec<Option<f64>>),
    Points(Vec<Point>),
}

impl DataPoints {
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            DataPoints::Values(v) => v.len(),
            DataPoints::Points(p) => p.len(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dataset {
    pub label: String,
    pub data: DataPoints,
    /// Drawn as a line over a scatter plot.
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub overlay_line: bool,
}

impl Dataset {
    #[must_use]
    pub fn values(label: impl Into<String>, values: Vec<Option<f64>>) -> Self {
        Self {
            label: label.into(),
            data: DataPoints::Values(values),
            overlay_line: false,
        }
    }

    #[must_use]
    pub fn points(label: impl Into<String>, points: Vec<Point>) -> Self {
        Self {
            label: label.into(),
            data: DataPoints::Points(points),
            overlay_line: false,
        }
    }
}

/// One chart: labels along x plus one or more datasets.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSeries {
    pub kind: ChartKind,
    pub title: String,
    pub x_title: String,
    pub y_title: String,
    /// Empty for scatter plots.
    pub labels: Vec<String>,
    pub datasets: Vec<Dataset>,
}
