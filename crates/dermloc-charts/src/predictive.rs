//! Forecast line chart with a 95% interval, with model fallback.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::adapter::{ChartsClient, SeriesSource};
use crate::error::ChartError;
use crate::types::{ChartKind, ChartSeries, Dataset};

/// Forecasting model offered by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ForecastModel {
    Arima,
    Ets,
}

impl ForecastModel {
    /// Tried in this order when no model is chosen.
    pub const FALLBACK_ORDER: [ForecastModel; 2] = [ForecastModel::Arima, ForecastModel::Ets];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ForecastModel::Arima => "ARIMA",
            ForecastModel::Ets => "ETS",
        }
    }

    /// `chosen` first, then the remaining models in fallback order.
    #[must_use]
    pub fn order_from(chosen: Option<ForecastModel>) -> Vec<ForecastModel> {
        let Some(chosen) = chosen else {
            return Self::FALLBACK_ORDER.to_vec();
        };
        let mut order = vec![chosen];
        order.extend(Self::FALLBACK_ORDER.iter().copied().filter(|m| *m != chosen));
        order
    }
}

impl fmt::Display for ForecastModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ForecastModel {
    type Err = ChartError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "ARIMA" => Ok(ForecastModel::Arima),
            "ETS" => Ok(ForecastModel::Ets),
            _ => Err(ChartError::UnknownModel(s.trim().to_string())),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ForecastRow {
    pub ano: i32,
    pub point: Option<f64>,
    pub lo95: Option<f64>,
    pub hi95: Option<f64>,
}

#[derive(Debug, Clone, Copy)]
pub struct Forecast {
    pub model: ForecastModel,
}

impl SeriesSource for Forecast {
    type Row = ForecastRow;

    fn name(&self) -> String {
        format!("forecast {}", self.model)
    }

    fn path(&self) -> &'static str {
        "api/preditivo/anual"
    }

    fn query(&self) -> Vec<(&'static str, String)> {
        vec![("modelo", self.model.as_str().to_string())]
    }

    fn shape(&self, rows: Vec<ForecastRow>) -> ChartSeries {
        let mut labels = Vec::with_capacity(rows.len());
        let mut point = Vec::with_capacity(rows.len());
        let mut lo95 = Vec::with_capacity(rows.len());
        let mut hi95 = Vec::with_capacity(rows.len());
        for row in rows {
            labels.push(row.ano.to_string());
            point.push(row.point);
            lo95.push(row.lo95);
            hi95.push(row.hi95);
        }

        ChartSeries {
            kind: ChartKind::Line,
            title: format!("Forecast ({})", self.model),
            x_title: "Year".to_string(),
            y_title: "Cases (forecast)".to_string(),
            labels,
            datasets: vec![
                Dataset::values(format!("Forecast ({})", self.model), point),
                Dataset::values("95% interval (low)", lo95),
                Dataset::values("95% interval (high)", hi95),
            ],
        }
    }
}

/// Loads the forecast for the first of `models` that returns data.
///
/// # Errors
///
/// Returns [`ChartError::AllModelsFailed`] if every model errors or comes
/// back empty.
pub async fn load_forecast(
    client: &ChartsClient,
    models: &[ForecastModel],
) -> Result<(ForecastModel, ChartSeries), ChartError> {
    for &model in models {
        match client.load(&Forecast { model }).await {
            Ok(chart) => return Ok((model, chart)),
            Err(e) => {
                tracing::warn!(model = %model, error = %e, "forecast model unavailable; trying next");
            }
        }
    }

    Err(ChartError::AllModelsFailed {
        tried: models.iter().map(ToString::to_string).collect(),
    })
}
