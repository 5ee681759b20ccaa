//! All three dashboard charts for one year range.

use serde::Serialize;

use crate::adapter::ChartsClient;
use crate::correlation::UvCorrelation;
use crate::error::ChartError;
use crate::incidence::AnnualIncidence;
use crate::predictive::{load_forecast, ForecastModel};
use crate::types::ChartSeries;
use crate::years::YearRange;

/// One chart or the message to show in its place.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum Panel {
    Ready { chart: ChartSeries },
    Failed { message: String },
}

impl Panel {
    fn from_result(name: &str, result: Result<ChartSeries, ChartError>) -> Self {
        match result {
            Ok(chart) => Panel::Ready { chart },
            Err(e) => {
                tracing::warn!(panel = name, error = %e, "chart panel failed");
                Panel::Failed {
                    message: e.to_string(),
                }
            }
        }
    }

    #[must_use]
    pub fn chart(&self) -> Option<&ChartSeries> {
        match self {
            Panel::Ready { chart } => Some(chart),
            Panel::Failed { .. } => None,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Dashboard {
    pub range: YearRange,
    pub incidence: Panel,
    /// Model that produced the forecast, if any did.
    pub forecast_model: Option<ForecastModel>,
    pub forecast: Panel,
    pub correlation: Panel,
}

/// Loads every panel concurrently. A failing panel does not affect the
/// others.
pub async fn load_dashboard(
    client: &ChartsClient,
    range: YearRange,
    models: &[ForecastModel],
) -> Dashboard {
    let incidence_source = AnnualIncidence::new(range);
    let correlation_source = UvCorrelation::new(range);

    let (incidence, forecast, correlation) = futures::join!(
        client.load(&incidence_source),
        load_forecast(client, models),
        client.load(&correlation_source),
    );

    let (forecast_model, forecast) = match forecast {
        Ok((model, chart)) => (Some(model), Ok(chart)),
        Err(e) => (None, Err(e)),
    };

    Dashboard {
        range,
        incidence: Panel::from_result("incidence", incidence),
        forecast_model,
        forecast: Panel::from_result("forecast", forecast),
        correlation: Panel::from_result("correlation", correlation),
    }
}
