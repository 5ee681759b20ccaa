//! Dashboard time series: annual incidence, forecast and UV correlation.
//!
//! Each chart is a [`SeriesSource`] loaded through the shared
//! [`ChartsClient`] adapter.

pub mod adapter;
pub mod correlation;
pub mod dashboard;
pub mod error;
pub mod incidence;
pub mod predictive;
pub mod types;
pub mod years;

pub use adapter::{ChartsClient, SeriesSource};
pub use correlation::{trendline, UvCorrelation};
pub use dashboard::{load_dashboard, Dashboard, Panel};
pub use error::ChartError;
pub use incidence::AnnualIncidence;
pub use predictive::{load_forecast, Forecast, ForecastModel};
pub use types::{ChartKind, ChartSeries, DataPoints, Dataset, Point};
pub use years::YearRange;
