//! `charts` command handler.

use dermloc_charts::{load_dashboard, ChartsClient, ForecastModel, Panel, YearRange};
use dermloc_core::AppConfig;

/// Loads all dashboard panels and prints them as JSON.
///
/// # Errors
///
/// Returns an error for an unknown model name or if the charts client
/// cannot be built.
pub(crate) async fn run_charts(
    config: &AppConfig,
    start: Option<i32>,
    end: Option<i32>,
    model: Option<&str>,
) -> anyhow::Result<()> {
    let models = model_order(model)?;
    let range = YearRange::sanitize(start, end);
    let client = ChartsClient::new(
        &config.charts_api_base,
        config.request_timeout_secs,
        &config.user_agent,
    )?;

    let dashboard = load_dashboard(&client, range, &models).await;
    for (name, panel) in [
        ("incidence", &dashboard.incidence),
        ("forecast", &dashboard.forecast),
        ("correlation", &dashboard.correlation),
    ] {
        if let Panel::Failed { message } = panel {
            eprintln!("{name}: {message}");
        }
    }
    println!("{}", serde_json::to_string_pretty(&dashboard)?);
    Ok(())
}

/// The chosen model first, then the remaining fallback models.
pub(crate) fn model_order(first: Option<&str>) -> anyhow::Result<Vec<ForecastModel>> {
    let chosen = first
        .map(str::parse::<ForecastModel>)
        .transpose()?;
    Ok(ForecastModel::order_from(chosen))
}
