//! Annual incidence bar chart.

use serde::Deserialize;

use crate::adapter::SeriesSource;
use crate::types::{ChartKind, ChartSeries, Dataset};
use crate::years::YearRange;

#[derive(Debug, Clone, Deserialize)]
pub struct IncidenceRow {
    pub ano: i32,
    #[serde(default)]
    pub casos: Option<f64>,
}

/// Cases per year over an observed range.
#[derive(Debug, Clone, Copy)]
pub struct AnnualIncidence {
    pub range: YearRange,
}

impl AnnualIncidence {
    /// Series over `range`, capped at the last observed year.
    #[must_use]
    pub fn new(range: YearRange) -> Self {
        Self {
            range: range.observed(),
        }
    }
}

impl SeriesSource for AnnualIncidence {
    type Row = IncidenceRow;

    fn name(&self) -> String {
        format!("incidence {}-{}", self.range.start, self.range.end)
    }

    fn path(&self) -> &'static str {
        "api/incidencia/anual"
    }

    fn query(&self) -> Vec<(&'static str, String)> {
        self.range.query_pairs()
    }

    fn shape(&self, rows: Vec<IncidenceRow>) -> ChartSeries {
        let (labels, values) = rows
            .into_iter()
            .map(|row| (row.ano.to_string(), Some(row.casos.unwrap_or(0.0))))
            .unzip();

        ChartSeries {
            kind: ChartKind::Bar,
            title: format!("Incidence history ({}-{})", self.range.start, self.range.end),
            x_title: "Year".to_string(),
            y_title: "Cases".to_string(),
            labels,
            datasets: vec![Dataset::values("Cases/year", values)],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shape_builds_bar_chart_with_missing_counts_as_zero() {
        let source = AnnualIncidence::new(YearRange::default());
        let rows = vec![
            IncidenceRow { ano: 2000, casos: Some(120.0) },
            IncidenceRow { ano: 2001, casos: None },
        ];
        let chart = source.shape(rows);
        assert_eq!(chart.kind, ChartKind::Bar);
        assert_eq!(chart.labels, vec!["2000", "2001"]);
        assert_eq!(
            chart.datasets[0].data,
            crate::types::DataPoints::Values(vec![Some(120.0), Some(0.0)])
        );
    }

    #[test]
    fn range_is_capped_to_observed_years() {
        let source = AnnualIncidence::new(YearRange::sanitize(Some(2010), Some(2030)));
        assert_eq!(
            source.query(),
            vec![("start", "2010".to_string()), ("end", "2023".to_string())]
        );
    }
}
