//! Year range handling for the dashboard inputs.

use serde::Serialize;

pub const DEFAULT_START_YEAR: i32 = 2000;
/// Last year with observed data.
pub const MAX_OBSERVED_YEAR: i32 = 2023;
/// Last forecast year.
pub const MAX_FORECAST_YEAR: i32 = 2033;
pub const MIN_YEAR: i32 = 1990;

/// An inclusive, ordered year range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct YearRange {
    pub start: i32,
    pub end: i32,
}

impl Default for YearRange {
    fn default() -> Self {
        Self {
            start: DEFAULT_START_YEAR,
            end: MAX_OBSERVED_YEAR,
        }
    }
}

impl YearRange {
    /// Fills missing bounds with defaults, clamps both into
    /// `MIN_YEAR..=MAX_FORECAST_YEAR` and swaps them if reversed.
    #[must_use]
    pub fn sanitize(start: Option<i32>, end: Option<i32>) -> Self {
        let start = start
            .unwrap_or(DEFAULT_START_YEAR)
            .clamp(MIN_YEAR, MAX_FORECAST_YEAR);
        let end = end
            .unwrap_or(MAX_OBSERVED_YEAR)
            .clamp(MIN_YEAR, MAX_FORECAST_YEAR);
        if end < start {
            Self {
                start: end,
                end: start,
            }
        } else {
            Self { start, end }
        }
    }

    /// Both bounds capped at the last observed year.
    #[must_use]
    pub fn observed(self) -> Self {
        Self {
            start: self.start.min(MAX_OBSERVED_YEAR),
            end: self.end.min(MAX_OBSERVED_YEAR),
        }
    }

    pub(crate) fn query_pairs(self) -> Vec<(&'static str, String)> {
        vec![
            ("start", self.start.to_string()),
            ("end", self.end.to_string()),
        ]
    }
}
