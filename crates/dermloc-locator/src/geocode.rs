//! Free-text address lookup against a Nominatim-style geocoder.

use std::time::Duration;

use dermloc_core::Coordinate;
use reqwest::{Client, Url};
use serde::Deserialize;

use crate::error::LocatorError;

/// One geocoder candidate. Coordinates arrive as strings.
#[derive(Debug, Deserialize)]
struct Candidate {
    lat: String,
    lon: String,
    #[serde(default)]
    display_name: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Geocoder {
    client: Client,
    base_url: Url,
}

impl Geocoder {
    /// # Errors
    ///
    /// Returns [`LocatorError::InvalidEndpoint`] if `base_url` does not parse,
    /// or [`LocatorError::Http`] if the client cannot be built.
    pub fn new(base_url: &str, timeout_secs: u64, user_agent: &str) -> Result<Self, LocatorError> {
        let base_url = Url::parse(base_url).map_err(|e| LocatorError::InvalidEndpoint {
            url: base_url.to_string(),
            reason: e.to_string(),
        })?;

        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .user_agent(user_agent)
            .build()?;

        Ok(Self { client, base_url })
    }

    /// Resolves `query` to the first candidate's coordinate.
    ///
    /// # Errors
    ///
    /// - [`LocatorError::GeocodeNotFound`] for a blank query (no request is
    ///   sent) or when the geocoder returns no candidates.
    /// - [`LocatorError::UnexpectedStatus`] / [`LocatorError::Http`] on
    ///   transport failures.
    /// - [`LocatorError::Deserialize`] if the body or the candidate's
    ///   coordinates cannot be parsed.
    pub async fn geocode(&self, query: &str) -> Result<Coordinate, LocatorError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(LocatorError::GeocodeNotFound {
                query: String::new(),
            });
        }

        let response = self
            .client
            .get(self.base_url.clone())
            .header(reqwest::header::ACCEPT, "application/json")
            .query(&[
                ("format", "json"),
                ("limit", "1"),
                ("accept-language", "pt-BR"),
                ("countrycodes", "br"),
                ("q", query),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(LocatorError::UnexpectedStatus {
                status: status.as_u16(),
                url: self.base_url.to_string(),
            });
        }

        let body = response.text().await?;
        let candidates: Vec<Candidate> =
            serde_json::from_str(&body).map_err(|e| LocatorError::Deserialize {
                context: "geocoder response".to_string(),
                source: e,
            })?;

        let Some(first) = candidates.into_iter().next() else {
            tracing::debug!(query, "geocoder returned no candidates");
            return Err(LocatorError::GeocodeNotFound {
                query: query.to_string(),
            });
        };

        let coordinate = parse_candidate(&first)?;
        tracing::debug!(
            query,
            lat = coordinate.lat,
            lon = coordinate.lon,
            display_name = first.display_name.as_deref().unwrap_or_default(),
            "geocoded address"
        );
        Ok(coordinate)
    }
}

fn parse_candidate(candidate: &Candidate) -> Result<Coordinate, LocatorError> {
    let parse = |raw: &str| {
        serde_json::from_str::<f64>(raw.trim()).map_err(|e| LocatorError::Deserialize {
            context: format!("geocoder coordinate \"{raw}\""),
            source: e,
        })
    };
    // JSON number grammar rejects NaN and infinities.
    Ok(Coordinate::new(parse(&candidate.lat)?, parse(&candidate.lon)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(lat: &str, lon: &str) -> Candidate {
        Candidate {
            lat: lat.to_owned(),
            lon: lon.to_owned(),
            display_name: None,
        }
    }

    #[test]
    fn parses_string_coordinates() {
        let c = parse_candidate(&candidate("-23.5505", " -46.6333")).unwrap();
        assert_eq!(c, Coordinate::new(-23.5505, -46.6333));
    }

    #[test]
    fn rejects_non_numeric_coordinates() {
        let err = parse_candidate(&candidate("north", "-46.6")).unwrap_err();
        assert!(matches!(err, LocatorError::Deserialize { .. }), "got: {err:?}");
    }

    #[test]
    fn new_rejects_unparseable_base_url() {
        let err = Geocoder::new("nominatim", 5, "dermloc-test/0.1").unwrap_err();
        assert!(matches!(err, LocatorError::InvalidEndpoint { .. }));
    }
}
