//! HTTP gateway to the geodata query service.
//!
//! Endpoints are tried strictly in priority order with no retry inside a
//! single endpoint: a non-2xx status, network error or malformed body moves
//! on to the next endpoint. Only when every endpoint has failed does the
//! caller see [`LocatorError::DataSourceUnavailable`].

use std::future::Future;
use std::time::Duration;

use reqwest::{Client, Url};

use crate::error::LocatorError;
use crate::query::QueryText;
use crate::types::{OverpassResponse, RawRecord};

/// Anything that can answer a query with raw records.
pub trait RecordSource {
    /// Issues `query` and returns the raw records it matched.
    fn fetch_records(
        &self,
        query: &QueryText,
    ) -> impl Future<Output = Result<Vec<RawRecord>, LocatorError>> + Send;
}

/// Client for the geodata query service with ordered endpoint fallback.
#[derive(Debug, Clone)]
pub struct OverpassGateway {
    client: Client,
    endpoints: Vec<Url>,
}

impl OverpassGateway {
    /// Creates a gateway for `endpoints`, tried in the given order.
    ///
    /// # Errors
    ///
    /// - [`LocatorError::NoEndpoints`] if `endpoints` is empty.
    /// - [`LocatorError::InvalidEndpoint`] if any entry is not a valid URL.
    /// - [`LocatorError::Http`] if the underlying `reqwest::Client` cannot be
    ///   constructed.
    pub fn new(
        endpoints: &[String],
        timeout_secs: u64,
        user_agent: &str,
    ) -> Result<Self, LocatorError> {
        if endpoints.is_empty() {
            return Err(LocatorError::NoEndpoints);
        }

        let endpoints = endpoints
            .iter()
            .map(|raw| {
                Url::parse(raw).map_err(|e| LocatorError::InvalidEndpoint {
                    url: raw.clone(),
                    reason: e.to_string(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;

        Ok(Self { client, endpoints })
    }

    #[must_use]
    pub fn endpoints(&self) -> &[Url] {
        &self.endpoints
    }

    /// Sends `query` to each endpoint in turn until one answers well-formed.
    ///
    /// # Errors
    ///
    /// Returns [`LocatorError::DataSourceUnavailable`] carrying the last
    /// underlying error once all endpoints have failed.
    pub async fn fetch_records(&self, query: &QueryText) -> Result<Vec<RawRecord>, LocatorError> {
        let mut last_error: Option<LocatorError> = None;

        for endpoint in &self.endpoints {
            tracing::debug!(endpoint = %endpoint, "querying geodata endpoint");
            match self.fetch_from(endpoint, query).await {
                Ok(records) => {
                    tracing::debug!(endpoint = %endpoint, count = records.len(), "geodata endpoint answered");
                    return Ok(records);
                }
                Err(err) => {
                    tracing::warn!(endpoint = %endpoint, error = %err, "geodata endpoint failed; trying next");
                    last_error = Some(err);
                }
            }
        }

        Err(LocatorError::DataSourceUnavailable {
            attempts: self.endpoints.len(),
            last_error: Box::new(last_error.unwrap_or(LocatorError::NoEndpoints)),
        })
    }

    async fn fetch_from(
        &self,
        endpoint: &Url,
        query: &QueryText,
    ) -> Result<Vec<RawRecord>, LocatorError> {
        let response = self
            .client
            .post(endpoint.clone())
            .header(reqwest::header::ACCEPT, "application/json")
            .form(&[("data", query.as_str())])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(LocatorError::UnexpectedStatus {
                status: status.as_u16(),
                url: endpoint.to_string(),
            });
        }

        let body = response.text().await?;
        let parsed = serde_json::from_str::<OverpassResponse>(&body).map_err(|e| {
            LocatorError::Deserialize {
                context: format!("geodata response from {endpoint}"),
                source: e,
            }
        })?;

        let total = parsed.elements.len();
        let records: Vec<RawRecord> = parsed
            .elements
            .into_iter()
            .filter_map(|value| match RawRecord::from_value(value) {
                Ok(record) => Some(record),
                Err(err) => {
                    tracing::warn!(endpoint = %endpoint, error = %err, "skipping unreadable geodata element");
                    None
                }
            })
            .collect();

        if records.len() < total {
            tracing::debug!(
                endpoint = %endpoint,
                kept = records.len(),
                total,
                "dropped unreadable geodata elements"
            );
        }

        Ok(records)
    }
}

impl RecordSource for OverpassGateway {
    async fn fetch_records(&self, query: &QueryText) -> Result<Vec<RawRecord>, LocatorError> {
        OverpassGateway::fetch_records(self, query).await
    }
}
