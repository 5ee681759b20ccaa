//! Acquiring the user's position with a bounded wait.

use std::future::Future;
use std::time::Duration;

use dermloc_core::Coordinate;
use thiserror::Error;

use crate::error::LocatorError;

/// A position reported by a provider.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Fix {
    pub coordinate: Coordinate,
    /// Accuracy radius in meters, when the provider reports one.
    pub accuracy_m: Option<f64>,
}

/// Failures a position provider can report.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ProviderError {
    #[error("permission denied")]
    PermissionDenied,

    #[error("position unavailable")]
    PositionUnavailable,

    #[error("timeout")]
    Timeout,

    #[error("geolocation not supported")]
    Unsupported,
}

/// Source of the user's current position.
pub trait LocationProvider {
    fn current_fix(&self) -> impl Future<Output = Result<Fix, ProviderError>> + Send;
}

/// Provider that always answers with a preset position: manual
/// coordinates, a map click or a dragged marker.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedLocation(pub Fix);

impl FixedLocation {
    #[must_use]
    pub fn new(coordinate: Coordinate, accuracy_m: Option<f64>) -> Self {
        Self(Fix {
            coordinate,
            accuracy_m,
        })
    }
}

impl LocationProvider for FixedLocation {
    async fn current_fix(&self) -> Result<Fix, ProviderError> {
        if self.0.coordinate.is_finite() {
            Ok(self.0)
        } else {
            Err(ProviderError::PositionUnavailable)
        }
    }
}

/// Asks `provider` for a fix, giving up after `timeout`.
///
/// # Errors
///
/// Returns [`LocatorError::LocationUnavailable`] carrying the provider's
/// reason, or `"timeout"` when the wait elapses.
pub async fn acquire_location<P: LocationProvider>(
    provider: &P,
    timeout: Duration,
) -> Result<Fix, LocatorError> {
    match tokio::time::timeout(timeout, provider.current_fix()).await {
        Ok(Ok(fix)) => Ok(fix),
        Ok(Err(err)) => {
            tracing::warn!(error = %err, "location provider failed");
            Err(LocatorError::LocationUnavailable(err.to_string()))
        }
        Err(_elapsed) => {
            tracing::warn!(timeout_secs = timeout.as_secs(), "location provider timed out");
            Err(LocatorError::LocationUnavailable(ProviderError::Timeout.to_string()))
        }
    }
}
