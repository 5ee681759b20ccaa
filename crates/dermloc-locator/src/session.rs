//! Per-user search state: location, cached results and the rendered view.
//!
//! Each search takes a generation token from [`SearchSession::begin_search`].
//! Results are applied only if no newer search (or location change) has
//! happened since, so a slow response cannot overwrite a newer one.

use std::sync::Arc;

use dermloc_core::{Category, Coordinate, OwnershipFilter};
use tokio::sync::Mutex;

use crate::error::LocatorError;
use crate::gateway::RecordSource;
use crate::pipeline::{apply_ownership_filter_capped, search, SearchRequest, MAX_DISPLAY_RESULTS};
use crate::presentation::{render, RenderedView};
use crate::types::ResultSet;

/// Session handle shared across request handlers. Never hold the lock
/// across network I/O; see [`search_shared`].
pub type SharedSession = Arc<Mutex<SearchSession>>;

/// Proof that a search was started, tied to one generation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SearchTicket {
    generation: u64,
    request: SearchRequest,
}

impl SearchTicket {
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    #[must_use]
    pub fn request(&self) -> &SearchRequest {
        &self.request
    }
}

#[derive(Debug)]
pub struct SearchSession {
    location: Coordinate,
    accuracy_m: Option<f64>,
    generation: u64,
    results: Option<ResultSet>,
    filter: OwnershipFilter,
    view: Option<RenderedView>,
    max_results: usize,
}

impl Default for SearchSession {
    fn default() -> Self {
        Self::new(MAX_DISPLAY_RESULTS)
    }
}

impl SearchSession {
    /// A session centred on Brazil with no results yet.
    #[must_use]
    pub fn new(max_results: usize) -> Self {
        Self {
            location: Coordinate::BRAZIL_CENTER,
            accuracy_m: None,
            generation: 0,
            results: None,
            filter: OwnershipFilter::default(),
            view: None,
            max_results,
        }
    }

    #[must_use]
    pub fn shared(max_results: usize) -> SharedSession {
        Arc::new(Mutex::new(Self::new(max_results)))
    }

    #[must_use]
    pub fn location(&self) -> Coordinate {
        self.location
    }

    #[must_use]
    pub fn accuracy_m(&self) -> Option<f64> {
        self.accuracy_m
    }

    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    #[must_use]
    pub fn results(&self) -> Option<&ResultSet> {
        self.results.as_ref()
    }

    #[must_use]
    pub fn filter(&self) -> OwnershipFilter {
        self.filter
    }

    #[must_use]
    pub fn view(&self) -> Option<&RenderedView> {
        self.view.as_ref()
    }

    /// Moves the user. Cached results and any in-flight search are
    /// invalidated since their distances no longer hold.
    pub fn set_location(&mut self, location: Coordinate, accuracy_m: Option<f64>) {
        self.location = location;
        self.accuracy_m = accuracy_m;
        self.generation += 1;
        self.results = None;
        self.view = None;
    }

    /// Starts a search from the current location.
    pub fn begin_search(&mut self, radius_km: f64, category: Category) -> SearchTicket {
        self.generation += 1;
        tracing::debug!(generation = self.generation, %category, radius_km, "search started");
        SearchTicket {
            generation: self.generation,
            request: SearchRequest {
                origin: self.location,
                radius_km,
                category,
            },
        }
    }

    /// Applies the outcome of the search started with `ticket`.
    ///
    /// An empty result set is stored and rendered as a status view.
    ///
    /// # Errors
    ///
    /// - [`LocatorError::Superseded`] if a newer search or location change
    ///   happened after `ticket` was issued; nothing is changed.
    /// - The search's own error; the previous results and view are kept.
    pub fn complete_search(
        &mut self,
        ticket: SearchTicket,
        outcome: Result<ResultSet, LocatorError>,
    ) -> Result<&RenderedView, LocatorError> {
        if ticket.generation != self.generation {
            tracing::debug!(
                generation = ticket.generation,
                current = self.generation,
                "discarding superseded search result"
            );
            return Err(LocatorError::Superseded {
                generation: ticket.generation,
            });
        }

        let results = outcome?;
        let view = match results.no_results() {
            Some(empty) => {
                RenderedView::status_only(self.location, self.accuracy_m, empty.user_message())
            }
            None => self.render_from(&results),
        };
        self.results = Some(results);
        Ok(self.view.insert(view))
    }

    /// Changes the ownership filter and re-renders from the cached results.
    /// Returns `None` if there is nothing cached yet.
    pub fn set_filter(&mut self, filter: OwnershipFilter) -> Option<&RenderedView> {
        self.filter = filter;
        let results = self.results.as_ref()?;
        let view = match results.no_results() {
            Some(empty) => {
                RenderedView::status_only(self.location, self.accuracy_m, empty.user_message())
            }
            None => self.render_from(results),
        };
        Some(self.view.insert(view))
    }

    fn render_from(&self, results: &ResultSet) -> RenderedView {
        let slice = apply_ownership_filter_capped(results, self.filter, self.max_results);
        render(results.origin, self.accuracy_m, &slice)
    }
}

/// Runs a full search against a shared session without holding its lock
/// while the data source is queried.
///
/// # Errors
///
/// See [`SearchSession::complete_search`].
pub async fn search_shared<S: RecordSource>(
    session: &SharedSession,
    source: &S,
    radius_km: f64,
    category: Category,
) -> Result<RenderedView, LocatorError> {
    let ticket = session.lock().await.begin_search(radius_km, category);
    let outcome = search(source, ticket.request()).await;
    if let Err(ref err) = outcome {
        tracing::warn!(generation = ticket.generation(), error = %err, "search failed");
    }
    let mut guard = session.lock().await;
    guard.complete_search(ticket, outcome).cloned()
}

#[cfg(test)]
#[path = "session_test.rs"]
mod tests;
