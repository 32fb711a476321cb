//! The search session orchestrator.

use std::sync::{Mutex, MutexGuard, PoisonError};

use tokio::sync::watch;

use nearserve_client::{ClientError, LocationError};
use nearserve_core::{
    scope, Coordinate, PlaceInfo, ProviderResult, ScopeSpec, SearchHistoryEntry, SearchQuery,
};

use crate::source::{PlaceLookup, ProviderSearch};
use crate::state::SessionState;
use crate::types::{
    Commit, ExpansionPolicy, PendingQuery, QueryOrigin, RunOutcome, SearchNotice,
    SessionSnapshot, Suggestion,
};

/// Owns the discovery state and coordinates search, ranking and widening.
///
/// All methods take `&self`; state lives behind a mutex that is never held
/// across an `.await`, so several mutator futures may be polled
/// concurrently (e.g. rapid scope clicks). Each query is stamped with a
/// generation when issued, and only the newest generation may commit.
/// Superseded searches are aborted by dropping their request future.
pub struct SearchSession<S, P> {
    search: S,
    places: P,
    state: Mutex<SessionState>,
    issued: watch::Sender<u64>,
    snapshots: watch::Sender<SessionSnapshot>,
}

impl<S: ProviderSearch, P: PlaceLookup> SearchSession<S, P> {
    /// Creates an idle session at `center` with the narrowest ladder rung.
    pub fn new(search: S, places: P, center: Coordinate, place: PlaceInfo) -> Self {
        let state = SessionState::new(center, place, ScopeSpec::Radius { km: 10 });
        let (snapshots, _) = watch::channel(state.snapshot());
        let (issued, _) = watch::channel(0);
        Self {
            search,
            places,
            state: Mutex::new(state),
            issued,
            snapshots,
        }
    }

    /// Creates a session at `center`, resolving its place first.
    pub async fn start(search: S, places: P, center: Coordinate) -> Self {
        let place = places.reverse_geocode(center).await;
        Self::new(search, places, center, place)
    }

    #[must_use]
    pub fn with_policy(self, policy: ExpansionPolicy) -> Self {
        self.lock().policy = policy;
        self
    }

    /// Initial scope and category, applied without fetching.
    #[must_use]
    pub fn with_query_defaults(self, scope: ScopeSpec, category: Option<String>) -> Self {
        {
            let mut state = self.lock();
            state.scope = scope;
            state.category = SearchQuery::new(state.center, state.scope.clone(), category).category;
        }
        self.publish();
        self
    }

    /// Receiver that observes every published [`SessionSnapshot`].
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.snapshots.subscribe()
    }

    #[must_use]
    pub fn snapshot(&self) -> SessionSnapshot {
        self.lock().snapshot()
    }

    #[must_use]
    pub fn current_query(&self) -> SearchQuery {
        self.lock().desired_query()
    }

    #[must_use]
    pub fn place(&self) -> PlaceInfo {
        self.lock().place.clone()
    }

    /// Most-recent-first, at most [`crate::HISTORY_CAPACITY`] entries.
    #[must_use]
    pub fn history(&self) -> Vec<SearchHistoryEntry> {
        self.lock().history.entries()
    }

    /// The scope ladder bound to the current place.
    #[must_use]
    pub fn ladder(&self) -> Vec<ScopeSpec> {
        scope::ladder(&self.lock().place)
    }

    #[must_use]
    pub fn suggestion(&self) -> Option<Suggestion> {
        self.lock().suggestion.clone()
    }

    // -----------------------------------------------------------------------
    // Mutators
    // -----------------------------------------------------------------------

    pub async fn set_scope(&self, scope: ScopeSpec) -> RunOutcome {
        let query = {
            let mut state = self.lock();
            state.next_intent();
            state.scope = scope;
            state.desired_query()
        };
        self.run_if_changed(query).await
    }

    pub async fn set_category(&self, category: Option<String>) -> RunOutcome {
        let query = {
            let mut state = self.lock();
            state.next_intent();
            let query = state.desired_query().with_category(category);
            state.category.clone_from(&query.category);
            query
        };
        self.run_if_changed(query).await
    }

    /// Re-centers the search. The new center is reverse-geocoded first so
    /// city/state/country scopes bind to the new place.
    ///
    /// Returns [`RunOutcome::Superseded`] without touching the session when
    /// another mutator is called while the place is being looked up.
    pub async fn set_center(&self, center: Coordinate) -> RunOutcome {
        let ticket = self.lock().next_intent();
        self.recenter(ticket, center).await
    }

    /// Forward-geocodes free text and re-centers on the match.
    ///
    /// A query that matches nothing is reported through the session notice
    /// and not retried. Superseded like [`SearchSession::set_center`].
    pub async fn search_place(&self, text: &str) -> RunOutcome {
        let ticket = self.lock().next_intent();
        let found = self.places.forward_geocode(text).await;
        if self.lock().intents != ticket {
            tracing::debug!(text, "place search superseded by a newer request");
            return RunOutcome::Superseded;
        }
        match found {
            Ok(center) => self.recenter(ticket, center).await,
            Err(err) => {
                let notice = SearchNotice::from(&err);
                tracing::warn!(text, error = %err, "free-text location search failed");
                self.lock().notice = Some(notice.clone());
                self.publish();
                RunOutcome::Failed(notice)
            }
        }
    }

    /// Runs the active suggestion's scope. `None` when there is no suggestion.
    pub async fn accept_suggestion(&self) -> Option<RunOutcome> {
        let query = {
            let mut state = self.lock();
            let next_scope = state.suggestion.as_ref()?.next_scope.clone();
            state.next_intent();
            state.scope = next_scope;
            state.desired_query()
        };
        Some(self.run_query(query, QueryOrigin::AcceptedSuggestion).await)
    }

    /// Re-runs the current query even if it is already displayed.
    pub async fn refresh(&self) -> RunOutcome {
        let query = {
            let mut state = self.lock();
            state.next_intent();
            state.desired_query()
        };
        self.run_query(query, QueryOrigin::User).await
    }

    /// Filters the visible results client-side without refetching.
    pub fn set_text_filter(&self, filter: Option<String>) {
        let filter = filter.map(|f| f.trim().to_owned()).filter(|f| !f.is_empty());
        self.lock().text_filter = filter;
        self.publish();
    }

    /// Records that the center came from the default location, for display.
    pub fn note_location_fallback(&self, reason: &LocationError) {
        self.lock().notice = Some(SearchNotice::from(reason));
        self.publish();
    }

    // -----------------------------------------------------------------------
    // Query lifecycle
    // -----------------------------------------------------------------------

    /// Issues `query`: stamps it with a fresh generation, marks it in
    /// flight and signals any older in-flight search to abort.
    pub fn begin(&self, query: SearchQuery, origin: QueryOrigin) -> PendingQuery {
        let pending = {
            let mut state = self.lock();
            state.scope = query.scope.clone();
            state.category.clone_from(&query.category);
            state.center = query.center;
            state.begin(query, origin)
        };
        self.issued.send_replace(pending.generation);
        tracing::debug!(
            generation = pending.generation,
            scope = %pending.query.scope,
            ?origin,
            "search issued"
        );
        self.publish();
        pending
    }

    /// Offers the response for `pending`. Stale or repeated responses are
    /// discarded without touching visible state.
    pub fn complete(
        &self,
        pending: &PendingQuery,
        outcome: Result<Vec<ProviderResult>, ClientError>,
    ) -> Commit {
        let commit = self.lock().complete(pending, outcome);
        if commit != Commit::Discarded {
            self.publish();
        }
        commit
    }

    /// Runs `query` to completion, including at most one automatic widening
    /// under [`ExpansionPolicy::AutoOnce`].
    pub async fn run_query(&self, query: SearchQuery, origin: QueryOrigin) -> RunOutcome {
        let mut next = Some((query, origin));
        let mut outcome = RunOutcome::Unchanged;

        while let Some((query, origin)) = next.take() {
            let pending = self.begin(query, origin);
            let Some(result) = self.search_unless_superseded(&pending).await else {
                tracing::debug!(
                    generation = pending.generation,
                    "search superseded before it finished, request aborted"
                );
                return RunOutcome::Superseded;
            };

            outcome = match self.complete(&pending, result) {
                Commit::Applied { phase, auto_expand } => {
                    next = auto_expand.map(|q| (q, QueryOrigin::AutoExpand));
                    RunOutcome::Committed {
                        phase,
                        result_count: self.lock().ranked.len(),
                    }
                }
                Commit::Failed(notice) => RunOutcome::Failed(notice),
                Commit::Discarded => RunOutcome::Superseded,
            };
        }
        outcome
    }

    async fn recenter(&self, ticket: u64, center: Coordinate) -> RunOutcome {
        let place = self.places.reverse_geocode(center).await;
        let query = {
            let mut state = self.lock();
            if state.intents != ticket {
                tracing::debug!(%center, "re-center superseded by a newer request");
                return RunOutcome::Superseded;
            }
            state.center = center;
            state.rebind_place(place);
            state.desired_query()
        };
        self.run_if_changed(query).await
    }

    async fn run_if_changed(&self, query: SearchQuery) -> RunOutcome {
        let cancelled = {
            let mut state = self.lock();
            if state.is_unchanged(&query) {
                tracing::debug!(scope = %query.scope, "query unchanged, not refetching");
                return RunOutcome::Unchanged;
            }
            // Switched back to what is already displayed: drop the in-flight
            // query instead of refetching.
            if state.in_flight.is_some() && state.displayed.as_ref() == Some(&query) {
                state.cancel_in_flight();
                Some(state.issued)
            } else {
                None
            }
        };
        match cancelled {
            Some(generation) => {
                self.issued.send_replace(generation);
                self.publish();
                tracing::debug!(
                    scope = %query.scope,
                    "returned to displayed query, in-flight search cancelled"
                );
                RunOutcome::Unchanged
            }
            None => self.run_query(query, QueryOrigin::User).await,
        }
    }

    /// Races the search against newer issuances; `None` when superseded.
    async fn search_unless_superseded(
        &self,
        pending: &PendingQuery,
    ) -> Option<Result<Vec<ProviderResult>, ClientError>> {
        let mut issued = self.issued.subscribe();
        let generation = pending.generation;
        tokio::select! {
            result = self.search.search(&pending.query) => Some(result),
            _ = issued.wait_for(|latest| *latest > generation) => None,
        }
    }

    fn lock(&self) -> MutexGuard<'_, SessionState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn publish(&self) {
        let snapshot = self.lock().snapshot();
        self.snapshots.send_replace(snapshot);
    }
}

#[cfg(test)]
#[path = "session_test.rs"]
mod tests;
