//! Synchronous core of the session: generation bookkeeping, commit rules and
//! the suggestion/auto-expand state machine. No I/O happens here.

use nearserve_client::ClientError;
use nearserve_core::{
    rank_for_scope, scope, Coordinate, PlaceInfo, ProviderResult, ScopeSpec, SearchQuery,
};

use crate::history::SearchHistory;
use crate::types::{
    Commit, ExpansionPolicy, PendingQuery, QueryOrigin, SearchNotice, SearchPhase,
    SessionSnapshot, Suggestion,
};

#[derive(Debug)]
pub(crate) struct SessionState {
    pub(crate) center: Coordinate,
    pub(crate) place: PlaceInfo,
    pub(crate) scope: ScopeSpec,
    pub(crate) category: Option<String>,
    pub(crate) text_filter: Option<String>,
    pub(crate) policy: ExpansionPolicy,

    /// Query behind the visible results.
    pub(crate) displayed: Option<SearchQuery>,
    pub(crate) in_flight: Option<PendingQuery>,
    pub(crate) ranked: Vec<ProviderResult>,
    pub(crate) history: SearchHistory,
    pub(crate) suggestion: Option<Suggestion>,
    pub(crate) notice: Option<SearchNotice>,
    pub(crate) phase: SearchPhase,
    /// Phase and suggestion to fall back to when an in-flight query fails or
    /// is cancelled.
    pub(crate) settled_phase: SearchPhase,
    pub(crate) settled_suggestion: Option<Suggestion>,

    /// Highest generation handed out.
    pub(crate) issued: u64,
    /// Generation behind `ranked` (0 before the first commit).
    pub(crate) committed: u64,
    /// Set once an automatic widening has fired for the current user query.
    pub(crate) auto_expanding: bool,
    /// Bumped by every user intent. A re-center only applies if no newer
    /// intent arrived while its place was being looked up.
    pub(crate) intents: u64,
}

impl SessionState {
    pub(crate) fn new(center: Coordinate, place: PlaceInfo, scope: ScopeSpec) -> Self {
        Self {
            center,
            place,
            scope,
            category: None,
            text_filter: None,
            policy: ExpansionPolicy::default(),
            displayed: None,
            in_flight: None,
            ranked: Vec::new(),
            history: SearchHistory::default(),
            suggestion: None,
            notice: None,
            phase: SearchPhase::Idle,
            settled_phase: SearchPhase::Idle,
            settled_suggestion: None,
            issued: 0,
            committed: 0,
            auto_expanding: false,
            intents: 0,
        }
    }

    /// The query implied by the current center, scope and category.
    pub(crate) fn desired_query(&self) -> SearchQuery {
        SearchQuery::new(self.center, self.scope.clone(), self.category.clone())
    }

    /// `true` when `query` is already displayed with nothing else pending, or
    /// is exactly what is in flight.
    pub(crate) fn is_unchanged(&self, query: &SearchQuery) -> bool {
        match &self.in_flight {
            Some(pending) => pending.query == *query,
            None => self.displayed.as_ref() == Some(query),
        }
    }

    /// Stamps `query` with the next generation and marks it in flight,
    /// superseding whatever was in flight before.
    pub(crate) fn begin(&mut self, query: SearchQuery, origin: QueryOrigin) -> PendingQuery {
        self.issued += 1;
        if self.phase != SearchPhase::Searching {
            self.settled_phase = self.phase;
            self.settled_suggestion = self.suggestion.take();
        }
        self.phase = SearchPhase::Searching;
        self.suggestion = None;
        if origin != QueryOrigin::AutoExpand {
            self.notice = None;
        }
        let pending = PendingQuery {
            generation: self.issued,
            query,
            origin,
        };
        self.in_flight = Some(pending.clone());
        pending
    }

    /// Starts a new user intent and returns its ticket.
    pub(crate) fn next_intent(&mut self) -> u64 {
        self.intents += 1;
        self.intents
    }

    /// Drops the in-flight query without starting another. Its response, if
    /// it arrives, will be discarded.
    pub(crate) fn cancel_in_flight(&mut self) -> bool {
        if self.in_flight.take().is_none() {
            return false;
        }
        self.issued += 1;
        self.restore_settled();
        true
    }

    /// Offers a response. Only the in-flight generation may change visible
    /// state, and only once: completing clears it, so a repeated delivery of
    /// the same response is discarded like any stale one.
    pub(crate) fn complete(
        &mut self,
        pending: &PendingQuery,
        outcome: Result<Vec<ProviderResult>, ClientError>,
    ) -> Commit {
        let is_current = self
            .in_flight
            .as_ref()
            .is_some_and(|current| current.generation == pending.generation);
        if !is_current {
            tracing::debug!(
                generation = pending.generation,
                issued = self.issued,
                committed = self.committed,
                "discarding stale search response"
            );
            return Commit::Discarded;
        }
        self.in_flight = None;

        let raw = match outcome {
            Ok(raw) => raw,
            Err(err) => {
                let notice = SearchNotice::from(&err);
                tracing::warn!(
                    generation = pending.generation,
                    scope = %pending.query.scope,
                    error = %err,
                    "provider search failed, keeping previous results"
                );
                self.restore_settled();
                self.notice = Some(notice.clone());
                return Commit::Failed(notice);
            }
        };

        let ranked = rank_for_scope(&pending.query, raw);
        self.committed = pending.generation;
        self.history.record(pending.query.clone(), ranked.len());
        self.ranked = ranked;
        self.displayed = Some(pending.query.clone());
        self.notice = None;

        if pending.origin != QueryOrigin::AutoExpand {
            self.auto_expanding = false;
        }

        let mut auto_expand = None;
        if scope::is_empty(&self.ranked) {
            match scope::suggest_next(&pending.query.scope, &self.place) {
                Some(next) => {
                    tracing::info!(
                        generation = pending.generation,
                        from = %pending.query.scope,
                        to = %next,
                        "no providers found, suggesting a wider scope"
                    );
                    if self.policy == ExpansionPolicy::AutoOnce && !self.auto_expanding {
                        self.auto_expanding = true;
                        auto_expand = Some(pending.query.with_scope(next.clone()));
                    }
                    self.suggestion = Some(Suggestion::new(
                        &pending.query,
                        next,
                        pending.generation,
                    ));
                    self.phase = SearchPhase::EmptySuggested;
                }
                None => {
                    tracing::info!(
                        generation = pending.generation,
                        "no providers found at the broadest scope"
                    );
                    self.phase = SearchPhase::EmptyTerminal;
                }
            }
        } else {
            tracing::info!(
                generation = pending.generation,
                scope = %pending.query.scope,
                results = self.ranked.len(),
                "search results committed"
            );
            self.phase = SearchPhase::Populated;
        }
        self.settled_phase = self.phase;
        self.settled_suggestion.clone_from(&self.suggestion);

        Commit::Applied {
            phase: self.phase,
            auto_expand,
        }
    }

    fn restore_settled(&mut self) {
        self.phase = self.settled_phase;
        self.suggestion.clone_from(&self.settled_suggestion);
    }

    pub(crate) fn visible_results(&self) -> Vec<ProviderResult> {
        match self.text_filter.as_deref() {
            Some(needle) => self
                .ranked
                .iter()
                .filter(|r| r.matches_text(needle))
                .cloned()
                .collect(),
            None => self.ranked.clone(),
        }
    }

    /// Re-targets administrative scopes at a new place.
    pub(crate) fn rebind_place(&mut self, place: PlaceInfo) {
        if !self.scope.is_radius() {
            self.scope = self.scope.rung().bind(&place);
        }
        self.place = place;
    }

    pub(crate) fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            query: self.desired_query(),
            displayed_query: self.displayed.clone(),
            place: self.place.clone(),
            phase: self.phase,
            results: self.visible_results(),
            total_results: self.ranked.len(),
            suggestion: self.suggestion.clone(),
            notice: self.notice.clone(),
            text_filter: self.text_filter.clone(),
            generation: self.committed,
        }
    }
}

#[cfg(test)]
#[path = "state_test.rs"]
mod tests;
