//! Value types exchanged between the session and its presenters.

use nearserve_client::{ClientError, ErrorKind, LocationError};
use nearserve_core::{PlaceInfo, ProviderResult, ScopeSpec, SearchQuery};

/// Where the session is in the search state machine.
///
/// `Idle -> Searching -> {Populated, EmptySuggested, EmptyTerminal}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SearchPhase {
    #[default]
    Idle,
    Searching,
    Populated,
    /// No results, and a broader rung is on offer.
    EmptySuggested,
    /// No results at the broadest rung.
    EmptyTerminal,
}

/// Who started a query. Drives suggestion clearing and the auto-expand guard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryOrigin {
    User,
    AcceptedSuggestion,
    AutoExpand,
}

/// What to do when a query comes back empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExpansionPolicy {
    /// Offer the next rung and wait for the user to accept it.
    #[default]
    Suggest,
    /// Run the next rung automatically, once per user-initiated query.
    AutoOnce,
}

/// Offer to widen the search after an empty result.
#[derive(Debug, Clone, PartialEq)]
pub struct Suggestion {
    pub message: String,
    pub next_scope: ScopeSpec,
    /// Generation of the empty response that produced this suggestion.
    pub generation: u64,
}

impl Suggestion {
    pub(crate) fn new(query: &SearchQuery, next_scope: ScopeSpec, generation: u64) -> Self {
        let what = query
            .category
            .as_deref()
            .map_or_else(|| "providers".to_owned(), |c| format!("{c} providers"));
        Self {
            message: format!(
                "No {what} found {}. Search {next_scope} instead?",
                query.scope
            ),
            next_scope,
            generation,
        }
    }
}

/// Non-blocking, recoverable annotation shown alongside the last good results.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchNotice {
    Network(String),
    Server(String),
    NotFound(String),
    /// The device position could not be read; the default center is in use.
    LocationFallback(String),
}

impl From<&ClientError> for SearchNotice {
    fn from(err: &ClientError) -> Self {
        let message = err.to_string();
        match err.kind() {
            ErrorKind::Network => SearchNotice::Network(message),
            ErrorKind::Server => SearchNotice::Server(message),
            ErrorKind::NotFound => SearchNotice::NotFound(message),
        }
    }
}

impl From<&LocationError> for SearchNotice {
    fn from(err: &LocationError) -> Self {
        SearchNotice::LocationFallback(err.to_string())
    }
}

impl std::fmt::Display for SearchNotice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SearchNotice::Network(m) => write!(f, "network problem: {m}"),
            SearchNotice::Server(m) => write!(f, "search failed: {m}"),
            SearchNotice::NotFound(m) => write!(f, "{m}"),
            SearchNotice::LocationFallback(m) => write!(f, "{m}; showing results near the default location"),
        }
    }
}

/// A query stamped with its issuance generation, awaiting its response.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingQuery {
    pub generation: u64,
    pub query: SearchQuery,
    pub origin: QueryOrigin,
}

/// Result of offering a response to the session.
#[derive(Debug, Clone, PartialEq)]
pub enum Commit {
    /// The response was newest and is now visible. `auto_expand` carries the
    /// follow-up query when the auto-expand policy fired.
    Applied {
        phase: SearchPhase,
        auto_expand: Option<SearchQuery>,
    },
    /// The search failed; previous results remain visible.
    Failed(SearchNotice),
    /// A newer query was issued, or this generation was already committed.
    Discarded,
}

/// Outcome of a mutator or [`crate::SearchSession::run_query`].
#[derive(Debug, Clone, PartialEq)]
pub enum RunOutcome {
    Committed {
        phase: SearchPhase,
        result_count: usize,
    },
    Failed(SearchNotice),
    /// A newer query superseded this one; nothing was committed.
    Superseded,
    /// The query equals the displayed or in-flight one; nothing was fetched.
    Unchanged,
}

/// Everything a presenter needs to render the map and list views.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionSnapshot {
    /// The query the session currently wants displayed.
    pub query: SearchQuery,
    /// The query behind `results`. Differs from `query` while a search is in
    /// flight or after one failed.
    pub displayed_query: Option<SearchQuery>,
    pub place: PlaceInfo,
    pub phase: SearchPhase,
    /// Ranked results after the text filter.
    pub results: Vec<ProviderResult>,
    /// Ranked results before the text filter.
    pub total_results: usize,
    pub suggestion: Option<Suggestion>,
    pub notice: Option<SearchNotice>,
    pub text_filter: Option<String>,
    /// Generation of the response behind `results` (0 before the first commit).
    pub generation: u64,
}
