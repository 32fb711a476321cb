//! Stateful orchestration of progressive provider discovery.
//!
//! [`SearchSession`] owns the current query, the ranked results, a bounded
//! search history and the active widening [`Suggestion`]. Presenters drive it
//! through its mutators and observe it through [`SearchSession::subscribe`].
//! Only the most recently issued query may change what is shown; older
//! responses are dropped, and their requests aborted when still in flight.

mod history;
mod session;
pub mod source;
mod state;
pub mod types;

pub use history::{SearchHistory, HISTORY_CAPACITY};
pub use session::SearchSession;
pub use source::{PlaceLookup, ProviderSearch};
pub use types::{
    Commit, ExpansionPolicy, PendingQuery, QueryOrigin, RunOutcome, SearchNotice, SearchPhase,
    SessionSnapshot, Suggestion,
};
