//! The `search` command: one discovery session driven to a result.

use nearserve_client::{GeoQueryClient, LocationResolver, StaticPosition};
use nearserve_core::{AppConfig, Coordinate, ScopeRung};
use nearserve_discovery::{
    ExpansionPolicy, RunOutcome, SearchNotice, SearchPhase, SearchSession, SessionSnapshot,
};

const NAME_WIDTH: usize = 30;

/// Where the search center comes from.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum CenterSource {
    Position(StaticPosition),
    Place(String),
}

impl CenterSource {
    /// # Errors
    ///
    /// Returns an error if `lat`/`lng` form an invalid coordinate.
    pub(crate) fn from_args(
        lat: Option<f64>,
        lng: Option<f64>,
        place: Option<String>,
        deny_location: bool,
    ) -> anyhow::Result<Self> {
        if let Some(text) = place {
            return Ok(Self::Place(text));
        }
        let position = match (lat.zip(lng), deny_location) {
            (Some((lat, lng)), _) => StaticPosition::Known(Coordinate::new(lat, lng)?),
            (None, true) => StaticPosition::Denied,
            (None, false) => StaticPosition::Unavailable,
        };
        Ok(Self::Position(position))
    }
}

#[derive(Debug, Clone)]
pub(crate) struct SearchOptions {
    pub(crate) scope: ScopeRung,
    pub(crate) category: Option<String>,
    pub(crate) filter: Option<String>,
    pub(crate) auto_expand: bool,
    pub(crate) follow_suggestions: bool,
}

/// Run a provider search and print the ranked results.
///
/// Service failures are reported alongside whatever was last found rather
/// than aborting the command.
///
/// # Errors
///
/// Returns an error if the HTTP clients cannot be built from `config`.
pub(crate) async fn run_search(
    config: &AppConfig,
    center: CenterSource,
    options: SearchOptions,
) -> anyhow::Result<()> {
    let search = GeoQueryClient::new(config)?;
    let resolver = LocationResolver::new(config)?;

    let (start, place_text) = match center {
        CenterSource::Position(source) => {
            let resolved = resolver.current_or_default(&source).await;
            if let Some(reason) = &resolved.fallback_reason {
                println!("note: {}", SearchNotice::from(reason));
            }
            (resolved.coordinate, None)
        }
        CenterSource::Place(text) => (resolver.default_center(), Some(text)),
    };

    let policy = if options.auto_expand {
        ExpansionPolicy::AutoOnce
    } else {
        ExpansionPolicy::Suggest
    };
    let session = SearchSession::start(search, resolver, start)
        .await
        .with_policy(policy);
    let scope = options.scope.bind(&session.place());
    let session = session.with_query_defaults(scope, options.category);

    let mut outcome = match place_text {
        Some(text) => session.search_place(&text).await,
        None => session.refresh().await,
    };
    if options.follow_suggestions {
        while let Some(next) = session.accept_suggestion().await {
            outcome = next;
        }
    }
    session.set_text_filter(options.filter);
    tracing::debug!(?outcome, history = session.history().len(), "search finished");

    print_snapshot(&session.snapshot(), &outcome);
    Ok(())
}

fn print_snapshot(snapshot: &SessionSnapshot, outcome: &RunOutcome) {
    let query = snapshot.displayed_query.as_ref().unwrap_or(&snapshot.query);
    println!(
        "{} {} near {} {}",
        query.category.as_deref().unwrap_or("all"),
        query.scope,
        snapshot.place,
        query.center
    );
    println!();

    if let Some(notice) = &snapshot.notice {
        println!("warning: {notice}");
    }
    if let RunOutcome::Failed(_) = outcome {
        if snapshot.generation == 0 {
            return;
        }
        println!("showing the last successful results");
    }

    match snapshot.phase {
        SearchPhase::EmptySuggested | SearchPhase::EmptyTerminal => {
            if let Some(suggestion) = &snapshot.suggestion {
                println!("{}", suggestion.message);
                println!("(rerun with --follow-suggestions to widen automatically)");
            } else {
                println!("no providers found, even at the broadest scope");
            }
            return;
        }
        SearchPhase::Idle | SearchPhase::Searching | SearchPhase::Populated => {}
    }

    if snapshot.results.is_empty() {
        println!(
            "none of the {} results match the filter{}",
            snapshot.total_results,
            snapshot
                .text_filter
                .as_deref()
                .map(|f| format!(" \"{f}\""))
                .unwrap_or_default()
        );
        return;
    }

    let header = format!(
        "{:<5}{:<width$}{:<14}{:>10}{:>9}  ID",
        "#",
        "NAME",
        "CATEGORY",
        "DISTANCE",
        "RATING",
        width = NAME_WIDTH + 2
    );
    println!("{header}");
    for (i, result) in snapshot.results.iter().enumerate() {
        let name = if result.name.chars().count() > NAME_WIDTH {
            format!(
                "{}...",
                result.name.chars().take(NAME_WIDTH - 3).collect::<String>()
            )
        } else {
            result.name.clone()
        };
        let distance = result
            .distance_km
            .map_or_else(|| "-".to_owned(), |km| format!("{km:.1} km"));
        let rating = format!("{:.1} ({})", result.rating_average, result.rating_count);
        println!(
            "{:<5}{:<width$}{:<14}{:>10}{:>9}  {}",
            i + 1,
            name,
            result.category,
            distance,
            rating,
            result.id,
            width = NAME_WIDTH + 2
        );
    }
    if snapshot.results.len() < snapshot.total_results {
        println!();
        println!(
            "{} of {} results shown after filtering",
            snapshot.results.len(),
            snapshot.total_results
        );
    }
}
