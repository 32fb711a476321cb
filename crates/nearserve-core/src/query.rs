use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::geo::Coordinate;
use crate::scope::ScopeSpec;

/// Everything that determines a provider search.
///
/// Two queries with equal fields are equivalent: the session never re-fetches
/// for a query equal to the one behind the visible results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchQuery {
    pub center: Coordinate,
    pub scope: ScopeSpec,
    pub category: Option<String>,
}

impl SearchQuery {
    #[must_use]
    pub fn new(center: Coordinate, scope: ScopeSpec, category: Option<String>) -> Self {
        Self {
            center,
            scope,
            category: normalize_category(category),
        }
    }

    #[must_use]
    pub fn with_scope(&self, scope: ScopeSpec) -> Self {
        Self {
            scope,
            ..self.clone()
        }
    }

    #[must_use]
    pub fn with_category(&self, category: Option<String>) -> Self {
        Self {
            category: normalize_category(category),
            ..self.clone()
        }
    }

    #[must_use]
    pub fn with_center(&self, center: Coordinate) -> Self {
        Self {
            center,
            ..self.clone()
        }
    }
}

/// Blank categories mean "no filter".
fn normalize_category(category: Option<String>) -> Option<String> {
    category
        .map(|c| c.trim().to_owned())
        .filter(|c| !c.is_empty())
}

/// A provider returned by a search, optionally annotated with its distance
/// from the search center.
///
/// `distance_km` is only ever set by [`crate::rank::rank`] for radius scopes;
/// administrative scopes leave it `None`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderResult {
    pub id: String,
    pub name: String,
    pub category: String,
    pub description: Option<String>,
    pub coordinate: Coordinate,
    pub rating_average: f64,
    pub rating_count: u32,
    pub distance_km: Option<f64>,
}

impl ProviderResult {
    /// Case-insensitive substring match on name, category and description.
    #[must_use]
    pub fn matches_text(&self, needle: &str) -> bool {
        let needle = needle.trim().to_lowercase();
        if needle.is_empty() {
            return true;
        }
        self.name.to_lowercase().contains(&needle)
            || self.category.to_lowercase().contains(&needle)
            || self
                .description
                .as_deref()
                .is_some_and(|d| d.to_lowercase().contains(&needle))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchHistoryEntry {
    pub query: SearchQuery,
    pub result_count: usize,
    pub timestamp: DateTime<Utc>,
}
