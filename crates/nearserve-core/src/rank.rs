//! Distance annotation and deterministic ordering of search results.
//!
//! All functions are pure and idempotent: ranking an already-ranked list
//! returns the same list.

use std::cmp::Ordering;

use crate::geo::Coordinate;
use crate::query::{ProviderResult, SearchQuery};

/// Annotates every result with its haversine distance from `center` and
/// sorts ascending by distance, then descending rating, then ascending id.
#[must_use]
pub fn rank(center: Coordinate, mut results: Vec<ProviderResult>) -> Vec<ProviderResult> {
    for result in &mut results {
        result.distance_km = Some(center.distance_km(&result.coordinate));
    }
    results.sort_by(|a, b| {
        let da = a.distance_km.unwrap_or(f64::INFINITY);
        let db = b.distance_km.unwrap_or(f64::INFINITY);
        da.total_cmp(&db).then_with(|| by_rating_then_id(a, b))
    });
    results
}

/// Orders by descending rating, then ascending id.
///
/// Distance is meaningless at city/state/country granularity, so any
/// `distance_km` carried in is cleared rather than shown.
#[must_use]
pub fn rank_by_rating(mut results: Vec<ProviderResult>) -> Vec<ProviderResult> {
    for result in &mut results {
        result.distance_km = None;
    }
    results.sort_by(by_rating_then_id);
    results
}

/// Picks the ordering appropriate to the query's scope.
#[must_use]
pub fn rank_for_scope(query: &SearchQuery, results: Vec<ProviderResult>) -> Vec<ProviderResult> {
    if query.scope.is_radius() {
        rank(query.center, results)
    } else {
        rank_by_rating(results)
    }
}

fn by_rating_then_id(a: &ProviderResult, b: &ProviderResult) -> Ordering {
    b.rating_average
        .total_cmp(&a.rating_average)
        .then_with(|| a.id.cmp(&b.id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scope::ScopeSpec;

    fn coord(lat: f64, lng: f64) -> Coordinate {
        Coordinate::new(lat, lng).unwrap()
    }

    fn provider(id: &str, lat: f64, lng: f64, rating: f64) -> ProviderResult {
        ProviderResult {
            id: id.to_owned(),
            name: format!("Provider {id}"),
            category: "cooking".to_owned(),
            description: None,
            coordinate: coord(lat, lng),
            rating_average: rating,
            rating_count: 3,
            distance_km: None,
        }
    }

    fn ids(results: &[ProviderResult]) -> Vec<&str> {
        results.iter().map(|r| r.id.as_str()).collect()
    }

    #[test]
    fn rank_sorts_by_distance_and_annotates() {
        let center = coord(28.6139, 77.2090);
        let ranked = rank(
            center,
            vec![
                provider("far", 28.70, 77.10, 5.0),
                provider("near", 28.62, 77.21, 1.0),
                provider("mid", 28.65, 77.25, 3.0),
            ],
        );
        assert_eq!(ids(&ranked), ["near", "mid", "far"]);
        assert!(ranked.iter().all(|r| r.distance_km.is_some()));
        let near = ranked[0].distance_km.unwrap();
        assert!(near < 1.5, "got {near}");
    }

    #[test]
    fn ties_at_same_coordinate_break_by_rating_then_id() {
        let center = coord(28.6139, 77.2090);
        let ranked = rank(
            center,
            vec![
                provider("b", 28.62, 77.21, 4.0),
                provider("c", 28.62, 77.21, 4.5),
                provider("a", 28.62, 77.21, 4.0),
            ],
        );
        assert_eq!(ids(&ranked), ["c", "a", "b"]);
    }

    #[test]
    fn rank_is_idempotent() {
        let center = coord(12.9716, 77.5946);
        let input = vec![
            provider("x", 12.98, 77.60, 4.0),
            provider("y", 13.05, 77.50, 4.9),
            provider("z", 12.98, 77.60, 4.0),
            provider("w", 12.90, 77.70, 2.0),
        ];
        let once = rank(center, input);
        let twice = rank(center, once.clone());
        assert_eq!(once, twice);
    }

    #[test]
    fn rank_by_rating_ignores_and_clears_distance() {
        let mut far_but_great = provider("great", 20.0, 70.0, 4.9);
        far_but_great.distance_km = Some(900.0);
        let ranked = rank_by_rating(vec![
            provider("ok", 28.6, 77.2, 3.1),
            far_but_great,
            provider("also-ok", 28.6, 77.2, 3.1),
        ]);
        assert_eq!(ids(&ranked), ["great", "also-ok", "ok"]);
        assert!(ranked.iter().all(|r| r.distance_km.is_none()));
        assert_eq!(rank_by_rating(ranked.clone()), ranked);
    }

    #[test]
    fn rank_for_scope_switches_on_scope_kind() {
        let center = coord(28.6139, 77.2090);
        let results = vec![
            provider("near-low", 28.62, 77.21, 1.0),
            provider("far-high", 28.90, 77.50, 5.0),
        ];

        let radius = SearchQuery::new(center, ScopeSpec::Radius { km: 50 }, None);
        assert_eq!(
            ids(&rank_for_scope(&radius, results.clone())),
            ["near-low", "far-high"]
        );

        let state = radius.with_scope(ScopeSpec::State {
            name: "Delhi".to_owned(),
        });
        let ranked = rank_for_scope(&state, results);
        assert_eq!(ids(&ranked), ["far-high", "near-low"]);
        assert!(ranked[0].distance_km.is_none());
    }
}
