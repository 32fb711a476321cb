//! Search scopes and the ladder used for progressive widening.
//!
//! The ladder is fixed: `Radius(10) < Radius(25) < Radius(50) < City < State
//! < Country`. Administrative rungs are stored unbound ([`ScopeRung`]) and only
//! receive a name when bound against the current [`PlaceInfo`], so a re-center
//! automatically re-targets them.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::geo::PlaceInfo;
use crate::query::ProviderResult;

/// The escalation ladder, narrowest first.
pub const SCOPE_LADDER: [ScopeRung; 6] = [
    ScopeRung::Radius(10),
    ScopeRung::Radius(25),
    ScopeRung::Radius(50),
    ScopeRung::City,
    ScopeRung::State,
    ScopeRung::Country,
];

/// A scope not yet bound to a place name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScopeRung {
    Radius(u32),
    City,
    State,
    Country,
}

impl ScopeRung {
    /// Attach the resolved place name to administrative rungs.
    #[must_use]
    pub fn bind(self, place: &PlaceInfo) -> ScopeSpec {
        match self {
            ScopeRung::Radius(km) => ScopeSpec::Radius { km },
            ScopeRung::City => ScopeSpec::City {
                name: place.city.clone(),
            },
            ScopeRung::State => ScopeSpec::State {
                name: place.state.clone(),
            },
            ScopeRung::Country => ScopeSpec::Country {
                name: place.country.clone(),
            },
        }
    }

    /// Total order key: radius rungs by kilometres, then city, state, country.
    fn breadth(self) -> (u8, u32) {
        match self {
            ScopeRung::Radius(km) => (0, km),
            ScopeRung::City => (1, 0),
            ScopeRung::State => (2, 0),
            ScopeRung::Country => (3, 0),
        }
    }
}

impl FromStr for ScopeRung {
    type Err = CoreError;

    /// Parses `radius:<km>` (or `<km>km`), `city`, `state`, `country`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.trim().to_ascii_lowercase();
        match lowered.as_str() {
            "city" => return Ok(ScopeRung::City),
            "state" => return Ok(ScopeRung::State),
            "country" => return Ok(ScopeRung::Country),
            _ => {}
        }
        let km = lowered
            .strip_prefix("radius:")
            .or_else(|| lowered.strip_suffix("km"))
            .and_then(|n| n.trim().parse::<u32>().ok())
            .filter(|km| *km > 0)
            .ok_or_else(|| CoreError::InvalidScope(s.to_owned()))?;
        Ok(ScopeRung::Radius(km))
    }
}

/// Geographic breadth of a provider search.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ScopeSpec {
    Radius { km: u32 },
    City { name: String },
    State { name: String },
    Country { name: String },
}

impl ScopeSpec {
    #[must_use]
    pub fn rung(&self) -> ScopeRung {
        match self {
            ScopeSpec::Radius { km } => ScopeRung::Radius(*km),
            ScopeSpec::City { .. } => ScopeRung::City,
            ScopeSpec::State { .. } => ScopeRung::State,
            ScopeSpec::Country { .. } => ScopeRung::Country,
        }
    }

    #[must_use]
    pub fn is_radius(&self) -> bool {
        matches!(self, ScopeSpec::Radius { .. })
    }

    /// `true` when `self` sits strictly higher on the ladder than `other`.
    #[must_use]
    pub fn is_broader_than(&self, other: &ScopeSpec) -> bool {
        self.rung().breadth() > other.rung().breadth()
    }

    /// Value of the `scope` request parameter.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            ScopeSpec::Radius { .. } => "radius",
            ScopeSpec::City { .. } => "city",
            ScopeSpec::State { .. } => "state",
            ScopeSpec::Country { .. } => "country",
        }
    }
}

impl std::fmt::Display for ScopeSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ScopeSpec::Radius { km } => write!(f, "within {km} km"),
            ScopeSpec::City { name } | ScopeSpec::State { name } | ScopeSpec::Country { name } => {
                write!(f, "in {name}")
            }
        }
    }
}

/// The full ladder bound to `place`, narrowest first.
#[must_use]
pub fn ladder(place: &PlaceInfo) -> Vec<ScopeSpec> {
    SCOPE_LADDER.iter().map(|rung| rung.bind(place)).collect()
}

/// Next rung strictly broader than `current`, or `None` at `Country`.
///
/// Radii that are not on the ladder widen to the first ladder rung above
/// them, so `Radius(15)` suggests `Radius(25)`.
#[must_use]
pub fn suggest_next(current: &ScopeSpec, place: &PlaceInfo) -> Option<ScopeSpec> {
    let current = current.rung().breadth();
    SCOPE_LADDER
        .iter()
        .find(|rung| rung.breadth() > current)
        .map(|rung| rung.bind(place))
}

/// Single decision point for "this result set warrants widening".
#[must_use]
pub fn is_empty(results: &[ProviderResult]) -> bool {
    results.is_empty()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn delhi() -> PlaceInfo {
        PlaceInfo {
            city: "New Delhi".to_owned(),
            state: "Delhi".to_owned(),
            country: "India".to_owned(),
        }
    }

    #[test]
    fn ladder_binds_administrative_names() {
        let rungs = ladder(&delhi());
        assert_eq!(rungs.len(), 6);
        assert_eq!(rungs[0], ScopeSpec::Radius { km: 10 });
        assert_eq!(
            rungs[3],
            ScopeSpec::City {
                name: "New Delhi".to_owned()
            }
        );
        assert_eq!(
            rungs[5],
            ScopeSpec::Country {
                name: "India".to_owned()
            }
        );
    }

    #[test]
    fn suggest_next_walks_the_ladder_and_terminates() {
        let place = delhi();
        let mut current = ScopeSpec::Radius { km: 10 };
        let mut seen = vec![current.clone()];
        while let Some(next) = suggest_next(&current, &place) {
            assert!(
                next.is_broader_than(&current),
                "{next:?} should be broader than {current:?}"
            );
            assert!(!seen.contains(&next), "ladder cycled at {next:?}");
            seen.push(next.clone());
            current = next;
        }
        assert_eq!(seen, ladder(&place));
        assert_eq!(current.rung(), ScopeRung::Country);
    }

    #[test]
    fn suggest_next_from_country_is_none() {
        let country = ScopeSpec::Country {
            name: "India".to_owned(),
        };
        assert_eq!(suggest_next(&country, &delhi()), None);
    }

    #[test]
    fn off_ladder_radius_widens_to_next_rung() {
        let next = suggest_next(&ScopeSpec::Radius { km: 15 }, &delhi());
        assert_eq!(next, Some(ScopeSpec::Radius { km: 25 }));

        let next = suggest_next(&ScopeSpec::Radius { km: 80 }, &delhi());
        assert_eq!(
            next,
            Some(ScopeSpec::City {
                name: "New Delhi".to_owned()
            })
        );
    }

    #[test]
    fn sentinel_place_still_renders_admin_rungs() {
        let place = PlaceInfo::unknown("India");
        let rungs = ladder(&place);
        assert_eq!(rungs[3].to_string(), "in Unknown City");
        assert_eq!(rungs[4].to_string(), "in Unknown State");
        assert_eq!(rungs[5].to_string(), "in India");
    }

    #[test]
    fn parses_rung_strings() {
        assert_eq!("radius:25".parse::<ScopeRung>(), Ok(ScopeRung::Radius(25)));
        assert_eq!("50km".parse::<ScopeRung>(), Ok(ScopeRung::Radius(50)));
        assert_eq!("City".parse::<ScopeRung>(), Ok(ScopeRung::City));
        assert_eq!("country".parse::<ScopeRung>(), Ok(ScopeRung::Country));
        assert!("radius:0".parse::<ScopeRung>().is_err());
        assert!("galaxy".parse::<ScopeRung>().is_err());
    }

    #[test]
    fn is_empty_checks_length() {
        assert!(is_empty(&[]));
    }
}
