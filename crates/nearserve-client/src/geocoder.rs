//! Client for a Nominatim-compatible geocoding service.
//!
//! Used for free-text (forward) search and as the second source for reverse
//! geocoding when the backend cannot resolve a coordinate.

use reqwest::{Client, Url};

use nearserve_core::{Coordinate, PlaceInfo};

use crate::error::ClientError;
use crate::http::{build_client, endpoint, get_json, normalise_base_url};
use crate::types::{NominatimHit, NominatimReverse};

/// A forward-geocoding hit.
#[derive(Debug, Clone, PartialEq)]
pub struct GeocodedPlace {
    pub coordinate: Coordinate,
    pub display_name: String,
}

pub struct Geocoder {
    client: Client,
    base_url: Url,
    country_codes: String,
}

impl Geocoder {
    /// `country_codes` restricts forward search (comma-separated ISO codes);
    /// pass an empty string for worldwide search.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Http`] if the HTTP client cannot be built or
    /// [`ClientError::InvalidBaseUrl`] if `base_url` does not parse.
    pub fn new(
        base_url: &str,
        country_codes: &str,
        timeout_secs: u64,
        user_agent: &str,
    ) -> Result<Self, ClientError> {
        Ok(Self {
            client: build_client(timeout_secs, user_agent)?,
            base_url: normalise_base_url(base_url)?,
            country_codes: country_codes.trim().to_owned(),
        })
    }

    /// Resolves free text to the best-matching coordinate.
    ///
    /// # Errors
    ///
    /// - [`ClientError::NotFound`] if the service returns no hits.
    /// - [`ClientError::Http`] / [`ClientError::Server`] on transport failure.
    /// - [`ClientError::Deserialize`] if a hit's coordinates do not parse.
    pub async fn search(&self, query: &str) -> Result<GeocodedPlace, ClientError> {
        let url = self.search_url(query)?;
        let body = get_json(&self.client, &url).await?;
        let hits: Vec<NominatimHit> =
            serde_json::from_value(body).map_err(|e| ClientError::Deserialize {
                context: format!("geocoder search(q={query})"),
                source: e,
            })?;

        let hit = hits.into_iter().next().ok_or_else(|| {
            tracing::warn!(query, "geocoder returned no hits");
            ClientError::NotFound {
                query: query.to_owned(),
            }
        })?;

        let coordinate = parse_hit_coordinate(&hit).ok_or_else(|| ClientError::Server {
            status: 200,
            message: format!("geocoder returned unusable coordinates ({}, {})", hit.lat, hit.lon),
        })?;

        Ok(GeocodedPlace {
            coordinate,
            display_name: hit.display_name,
        })
    }

    /// Resolves a coordinate to city/state/country.
    ///
    /// Missing address parts come back as sentinels via
    /// [`PlaceInfo::with_fallbacks`].
    ///
    /// # Errors
    ///
    /// - [`ClientError::Server`] if the service reports it cannot geocode the point.
    /// - [`ClientError::Http`] on transport failure.
    /// - [`ClientError::Deserialize`] if the response shape is unexpected.
    pub async fn reverse(
        &self,
        coordinate: Coordinate,
        default_country: &str,
    ) -> Result<PlaceInfo, ClientError> {
        let mut url = endpoint(&self.base_url, "reverse")?;
        url.query_pairs_mut()
            .append_pair("format", "json")
            .append_pair("lat", &coordinate.latitude().to_string())
            .append_pair("lon", &coordinate.longitude().to_string());

        let body = get_json(&self.client, &url).await?;
        let reverse: NominatimReverse =
            serde_json::from_value(body).map_err(|e| ClientError::Deserialize {
                context: format!("geocoder reverse({coordinate})"),
                source: e,
            })?;

        let Some(address) = reverse.address else {
            return Err(ClientError::Server {
                status: 200,
                message: reverse
                    .error
                    .unwrap_or_else(|| "reverse geocode returned no address".to_owned()),
            });
        };

        Ok(PlaceInfo {
            city: address.locality().unwrap_or_default().to_owned(),
            state: address.state.clone().unwrap_or_default(),
            country: address.country.clone().unwrap_or_default(),
        }
        .with_fallbacks(default_country))
    }

    fn search_url(&self, query: &str) -> Result<Url, ClientError> {
        let mut url = endpoint(&self.base_url, "search")?;
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("format", "json");
            pairs.append_pair("q", query.trim());
            pairs.append_pair("limit", "1");
            if !self.country_codes.is_empty() {
                pairs.append_pair("countrycodes", &self.country_codes);
            }
        }
        Ok(url)
    }
}

fn parse_hit_coordinate(hit: &NominatimHit) -> Option<Coordinate> {
    let lat = hit.lat.trim().parse::<f64>().ok()?;
    let lon = hit.lon.trim().parse::<f64>().ok()?;
    Coordinate::new(lat, lon).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn search_url_carries_format_limit_and_country_codes() {
        let geocoder =
            Geocoder::new("https://nominatim.example.org", "in", 5, "nearserve-test").unwrap();
        let url = geocoder.search_url("Connaught Place").unwrap();
        assert_eq!(
            url.as_str(),
            "https://nominatim.example.org/search?format=json&q=Connaught+Place&limit=1&countrycodes=in"
        );
    }

    #[test]
    fn search_url_omits_empty_country_codes() {
        let geocoder = Geocoder::new("https://nominatim.example.org", "", 5, "nearserve-test").unwrap();
        let url = geocoder.search_url("Paris").unwrap();
        assert!(!url.as_str().contains("countrycodes"), "{url}");
    }

    #[test]
    fn unparseable_hit_coordinates_are_rejected() {
        let hit = NominatimHit {
            lat: "north".to_owned(),
            lon: "77.2".to_owned(),
            display_name: String::new(),
        };
        assert!(parse_hit_coordinate(&hit).is_none());
    }
}
