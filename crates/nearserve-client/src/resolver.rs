//! Location resolution with defined fallbacks.
//!
//! None of the operations here leave the caller without a usable value:
//! a denied or unavailable position falls back to the configured default
//! center, and a failed reverse geocode falls back to a sentinel
//! [`PlaceInfo`]. Only forward geocoding reports failure, since a free-text
//! query that matches nothing is something the user must see.

use std::future::Future;
use std::time::Duration;

use reqwest::{Client, Url};
use tokio::time::Instant;

use nearserve_core::{AppConfig, Coordinate, PlaceInfo};

use crate::error::{ClientError, LocationError};
use crate::geocoder::{GeocodedPlace, Geocoder};
use crate::http::{build_client, endpoint, get_json, normalise_base_url};
use crate::position::PositionSource;
use crate::types::{Envelope, PlaceRecord};

const REVERSE_GEOCODE_PATH: &str = "services/reverse-geocode";

/// The center a session should start from, and why it was chosen.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedCenter {
    pub coordinate: Coordinate,
    /// Set when the default center was used because the position source failed.
    pub fallback_reason: Option<LocationError>,
}

pub struct LocationResolver {
    client: Client,
    reverse_endpoint: Url,
    geocoder: Geocoder,
    default_center: Coordinate,
    default_country: String,
    timeout: Duration,
}

impl LocationResolver {
    /// # Errors
    ///
    /// Returns [`ClientError::Http`] if an HTTP client cannot be built or
    /// [`ClientError::InvalidBaseUrl`] if either configured URL does not parse.
    pub fn new(config: &AppConfig) -> Result<Self, ClientError> {
        let base = normalise_base_url(&config.api_base_url)?;
        let geocoder = Geocoder::new(
            &config.geocoder_url,
            &config.country_codes,
            config.geocode_timeout_secs,
            &config.user_agent,
        )?;
        Ok(Self {
            client: build_client(config.geocode_timeout_secs, &config.user_agent)?,
            reverse_endpoint: endpoint(&base, REVERSE_GEOCODE_PATH)?,
            geocoder,
            default_center: config.default_center,
            default_country: config.default_country.clone(),
            timeout: Duration::from_secs(config.geocode_timeout_secs),
        })
    }

    #[must_use]
    pub fn default_center(&self) -> Coordinate {
        self.default_center
    }

    #[must_use]
    pub fn default_country(&self) -> &str {
        &self.default_country
    }

    /// Reads the current position from `source`.
    ///
    /// # Errors
    ///
    /// Returns the source's [`LocationError`]; a source that does not answer
    /// within the geocoding timeout is reported as
    /// [`LocationError::Unavailable`].
    pub async fn resolve_current_coordinate<P: PositionSource>(
        &self,
        source: &P,
    ) -> Result<Coordinate, LocationError> {
        tokio::time::timeout(self.timeout, source.current_position())
            .await
            .map_err(|_| LocationError::Unavailable("position request timed out".to_owned()))?
    }

    /// Current position, or the configured default center when it cannot be
    /// obtained.
    pub async fn current_or_default<P: PositionSource>(&self, source: &P) -> ResolvedCenter {
        match self.resolve_current_coordinate(source).await {
            Ok(coordinate) => ResolvedCenter {
                coordinate,
                fallback_reason: None,
            },
            Err(reason) => {
                tracing::warn!(
                    error = %reason,
                    fallback = %self.default_center,
                    "current position unavailable, using default center"
                );
                ResolvedCenter {
                    coordinate: self.default_center,
                    fallback_reason: Some(reason),
                }
            }
        }
    }

    /// Resolves `coordinate` to a place, never failing.
    ///
    /// Tries the backend first, then the third-party geocoder, then returns
    /// [`PlaceInfo::unknown`] with the default country.
    pub async fn reverse_geocode(&self, coordinate: Coordinate) -> PlaceInfo {
        match self.try_reverse_geocode(coordinate).await {
            Ok(place) => place,
            Err(err) => {
                tracing::warn!(
                    error = %err,
                    coordinate = %coordinate,
                    "reverse geocode failed, using sentinel place"
                );
                PlaceInfo::unknown(&self.default_country)
            }
        }
    }

    /// Backend reverse geocode with the third-party geocoder as fallback.
    ///
    /// Both steps share one deadline, so the whole chain never takes longer
    /// than the configured geocode timeout.
    ///
    /// # Errors
    ///
    /// Returns the geocoder's error when both sources fail.
    pub async fn try_reverse_geocode(&self, coordinate: Coordinate) -> Result<PlaceInfo, ClientError> {
        let deadline = Instant::now() + self.timeout;
        match self
            .bounded_until("reverse geocode", deadline, self.backend_reverse(coordinate))
            .await
        {
            Ok(place) => return Ok(place),
            Err(err) => {
                tracing::debug!(error = %err, "backend reverse geocode failed, trying geocoder");
            }
        }
        self.bounded_until(
            "reverse geocode",
            deadline,
            self.geocoder.reverse(coordinate, &self.default_country),
        )
        .await
    }

    /// Resolves free text to a coordinate. Not retried.
    ///
    /// # Errors
    ///
    /// - [`ClientError::NotFound`] if nothing matched.
    /// - [`ClientError::Timeout`] / [`ClientError::Http`] on network failure.
    pub async fn forward_geocode(&self, query: &str) -> Result<Coordinate, ClientError> {
        self.forward_geocode_place(query)
            .await
            .map(|place| place.coordinate)
    }

    /// Like [`LocationResolver::forward_geocode`] but keeps the display name.
    ///
    /// # Errors
    ///
    /// Same as [`LocationResolver::forward_geocode`].
    pub async fn forward_geocode_place(&self, query: &str) -> Result<GeocodedPlace, ClientError> {
        if query.trim().is_empty() {
            return Err(ClientError::NotFound {
                query: query.to_owned(),
            });
        }
        self.bounded("forward geocode", self.geocoder.search(query))
            .await
    }

    async fn backend_reverse(&self, coordinate: Coordinate) -> Result<PlaceInfo, ClientError> {
        let mut url = self.reverse_endpoint.clone();
        url.query_pairs_mut()
            .append_pair("lat", &coordinate.latitude().to_string())
            .append_pair("lng", &coordinate.longitude().to_string());

        let body = get_json(&self.client, &url).await?;
        let envelope: Envelope<PlaceRecord> =
            serde_json::from_value(body).map_err(|e| ClientError::Deserialize {
                context: format!("reverse-geocode({coordinate})"),
                source: e,
            })?;

        match (envelope.success, envelope.data) {
            (true, Some(place)) => Ok(PlaceInfo {
                city: place.city,
                state: place.state,
                country: place.country,
            }
            .with_fallbacks(&self.default_country)),
            _ => Err(ClientError::Server {
                status: 200,
                message: envelope
                    .message
                    .unwrap_or_else(|| "reverse geocode unsuccessful".to_owned()),
            }),
        }
    }

    /// Applies the geocoding timeout on top of the HTTP client's own.
    async fn bounded<T>(
        &self,
        operation: &'static str,
        fut: impl Future<Output = Result<T, ClientError>>,
    ) -> Result<T, ClientError> {
        self.bounded_until(operation, Instant::now() + self.timeout, fut)
            .await
    }

    async fn bounded_until<T>(
        &self,
        operation: &'static str,
        deadline: Instant,
        fut: impl Future<Output = Result<T, ClientError>>,
    ) -> Result<T, ClientError> {
        tokio::time::timeout_at(deadline, fut)
            .await
            .map_err(|_| ClientError::Timeout {
                operation,
                after_secs: self.timeout.as_secs(),
            })?
    }
}
