//! HTTP client for the backend's `services/nearby-providers` endpoint.
//!
//! Each [`SearchQuery`] is translated into exactly one scope-specific group of
//! query parameters. The response envelope's `success` flag is checked and
//! failures surface as [`ClientError::Server`].

use reqwest::{Client, Url};

use nearserve_core::{AppConfig, ProviderResult, ScopeSpec, SearchQuery};

use crate::error::ClientError;
use crate::http::{build_client, endpoint, get_json, normalise_base_url};
use crate::retry::retry_with_backoff;
use crate::types::{Envelope, ProviderRecord, ProvidersData};

const NEARBY_PROVIDERS_PATH: &str = "services/nearby-providers";

/// Stateless provider search client.
///
/// Use [`GeoQueryClient::new`] with the application config, or
/// [`GeoQueryClient::with_base_url`] to point at a mock server in tests.
pub struct GeoQueryClient {
    client: Client,
    endpoint: Url,
    default_country: String,
    page_size: u32,
    max_retries: u32,
    backoff_base_ms: u64,
}

impl GeoQueryClient {
    /// # Errors
    ///
    /// Returns [`ClientError::Http`] if the `reqwest::Client` cannot be built,
    /// or [`ClientError::InvalidBaseUrl`] if `api_base_url` does not parse.
    pub fn new(config: &AppConfig) -> Result<Self, ClientError> {
        let mut client = Self::with_base_url(
            &config.api_base_url,
            config.request_timeout_secs,
            &config.user_agent,
        )?;
        client.default_country.clone_from(&config.default_country);
        client.page_size = config.page_size;
        client.max_retries = config.max_retries;
        client.backoff_base_ms = config.retry_backoff_base_ms;
        Ok(client)
    }

    /// Creates a client with page size 50, no retries and `India` as the
    /// fallback country.
    ///
    /// # Errors
    ///
    /// Same as [`GeoQueryClient::new`].
    pub fn with_base_url(
        base_url: &str,
        timeout_secs: u64,
        user_agent: &str,
    ) -> Result<Self, ClientError> {
        let client = build_client(timeout_secs, user_agent)?;
        let base = normalise_base_url(base_url)?;
        Ok(Self {
            client,
            endpoint: endpoint(&base, NEARBY_PROVIDERS_PATH)?,
            default_country: "India".to_owned(),
            page_size: 50,
            max_retries: 0,
            backoff_base_ms: 0,
        })
    }

    #[must_use]
    pub fn page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    #[must_use]
    pub fn retries(mut self, max_retries: u32, backoff_base_ms: u64) -> Self {
        self.max_retries = max_retries;
        self.backoff_base_ms = backoff_base_ms;
        self
    }

    /// Runs one provider search.
    ///
    /// Records without a usable coordinate, or that fail to deserialize, are
    /// skipped with a warning. Transient failures are retried per the
    /// configured policy.
    ///
    /// # Errors
    ///
    /// - [`ClientError::Http`] on network failure after retries.
    /// - [`ClientError::Server`] on a non-2xx status or `"success": false`.
    /// - [`ClientError::Deserialize`] if the envelope does not match.
    pub async fn search(&self, query: &SearchQuery) -> Result<Vec<ProviderResult>, ClientError> {
        let url = self.build_search_url(query);
        tracing::debug!(scope = %query.scope, url = %url, "searching providers");

        let body = retry_with_backoff(self.max_retries, self.backoff_base_ms, || {
            get_json(&self.client, &url)
        })
        .await?;

        let envelope: Envelope<ProvidersData> =
            serde_json::from_value(body).map_err(|e| ClientError::Deserialize {
                context: format!("nearby-providers(scope={})", query.scope.kind()),
                source: e,
            })?;

        if !envelope.success {
            return Err(ClientError::Server {
                status: 200,
                message: envelope
                    .message
                    .unwrap_or_else(|| "provider search failed".to_owned()),
            });
        }

        let records = envelope.data.map(|d| d.providers).unwrap_or_default();
        let total = records.len();
        let results: Vec<ProviderResult> = records
            .into_iter()
            .filter_map(|value| {
                let record = serde_json::from_value::<ProviderRecord>(value)
                    .map_err(|e| {
                        tracing::warn!(error = %e, "nearby-providers: skipping malformed record");
                    })
                    .ok()?;
                let id = record.id.clone();
                let result = record.into_result();
                if result.is_none() {
                    tracing::warn!(provider_id = %id, "nearby-providers: skipping record without location");
                }
                result
            })
            .collect();

        tracing::debug!(
            received = total,
            kept = results.len(),
            "provider search complete"
        );
        Ok(results)
    }

    /// Builds the request URL: `scope`, the scope's parameter group, optional
    /// `category`, and `limit`.
    pub(crate) fn build_search_url(&self, query: &SearchQuery) -> Url {
        let mut url = self.endpoint.clone();
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("scope", query.scope.kind());
            match &query.scope {
                ScopeSpec::Radius { km } => {
                    pairs.append_pair("lat", &query.center.latitude().to_string());
                    pairs.append_pair("lng", &query.center.longitude().to_string());
                    pairs.append_pair("radiusKm", &km.to_string());
                }
                ScopeSpec::City { name } => {
                    pairs.append_pair("city", name);
                }
                ScopeSpec::State { name } => {
                    pairs.append_pair("state", name);
                }
                ScopeSpec::Country { name } => {
                    let country = if name.trim().is_empty() {
                        &self.default_country
                    } else {
                        name
                    };
                    pairs.append_pair("country", country);
                }
            }
            if let Some(category) = &query.category {
                pairs.append_pair("category", category);
            }
            pairs.append_pair("limit", &self.page_size.to_string());
        }
        url
    }
}
