//! Shared `reqwest` plumbing for the backend and geocoder clients.

use std::time::Duration;

use reqwest::{Client, Url};

use crate::error::ClientError;

pub(crate) fn build_client(timeout_secs: u64, user_agent: &str) -> Result<Client, ClientError> {
    let client = Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .connect_timeout(Duration::from_secs(timeout_secs.clamp(1, 10)))
        .user_agent(user_agent)
        .build()?;
    Ok(client)
}

/// Parses `raw` and guarantees exactly one trailing slash, so that
/// [`Url::join`] appends to the base path instead of replacing its last
/// segment.
pub(crate) fn normalise_base_url(raw: &str) -> Result<Url, ClientError> {
    let normalised = format!("{}/", raw.trim().trim_end_matches('/'));
    Url::parse(&normalised).map_err(|e| ClientError::InvalidBaseUrl {
        url: raw.to_owned(),
        reason: e.to_string(),
    })
}

pub(crate) fn endpoint(base: &Url, path: &str) -> Result<Url, ClientError> {
    base.join(path).map_err(|e| ClientError::InvalidBaseUrl {
        url: base.to_string(),
        reason: e.to_string(),
    })
}

/// Sends a GET request and parses the body as JSON.
///
/// Non-2xx statuses become [`ClientError::Server`], carrying the body's
/// `message` (or `error`) field when one is present.
pub(crate) async fn get_json(client: &Client, url: &Url) -> Result<serde_json::Value, ClientError> {
    let response = client.get(url.clone()).send().await?;
    let status = response.status();
    let body = response.text().await?;

    if !status.is_success() {
        let message = serde_json::from_str::<serde_json::Value>(&body)
            .ok()
            .as_ref()
            .and_then(error_message)
            .unwrap_or_else(|| status.canonical_reason().unwrap_or("unknown error").to_owned());
        return Err(ClientError::Server {
            status: status.as_u16(),
            message,
        });
    }

    serde_json::from_str(&body).map_err(|e| ClientError::Deserialize {
        context: url.path().to_owned(),
        source: e,
    })
}

/// Extracts a human-readable message from an error body.
pub(crate) fn error_message(body: &serde_json::Value) -> Option<String> {
    ["message", "error"]
        .iter()
        .find_map(|key| body.get(key).and_then(serde_json::Value::as_str))
        .map(str::to_owned)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalise_adds_single_trailing_slash() {
        let url = normalise_base_url("http://localhost:5000/api//").unwrap();
        assert_eq!(url.as_str(), "http://localhost:5000/api/");
    }

    #[test]
    fn endpoint_appends_to_base_path() {
        let base = normalise_base_url("http://localhost:5000/api").unwrap();
        let url = endpoint(&base, "services/nearby-providers").unwrap();
        assert_eq!(
            url.as_str(),
            "http://localhost:5000/api/services/nearby-providers"
        );
    }

    #[test]
    fn rejects_unparseable_base_url() {
        let err = normalise_base_url("not a url").unwrap_err();
        assert!(matches!(err, ClientError::InvalidBaseUrl { .. }));
    }

    #[test]
    fn error_message_prefers_message_then_error() {
        let body = serde_json::json!({"success": false, "message": "bad scope"});
        assert_eq!(error_message(&body).as_deref(), Some("bad scope"));
        let body = serde_json::json!({"error": "Unable to geocode"});
        assert_eq!(error_message(&body).as_deref(), Some("Unable to geocode"));
        assert_eq!(error_message(&serde_json::json!({})), None);
    }
}
