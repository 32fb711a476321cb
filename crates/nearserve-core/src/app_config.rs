use crate::geo::Coordinate;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

#[derive(Clone)]
pub struct AppConfig {
    pub env: Environment,
    pub log_level: String,
    pub api_base_url: String,
    pub geocoder_url: String,
    pub user_agent: String,
    pub default_center: Coordinate,
    pub default_country: String,
    pub country_codes: String,
    pub geocode_timeout_secs: u64,
    pub request_timeout_secs: u64,
    pub page_size: u32,
    pub max_retries: u32,
    pub retry_backoff_base_ms: u64,
    pub auto_expand: bool,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("log_level", &self.log_level)
            .field("api_base_url", &redact_userinfo(&self.api_base_url))
            .field("geocoder_url", &redact_userinfo(&self.geocoder_url))
            .field("user_agent", &self.user_agent)
            .field("default_center", &self.default_center)
            .field("default_country", &self.default_country)
            .field("country_codes", &self.country_codes)
            .field("geocode_timeout_secs", &self.geocode_timeout_secs)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("page_size", &self.page_size)
            .field("max_retries", &self.max_retries)
            .field("retry_backoff_base_ms", &self.retry_backoff_base_ms)
            .field("auto_expand", &self.auto_expand)
            .finish()
    }
}

/// Replaces `user:pass@` in a URL with `[redacted]@`.
fn redact_userinfo(url: &str) -> String {
    let Some((scheme, rest)) = url.split_once("://") else {
        return url.to_owned();
    };
    let authority_end = rest.find('/').unwrap_or(rest.len());
    match rest[..authority_end].rfind('@') {
        Some(at) => format!("{scheme}://[redacted]{}", &rest[at..]),
        None => url.to_owned(),
    }
}
