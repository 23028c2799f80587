//! Client configuration.
//!
//! Settings can be assembled with `ClientConfig::builder` or loaded from the
//! `PAGIENT_*` environment variables.

use std::time::Duration;

use crate::auth::Auth;
use crate::endpoints::Endpoints;
use crate::error::ApiError;

/// Bound on every round trip.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Identifying `User-Agent` sent with each request.
pub const USER_AGENT: &str = concat!("pagient-rs/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub base_url: String,
    pub timeout: Duration,
    pub user_agent: String,
    pub auth: Auth,
    pub endpoints: Endpoints,
}

impl ClientConfig {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout: DEFAULT_TIMEOUT,
            user_agent: USER_AGENT.to_string(),
            auth: Auth::None,
            endpoints: Endpoints::default(),
        }
    }

    pub fn builder(base_url: &str) -> ClientConfigBuilder {
        ClientConfigBuilder {
            config: Self::new(base_url),
        }
    }

    /// Load from `PAGIENT_BASE_URL`, `PAGIENT_TOKEN`, `PAGIENT_USERNAME`,
    /// `PAGIENT_PASSWORD`, `PAGIENT_TIMEOUT_SECS` and `PAGIENT_API_PREFIX`.
    pub fn from_env() -> Result<Self, ApiError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ApiError> {
        let base_url = lookup("PAGIENT_BASE_URL")
            .filter(|url| !url.is_empty())
            .ok_or_else(|| ApiError::MissingConfig("PAGIENT_BASE_URL must be set".to_string()))?;
        let mut config = Self::new(&base_url);

        if let Some(raw) = lookup("PAGIENT_TIMEOUT_SECS") {
            let secs: u64 = raw.parse().map_err(|e| {
                ApiError::InvalidConfig(format!("PAGIENT_TIMEOUT_SECS is not a number: {e}"))
            })?;
            config.timeout = Duration::from_secs(secs);
        }

        if let Some(prefix) = lookup("PAGIENT_API_PREFIX") {
            config.endpoints = Endpoints::with_api_prefix(&prefix);
        }

        config.auth = match (
            lookup("PAGIENT_TOKEN").filter(|t| !t.is_empty()),
            lookup("PAGIENT_USERNAME"),
            lookup("PAGIENT_PASSWORD"),
        ) {
            (Some(token), _, _) => Auth::Bearer(token),
            (None, Some(username), Some(password)) => Auth::Basic { username, password },
            _ => Auth::None,
        };

        Ok(config)
    }
}

pub struct ClientConfigBuilder {
    config: ClientConfig,
}

impl ClientConfigBuilder {
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.config.user_agent = user_agent.into();
        self
    }

    pub fn auth(mut self, auth: Auth) -> Self {
        self.config.auth = auth;
        self
    }

    pub fn token(self, token: impl Into<String>) -> Self {
        self.auth(Auth::bearer(token))
    }

    pub fn basic_auth(self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.auth(Auth::basic(username, password))
    }

    pub fn endpoints(mut self, endpoints: Endpoints) -> Self {
        self.config.endpoints = endpoints;
        self
    }

    pub fn build(self) -> ClientConfig {
        self.config
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults() {
        let config = ClientConfig::new("http://localhost:8080/");
        assert_eq!(config.base_url, "http://localhost:8080");
        assert_eq!(config.timeout, Duration::from_secs(10));
        assert!(config.user_agent.starts_with("pagient-rs/"));
        assert!(config.auth.is_none());
        assert_eq!(config.endpoints, Endpoints::default());
    }

    #[test]
    fn builder_sets_fields() {
        let config = ClientConfig::builder("http://localhost")
            .timeout(Duration::from_secs(3))
            .user_agent("test-agent")
            .token("tok")
            .build();
        assert_eq!(config.timeout, Duration::from_secs(3));
        assert_eq!(config.user_agent, "test-agent");
        assert_eq!(config.auth, Auth::bearer("tok"));
    }

    #[test]
    fn env_requires_base_url() {
        let err = ClientConfig::from_lookup(lookup(&[])).unwrap_err();
        assert!(matches!(err, ApiError::MissingConfig(_)));
    }

    #[test]
    fn env_token_wins_over_basic() {
        let config = ClientConfig::from_lookup(lookup(&[
            ("PAGIENT_BASE_URL", "http://pagient.local"),
            ("PAGIENT_TOKEN", "tok"),
            ("PAGIENT_USERNAME", "admin"),
            ("PAGIENT_PASSWORD", "admin"),
        ]))
        .unwrap();
        assert_eq!(config.auth, Auth::bearer("tok"));
    }

    #[test]
    fn env_basic_and_prefix() {
        let config = ClientConfig::from_lookup(lookup(&[
            ("PAGIENT_BASE_URL", "http://pagient.local"),
            ("PAGIENT_USERNAME", "admin"),
            ("PAGIENT_PASSWORD", "secret"),
            ("PAGIENT_API_PREFIX", "/api"),
            ("PAGIENT_TIMEOUT_SECS", "30"),
        ]))
        .unwrap();
        assert_eq!(config.auth, Auth::basic("admin", "secret"));
        assert_eq!(config.endpoints.patients, "/api/patients");
        assert_eq!(config.timeout, Duration::from_secs(30));
    }

    #[test]
    fn env_rejects_bad_timeout() {
        let err = ClientConfig::from_lookup(lookup(&[
            ("PAGIENT_BASE_URL", "http://pagient.local"),
            ("PAGIENT_TIMEOUT_SECS", "soon"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ApiError::InvalidConfig(_)), "{err:?}");
        assert!(err.to_string().starts_with("invalid configuration:"));
    }
}
