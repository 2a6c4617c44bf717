//! Backend connection configuration.
//!
//! Authentication precedence:
//! 1. `ELASTICSEARCH_NO_AUTH=true` (explicit no-auth)
//! 2. Username + password pair
//! 3. Unauthenticated fallback

use std::{collections::HashMap, fmt, time::Duration};

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{ClientError, ClientResult};

pub const ENV_URL: &str = "ELASTICSEARCH_URL";
pub const ENV_USERNAME: &str = "ELASTICSEARCH_USERNAME";
pub const ENV_PASSWORD: &str = "ELASTICSEARCH_PASSWORD";
pub const ENV_NO_AUTH: &str = "ELASTICSEARCH_NO_AUTH";
pub const ENV_TIMEOUT: &str = "ELASTICSEARCH_TIMEOUT";

/// Resolved authentication mode for a connection.
#[derive(Clone, PartialEq, Eq)]
pub enum AuthMode {
    /// No-auth flag was set explicitly.
    NoAuth,
    Basic { username: String, password: String },
    /// Nothing configured; connect without credentials and hope for the best.
    Anonymous,
}

impl fmt::Debug for AuthMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthMode::NoAuth => f.write_str("NoAuth"),
            AuthMode::Basic { username, .. } => f
                .debug_struct("Basic")
                .field("username", username)
                .field("password", &"****")
                .finish(),
            AuthMode::Anonymous => f.write_str("Anonymous"),
        }
    }
}

/// Static parameters a client is built from.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct ConnectionParams {
    pub url: String,
    pub username: Option<String>,
    pub password: Option<String>,
    pub no_auth: bool,
    pub timeout: Option<Duration>,
}

impl fmt::Debug for ConnectionParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionParams")
            .field("url", &self.url)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "****"))
            .field("no_auth", &self.no_auth)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl ConnectionParams {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Default::default()
        }
    }

    #[must_use]
    pub fn with_basic_auth(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self.password = Some(password.into());
        self
    }

    #[must_use]
    pub fn with_no_auth(mut self, no_auth: bool) -> Self {
        self.no_auth = no_auth;
        self
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Load connection parameters from process environment.
    pub fn from_env() -> ClientResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load connection parameters through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> ClientResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let url = lookup(ENV_URL)
            .filter(|u| !u.trim().is_empty())
            .ok_or(ClientError::MissingUrl)?;

        Ok(Self {
            url,
            username: lookup(ENV_USERNAME).filter(|s| !s.is_empty()),
            password: lookup(ENV_PASSWORD).filter(|s| !s.is_empty()),
            no_auth: no_auth_flag(lookup(ENV_NO_AUTH)),
            timeout: parse_timeout(lookup(ENV_TIMEOUT)),
        })
    }

    pub fn auth(&self) -> AuthMode {
        if self.no_auth {
            return AuthMode::NoAuth;
        }
        match (&self.username, &self.password) {
            (Some(username), Some(password)) if !username.is_empty() && !password.is_empty() => {
                AuthMode::Basic {
                    username: username.clone(),
                    password: password.clone(),
                }
            }
            _ => AuthMode::Anonymous,
        }
    }
}

fn no_auth_flag(raw: Option<String>) -> bool {
    raw.map(|v| v.trim().eq_ignore_ascii_case("true"))
        .unwrap_or(false)
}

fn parse_timeout(raw: Option<String>) -> Option<Duration> {
    let raw = raw?;
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    match raw.parse::<u64>() {
        Ok(secs) => Some(Duration::from_secs(secs)),
        Err(_) => {
            warn!(value = %raw, "Ignoring non-numeric {}", ENV_TIMEOUT);
            None
        }
    }
}

/// A named cluster entry from the `clusters` section of the config document.
#[derive(Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct ClusterInfo {
    pub elasticsearch_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub elasticsearch_username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub elasticsearch_password: Option<String>,
    /// Request timeout in seconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<u64>,
}

impl fmt::Debug for ClusterInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClusterInfo")
            .field("elasticsearch_url", &self.elasticsearch_url)
            .field("elasticsearch_username", &self.elasticsearch_username)
            .field(
                "elasticsearch_password",
                &self.elasticsearch_password.as_ref().map(|_| "****"),
            )
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl ClusterInfo {
    /// Build connection parameters. The no-auth flag is process-wide.
    pub fn connection_params(&self, no_auth: bool) -> ConnectionParams {
        ConnectionParams {
            url: self.elasticsearch_url.clone(),
            username: self.elasticsearch_username.clone(),
            password: self.elasticsearch_password.clone(),
            no_auth,
            timeout: self.timeout.map(Duration::from_secs),
        }
    }
}

/// Named clusters available in multi-backend mode.
#[derive(Debug, Clone, Default)]
pub struct ClusterRegistry {
    clusters: HashMap<String, ClusterInfo>,
}

impl From<HashMap<String, ClusterInfo>> for ClusterRegistry {
    fn from(clusters: HashMap<String, ClusterInfo>) -> Self {
        Self { clusters }
    }
}

impl FromIterator<(String, ClusterInfo)> for ClusterRegistry {
    fn from_iter<I: IntoIterator<Item = (String, ClusterInfo)>>(iter: I) -> Self {
        Self {
            clusters: iter.into_iter().collect(),
        }
    }
}

impl ClusterRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_cluster(mut self, name: impl Into<String>, info: ClusterInfo) -> Self {
        self.clusters.insert(name.into(), info);
        self
    }

    pub fn get(&self, name: &str) -> Option<&ClusterInfo> {
        self.clusters.get(name)
    }

    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.clusters.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.clusters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clusters.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_from_lookup_requires_url() {
        let err = ConnectionParams::from_lookup(lookup_from(&[])).unwrap_err();
        assert!(matches!(err, ClientError::MissingUrl));

        let err = ConnectionParams::from_lookup(lookup_from(&[(ENV_URL, "  ")])).unwrap_err();
        assert!(matches!(err, ClientError::MissingUrl));
    }

    #[test]
    fn test_from_lookup_full() {
        let params = ConnectionParams::from_lookup(lookup_from(&[
            (ENV_URL, "http://localhost:9200"),
            (ENV_USERNAME, "elastic"),
            (ENV_PASSWORD, "changeme"),
            (ENV_TIMEOUT, "30"),
        ]))
        .unwrap();

        assert_eq!(params.url, "http://localhost:9200");
        assert_eq!(params.timeout, Some(Duration::from_secs(30)));
        assert_eq!(
            params.auth(),
            AuthMode::Basic {
                username: "elastic".to_string(),
                password: "changeme".to_string()
            }
        );
    }

    #[test]
    fn test_no_auth_flag_wins_over_credentials() {
        let params = ConnectionParams::from_lookup(lookup_from(&[
            (ENV_URL, "http://localhost:9200"),
            (ENV_USERNAME, "elastic"),
            (ENV_PASSWORD, "changeme"),
            (ENV_NO_AUTH, "TRUE"),
        ]))
        .unwrap();
        assert_eq!(params.auth(), AuthMode::NoAuth);
    }

    #[test]
    fn test_partial_credentials_fall_back_to_anonymous() {
        let params = ConnectionParams::new("http://localhost:9200");
        assert_eq!(params.auth(), AuthMode::Anonymous);

        let mut params = ConnectionParams::new("http://localhost:9200");
        params.username = Some("elastic".to_string());
        assert_eq!(params.auth(), AuthMode::Anonymous);
    }

    #[test]
    fn test_invalid_timeout_ignored() {
        let params = ConnectionParams::from_lookup(lookup_from(&[
            (ENV_URL, "http://localhost:9200"),
            (ENV_TIMEOUT, "soon"),
        ]))
        .unwrap();
        assert!(params.timeout.is_none());
    }

    #[test]
    fn test_debug_redacts_password() {
        let params =
            ConnectionParams::new("http://localhost:9200").with_basic_auth("elastic", "hunter2");
        let rendered = format!("{:?}", params);
        assert!(!rendered.contains("hunter2"));
        assert!(rendered.contains("****"));
    }

    #[test]
    fn test_cluster_registry_from_section() {
        let section: HashMap<String, ClusterInfo> = serde_json::from_value(serde_json::json!({
            "logs": {
                "elasticsearch_url": "http://logs:9200",
                "elasticsearch_username": "reader",
                "elasticsearch_password": "secret",
                "timeout": 10
            },
            "metrics": {"elasticsearch_url": "http://metrics:9200"}
        }))
        .expect("Failed to parse");

        let registry = ClusterRegistry::from(section);
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.names(), vec!["logs", "metrics"]);

        let logs = registry.get("logs").unwrap().connection_params(false);
        assert_eq!(logs.url, "http://logs:9200");
        assert_eq!(logs.timeout, Some(Duration::from_secs(10)));
        assert!(matches!(logs.auth(), AuthMode::Basic { .. }));

        let metrics = registry.get("metrics").unwrap().connection_params(true);
        assert_eq!(metrics.auth(), AuthMode::NoAuth);
    }

    #[test]
    fn test_cluster_info_requires_url() {
        let parsed: Result<ClusterInfo, _> =
            serde_json::from_value(serde_json::json!({"timeout": 5}));
        assert!(parsed.is_err());
    }

    #[test]
    fn test_cluster_registry_from_iter() {
        let registry: ClusterRegistry = [(
            "local".to_string(),
            ClusterInfo {
                elasticsearch_url: "http://127.0.0.1:9200".to_string(),
                elasticsearch_username: None,
                elasticsearch_password: None,
                timeout: None,
            },
        )]
        .into_iter()
        .collect();
        assert_eq!(registry.names(), vec!["local"]);
        assert!(ClusterRegistry::new().is_empty());
    }
}
