//! HTTP client for the Elasticsearch REST API.

use async_trait::async_trait;
use reqwest::{Method, RequestBuilder};
use serde_json::Value;
use tracing::debug;
use url::Url;

use crate::{
    config::{AuthMode, ConnectionParams},
    error::{ClientError, ClientResult},
};

/// Backend operations the tool handlers depend on.
///
/// Every method returns the decoded JSON body or fails with a transport /
/// status error. Results are not interpreted here.
#[async_trait]
pub trait SearchBackend: Send + Sync {
    /// `GET /`: cluster self-description including `version.number`.
    async fn info(&self) -> ClientResult<Value>;

    /// `GET /_cat/indices?format=json`
    async fn cat_indices(&self) -> ClientResult<Value>;

    /// `GET /{index}`: settings, mappings and aliases of one index.
    async fn get_index(&self, index: &str) -> ClientResult<Value>;

    /// `GET /{index}/_mapping`
    async fn get_mapping(&self, index: &str) -> ClientResult<Value>;

    /// `POST /{index}/_search`
    async fn search(&self, index: &str, query: &Value) -> ClientResult<Value>;

    /// `GET /_cat/shards/{index}?format=json`
    async fn cat_shards(&self, index: &str) -> ClientResult<Value>;
}

/// Stateless Elasticsearch client built from [`ConnectionParams`].
#[derive(Debug, Clone)]
pub struct EsClient {
    http: reqwest::Client,
    base_url: Url,
    auth: AuthMode,
}

impl EsClient {
    pub fn new(params: &ConnectionParams) -> ClientResult<Self> {
        let mut base_url = Url::parse(&params.url).map_err(|e| ClientError::InvalidUrl {
            url: params.url.clone(),
            reason: e.to_string(),
        })?;
        // Url::join drops the last path segment unless it ends with '/'
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = params.timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder.build()?;

        let auth = params.auth();
        match &auth {
            AuthMode::NoAuth => debug!(url = %base_url, "Connecting without authentication (explicit)"),
            AuthMode::Basic { username, .. } => {
                debug!(url = %base_url, username = %username, "Connecting with basic auth")
            }
            AuthMode::Anonymous => {
                debug!(url = %base_url, "No credentials configured, connecting unauthenticated")
            }
        }

        Ok(Self {
            http,
            base_url,
            auth,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn auth(&self) -> &AuthMode {
        &self.auth
    }

    /// Resolve an API path against the base URL.
    pub fn endpoint(&self, path: &str) -> ClientResult<Url> {
        self.base_url
            .join(path.trim_start_matches('/'))
            .map_err(|e| ClientError::InvalidUrl {
                url: path.to_string(),
                reason: e.to_string(),
            })
    }

    fn request(&self, method: Method, path: &str) -> ClientResult<RequestBuilder> {
        let url = self.endpoint(path)?;
        let builder = self.http.request(method, url);
        Ok(match &self.auth {
            AuthMode::Basic { username, password } => builder.basic_auth(username, Some(password)),
            AuthMode::NoAuth | AuthMode::Anonymous => builder,
        })
    }

    async fn send(&self, builder: RequestBuilder) -> ClientResult<Value> {
        let response = builder.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ClientError::Status {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response.json::<Value>().await?)
    }
}

/// Percent-encode an index expression for use as a single path segment.
fn index_segment(index: &str) -> String {
    url::form_urlencoded::byte_serialize(index.as_bytes())
        .collect::<String>()
        // form encoding turns spaces into '+', which is literal in a path
        .replace('+', "%20")
}

#[async_trait]
impl SearchBackend for EsClient {
    async fn info(&self) -> ClientResult<Value> {
        let req = self.request(Method::GET, "/")?;
        self.send(req).await
    }

    async fn cat_indices(&self) -> ClientResult<Value> {
        let req = self
            .request(Method::GET, "/_cat/indices")?
            .query(&[("format", "json")]);
        self.send(req).await
    }

    async fn get_index(&self, index: &str) -> ClientResult<Value> {
        let req = self.request(Method::GET, &format!("/{}", index_segment(index)))?;
        self.send(req).await
    }

    async fn get_mapping(&self, index: &str) -> ClientResult<Value> {
        let req = self.request(Method::GET, &format!("/{}/_mapping", index_segment(index)))?;
        self.send(req).await
    }

    async fn search(&self, index: &str, query: &Value) -> ClientResult<Value> {
        let req = self
            .request(Method::POST, &format!("/{}/_search", index_segment(index)))?
            .json(query);
        self.send(req).await
    }

    async fn cat_shards(&self, index: &str) -> ClientResult<Value> {
        let req = self
            .request(Method::GET, &format!("/_cat/shards/{}", index_segment(index)))?
            .query(&[("format", "json")]);
        self.send(req).await
    }
}

/// Extract `version.number` from an info response.
pub fn version_number(info: &Value) -> ClientResult<&str> {
    info.get("version")
        .and_then(|v| v.get("number"))
        .and_then(Value::as_str)
        .ok_or_else(|| ClientError::UnexpectedResponse("missing version.number".to_string()))
}
