//! Backend client error types.

use thiserror::Error;

pub type ClientResult<T> = Result<T, ClientError>;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Elasticsearch URL must be provided via the config file or the ELASTICSEARCH_URL environment variable")]
    MissingUrl,

    #[error("Invalid Elasticsearch URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("Cluster not found: {0}")]
    ClusterNotFound(String),

    #[error("Elasticsearch returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Unexpected response: {0}")]
    UnexpectedResponse(String),

    #[error(transparent)]
    Http(#[from] reqwest::Error),
}
