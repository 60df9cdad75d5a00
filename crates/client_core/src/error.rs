use shared::error::ValidationError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ClientError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientErrorKind {
    Network,
    Decode,
    Validation,
    Config,
}

#[derive(Debug, Error)]
pub enum ClientError {
    /// Transport failure or a non-success HTTP status.
    #[error("request {endpoint} failed: {source}")]
    Network {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("malformed response from {endpoint}: {source}")]
    Decode {
        endpoint: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid input: {0}")]
    Validation(#[from] ValidationError),
    #[error("invalid configuration: {0}")]
    Config(String),
}

impl ClientError {
    pub(crate) fn network(endpoint: &str, source: reqwest::Error) -> Self {
        Self::Network {
            endpoint: endpoint.to_string(),
            source,
        }
    }

    pub(crate) fn decode(endpoint: &str, source: serde_json::Error) -> Self {
        Self::Decode {
            endpoint: endpoint.to_string(),
            source,
        }
    }

    pub fn kind(&self) -> ClientErrorKind {
        match self {
            ClientError::Network { .. } => ClientErrorKind::Network,
            ClientError::Decode { .. } => ClientErrorKind::Decode,
            ClientError::Validation(_) => ClientErrorKind::Validation,
            ClientError::Config(_) => ClientErrorKind::Config,
        }
    }

    /// HTTP status for failures that got as far as a response.
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Network { source, .. } => source.status().map(|status| status.as_u16()),
            _ => None,
        }
    }
}
