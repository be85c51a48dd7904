use thiserror::Error;

/// Errors returned by [`crate::SearchClient`].
#[derive(Debug, Error)]
pub enum ClientError {
    /// Network or TLS failure from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The backend answered with a non-2xx status. `message` is the backend's
    /// own explanation when the body carried one.
    #[error("unexpected HTTP status {status} from {url}")]
    Api {
        status: u16,
        url: String,
        message: Option<String>,
    },

    /// The response body could not be deserialized into the expected type.
    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("search response from {url} has no `shops` array")]
    MissingShops { url: String },

    #[error("shop not found: {shop_id}")]
    NotFound { shop_id: String },

    #[error("invalid base URL \"{base_url}\": {reason}")]
    InvalidBaseUrl { base_url: String, reason: String },
}

impl ClientError {
    /// The backend-supplied error message, if the failure carried one.
    #[must_use]
    pub fn backend_message(&self) -> Option<&str> {
        match self {
            ClientError::Api { message, .. } => message.as_deref(),
            _ => None,
        }
    }
}
