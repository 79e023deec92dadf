//! Graph client error types.

use capsync_core::StoreError;

/// Errors raised by the Graph client.
#[derive(Debug, thiserror::Error)]
pub enum GraphError {
    /// The token endpoint rejected the credential exchange. Fatal for the
    /// whole run.
    #[error("authentication failed: {0}")]
    Authentication(String),

    /// Graph returned a non-success status for an API call.
    #[error("graph api returned {status}: {detail}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Error detail, decoded from the Graph error body when present.
        detail: String,
    },

    /// Transport-level failure.
    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// A response body could not be decoded.
    #[error("invalid response body: {0}")]
    InvalidResponse(#[from] serde_json::Error),
}

/// Result type for Graph operations.
pub type GraphResult<T> = Result<T, GraphError>;

impl From<GraphError> for StoreError {
    fn from(err: GraphError) -> Self {
        Self::new(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn authentication_display() {
        let e = GraphError::Authentication("invalid_client".into());
        assert_eq!(e.to_string(), "authentication failed: invalid_client");
    }

    #[test]
    fn api_display() {
        let e = GraphError::Api {
            status: 404,
            detail: "ResourceNotFound: policy does not exist".into(),
        };
        assert_eq!(
            e.to_string(),
            "graph api returned 404: ResourceNotFound: policy does not exist"
        );
    }

    #[test]
    fn store_error_from_graph_error() {
        let e = GraphError::Api {
            status: 409,
            detail: "Conflict".into(),
        };
        let store: StoreError = e.into();
        assert_eq!(store.to_string(), "graph api returned 409: Conflict");
    }
}
