//! Conditional access policy CRUD over the Graph API.

use async_trait::async_trait;
use capsync_core::{PolicyDefinition, PolicyStore, RemotePolicy, StoreError};
use serde::Deserialize;
use tracing::debug;

use crate::{AccessToken, DEFAULT_REQUEST_TIMEOUT, GraphError, GraphResult};

/// Default Graph API base URL, versioned.
pub const DEFAULT_GRAPH_URL: &str = "https://graph.microsoft.com/v1.0";

const POLICIES_PATH: &str = "/identity/conditionalAccess/policies";

/// One page of a policy listing.
#[derive(Debug, Deserialize)]
struct PolicyPage {
    value: Vec<RemotePolicy>,
    #[serde(rename = "@odata.nextLink")]
    next_link: Option<String>,
}

/// Error body Graph returns on a failed call.
#[derive(Debug, Deserialize)]
struct GraphErrorBody {
    error: GraphErrorDetail,
}

#[derive(Debug, Deserialize)]
struct GraphErrorDetail {
    code: String,
    message: String,
}

/// Client for the conditional access policy collection.
pub struct GraphClient {
    http: reqwest::Client,
    base_url: String,
    token: AccessToken,
}

impl GraphClient {
    /// Create a client against the default Graph endpoint.
    ///
    /// # Errors
    /// Returns [`GraphError::Http`] if the HTTP client cannot be built.
    pub fn new(token: AccessToken) -> GraphResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(DEFAULT_REQUEST_TIMEOUT)
            .build()?;
        Ok(Self {
            http,
            base_url: DEFAULT_GRAPH_URL.to_string(),
            token,
        })
    }

    /// Override the Graph base URL (used by tests).
    #[must_use]
    pub fn with_base_url(mut self, url: &str) -> Self {
        self.base_url = url.trim_end_matches('/').to_string();
        self
    }

    /// List every conditional access policy, following pagination until the
    /// collection is exhausted. No name filtering happens here.
    ///
    /// # Errors
    /// Returns [`GraphError::Api`] on a non-success status or
    /// [`GraphError::Http`] on transport failure.
    pub async fn list_policies(&self) -> GraphResult<Vec<RemotePolicy>> {
        let mut policies = Vec::new();
        let mut url = format!("{}{POLICIES_PATH}", self.base_url);

        loop {
            let response = self
                .http
                .get(&url)
                .header("Authorization", self.token.authorization_header())
                .send()
                .await?;
            let response = Self::check(response).await?;
            let page: PolicyPage = response.json().await?;

            policies.extend(page.value);
            match page.next_link {
                Some(next) => url = next,
                None => break,
            }
        }

        debug!(count = policies.len(), "listed remote policies");
        Ok(policies)
    }

    /// Create a policy from a definition.
    ///
    /// The request body is the definition's restricted payload shape; the
    /// service assigns the id, returned in the created object.
    ///
    /// # Errors
    /// Returns [`GraphError::Api`] on a non-success status or
    /// [`GraphError::Http`] on transport failure.
    pub async fn create_policy(
        &self,
        definition: &PolicyDefinition,
    ) -> GraphResult<RemotePolicy> {
        let url = format!("{}{POLICIES_PATH}", self.base_url);
        let response = self
            .http
            .post(&url)
            .header("Authorization", self.token.authorization_header())
            .json(definition)
            .send()
            .await?;
        let response = Self::check(response).await?;
        Ok(response.json().await?)
    }

    /// Overwrite an existing policy by id with a definition.
    ///
    /// # Errors
    /// Returns [`GraphError::Api`] on a non-success status or
    /// [`GraphError::Http`] on transport failure.
    pub async fn update_policy(
        &self,
        id: &str,
        definition: &PolicyDefinition,
    ) -> GraphResult<()> {
        let url = format!("{}{POLICIES_PATH}/{id}", self.base_url);
        let response = self
            .http
            .patch(&url)
            .header("Authorization", self.token.authorization_header())
            .json(definition)
            .send()
            .await?;
        Self::check(response).await?;
        Ok(())
    }

    /// Delete a policy by id.
    ///
    /// # Errors
    /// Returns [`GraphError::Api`] on a non-success status or
    /// [`GraphError::Http`] on transport failure.
    pub async fn delete_policy(&self, id: &str) -> GraphResult<()> {
        let url = format!("{}{POLICIES_PATH}/{id}", self.base_url);
        let response = self
            .http
            .delete(&url)
            .header("Authorization", self.token.authorization_header())
            .send()
            .await?;
        Self::check(response).await?;
        Ok(())
    }

    /// Map a non-success response to [`GraphError::Api`], decoding the Graph
    /// error body for detail when one is present.
    async fn check(response: reqwest::Response) -> GraphResult<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let detail = match response.json::<GraphErrorBody>().await {
            Ok(body) => format!("{}: {}", body.error.code, body.error.message),
            Err(_) => status
                .canonical_reason()
                .unwrap_or("unrecognized error body")
                .to_string(),
        };
        Err(GraphError::Api {
            status: status.as_u16(),
            detail,
        })
    }
}

#[async_trait]
impl PolicyStore for GraphClient {
    async fn create(&self, definition: &PolicyDefinition) -> Result<(), StoreError> {
        self.create_policy(definition).await?;
        Ok(())
    }

    async fn update(&self, id: &str, definition: &PolicyDefinition) -> Result<(), StoreError> {
        self.update_policy(id, definition).await?;
        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<(), StoreError> {
        self.delete_policy(id).await?;
        Ok(())
    }
}
