//! REST implementation of the operations client.
//!
//! Wraps the provider's long-running-operations HTTP API using
//! [`reqwest`].

use async_trait::async_trait;

use crate::operations::{
    OperationClient, OperationHandle, OperationStatus, ProviderError, StartRequest,
};

/// HTTP client for the provider's operations API.
pub struct RestOperationClient {
    client: reqwest::Client,
    base_url: String,
}

impl RestOperationClient {
    /// Create a new client.
    ///
    /// * `base_url` - Base HTTP URL, e.g. `https://generation.internal`.
    pub fn new(base_url: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url,
        }
    }

    /// Create a client reusing an existing [`reqwest::Client`] (useful
    /// for connection pooling).
    pub fn with_client(client: reqwest::Client, base_url: String) -> Self {
        Self { client, base_url }
    }

    // ---- private helpers ----

    /// Ensure the response has a success status code. Returns the
    /// response unchanged on success, or a [`ProviderError::Api`]
    /// containing the status and body text on failure.
    async fn ensure_success(
        response: reqwest::Response,
    ) -> Result<reqwest::Response, ProviderError> {
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(ProviderError::Api {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }

    /// Parse a successful JSON response body into the expected type.
    async fn parse_response<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, ProviderError> {
        let response = Self::ensure_success(response).await?;
        Ok(response.json::<T>().await?)
    }

    /// Assert the response has a success status code, discarding the body.
    async fn check_status(response: reqwest::Response) -> Result<(), ProviderError> {
        Self::ensure_success(response).await?;
        Ok(())
    }
}

#[async_trait]
impl OperationClient for RestOperationClient {
    /// `POST /v1/operations` with the generation parameters. Returns the
    /// server-assigned operation handle.
    async fn start(&self, request: &StartRequest) -> Result<OperationHandle, ProviderError> {
        let response = self
            .client
            .post(format!("{}/v1/operations", self.base_url))
            .json(request)
            .send()
            .await?;

        Self::parse_response(response).await
    }

    /// `GET /v1/operations/{name}`.
    async fn poll(&self, handle: &OperationHandle) -> Result<OperationStatus, ProviderError> {
        let response = self
            .client
            .get(format!("{}/v1/{}", self.base_url, handle.name))
            .send()
            .await?;

        Self::parse_response(response).await
    }

    /// `POST /v1/operations/{name}:cancel`.
    async fn cancel(&self, handle: &OperationHandle) -> Result<(), ProviderError> {
        let response = self
            .client
            .post(format!("{}/v1/{}:cancel", self.base_url, handle.name))
            .send()
            .await?;

        Self::check_status(response).await
    }
}
