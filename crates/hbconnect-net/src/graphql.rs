//! Retrying GraphQL query client.
//!
//! Only transport failures are retried, with a fixed delay between attempts.
//! A response with a non-success status is returned as an error at once.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, warn};

use crate::error::{NetError, Result};
use crate::transport::{HttpRequest, HttpTransport};

/// Goldsky search gateway.
pub const GOLDSKY_GRAPHQL_URL: &str = "https://arweave-search.goldsky.com/graphql";
/// Arweave gateway.
pub const ARWEAVE_GRAPHQL_URL: &str = "https://arweave.net/graphql";

/// Configuration for [`GqlClient`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GqlConfig {
    /// Must look like `http(s)://host/graphql`.
    pub endpoint_url: String,
    /// Extra attempts after the first transport failure.
    pub retries: u32,
    /// Fixed delay between attempts, in milliseconds.
    pub retry_delay_ms: u64,
}

impl Default for GqlConfig {
    fn default() -> Self {
        Self {
            endpoint_url: GOLDSKY_GRAPHQL_URL.to_string(),
            retries: 0,
            retry_delay_ms: 10_000,
        }
    }
}

impl GqlConfig {
    pub fn with_endpoint(mut self, endpoint_url: impl Into<String>) -> Self {
        self.endpoint_url = endpoint_url.into();
        self
    }

    pub fn with_retries(mut self, retries: u32) -> Self {
        self.retries = retries;
        self
    }

    pub fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX);
        self
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }
}

/// True if `url` has the `http(s)://.../graphql` shape.
pub fn is_graphql_endpoint(url: &str) -> bool {
    let rest = url
        .strip_prefix("https://")
        .or_else(|| url.strip_prefix("http://"));
    matches!(rest, Some(rest) if rest.contains("/graphq"))
}

#[derive(Serialize)]
struct QueryBody<'a> {
    query: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    variables: Option<&'a Value>,
}

/// GraphQL client over an [`HttpTransport`].
#[derive(Debug, Clone)]
pub struct GqlClient<T> {
    transport: T,
    config: GqlConfig,
}

impl<T: HttpTransport> GqlClient<T> {
    /// Create a client. Fails at once if the endpoint is malformed.
    pub fn new(config: GqlConfig, transport: T) -> Result<Self> {
        if !is_graphql_endpoint(&config.endpoint_url) {
            return Err(NetError::InvalidEndpoint(format!(
                "string doesn't appear to be a URL of the form <http(s)://some-domain/graphql>. You entered \"{}\"",
                config.endpoint_url
            )));
        }
        Ok(Self { transport, config })
    }

    pub fn config(&self) -> &GqlConfig {
        &self.config
    }

    /// Run a query and return the response JSON verbatim.
    pub async fn run(&self, query: &str, variables: Option<&Value>) -> Result<Value> {
        let body = serde_json::to_vec(&QueryBody { query, variables })?;
        let request = HttpRequest::post(self.config.endpoint_url.as_str(), body)
            .header("Accept", "application/json")
            .header("Content-Type", "application/json");

        let response = self.execute_with_retry(request).await?;
        if !response.is_success() {
            return Err(NetError::Status {
                status: response.status,
                status_text: response.status_text,
            });
        }
        Ok(response.json()?)
    }

    async fn execute_with_retry(
        &self,
        request: HttpRequest,
    ) -> Result<crate::transport::HttpResponse> {
        let retries = self.config.retries;
        let delay = self.config.retry_delay();
        let mut tries = 0u32;

        loop {
            match self.transport.execute(request.clone()).await {
                Ok(response) => {
                    debug!(status = response.status, attempt = tries + 1, "graphql response");
                    return Ok(response);
                }
                Err(e) if tries < retries => {
                    tries += 1;
                    warn!(
                        error = %e,
                        "waiting {}ms before retrying {} of {}",
                        delay.as_millis(),
                        tries,
                        retries
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(e) => {
                    return Err(NetError::RetriesExhausted {
                        url: request.url,
                        retries,
                        source: e,
                    })
                }
            }
        }
    }
}
