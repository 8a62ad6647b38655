//! HTTP transport with failure classification.
//!
//! [`Dispatch`] is the seam between the resilience pipeline and the
//! network: one method per verb, JSON in, JSON out, every failure already
//! classified into the [`ServiceErrorKind`] taxonomy the retry executor
//! consumes. Tests substitute a scripted implementation; production uses
//! [`HttpTransport`] over reqwest.

use async_trait::async_trait;
use mentora_error::{HttpError, MentoraResult, ServiceError, ServiceErrorKind};
use serde_json::Value as JsonValue;
use std::time::Duration;
use tracing::{debug, error};

/// One classified HTTP exchange against a single backend.
#[async_trait]
pub trait Dispatch: Send + Sync {
    /// POST a JSON body to `path`, returning the decoded JSON reply.
    async fn post(&self, path: &str, body: &JsonValue) -> Result<JsonValue, ServiceError>;

    /// GET `path`, returning the decoded JSON reply.
    async fn get(&self, path: &str) -> Result<JsonValue, ServiceError>;
}

/// reqwest-backed transport for one backend base URL.
///
/// The timeout applies per attempt. Business transports get a generous
/// deadline so free-tier cold starts have a chance to finish; probe
/// transports get a short one so health checks stay snappy.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    base_url: String,
    timeout: Duration,
}

impl HttpTransport {
    /// Create a transport for `base_url` with a per-attempt timeout.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> MentoraResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .gzip(true)
            .build()
            .map_err(|e| HttpError::new(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            timeout,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Map a reqwest send failure onto the service taxonomy.
    fn classify_send_error(&self, err: reqwest::Error) -> ServiceError {
        let kind = if err.is_timeout() {
            ServiceErrorKind::Timeout {
                elapsed_ms: self.timeout.as_millis() as u64,
            }
        } else {
            ServiceErrorKind::Unreachable(err.to_string())
        };
        ServiceError::new(kind)
    }

    /// Map a non-2xx response onto the service taxonomy.
    async fn classify_status(response: reqwest::Response) -> ServiceError {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        let kind = if status.as_u16() == 429 {
            ServiceErrorKind::RateLimited(body)
        } else if status.is_server_error() {
            ServiceErrorKind::ServerError {
                status: status.as_u16(),
                message: body,
            }
        } else {
            ServiceErrorKind::ClientError {
                status: status.as_u16(),
                message: body,
            }
        };
        ServiceError::new(kind)
    }

    async fn decode(response: reqwest::Response) -> Result<JsonValue, ServiceError> {
        response.json().await.map_err(|e| {
            error!(error = %e, "Backend returned undecodable body");
            ServiceError::new(ServiceErrorKind::MalformedResponse(format!(
                "body is not valid JSON: {e}"
            )))
        })
    }
}

#[async_trait]
impl Dispatch for HttpTransport {
    async fn post(&self, path: &str, body: &JsonValue) -> Result<JsonValue, ServiceError> {
        let url = self.url(path);
        debug!(%url, "POST");

        let response = self
            .client
            .post(&url)
            .header("content-type", "application/json")
            .json(body)
            .send()
            .await
            .map_err(|e| self.classify_send_error(e))?;

        if !response.status().is_success() {
            return Err(Self::classify_status(response).await);
        }

        Self::decode(response).await
    }

    async fn get(&self, path: &str) -> Result<JsonValue, ServiceError> {
        let url = self.url(path);
        debug!(%url, "GET");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| self.classify_send_error(e))?;

        if !response.status().is_success() {
            return Err(Self::classify_status(response).await);
        }

        Self::decode(response).await
    }
}
