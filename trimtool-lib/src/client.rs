//! Main TrimtoolClient

use std::sync::Arc;
use std::time::Duration;

use reqwest::Client;
use reqwest::Method;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tokio_util::sync::CancellationToken;

use crate::api::QueryParams;
use crate::error::ApiError;

/// The client for the trim normalization backend.
///
/// Cheap to clone (uses `Arc` internally). Every call takes a
/// [`CancellationToken`]; when the token fires before the response arrives
/// the call resolves to [`ApiError::Cancelled`].
///
/// # Example
///
/// ```ignore
/// let client = TrimtoolClient::builder()
///     .url("http://localhost:8000")
///     .timeout(Duration::from_secs(30))
///     .build()?;
///
/// let stats = client.stats(&CancellationToken::new()).await?;
/// ```
#[derive(Clone)]
pub struct TrimtoolClient {
    inner: Arc<TrimtoolClientInner>,
}

struct TrimtoolClientInner {
    base_url: String,
    http_client: Client,
}

impl TrimtoolClient {
    /// Creates a new builder for constructing a client.
    pub fn builder() -> TrimtoolClientBuilder<Missing> {
        TrimtoolClientBuilder::new()
    }

    /// Returns the base URL of the backend.
    pub fn base_url(&self) -> &str {
        &self.inner.base_url
    }

    /// Sends a request and decodes the JSON response.
    ///
    /// `204 No Content` and empty bodies decode to `None`.
    pub(crate) async fn send<B, T>(
        &self,
        method: Method,
        path: &str,
        query: QueryParams,
        body: Option<&B>,
        cancel: &CancellationToken,
    ) -> Result<Option<T>, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        if cancel.is_cancelled() {
            return Err(ApiError::Cancelled);
        }

        let url = format!("{}{}{}", self.inner.base_url, path, query.to_query_string());
        log::debug!("{} {}", method, url);

        let mut request = self.inner.http_client.request(method, &url);
        if let Some(body) = body {
            request = request.json(body);
        }

        let text = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                log::debug!("cancelled {}", url);
                return Err(ApiError::Cancelled);
            }
            result = Self::dispatch(request) => result?,
        };

        match text {
            None => Ok(None),
            Some(body) => serde_json::from_str(&body)
                .map(Some)
                .map_err(|e| ApiError::parse_with_body(e.to_string(), body)),
        }
    }

    /// Like [`send`](Self::send), but a missing body is a parse error.
    pub(crate) async fn send_expecting<B, T>(
        &self,
        method: Method,
        path: &str,
        query: QueryParams,
        body: Option<&B>,
        cancel: &CancellationToken,
    ) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.send(method, path, query, body, cancel)
            .await?
            .ok_or_else(|| ApiError::Parse {
                message: format!("empty response from {}", path),
                body: None,
            })
    }

    async fn dispatch(request: reqwest::RequestBuilder) -> Result<Option<String>, ApiError> {
        let response = request.send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let err = ApiError::from_body(status.as_u16(), status.canonical_reason(), &body);
            log::warn!("request failed: {}", err);
            return Err(err);
        }

        if status == reqwest::StatusCode::NO_CONTENT {
            return Ok(None);
        }

        let body = response.text().await?;
        if body.trim().is_empty() {
            Ok(None)
        } else {
            Ok(Some(body))
        }
    }
}

impl std::fmt::Debug for TrimtoolClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TrimtoolClient")
            .field("base_url", &self.inner.base_url)
            .finish_non_exhaustive()
    }
}

// =============================================================================
// Typestate Builder
// =============================================================================

/// Marker type for missing required builder fields.
pub struct Missing;

/// Marker type for set builder fields.
pub struct Set<T>(T);

/// Builder for constructing a [`TrimtoolClient`].
///
/// The base URL is required; `build()` only exists once it has been set.
pub struct TrimtoolClientBuilder<Url> {
    url: Url,
    timeout: Option<Duration>,
    connect_timeout: Option<Duration>,
    http_client: Option<Client>,
}

impl TrimtoolClientBuilder<Missing> {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self {
            url: Missing,
            timeout: None,
            connect_timeout: None,
            http_client: None,
        }
    }

    /// Sets the backend base URL, e.g. `http://localhost:8000`.
    pub fn url(self, url: impl Into<String>) -> TrimtoolClientBuilder<Set<String>> {
        TrimtoolClientBuilder {
            url: Set(url.into()),
            timeout: self.timeout,
            connect_timeout: self.connect_timeout,
            http_client: self.http_client,
        }
    }
}

impl Default for TrimtoolClientBuilder<Missing> {
    fn default() -> Self {
        Self::new()
    }
}

impl<U> TrimtoolClientBuilder<U> {
    /// Sets the overall request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Sets the connection timeout.
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }

    /// Sets a custom HTTP client. Timeouts set on this builder are ignored.
    pub fn http_client(mut self, client: Client) -> Self {
        self.http_client = Some(client);
        self
    }
}

impl TrimtoolClientBuilder<Set<String>> {
    /// Builds the [`TrimtoolClient`].
    ///
    /// Fails with [`ApiError::InvalidUrl`] unless the URL is absolute
    /// `http` or `https`.
    pub fn build(self) -> Result<TrimtoolClient, ApiError> {
        let base_url = validate_base_url(&self.url.0)?;

        let http_client = match self.http_client {
            Some(client) => client,
            None => {
                let mut builder = Client::builder();
                if let Some(timeout) = self.timeout {
                    builder = builder.timeout(timeout);
                }
                if let Some(timeout) = self.connect_timeout {
                    builder = builder.connect_timeout(timeout);
                }
                builder.build()?
            }
        };

        Ok(TrimtoolClient {
            inner: Arc::new(TrimtoolClientInner {
                base_url,
                http_client,
            }),
        })
    }
}

/// Checks the scheme and strips trailing slashes.
pub fn validate_base_url(raw: &str) -> Result<String, ApiError> {
    let parsed = url::Url::parse(raw.trim()).map_err(|e| ApiError::InvalidUrl(format!("{}: {}", raw, e)))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(ApiError::InvalidUrl(format!(
            "{}: expected an http:// or https:// URL",
            raw
        )));
    }
    Ok(raw.trim().trim_end_matches('/').to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_base_url_strips_slash() {
        assert_eq!(
            validate_base_url("http://localhost:8000/").unwrap(),
            "http://localhost:8000"
        );
        assert_eq!(
            validate_base_url(" https://api.example.com/v1 ").unwrap(),
            "https://api.example.com/v1"
        );
    }

    #[test]
    fn test_validate_base_url_rejects_other_schemes() {
        assert!(matches!(
            validate_base_url("ftp://example.com"),
            Err(ApiError::InvalidUrl(_))
        ));
        assert!(matches!(
            validate_base_url("localhost:8000"),
            Err(ApiError::InvalidUrl(_))
        ));
        assert!(validate_base_url("").is_err());
    }
}
