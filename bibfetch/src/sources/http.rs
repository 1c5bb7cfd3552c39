//! Shared HTTP plumbing for source adapters

use crate::types::{FetchOptions, SourceError};
use bibfetch_common::{Error, Result};
use reqwest::{header, Client, Response, StatusCode};
use tracing::debug;

/// User-Agent header sent when no override is configured
pub const DEFAULT_USER_AGENT: &str = concat!("bibfetch/", env!("CARGO_PKG_VERSION"));

/// Build the HTTP client shared by all adapters
///
/// Timeouts are not set here; each request applies the deadline from its
/// [`FetchOptions`].
pub fn build_http_client(user_agent: Option<&str>) -> Result<Client> {
    let user_agent = user_agent.unwrap_or(DEFAULT_USER_AGENT);
    let mut headers = header::HeaderMap::new();
    headers.insert(
        header::USER_AGENT,
        header::HeaderValue::from_str(user_agent)
            .map_err(|e| Error::Config(format!("Invalid user agent {:?}: {}", user_agent, e)))?,
    );

    Client::builder()
        .default_headers(headers)
        .build()
        .map_err(|e| Error::Internal(format!("Failed to create HTTP client: {}", e)))
}

/// Issue a GET request with per-call options and classify the status
///
/// 404 maps to `SourceError::NotFound`, any other non-success status to
/// `SourceError::Transport`.
pub(crate) async fn get(
    client: &Client,
    url: &str,
    options: &FetchOptions,
) -> std::result::Result<Response, SourceError> {
    let mut request = client.get(url);
    if let Some(timeout) = options.timeout {
        request = request.timeout(timeout);
    }
    if let Some(ref user_agent) = options.user_agent {
        request = request.header(header::USER_AGENT, user_agent.as_str());
    }

    debug!(url = %url, "GET");
    let response = request
        .send()
        .await
        .map_err(|e| SourceError::Transport(format!("request to {} failed: {}", url, e)))?;

    let status = response.status();
    if status == StatusCode::NOT_FOUND {
        return Err(SourceError::NotFound(url.to_string()));
    }
    if !status.is_success() {
        return Err(SourceError::Transport(format!("{} returned {}", url, status)));
    }

    Ok(response)
}

/// GET a URL and return the body as text
pub(crate) async fn get_text(
    client: &Client,
    url: &str,
    options: &FetchOptions,
) -> std::result::Result<String, SourceError> {
    let response = get(client, url, options).await?;
    Ok(response.text().await?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_client_with_default_agent() {
        assert!(build_http_client(None).is_ok());
        assert!(DEFAULT_USER_AGENT.starts_with("bibfetch/"));
    }

    #[test]
    fn test_build_client_rejects_invalid_agent() {
        let result = build_http_client(Some("bad\nagent"));
        assert!(matches!(result, Err(Error::Config(_))));
    }
}
