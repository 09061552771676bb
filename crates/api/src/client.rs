//! Shared HTTP client construction and response handling.

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};

use crate::error::{ApiError, ErrorBody};

/// Timeout for a single request to any endpoint.
pub(crate) const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Build a client carrying the `Authorization: APIKey <token>` header
/// on every request.
///
/// The same client can be shared by all endpoint wrappers for
/// connection pooling.
pub fn build_http_client(api_key: &str) -> Result<reqwest::Client, ApiError> {
    let mut headers = HeaderMap::new();
    let value = HeaderValue::from_str(&format!("APIKey {api_key}"))
        .map_err(|_| ApiError::InvalidApiKey)?;
    headers.insert(AUTHORIZATION, value);

    Ok(reqwest::Client::builder()
        .default_headers(headers)
        .timeout(REQUEST_TIMEOUT)
        .build()?)
}

/// Ensure the response has a success status code. Returns the response
/// unchanged on success; otherwise reads the body and produces an
/// [`ApiError::Status`] with the parsed error fields.
pub(crate) async fn ensure_success(
    response: reqwest::Response,
) -> Result<reqwest::Response, ApiError> {
    let status = response.status();
    if !status.is_success() {
        let raw = response
            .text()
            .await
            .unwrap_or_else(|_| "<unreadable body>".to_string());
        return Err(ApiError::Status {
            status: status.as_u16(),
            body: ErrorBody::parse(raw),
        });
    }
    Ok(response)
}

/// Parse a successful JSON response body into the expected type.
pub(crate) async fn parse_json<T: serde::de::DeserializeOwned>(
    response: reqwest::Response,
) -> Result<T, ApiError> {
    let response = ensure_success(response).await?;
    Ok(response.json::<T>().await?)
}

/// Assert the response has a success status code, discarding the body.
pub(crate) async fn check_status(response: reqwest::Response) -> Result<(), ApiError> {
    ensure_success(response).await?;
    Ok(())
}

/// Normalize a base URL: no trailing slash, so endpoint paths can be
/// appended uniformly.
pub(crate) fn trim_base_url(base_url: &str) -> String {
    base_url.trim_end_matches('/').to_string()
}
