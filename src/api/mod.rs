//! HTTP helpers shared by the session manager and the request gateway. They
//! own request setup (base URL, user agent, timeout) and turn responses into
//! typed values or classified [`Error`]s. The helpers never store tokens; the
//! caller passes the bearer token for each request.

pub mod types;

use crate::{
    config::ClientConfig,
    error::{Error, Result},
    APP_USER_AGENT,
};
use reqwest::{header::AUTHORIZATION, Client, Method, RequestBuilder, Response};
use secrecy::{ExposeSecret, SecretString};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use tracing::{debug, info_span, Instrument};

/// Maximum number of error body characters surfaced to callers.
const MAX_ERROR_CHARS: usize = 200;

#[derive(Clone, Debug)]
pub struct ApiClient {
    client: Client,
    config: ClientConfig,
}

impl ApiClient {
    /// # Errors
    /// Returns an error if the underlying HTTP client cannot be built.
    pub fn new(config: ClientConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(APP_USER_AGENT)
            .timeout(config.timeout)
            .build()?;

        Ok(Self { client, config })
    }

    #[must_use]
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Starts a request against an API path, attaching the bearer token when
    /// one is given.
    ///
    /// # Errors
    /// Returns an error if the endpoint URL cannot be built.
    pub fn request(
        &self,
        method: Method,
        path: &str,
        token: Option<&SecretString>,
    ) -> Result<RequestBuilder> {
        let url = self.config.endpoint_url(path)?;
        let builder = self.client.request(method, url);

        Ok(match token {
            Some(token) => builder.header(AUTHORIZATION, bearer(token)),
            None => builder,
        })
    }

    /// Posts a JSON body without credentials and parses the JSON answer.
    ///
    /// # Errors
    /// Returns an error on transport failure, a non-success status, or an
    /// undecodable body.
    pub async fn post_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T> {
        let span = info_span!("api.post", http.method = "POST", path = %path);
        let response = self
            .request(Method::POST, path, None)?
            .json(body)
            .send()
            .instrument(span)
            .await?;

        handle_json_response(response).await
    }

    /// Fetches JSON with a bearer token.
    ///
    /// # Errors
    /// Returns an error on transport failure, a non-success status, or an
    /// undecodable body.
    pub async fn get_json_with_token<T: DeserializeOwned>(
        &self,
        path: &str,
        token: &SecretString,
    ) -> Result<T> {
        let span = info_span!("api.get", http.method = "GET", path = %path);
        let response = self
            .request(Method::GET, path, Some(token))?
            .send()
            .instrument(span)
            .await?;

        handle_json_response(response).await
    }
}

/// Formats the `Authorization` header value.
#[must_use]
pub fn bearer(token: &SecretString) -> String {
    format!("Bearer {}", token.expose_secret())
}

/// Parses JSON responses and surfaces HTTP errors with sanitized bodies.
/// An empty success body decodes as JSON `null`.
///
/// # Errors
/// Returns a classified error for non-success statuses or undecodable bodies.
pub async fn handle_json_response<T: DeserializeOwned>(response: Response) -> Result<T> {
    if !response.status().is_success() {
        return Err(error_from_response(response).await);
    }

    let bytes = response.bytes().await?;
    if bytes.iter().all(u8::is_ascii_whitespace) {
        debug!("empty response body");
        return Ok(serde_json::from_value(Value::Null)?);
    }

    Ok(serde_json::from_slice(&bytes)?)
}

/// Builds the error for a non-success response, preferring the API's
/// `{"error": "..."}` message over the raw body.
pub async fn error_from_response(response: Response) -> Error {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();

    Error::from_status(status, error_message(&body))
}

fn error_message(body: &str) -> String {
    let from_json = serde_json::from_str::<Value>(body).ok().and_then(|json| {
        json.get("error")
            .or_else(|| json.get("message"))
            .and_then(Value::as_str)
            .map(str::to_string)
    });

    sanitize_body(&from_json.unwrap_or_else(|| body.to_string()))
}

/// Trims and truncates error bodies for user-facing messages.
fn sanitize_body(body: &str) -> String {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        "Request failed.".to_string()
    } else {
        trimmed.chars().take(MAX_ERROR_CHARS).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_message_prefers_api_error_field() {
        assert_eq!(error_message(r#"{"error":"invalid token"}"#), "invalid token");
        assert_eq!(error_message(r#"{"message":"gone"}"#), "gone");
    }

    #[test]
    fn error_message_falls_back_to_sanitized_body() {
        assert_eq!(error_message("   "), "Request failed.");
        assert_eq!(error_message(" plain text "), "plain text");

        let long = "x".repeat(500);
        assert_eq!(error_message(&long).len(), MAX_ERROR_CHARS);
    }

    #[test]
    fn bearer_formats_header() {
        let token = SecretString::from("abc".to_string());
        assert_eq!(bearer(&token), "Bearer abc");
    }
}
