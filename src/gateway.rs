//! Request gateway for authenticated API calls.
//!
//! Outbound, every request gets the current access token as
//! `Authorization: Bearer <token>` plus an `X-Request-Id` that stays the same
//! across the retry. Inbound, a `401` on a request that was not retried yet
//! marks it retried, refreshes the access token through the session manager
//! and resubmits the same request once. Any other failure, including a second
//! `401`, goes back to the caller unchanged.
//!
//! When the refresh fails the session manager has already logged out; the
//! gateway returns the original `401` error.

use crate::{
    api::{error_from_response, handle_json_response},
    error::Result,
    session::SessionManager,
};
use reqwest::{Method, Response, StatusCode};
use secrecy::SecretString;
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, instrument, warn};
use uuid::Uuid;

pub const REQUEST_ID_HEADER: &str = "X-Request-Id";

/// One logical API request. The retry flag is set before the single retry is
/// sent and is never cleared.
#[derive(Clone, Debug)]
pub struct ApiRequest {
    method: Method,
    path: String,
    body: Option<Value>,
    request_id: Uuid,
    retried: bool,
}

impl ApiRequest {
    #[must_use]
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            body: None,
            request_id: Uuid::new_v4(),
            retried: false,
        }
    }

    #[must_use]
    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    #[must_use]
    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    #[must_use]
    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::PUT, path)
    }

    /// # Errors
    /// Returns an error if the body cannot be encoded as JSON.
    pub fn json<B: Serialize + ?Sized>(mut self, body: &B) -> Result<Self> {
        self.body = Some(serde_json::to_value(body)?);
        Ok(self)
    }

    #[must_use]
    pub fn method(&self) -> &Method {
        &self.method
    }

    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    #[must_use]
    pub fn request_id(&self) -> Uuid {
        self.request_id
    }

    #[must_use]
    pub fn is_retried(&self) -> bool {
        self.retried
    }
}

#[derive(Clone, Debug)]
pub struct Gateway {
    session: Arc<SessionManager>,
}

impl Gateway {
    #[must_use]
    pub fn new(session: Arc<SessionManager>) -> Self {
        Self { session }
    }

    #[must_use]
    pub fn session(&self) -> &Arc<SessionManager> {
        &self.session
    }

    /// Sends the request and decodes the JSON answer.
    ///
    /// # Errors
    /// Returns the classified error of the final attempt or a decode error.
    pub async fn send_json<T: DeserializeOwned>(&self, request: ApiRequest) -> Result<T> {
        let response = self.execute(request).await?;
        handle_json_response(response).await
    }

    /// Sends the request, refreshing and retrying once on the first `401`.
    /// Only successful responses are returned.
    ///
    /// # Errors
    /// Returns a transport error, or the HTTP error of the final attempt.
    #[instrument(
        skip(self, request),
        fields(
            http.method = %request.method,
            path = %request.path,
            request_id = %request.request_id
        )
    )]
    pub async fn execute(&self, mut request: ApiRequest) -> Result<Response> {
        loop {
            let (token, generation) = self.session.credentials().await;
            let response = self.dispatch(&request, token.as_ref()).await?;

            if response.status() != StatusCode::UNAUTHORIZED || request.retried {
                return ensure_success(response).await;
            }

            request.retried = true;
            let unauthorized = error_from_response(response).await;

            if !self.session.refresh_after(generation).await {
                warn!("refresh failed, not retrying: {}", unauthorized);
                return Err(unauthorized);
            }

            debug!("retrying with refreshed access token");
        }
    }

    async fn dispatch(&self, request: &ApiRequest, token: Option<&SecretString>) -> Result<Response> {
        let mut builder = self
            .session
            .api()
            .request(request.method.clone(), &request.path, token)?
            .header(REQUEST_ID_HEADER, request.request_id.to_string());

        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        Ok(builder.send().await?)
    }
}

async fn ensure_success(response: Response) -> Result<Response> {
    if response.status().is_success() {
        Ok(response)
    } else {
        Err(error_from_response(response).await)
    }
}
