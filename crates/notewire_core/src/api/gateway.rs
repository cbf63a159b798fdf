//! The single chokepoint for all network calls.
//!
//! # Responsibility
//! - Build authenticated JSON requests against the deployment base URL.
//! - Normalize every response into the uniform envelope.
//! - Handle session expiry (401/403) centrally, exactly once.
//!
//! # Invariants
//! - `Authorization` is attached only while the session holds a token.
//! - Caller-supplied headers override the defaults on key collision.
//! - A non-JSON body never propagates; it becomes a synthesized failure.
//! - The gateway emits the user notice for its own failure paths; callers
//!   only reset their loading state.

use crate::api::{ApiEnvelope, ApiError, ApiResult};
use crate::config::ApiConfig;
use crate::presenter::{NoticeLevel, Presenter};
use crate::repo::session_repo::SessionRepository;
use crate::session_store::SessionStore;
use log::{error, info, warn};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Method, Response, StatusCode};
use serde_json::Value;
use std::time::{Duration, Instant};
use uuid::Uuid;

/// Notice emitted once for any transport-level failure.
pub const NETWORK_ERROR_NOTICE: &str = "Network error. Please try again.";

/// Notice emitted once when the server rejects the session.
pub const SESSION_EXPIRED_NOTICE: &str = "Session expired. Please login again.";

/// Error text synthesized for responses that are not JSON.
const INVALID_RESPONSE_ERROR: &str = "Invalid response format";

/// One request through the gateway.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    method: Method,
    endpoint: String,
    body: Option<Value>,
    headers: HeaderMap,
}

impl ApiRequest {
    fn new(method: Method, endpoint: impl Into<String>) -> Self {
        Self {
            method,
            endpoint: endpoint.into(),
            body: None,
            headers: HeaderMap::new(),
        }
    }

    pub fn get(endpoint: impl Into<String>) -> Self {
        Self::new(Method::GET, endpoint)
    }

    pub fn post(endpoint: impl Into<String>, body: Value) -> Self {
        let mut request = Self::new(Method::POST, endpoint);
        request.body = Some(body);
        request
    }

    pub fn put(endpoint: impl Into<String>, body: Value) -> Self {
        let mut request = Self::new(Method::PUT, endpoint);
        request.body = Some(body);
        request
    }

    pub fn delete(endpoint: impl Into<String>) -> Self {
        Self::new(Method::DELETE, endpoint)
    }

    /// Adds a header that overrides the gateway defaults on collision.
    pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }
}

/// HTTP gateway bound to one deployment base URL.
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    /// Builds the gateway with the configured per-request timeout.
    pub fn new(config: &ApiConfig) -> ApiResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Dispatches one request and normalizes its outcome.
    ///
    /// Every auth/notes/reset operation goes through here, so expiry
    /// handling is applied in exactly one place:
    /// - 401/403 clears the session, routes to the login view, emits one
    ///   "session expired" notice and returns [`ApiError::Unauthorized`].
    /// - Any other transport failure is logged, emits one "network error"
    ///   notice and returns [`ApiError::Transport`].
    pub async fn call<R, P>(
        &self,
        session: &mut SessionStore<R>,
        presenter: &mut P,
        request: ApiRequest,
    ) -> ApiResult<ApiEnvelope>
    where
        R: SessionRepository,
        P: Presenter,
    {
        let request_id = Uuid::new_v4();
        let started_at = Instant::now();
        let url = format!("{}{}", self.base_url, request.endpoint);

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        if !session.token().is_empty() {
            let bearer = HeaderValue::from_str(&format!("Bearer {}", session.token()))
                .map_err(|err| ApiError::Request(format!("authorization header: {err}")))?;
            headers.insert(AUTHORIZATION, bearer);
        }
        for (name, value) in request.headers.iter() {
            headers.insert(name.clone(), value.clone());
        }

        let mut builder = self.http.request(request.method.clone(), url).headers(headers);
        if let Some(body) = &request.body {
            builder = builder.body(body.to_string());
        }

        let response = match builder.send().await {
            Ok(response) => response,
            Err(err) => {
                return Err(self.transport_failure(presenter, &request, request_id, started_at, err))
            }
        };

        let status = response.status();
        let envelope = if is_json_response(&response) {
            match response.json::<ApiEnvelope>().await {
                Ok(envelope) => envelope,
                Err(err) => {
                    return Err(self.transport_failure(
                        presenter, &request, request_id, started_at, err,
                    ))
                }
            }
        } else {
            ApiEnvelope::failure(INVALID_RESPONSE_ERROR)
        };

        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            if let Err(err) = session.clear_auth() {
                warn!(
                    "event=session_clear module=api status=error request_id={request_id} error={err}"
                );
            }
            presenter.show_login();
            presenter.notify(NoticeLevel::Error, SESSION_EXPIRED_NOTICE);
            info!(
                "event=api_call module=api status=unauthorized request_id={request_id} method={} endpoint={} http_status={} duration_ms={}",
                request.method,
                request.endpoint,
                status.as_u16(),
                started_at.elapsed().as_millis()
            );
            return Err(ApiError::Unauthorized);
        }

        info!(
            "event=api_call module=api status=ok request_id={request_id} method={} endpoint={} http_status={} duration_ms={}",
            request.method,
            request.endpoint,
            status.as_u16(),
            started_at.elapsed().as_millis()
        );

        Ok(envelope)
    }

    fn transport_failure<P: Presenter>(
        &self,
        presenter: &mut P,
        request: &ApiRequest,
        request_id: Uuid,
        started_at: Instant,
        err: reqwest::Error,
    ) -> ApiError {
        error!(
            "event=api_call module=api status=error request_id={request_id} method={} endpoint={} duration_ms={} error={err}",
            request.method,
            request.endpoint,
            started_at.elapsed().as_millis()
        );
        presenter.notify(NoticeLevel::Error, NETWORK_ERROR_NOTICE);
        ApiError::Transport(err)
    }
}

fn is_json_response(response: &Response) -> bool {
    response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.contains("application/json"))
}
