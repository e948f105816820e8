//! Authenticated request executor.
//!
//! [`Transport`] owns the `reqwest::Client` and the base URL, reads the
//! bearer token from the [`SessionStore`] at send time, and classifies
//! responses into success or a structured [`ApiError`]. It knows nothing
//! about refresh; that lives in [`crate::reauth`].

use std::time::Duration;

use reqwest::{Method, Response};
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::config::Config;
use crate::error::{ApiError, ApiResult};
use crate::session::SessionStore;

/// Body of a request descriptor.
///
/// Multipart parts are rebuilt from the stored bytes on every send so a
/// descriptor can be replayed after a token refresh.
#[derive(Debug, Clone)]
pub enum RequestBody {
    Empty,
    Json(Value),
    /// Single-file multipart form (the `video` upload).
    Multipart {
        field: String,
        file_name: String,
        mime: String,
        bytes: Vec<u8>,
    },
}

/// A replayable description of one HTTP request.
#[derive(Debug, Clone)]
pub struct RequestDescriptor {
    pub method: Method,
    /// Path relative to the base URL, e.g. `stream/abc123`.
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: RequestBody,
}

impl RequestDescriptor {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            body: RequestBody::Empty,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn patch(path: impl Into<String>) -> Self {
        Self::new(Method::PATCH, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    pub fn with_query(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.query.push((key.into(), value.to_string()));
        self
    }

    /// Attaches a JSON body.
    ///
    /// # Errors
    /// Returns an error if the payload fails to serialize.
    pub fn with_json<T: Serialize>(mut self, payload: &T) -> ApiResult<Self> {
        let value = serde_json::to_value(payload)
            .map_err(|e| ApiError::decode(format!("failed to serialize request body: {e}")))?;
        self.body = RequestBody::Json(value);
        Ok(self)
    }

    /// Attaches a single-file multipart body.
    pub fn with_file(
        mut self,
        field: impl Into<String>,
        file_name: impl Into<String>,
        mime: impl Into<String>,
        bytes: Vec<u8>,
    ) -> Self {
        self.body = RequestBody::Multipart {
            field: field.into(),
            file_name: file_name.into(),
            mime: mime.into(),
            bytes,
        };
        self
    }
}

/// Authenticated request executor.
///
/// Cheap to clone; clones share the connection pool and cookie jar. The
/// cookie jar matters: the refresh endpoint's ambient credential is an
/// HTTP-only cookie set at login.
#[derive(Debug, Clone)]
pub struct Transport {
    http: reqwest::Client,
    base_url: String,
    session: SessionStore,
}

impl Transport {
    /// Builds a transport from config and a session store.
    ///
    /// # Errors
    /// Returns an error if the underlying HTTP client cannot be built.
    pub fn new(config: &Config, session: SessionStore) -> ApiResult<Self> {
        let mut builder = reqwest::Client::builder()
            .user_agent(crate::USER_AGENT)
            .cookie_store(true);

        if config.request_timeout_secs > 0 {
            builder = builder.timeout(Duration::from_secs(u64::from(config.request_timeout_secs)));
        }

        let http = builder
            .build()
            .map_err(|e| ApiError::transport(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            http,
            base_url: config.base_url_normalized(),
            session,
        })
    }

    /// The session store this transport reads tokens from.
    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    /// Sends one request, attaching `Authorization: Bearer <token>` when a
    /// token is present. Non-success statuses become [`ApiError`] with the
    /// response body parsed for details.
    pub async fn send(&self, descriptor: &RequestDescriptor) -> ApiResult<Response> {
        let url = format!("{}{}", self.base_url, descriptor.path);
        let mut request = self.http.request(descriptor.method.clone(), &url);

        if !descriptor.query.is_empty() {
            request = request.query(&descriptor.query);
        }

        if let Some(token) = self.session.token() {
            request = request.bearer_auth(token);
        }

        request = match &descriptor.body {
            RequestBody::Empty => request,
            RequestBody::Json(value) => request.json(value),
            RequestBody::Multipart {
                field,
                file_name,
                mime,
                bytes,
            } => {
                let part = reqwest::multipart::Part::bytes(bytes.clone())
                    .file_name(file_name.clone())
                    .mime_str(mime)
                    .map_err(|e| ApiError::decode(format!("invalid MIME type '{mime}': {e}")))?;
                let form = reqwest::multipart::Form::new().part(field.clone(), part);
                request.multipart(form)
            }
        };

        debug!(method = %descriptor.method, path = %descriptor.path, "sending request");

        let response = request.send().await.map_err(ApiError::from)?;
        let status = response.status();

        if status.is_success() {
            return Ok(response);
        }

        let body_text = response.text().await.unwrap_or_default();
        debug!(%status, path = %descriptor.path, "request failed");
        Err(ApiError::http_status(status.as_u16(), &body_text))
    }
}

#[cfg(test)]
mod tests {
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn transport_for(server: &MockServer, session: SessionStore) -> Transport {
        let config = Config {
            base_url: server.uri(),
            ..Config::default()
        };
        Transport::new(&config, session).unwrap()
    }

    /// Test: the bearer header is attached when a token is present.
    #[tokio::test]
    async fn test_bearer_header_attached_when_logged_in() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/stream/abc"))
            .and(header("authorization", "Bearer tok-1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
            .expect(1)
            .mount(&server)
            .await;

        let transport = transport_for(&server, SessionStore::with_token("tok-1"));
        let response = transport.send(&RequestDescriptor::get("stream/abc")).await;
        assert!(response.is_ok());
    }

    /// Test: without a token the request goes out unauthenticated.
    #[tokio::test]
    async fn test_no_bearer_header_when_logged_out() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/stream"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
            .mount(&server)
            .await;

        let transport = transport_for(&server, SessionStore::new());
        let response = transport.send(&RequestDescriptor::get("stream")).await.unwrap();

        // wiremock would have matched either way; assert on what was received.
        let requests = server.received_requests().await.unwrap();
        assert!(!requests[0].headers.contains_key("authorization"));
        assert_eq!(response.status(), 200);
    }

    /// Test: query pairs land on the wire.
    #[tokio::test]
    async fn test_query_parameters() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/stream"))
            .and(query_param("limit", "9"))
            .and(query_param("offset", "18"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
            .expect(1)
            .mount(&server)
            .await;

        let transport = transport_for(&server, SessionStore::new());
        let descriptor = RequestDescriptor::get("stream")
            .with_query("limit", 9)
            .with_query("offset", 18);
        transport.send(&descriptor).await.unwrap();
    }

    /// Test: error statuses become structured failures with the body kept.
    #[tokio::test]
    async fn test_error_status_classified() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/stream/private"))
            .respond_with(
                ResponseTemplate::new(403)
                    .set_body_json(serde_json::json!({"message": "not the owner"})),
            )
            .mount(&server)
            .await;

        let transport = transport_for(&server, SessionStore::new());
        let err = transport
            .send(&RequestDescriptor::get("stream/private"))
            .await
            .unwrap_err();
        assert!(err.is_access_denied());
        assert_eq!(err.message, "HTTP 403: not the owner");
    }
}
