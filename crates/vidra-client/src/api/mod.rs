//! Typed endpoint wrappers over the transport/reauth/cache stack.

mod auth;
mod streams;

use serde::de::DeserializeOwned;

use crate::cache::TagCache;
use crate::config::Config;
use crate::error::{ApiError, ApiResult};
use crate::reauth;
use crate::session::SessionStore;
use crate::transport::{RequestDescriptor, Transport};

/// Client for the vidra platform API.
///
/// Owns the transport, the session store and the tagged cache. All
/// authenticated endpoints run through the reauthentication interceptor;
/// presentation code only calls the typed methods and reads the session.
#[derive(Debug, Clone)]
pub struct ApiClient {
    transport: Transport,
    cache: TagCache,
    session: SessionStore,
}

impl ApiClient {
    /// Builds a client from config and a (possibly restored) session.
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn new(config: &Config, session: SessionStore) -> ApiResult<Self> {
        let transport = Transport::new(config, session.clone())?;
        Ok(Self {
            transport,
            cache: TagCache::new(),
            session,
        })
    }

    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    pub fn cache(&self) -> &TagCache {
        &self.cache
    }

    /// Sends through the reauthentication interceptor.
    pub(crate) async fn send(&self, descriptor: &RequestDescriptor) -> ApiResult<reqwest::Response> {
        reauth::send_with_reauth(&self.transport, descriptor).await
    }

    /// Sends directly, bypassing reauthentication. Only the auth endpoints
    /// themselves use this.
    pub(crate) async fn send_plain(
        &self,
        descriptor: &RequestDescriptor,
    ) -> ApiResult<reqwest::Response> {
        self.transport.send(descriptor).await
    }

    /// Sends through reauth and decodes the JSON body.
    pub(crate) async fn send_json<T: DeserializeOwned>(
        &self,
        descriptor: &RequestDescriptor,
    ) -> ApiResult<T> {
        let response = self.send(descriptor).await?;
        response
            .json::<T>()
            .await
            .map_err(|e| ApiError::decode(format!("failed to decode response body: {e}")))
    }
}
