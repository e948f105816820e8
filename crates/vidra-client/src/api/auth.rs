//! Auth endpoints: login, logout, user listing.
//!
//! Login and logout deliberately bypass the reauthentication interceptor;
//! refreshing in reaction to a failed login would loop for nothing.

use tracing::info;
use vidra_types::{AckResponse, LoginRequest, TokenResponse, UserPage};

use super::ApiClient;
use crate::error::{ApiError, ApiResult};
use crate::transport::RequestDescriptor;

impl ApiClient {
    /// `POST auth/login`. On success the session store receives the token;
    /// the server also sets the refresh cookie on the shared jar.
    pub async fn login(&self, credentials: &LoginRequest) -> ApiResult<TokenResponse> {
        let descriptor = RequestDescriptor::post("auth/login").with_json(credentials)?;
        let response = self.send_plain(&descriptor).await?;
        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| ApiError::decode(format!("failed to decode login response: {e}")))?;

        self.session().token_received(&token);
        info!("logged in");
        Ok(token)
    }

    /// `POST auth/logout`. Clears the session and the cache regardless of
    /// already-cached data; the server invalidates the refresh cookie.
    pub async fn logout(&self) -> ApiResult<AckResponse> {
        let descriptor = RequestDescriptor::post("auth/logout");
        let response = self.send_plain(&descriptor).await?;
        let ack: AckResponse = response
            .json()
            .await
            .map_err(|e| ApiError::decode(format!("failed to decode logout response: {e}")))?;

        self.session().clear();
        self.cache().clear();
        info!("logged out");
        Ok(ack)
    }

    /// `GET auth/users`. Bearer-protected; served fresh on every call.
    pub async fn list_users(&self) -> ApiResult<UserPage> {
        self.send_json(&RequestDescriptor::get("auth/users")).await
    }
}
