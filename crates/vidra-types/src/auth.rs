//! Authentication request/response payloads.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Credentials sent to `POST auth/login`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Token payload returned by `POST auth/login` and `POST auth/refresh`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenResponse {
    /// Short-lived bearer token.
    pub access_token: String,
    /// Lifetime of the token in seconds.
    pub expires_in: u64,
    /// Always "Bearer".
    pub token_type: String,
}

/// Generic acknowledgement (logout and similar endpoints).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AckResponse {
    pub message: String,
    pub generated_at: DateTime<Utc>,
}
