//! User payloads from the auth service.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A platform account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Page of accounts from `GET auth/users`.
///
/// Unlike the stream listing this endpoint paginates by page number.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserPage {
    pub users: Vec<User>,
    pub total: u64,
    pub page: u64,
    pub limit: u64,
}
