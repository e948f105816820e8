//! Client library for the vidra streaming platform.
//!
//! The interesting machinery lives in four places: [`session`] (the shared
//! token store), [`transport`] (the authenticated request executor),
//! [`reauth`] (the refresh-and-replay interceptor) and [`cache`] (tag-based
//! invalidation for cached query results). [`api`] wires them into typed
//! endpoint calls.

pub mod api;
pub mod cache;
pub mod config;
pub mod download;
pub mod error;
pub mod pagination;
pub mod reauth;
pub mod session;
pub mod transport;

pub use api::ApiClient;
pub use config::Config;
pub use error::{ApiError, ApiErrorKind, ApiResult};
pub use session::{SessionState, SessionStore};

/// Standard User-Agent header for vidra API requests.
pub const USER_AGENT: &str = concat!("vidra/", env!("CARGO_PKG_VERSION"));
