//! Wire types for the vidra streaming platform API.
//!
//! Payload shapes mirror the server's JSON exactly; everything here is
//! plain data with no behavior beyond small accessors.

pub mod auth;
pub mod stream;
pub mod user;

pub use auth::{AckResponse, LoginRequest, TokenResponse};
pub use stream::{
    CreateStreamRequest, ListParams, Stream, StreamPage, StreamStatus, UpdateStreamRequest,
    Visibility,
};
pub use user::{User, UserPage};
