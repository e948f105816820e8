//! Reauthentication interceptor: refresh-and-replay on 401.
//!
//! Modeled as an explicit state machine over a single request attempt:
//!
//! ```text
//! Initial --ok/other-error--> Done
//! Initial --401-------------> Refreshing
//! Refreshing --refresh ok---> Retrying   (new token stored)
//! Refreshing --refresh err--> Done       (session cleared, original 401)
//! Retrying --any outcome----> Done       (a second 401 surfaces, no loop)
//! ```
//!
//! The retry budget is exactly one refresh per failing request. Every
//! authenticated endpoint goes through [`send_with_reauth`]; none of them
//! carry their own retry code.

use reqwest::Response;
use tracing::debug;
use vidra_types::TokenResponse;

use crate::error::{ApiError, ApiResult};
use crate::transport::{RequestDescriptor, Transport};

/// Path of the refresh endpoint. No bearer is required; the ambient
/// credential travels in the cookie jar.
const REFRESH_PATH: &str = "auth/refresh";

/// Phase of one request attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReauthPhase {
    /// About to execute the original request.
    Initial,
    /// Original request got a 401; a refresh call is in flight.
    Refreshing,
    /// Refresh succeeded; replaying the original request once.
    Retrying,
    /// Terminal.
    Done,
}

/// Observable outcomes that drive the state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReauthEvent {
    /// The in-flight request settled with a non-401 outcome.
    Settled,
    /// The in-flight request failed with 401.
    Unauthorized,
    RefreshSucceeded,
    RefreshFailed,
}

impl ReauthPhase {
    /// Total transition function. Unexpected pairs terminate; there is no
    /// path that issues a second refresh for the same request.
    pub fn next(self, event: ReauthEvent) -> ReauthPhase {
        match (self, event) {
            (ReauthPhase::Initial, ReauthEvent::Unauthorized) => ReauthPhase::Refreshing,
            (ReauthPhase::Refreshing, ReauthEvent::RefreshSucceeded) => ReauthPhase::Retrying,
            _ => ReauthPhase::Done,
        }
    }
}

/// Sends a request with transparent reauthentication.
///
/// On a 401, issues one `POST auth/refresh`; if it yields a new token the
/// session is updated and the original request is replayed exactly once.
/// If the refresh fails the session is cleared and the **original** 401 is
/// returned. The refresh always settles before the replay starts.
pub async fn send_with_reauth(
    transport: &Transport,
    descriptor: &RequestDescriptor,
) -> ApiResult<Response> {
    let mut phase = ReauthPhase::Initial;
    let mut original_failure: Option<ApiError> = None;

    loop {
        match phase {
            ReauthPhase::Initial => match transport.send(descriptor).await {
                Ok(response) => return Ok(response),
                Err(err) if err.is_unauthorized() => {
                    debug!(path = %descriptor.path, "401 received, attempting token refresh");
                    original_failure = Some(err);
                    phase = phase.next(ReauthEvent::Unauthorized);
                }
                Err(err) => return Err(err),
            },
            ReauthPhase::Refreshing => match refresh(transport).await {
                Ok(token) => {
                    transport.session().token_received(&token);
                    phase = phase.next(ReauthEvent::RefreshSucceeded);
                }
                Err(refresh_err) => {
                    debug!(error = %refresh_err, "token refresh failed, clearing session");
                    transport.session().clear();
                    return match original_failure.take() {
                        Some(original) => Err(original),
                        None => Err(refresh_err),
                    };
                }
            },
            // The replay's outcome is terminal either way; a second 401 is
            // surfaced to the caller rather than retried.
            ReauthPhase::Retrying => return transport.send(descriptor).await,
            ReauthPhase::Done => {
                return Err(ApiError::transport("reauth flow terminated without a result"));
            }
        }
    }
}

/// Issues the dedicated refresh call, bypassing the interceptor so a 401
/// from the refresh endpoint cannot recurse.
async fn refresh(transport: &Transport) -> ApiResult<TokenResponse> {
    let response = transport.send(&RequestDescriptor::post(REFRESH_PATH)).await?;
    response
        .json::<TokenResponse>()
        .await
        .map_err(|e| ApiError::decode(format!("failed to decode refresh response: {e}")))
}
