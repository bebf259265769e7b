//! # Spotify Integration Module
//!
//! Thin typed layer over the Spotify Web API endpoints the daemon consumes.
//! Each submodule covers one API domain:
//!
//! - [`auth`] - OAuth 2.0 PKCE flow (browser launch, local callback, token exchange)
//! - [`player`] - playback state, user profile, start-playback, shuffle toggle
//! - [`playlist`] - create/unfollow playlists, paged track listings, bulk add/remove
//! - [`context`] - track counts and random-offset track lookups for albums and playlists
//! - [`gateway`] - [`SpotifyGateway`], the [`crate::player::Gateway`] implementation
//!
//! All request functions build their URLs from [`crate::config`] getters,
//! authenticate with a bearer token per call, and decode responses into the
//! typed records in [`crate::types`]. Failures are classified into
//! [`ApiError`] variants so callers can tell a dead network from a provider
//! outage from a malformed body.

pub mod auth;
pub mod context;
pub mod gateway;
pub mod player;
pub mod playlist;

pub use gateway::SpotifyGateway;

use serde::de::DeserializeOwned;

use crate::types::ErrorEnvelope;

/// Classified failure of a Spotify Web API call.
#[derive(Debug)]
pub enum ApiError {
    /// Request construction or network failure.
    Transport(reqwest::Error),
    /// The response body could not be decoded into the expected record.
    Decode(String),
    /// Spotify returned a structured error envelope.
    Provider { status: u16, message: String },
    /// The call succeeded but yielded something the engine cannot work with.
    Logic(String),
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ApiError::Transport(e) => write!(f, "couldn't complete request: {}", e),
            ApiError::Decode(e) => write!(f, "couldn't decode response body: {}", e),
            ApiError::Provider { status, message } => {
                write!(f, "provider returned an error {}: {}", status, message)
            }
            ApiError::Logic(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for ApiError {}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        ApiError::Transport(err)
    }
}

impl ApiError {
    /// Whether the supervisory loop should back off and restart instead of
    /// giving up. Matches the provider statuses the original deployment kept
    /// running through: gateway errors, internal errors, and the stray 404
    /// Spotify serves while a context is being rebuilt.
    pub fn is_transient(&self) -> bool {
        match self {
            ApiError::Transport(_) => true,
            ApiError::Provider { status, .. } => matches!(status, 500 | 502 | 504 | 404),
            _ => false,
        }
    }
}

/// Decodes a response into `T`, classifying failures.
///
/// Non-2xx responses are decoded against Spotify's error envelope first; a
/// body that fits neither the envelope nor `T` becomes a decode error.
pub(crate) async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ApiError> {
    let status = response.status();
    let body = response.text().await?;

    if !status.is_success() {
        return Err(provider_error(status.as_u16(), &body));
    }

    serde_json::from_str::<T>(&body).map_err(|e| ApiError::Decode(e.to_string()))
}

/// Checks a response from an endpoint whose success body carries nothing we
/// need (playback transfer, shuffle toggle, unfollow).
pub(crate) async fn expect_success(response: reqwest::Response) -> Result<(), ApiError> {
    let status = response.status();
    if status.is_success() {
        return Ok(());
    }

    let body = response.text().await?;
    Err(provider_error(status.as_u16(), &body))
}

fn provider_error(status: u16, body: &str) -> ApiError {
    match serde_json::from_str::<ErrorEnvelope>(body) {
        Ok(envelope) => ApiError::Provider {
            status: envelope.error.status,
            message: envelope.error.message,
        },
        // no envelope; keep the status and whatever Spotify sent
        Err(_) => ApiError::Provider {
            status,
            message: body.trim().to_string(),
        },
    }
}
