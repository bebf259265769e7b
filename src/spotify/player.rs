use reqwest::{Client, StatusCode};

use crate::{
    config,
    spotify::{ApiError, decode, expect_success},
    types::{PlaybackOffset, PlaybackState, StartPlaybackRequest, UserProfile},
};

/// Retrieves the current playback state of the authenticated user.
///
/// Returns `Ok(None)` when Spotify answers `204 No Content`, which it does
/// whenever nothing is playing on any device. The polling loop treats that
/// as "nothing to do" rather than an error.
pub async fn get_playback_state(token: &str) -> Result<Option<PlaybackState>, ApiError> {
    let client = Client::new();
    let api_url = format!("{uri}/me/player", uri = &config::spotify_apiurl());

    let response = client.get(&api_url).bearer_auth(token).send().await?;

    if response.status() == StatusCode::NO_CONTENT {
        return Ok(None);
    }

    let state = decode::<PlaybackState>(response).await?;
    Ok(Some(state))
}

/// Retrieves the authenticated user's profile (id and market country).
///
/// Requires the `user-read-private` scope, without which Spotify omits the
/// `country` field and this call fails with a decode error.
pub async fn get_profile(token: &str) -> Result<UserProfile, ApiError> {
    let client = Client::new();
    let api_url = format!("{uri}/me", uri = &config::spotify_apiurl());

    let response = client.get(&api_url).bearer_auth(token).send().await?;
    decode::<UserProfile>(response).await
}

/// Starts playback on the given context at a track offset.
pub async fn start_playback(
    token: &str,
    context_uri: &str,
    position: u32,
) -> Result<(), ApiError> {
    let client = Client::new();
    let api_url = format!("{uri}/me/player/play", uri = &config::spotify_apiurl());

    let body = StartPlaybackRequest {
        context_uri: context_uri.to_string(),
        offset: PlaybackOffset { position },
    };

    let response = client
        .put(&api_url)
        .bearer_auth(token)
        .json(&body)
        .send()
        .await?;
    expect_success(response).await
}

/// Toggles the player's native shuffle flag.
///
/// The managed playlist must play in the exact order its tracks were chosen,
/// so the engine turns native shuffle off right after switching onto it.
pub async fn set_shuffle(token: &str, state: bool) -> Result<(), ApiError> {
    let client = Client::new();
    let api_url = format!(
        "{uri}/me/player/shuffle?state={state}",
        uri = &config::spotify_apiurl(),
        state = state
    );

    let response = client
        .put(&api_url)
        .bearer_auth(token)
        .header(reqwest::header::CONTENT_LENGTH, 0)
        .send()
        .await?;
    expect_success(response).await
}
