use reqwest::Client;

use crate::{
    config,
    spotify::{ApiError, decode, expect_success},
    types::{
        AddTracksRequest, CreatePlaylistRequest, CreatePlaylistResponse, PlaylistTrackPage,
        RemoveTracksRequest, SnapshotResponse, TrackRef,
    },
};

/// Creates a new private playlist owned by the given user.
pub async fn create(
    token: &str,
    user_id: &str,
    name: String,
) -> Result<CreatePlaylistResponse, ApiError> {
    let client = Client::new();
    let api_url = format!(
        "{uri}/users/{user_id}/playlists",
        uri = &config::spotify_apiurl(),
        user_id = user_id
    );

    let body = CreatePlaylistRequest {
        name,
        description: "Automatically managed. Do not edit by hand.".to_string(),
        public: false,
        collaborative: false,
    };

    let response = client
        .post(&api_url)
        .bearer_auth(token)
        .json(&body)
        .send()
        .await?;
    decode::<CreatePlaylistResponse>(response).await
}

/// Unfollows a playlist, hiding it from the user's library.
///
/// Spotify offers no real playlist delete; an unfollowed playlist keeps
/// existing and stays addressable by href/uri, which is exactly what the
/// managed playlist relies on.
pub async fn unfollow(token: &str, playlist_id: &str) -> Result<(), ApiError> {
    let client = Client::new();
    let api_url = format!(
        "{uri}/playlists/{id}/followers",
        uri = &config::spotify_apiurl(),
        id = playlist_id
    );

    let response = client.delete(&api_url).bearer_auth(token).send().await?;
    expect_success(response).await
}

/// Retrieves the full, ordered track URI list of a playlist.
///
/// Pages through `{href}/tracks` with the maximum page size. Entries whose
/// `track` is null (removed or regionally unavailable) are skipped.
pub async fn get_all_tracks(
    token: &str,
    playlist_href: &str,
    market: &str,
) -> Result<Vec<String>, ApiError> {
    let client = Client::new();
    let mut uris: Vec<String> = Vec::new();
    let mut offset: u32 = 0;

    loop {
        let api_url = format!(
            "{href}/tracks?market={market}&limit=50&offset={offset}",
            href = playlist_href,
            market = market,
            offset = offset
        );

        let response = client.get(&api_url).bearer_auth(token).send().await?;
        let page = decode::<PlaylistTrackPage>(response).await?;

        let fetched = page.items.len() as u32;
        uris.extend(
            page.items
                .into_iter()
                .filter_map(|item| item.track.map(|t| t.uri)),
        );

        offset += fetched;
        if fetched == 0 || offset >= page.total || page.next.is_none() {
            break;
        }
    }

    Ok(uris)
}

/// Appends tracks to the end of a playlist in one bulk request.
pub async fn add_tracks(
    token: &str,
    playlist_href: &str,
    uris: Vec<String>,
) -> Result<(), ApiError> {
    let client = Client::new();
    let api_url = format!("{href}/tracks", href = playlist_href);

    let body = AddTracksRequest { uris };

    let response = client
        .post(&api_url)
        .bearer_auth(token)
        .json(&body)
        .send()
        .await?;
    decode::<SnapshotResponse>(response).await?;

    Ok(())
}

/// Removes all occurrences of the given tracks from a playlist in one bulk
/// request.
pub async fn remove_tracks(
    token: &str,
    playlist_href: &str,
    uris: Vec<String>,
) -> Result<(), ApiError> {
    let client = Client::new();
    let api_url = format!("{href}/tracks", href = playlist_href);

    let body = RemoveTracksRequest {
        tracks: uris.into_iter().map(|uri| TrackRef { uri }).collect(),
    };

    let response = client
        .delete(&api_url)
        .bearer_auth(token)
        .json(&body)
        .send()
        .await?;
    decode::<SnapshotResponse>(response).await?;

    Ok(())
}
