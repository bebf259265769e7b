//! Lookups against the listening context (the album or playlist the user is
//! playing from): total track counts and single-track pages at arbitrary
//! offsets. Both endpoints shape their payloads differently for albums and
//! playlists, which is why every function here takes a [`ContextKind`].

use reqwest::Client;

use crate::{
    spotify::{ApiError, decode},
    types::{AlbumMetadata, AlbumTrackPage, ContextKind, PlaylistMetadata, PlaylistTrackPage},
};

/// Retrieves the total track count of a context.
///
/// Albums report it as a top-level `total_tracks`; playlists nest it under
/// `tracks.total`. A context that reports zero tracks is a logic error, since
/// there is nothing the engine could shuffle.
pub async fn get_length(token: &str, href: &str, kind: ContextKind) -> Result<u32, ApiError> {
    let client = Client::new();
    let response = client.get(href).bearer_auth(token).send().await?;

    let total = match kind {
        ContextKind::Album => decode::<AlbumMetadata>(response).await?.total_tracks,
        ContextKind::Playlist => decode::<PlaylistMetadata>(response).await?.tracks.total,
    };

    if total == 0 {
        return Err(ApiError::Logic(format!(
            "{} at {} reported zero tracks",
            kind, href
        )));
    }

    Ok(total)
}

/// Retrieves the track URI at one offset of a context's track listing.
///
/// Returns `Ok(None)` when the offset holds nothing usable: an empty page, or
/// a playlist entry whose track is null (removed or unavailable in the
/// market). The sampling loop counts that as a missed draw and tries another
/// offset.
pub async fn get_track_at(
    token: &str,
    href: &str,
    kind: ContextKind,
    market: &str,
    offset: u32,
) -> Result<Option<String>, ApiError> {
    let client = Client::new();
    let api_url = format!(
        "{href}/tracks?market={market}&limit=1&offset={offset}",
        href = href,
        market = market,
        offset = offset
    );

    let response = client.get(&api_url).bearer_auth(token).send().await?;

    let uri = match kind {
        ContextKind::Album => decode::<AlbumTrackPage>(response)
            .await?
            .items
            .into_iter()
            .next()
            .map(|item| item.uri),
        ContextKind::Playlist => decode::<PlaylistTrackPage>(response)
            .await?
            .items
            .into_iter()
            .next()
            .and_then(|item| item.track.map(|t| t.uri)),
    };

    Ok(uri)
}
