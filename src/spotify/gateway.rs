use crate::{
    management::TokenManager,
    player::Gateway,
    spotify::{ApiError, context, player, playlist},
    types::{ContextKind, CreatePlaylistResponse, PlaybackState, UserProfile},
};

/// Production [`Gateway`] backed by the Spotify Web API.
///
/// Owns the token manager and pulls a valid access token before every call,
/// refreshing transparently when the stored one is about to expire. Passed
/// into the engine as an explicit value; there is no process-wide client.
pub struct SpotifyGateway {
    tokens: TokenManager,
}

impl SpotifyGateway {
    pub fn new(tokens: TokenManager) -> Self {
        SpotifyGateway { tokens }
    }

    /// Forces a token refresh regardless of expiry. Used by the supervisory
    /// loop after Spotify drops the connection or serves an outage status.
    pub async fn force_refresh(&mut self) -> Result<(), String> {
        self.tokens.force_refresh().await
    }
}

impl Gateway for SpotifyGateway {
    async fn playback_state(&mut self) -> Result<Option<PlaybackState>, ApiError> {
        let token = self.tokens.get_valid_token().await;
        player::get_playback_state(&token).await
    }

    async fn profile(&mut self) -> Result<UserProfile, ApiError> {
        let token = self.tokens.get_valid_token().await;
        player::get_profile(&token).await
    }

    async fn context_length(&mut self, href: &str, kind: ContextKind) -> Result<u32, ApiError> {
        let token = self.tokens.get_valid_token().await;
        context::get_length(&token, href, kind).await
    }

    async fn track_at(
        &mut self,
        href: &str,
        kind: ContextKind,
        market: &str,
        offset: u32,
    ) -> Result<Option<String>, ApiError> {
        let token = self.tokens.get_valid_token().await;
        context::get_track_at(&token, href, kind, market, offset).await
    }

    async fn create_playlist(
        &mut self,
        user_id: &str,
        name: String,
    ) -> Result<CreatePlaylistResponse, ApiError> {
        let token = self.tokens.get_valid_token().await;
        playlist::create(&token, user_id, name).await
    }

    async fn unfollow_playlist(&mut self, playlist_id: &str) -> Result<(), ApiError> {
        let token = self.tokens.get_valid_token().await;
        playlist::unfollow(&token, playlist_id).await
    }

    async fn playlist_tracks(&mut self, href: &str, market: &str) -> Result<Vec<String>, ApiError> {
        let token = self.tokens.get_valid_token().await;
        playlist::get_all_tracks(&token, href, market).await
    }

    async fn add_tracks(&mut self, href: &str, uris: Vec<String>) -> Result<(), ApiError> {
        let token = self.tokens.get_valid_token().await;
        playlist::add_tracks(&token, href, uris).await
    }

    async fn remove_tracks(&mut self, href: &str, uris: Vec<String>) -> Result<(), ApiError> {
        let token = self.tokens.get_valid_token().await;
        playlist::remove_tracks(&token, href, uris).await
    }

    async fn start_playback(&mut self, context_uri: &str, position: u32) -> Result<(), ApiError> {
        let token = self.tokens.get_valid_token().await;
        player::start_playback(&token, context_uri, position).await
    }

    async fn set_shuffle(&mut self, state: bool) -> Result<(), ApiError> {
        let token = self.tokens.get_valid_token().await;
        player::set_shuffle(&token, state).await
    }
}
