use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Token {
    pub access_token: String,
    pub refresh_token: String,
    pub scope: String,
    pub expires_in: u64,
    pub obtained_at: u64,
}

#[derive(Debug, Clone)]
pub struct PkceToken {
    pub code_verifier: String,
    pub token: Option<Token>,
}

/// The authenticated user's account profile, fetched once at startup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: String,
    pub country: String,
}

/// Snapshot of the player returned by `GET /me/player`.
///
/// A `204 No Content` response (nothing playing anywhere) is represented as
/// the absence of a snapshot, not as a value of this type.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaybackState {
    pub device: Device,
    pub repeat_state: String,
    pub shuffle_state: bool,
    #[serde(default)]
    pub smart_shuffle: bool,
    pub context: Option<PlaybackContext>,
    pub is_playing: bool,
    pub currently_playing_type: String,
    pub item: Option<PlayingItem>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Device {
    #[serde(default)]
    pub is_private_session: bool,
}

/// The album/playlist/show/artist the player is currently bound to.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaybackContext {
    #[serde(rename = "type")]
    pub kind: String,
    pub href: String,
    pub uri: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayingItem {
    pub uri: String,
}

/// The kinds of playback context the engine can shuffle.
///
/// Shows and artist radios also appear as contexts in playback snapshots but
/// are rejected during admissibility checks, so they never reach this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContextKind {
    Album,
    Playlist,
}

impl ContextKind {
    /// Parses the `type` field of a playback context.
    pub fn parse(kind: &str) -> Option<Self> {
        match kind {
            "album" => Some(ContextKind::Album),
            "playlist" => Some(ContextKind::Playlist),
            _ => None,
        }
    }
}

impl std::fmt::Display for ContextKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ContextKind::Album => write!(f, "album"),
            ContextKind::Playlist => write!(f, "playlist"),
        }
    }
}

/// Album metadata, of which only the track count matters here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlbumMetadata {
    pub total_tracks: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaylistMetadata {
    pub tracks: PlaylistTracksField,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaylistTracksField {
    pub total: u32,
}

/// One page of an album's track listing. Album items carry their URI at the
/// top level.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlbumTrackPage {
    pub items: Vec<AlbumTrackItem>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlbumTrackItem {
    pub uri: String,
}

/// One page of a playlist's track listing. Playlist items nest the URI under
/// `track`, which may be null for removed or unavailable entries.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaylistTrackPage {
    pub items: Vec<PlaylistTrackItem>,
    pub total: u32,
    pub next: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaylistTrackItem {
    pub track: Option<PlaylistTrack>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaylistTrack {
    pub uri: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePlaylistRequest {
    pub name: String,
    pub description: String,
    pub public: bool,
    pub collaborative: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePlaylistResponse {
    pub id: String,
    pub href: String,
    pub uri: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddTracksRequest {
    pub uris: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoveTracksRequest {
    pub tracks: Vec<TrackRef>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackRef {
    pub uri: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotResponse {
    pub snapshot_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StartPlaybackRequest {
    pub context_uri: String,
    pub offset: PlaybackOffset,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaybackOffset {
    pub position: u32,
}

/// The persisted identity of the managed shuffle playlist.
///
/// Created once per account and reused across restarts; only the playlist's
/// *contents* are cleared and repopulated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaylistIdentity {
    pub href: String,
    pub uri: String,
}

/// Spotify's structured error envelope, present in any failed response body.
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorEnvelope {
    pub error: ProviderError,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProviderError {
    pub status: u16,
    pub message: String,
}
