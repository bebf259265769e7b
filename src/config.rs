//! Configuration management for the shuffle daemon.
//!
//! This module handles loading and accessing configuration values from
//! environment variables and `.env` files. Configuration follows a
//! hierarchical approach:
//! 1. Environment variables (highest priority)
//! 2. `.env` file in the local data directory
//! 3. Application defaults (for the polling and playlist tunables)

use dotenv;
use std::{env, path::PathBuf};

/// Loads environment variables from a `.env` file in the local data directory.
///
/// Creates the necessary directory structure if it doesn't exist and loads
/// environment variables from a `.env` file located in the platform-specific
/// local data directory under `trushuffle/.env`:
/// - Linux: `~/.local/share/trushuffle/.env`
/// - macOS: `~/Library/Application Support/trushuffle/.env`
/// - Windows: `%LOCALAPPDATA%/trushuffle/.env`
///
/// # Errors
///
/// Returns an error string if the parent directory cannot be created or the
/// `.env` file cannot be read or parsed.
pub async fn load_env() -> Result<(), String> {
    let mut path = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
    path.push("trushuffle/.env");
    if let Some(parent) = path.parent() {
        async_fs::create_dir_all(parent)
            .await
            .map_err(|e| e.to_string())?;
    }

    dotenv::from_path(path).expect("Failed to load .env file");
    Ok(())
}

/// Returns the server address for the local OAuth callback server.
///
/// # Panics
///
/// Panics if the `SERVER_ADDRESS` environment variable is not set.
pub fn server_addr() -> String {
    env::var("SERVER_ADDRESS").expect("SERVER_ADDRESS must be set")
}

/// Returns the Spotify API client ID for authentication.
///
/// # Panics
///
/// Panics if the `SPOTIFY_API_AUTH_CLIENT_ID` environment variable is not set.
pub fn spotify_client_id() -> String {
    env::var("SPOTIFY_API_AUTH_CLIENT_ID").expect("SPOTIFY_API_AUTH_CLIENT_ID must be set")
}

/// Returns the Spotify OAuth redirect URI.
///
/// Must match the redirect URI registered in the Spotify application settings.
///
/// # Panics
///
/// Panics if the `SPOTIFY_API_REDIRECT_URI` environment variable is not set.
pub fn spotify_redirect_uri() -> String {
    env::var("SPOTIFY_API_REDIRECT_URI").expect("SPOTIFY_API_REDIRECT_URI must be set")
}

/// Returns the Spotify API scope permissions.
///
/// The daemon needs playback read/modify plus private-playlist read/modify
/// scopes, e.g. `user-read-playback-state user-modify-playback-state
/// user-read-private playlist-read-private playlist-modify-private
/// playlist-modify-public`.
///
/// # Panics
///
/// Panics if the `SPOTIFY_API_AUTH_SCOPE` environment variable is not set.
pub fn spotify_scope() -> String {
    env::var("SPOTIFY_API_AUTH_SCOPE").expect("SPOTIFY_API_AUTH_SCOPE must be set")
}

/// Returns the Spotify OAuth authorization URL.
///
/// # Panics
///
/// Panics if the `SPOTIFY_API_AUTH_URL` environment variable is not set.
pub fn spotify_apiauth_url() -> String {
    env::var("SPOTIFY_API_AUTH_URL").expect("SPOTIFY_API_AUTH_URL must be set")
}

/// Returns the Spotify Web API base URL.
///
/// # Panics
///
/// Panics if the `SPOTIFY_API_URL` environment variable is not set.
pub fn spotify_apiurl() -> String {
    env::var("SPOTIFY_API_URL").expect("SPOTIFY_API_URL must be set")
}

/// Returns the Spotify OAuth token exchange URL.
///
/// # Panics
///
/// Panics if the `SPOTIFY_API_TOKEN_URL` environment variable is not set.
pub fn spotify_apitoken_url() -> String {
    env::var("SPOTIFY_API_TOKEN_URL").expect("SPOTIFY_API_TOKEN_URL must be set")
}

/// Returns the polling interval of the playback loop in seconds.
///
/// Read from `POLL_INTERVAL_SECS`, defaulting to 1 second when unset or
/// unparsable.
pub fn poll_interval_secs() -> u64 {
    env::var("POLL_INTERVAL_SECS")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(1)
}

/// Returns the size cap of the managed shuffle playlist.
///
/// Read from `SHUFFLE_PLAYLIST_SIZE`, defaulting to 20 tracks. The effective
/// playlist length is the minimum of this cap and the active context's track
/// count.
pub fn shuffle_playlist_size() -> u32 {
    env::var("SHUFFLE_PLAYLIST_SIZE")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(20)
}

/// Returns the name given to the managed shuffle playlist on creation.
///
/// Read from `SHUFFLE_PLAYLIST_NAME`, defaulting to "True Random Shuffle".
/// The playlist is unfollowed right after creation, so the name only shows
/// up in the Web API, not in the user's library.
pub fn shuffle_playlist_name() -> String {
    env::var("SHUFFLE_PLAYLIST_NAME").unwrap_or_else(|_| "True Random Shuffle".to_string())
}
