use std::time::Duration;

use tokio::time::sleep;

use crate::{
    config, error, info,
    management::{ShufflePlaylistStore, TokenManager},
    player::{Gateway, Player, PlayerError},
    spotify::{ApiError, SpotifyGateway},
    success, warning,
};

/// Runs the polling daemon until interrupted or an unrecoverable error hits.
///
/// The outer loop is the supervisory wrapper from the original deployment:
/// transient failures (dropped connections, provider outage statuses) force a
/// token refresh and restart the session; provider errors additionally wait a
/// minute first to give Spotify room to recover. Anything else shuts the
/// process down.
pub async fn run() {
    let tokens = match TokenManager::load().await {
        Ok(tokens) => tokens,
        Err(e) => {
            error!(
                "Failed to load token. Please run trushuffle auth\n Error: {}",
                e
            );
        }
    };
    let mut gateway = SpotifyGateway::new(tokens);

    loop {
        match run_session(&mut gateway).await {
            Ok(()) => return,
            Err(e) => {
                warning!("couldn't continue polling loop; {}", e);

                if !e.is_transient() {
                    error!("Unrecoverable error, shutting down.");
                }

                // provider-side outages get a minute to settle before we
                // come back; a dropped connection just needs fresh auth
                if matches!(e.api(), ApiError::Provider { .. }) {
                    sleep(Duration::from_secs(60)).await;
                }

                if let Err(refresh_err) = gateway.force_refresh().await {
                    error!("Failed to refresh access token: {}", refresh_err);
                }
            }
        }
    }
}

/// One supervised session: fetch the profile, adopt or create the managed
/// playlist, then poll playback forever.
async fn run_session(gateway: &mut SpotifyGateway) -> Result<(), PlayerError> {
    let profile = gateway
        .profile()
        .await
        .map_err(|e| PlayerError::new("couldn't fetch user profile", e))?;
    info!("Shuffling for {} (market {})", profile.id, profile.country);

    let persisted = match ShufflePlaylistStore::load().await {
        Ok(persisted) => persisted,
        Err(e) => {
            error!("Failed to read shuffle playlist record: {}", e);
        }
    };

    let mut player = Player::new(
        gateway,
        rand::rng(),
        profile,
        config::shuffle_playlist_size(),
    );

    if let Some(created) = player
        .locate_or_create(persisted, config::shuffle_playlist_name())
        .await?
    {
        if let Err(e) = ShufflePlaylistStore::persist(&created).await {
            error!("Failed to persist shuffle playlist record: {}", e);
        }
        success!("Created managed shuffle playlist {}", created.uri);
    }

    let interval = Duration::from_secs(config::poll_interval_secs());

    loop {
        sleep(interval).await;
        player.tick().await?;
    }
}
