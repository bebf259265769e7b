//! # Playback Engine Module
//!
//! The playback-context tracking and shuffle-playlist reconciliation engine.
//! On every polling tick the engine decides whether the listening context has
//! changed, whether the managed playlist needs to be created, cleared,
//! trimmed, or refilled, and which tracks to add next.
//!
//! The engine talks to Spotify exclusively through the [`Gateway`] trait so
//! the whole state machine runs against an in-memory fake under test. The
//! production implementation is [`crate::spotify::SpotifyGateway`].
//!
//! Split across three files:
//!
//! - [`state`] - the [`PlayerState`] record and its invariants
//! - [`tracker`] - snapshot classification and context adoption
//! - [`shuffle`] - the managed-playlist lifecycle (clear/populate/trim/fill/switch)

pub mod shuffle;
pub mod state;
pub mod tracker;

pub use state::{Checks, Context, PlayerState, ShufflePlaylist};
pub use tracker::{Classification, classify};

use rand::Rng;

use crate::{
    spotify::ApiError,
    types::{ContextKind, CreatePlaylistResponse, PlaybackState, UserProfile},
};

/// Remote operations the engine needs from the playback provider.
///
/// Methods take `&mut self` because the production gateway refreshes its
/// access token in place. Only one tick is ever in flight, so no further
/// synchronization is required.
pub trait Gateway {
    /// Current playback snapshot; `None` when nothing is playing anywhere.
    async fn playback_state(&mut self) -> Result<Option<PlaybackState>, ApiError>;

    /// The authenticated user's profile.
    async fn profile(&mut self) -> Result<UserProfile, ApiError>;

    /// Total track count of an album or playlist context.
    async fn context_length(&mut self, href: &str, kind: ContextKind) -> Result<u32, ApiError>;

    /// Track URI at one offset of a context's listing; `None` when the offset
    /// holds nothing usable.
    async fn track_at(
        &mut self,
        href: &str,
        kind: ContextKind,
        market: &str,
        offset: u32,
    ) -> Result<Option<String>, ApiError>;

    /// Creates a new private playlist for the user.
    async fn create_playlist(
        &mut self,
        user_id: &str,
        name: String,
    ) -> Result<CreatePlaylistResponse, ApiError>;

    /// Unfollows a playlist, hiding it from the user's library.
    async fn unfollow_playlist(&mut self, playlist_id: &str) -> Result<(), ApiError>;

    /// The full, ordered track URI list of a playlist.
    async fn playlist_tracks(&mut self, href: &str, market: &str) -> Result<Vec<String>, ApiError>;

    /// Appends tracks to a playlist in one bulk request.
    async fn add_tracks(&mut self, href: &str, uris: Vec<String>) -> Result<(), ApiError>;

    /// Removes tracks from a playlist in one bulk request.
    async fn remove_tracks(&mut self, href: &str, uris: Vec<String>) -> Result<(), ApiError>;

    /// Starts playback on a context at a track offset.
    async fn start_playback(&mut self, context_uri: &str, position: u32) -> Result<(), ApiError>;

    /// Toggles the player's native shuffle flag.
    async fn set_shuffle(&mut self, state: bool) -> Result<(), ApiError>;
}

/// Outcome of one polling tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tick {
    /// Nothing for the engine to do this tick.
    NotApplicable,
    /// The tick ran the full trim/fill/switch sequence.
    Applicable,
}

/// A failed engine operation, labeled with what the engine was doing.
#[derive(Debug)]
pub struct PlayerError {
    op: &'static str,
    source: ApiError,
}

impl PlayerError {
    pub fn new(op: &'static str, source: ApiError) -> Self {
        PlayerError { op, source }
    }

    /// Returns a closure attaching `op` to an [`ApiError`], for `map_err`.
    fn op(op: &'static str) -> impl FnOnce(ApiError) -> PlayerError {
        move |source| PlayerError { op, source }
    }

    /// The underlying classified API failure.
    pub fn api(&self) -> &ApiError {
        &self.source
    }

    /// Whether the supervisory loop should restart instead of giving up.
    pub fn is_transient(&self) -> bool {
        self.source.is_transient()
    }
}

impl std::fmt::Display for PlayerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}; {}", self.op, self.source)
    }
}

impl std::error::Error for PlayerError {}

/// The engine: one long-lived instance per session, exclusively owning its
/// [`PlayerState`] and driving all remote mutations through the gateway.
pub struct Player<'g, G: Gateway, R: Rng> {
    pub(crate) gateway: &'g mut G,
    pub(crate) rng: R,
    pub(crate) state: PlayerState,
    /// Size cap for the managed playlist.
    pub(crate) cap: u32,
    /// Fill calls since the last bookkeeping reconciliation.
    pub(crate) fills_since_reconcile: u32,
}

impl<'g, G: Gateway, R: Rng> Player<'g, G, R> {
    pub fn new(gateway: &'g mut G, rng: R, profile: UserProfile, cap: u32) -> Self {
        Player {
            gateway,
            rng,
            state: PlayerState::new(profile),
            cap,
            fills_since_reconcile: 0,
        }
    }

    /// Read access to the engine state, mainly for assertions in tests.
    pub fn state(&self) -> &PlayerState {
        &self.state
    }

    /// Access to the gateway while the engine borrows it.
    pub fn gateway(&self) -> &G {
        self.gateway
    }

    pub fn gateway_mut(&mut self) -> &mut G {
        self.gateway
    }

    /// Runs one full polling tick: fetch the playback snapshot, evaluate it,
    /// and when applicable trim finished tracks, top the playlist back up,
    /// and switch playback onto it.
    ///
    /// Fails fast: the first remote failure aborts the remainder of the tick.
    /// Bookkeeping is only ever updated after the corresponding remote call
    /// succeeded, so a failed tick leaves the state consistent with the last
    /// successful remote operation.
    pub async fn tick(&mut self) -> Result<Tick, PlayerError> {
        let snapshot = self
            .gateway
            .playback_state()
            .await
            .map_err(PlayerError::op("couldn't fetch playback state"))?;

        if self.evaluate_tick(snapshot.as_ref()).await? == Tick::NotApplicable {
            return Ok(Tick::NotApplicable);
        }

        // evaluate_tick only reports applicable for snapshots with a playing
        // track and a context
        let Some(snapshot) = snapshot else {
            return Ok(Tick::NotApplicable);
        };
        let Some(active_context) = snapshot.context.as_ref() else {
            return Ok(Tick::NotApplicable);
        };

        if let Some(item) = snapshot.item.as_ref() {
            self.remove_finished_tracks(&item.uri).await?;
        }
        self.fill().await?;
        self.switch_playback_if_needed(&active_context.uri).await?;

        Ok(Tick::Applicable)
    }
}
