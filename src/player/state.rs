use crate::types::{ContextKind, PlaybackState, PlaylistIdentity, UserProfile};

/// The engine's complete local state.
///
/// One long-lived instance, owned by the polling loop and mutated only by the
/// tracker and the shuffle manager, never concurrently.
#[derive(Debug)]
pub struct PlayerState {
    /// Set once at startup from the account profile.
    pub user_id: String,
    /// The user's market country, required by track-listing endpoints.
    pub user_country: String,
    /// Transient per-tick flags copied from the latest snapshot.
    pub checks: Checks,
    /// The adopted listening context. `None` and `Some` transition as a unit,
    /// which is what keeps the context fields atomic.
    pub context: Option<Context>,
    /// The managed playlist: identity, target size, and bookkeeping.
    pub shuffle: ShufflePlaylist,
}

/// Admissibility flags refreshed from every playback snapshot.
///
/// Purely transient; no invariant ties one tick's values to the next.
#[derive(Debug, Default)]
pub struct Checks {
    pub is_playing: bool,
    pub is_private_session: bool,
    pub currently_playing_type: String,
    pub repeat_state: String,
    pub shuffle_state: bool,
    pub smart_shuffle: bool,
}

impl Checks {
    pub fn capture(snapshot: &PlaybackState) -> Self {
        Checks {
            is_playing: snapshot.is_playing,
            is_private_session: snapshot.device.is_private_session,
            currently_playing_type: snapshot.currently_playing_type.clone(),
            repeat_state: snapshot.repeat_state.clone(),
            shuffle_state: snapshot.shuffle_state,
            smart_shuffle: snapshot.smart_shuffle,
        }
    }
}

/// The album or playlist the user is listening to.
#[derive(Debug, Clone)]
pub struct Context {
    pub href: String,
    pub kind: ContextKind,
    pub uri: String,
    /// Total track count of the context.
    pub length: u32,
}

/// Identity, target size, and local bookkeeping of the managed playlist.
#[derive(Debug, Default)]
pub struct ShufflePlaylist {
    pub href: String,
    pub uri: String,
    /// Target track count: `min(context length, configured cap)` while a
    /// context is active, 0 otherwise.
    pub target_len: u32,
    /// Ordered URIs believed to be in the remote playlist. Insertion order is
    /// playback order.
    pub tracks: Vec<String>,
}

impl ShufflePlaylist {
    pub fn identity(&self) -> PlaylistIdentity {
        PlaylistIdentity {
            href: self.href.clone(),
            uri: self.uri.clone(),
        }
    }

    pub fn adopt_identity(&mut self, identity: PlaylistIdentity) {
        self.href = identity.href;
        self.uri = identity.uri;
    }
}

impl PlayerState {
    pub fn new(profile: UserProfile) -> Self {
        PlayerState {
            user_id: profile.id,
            user_country: profile.country,
            checks: Checks::default(),
            context: None,
            shuffle: ShufflePlaylist::default(),
        }
    }

    /// Adopts a freshly observed context and derives the playlist target size
    /// from it in the same step.
    pub fn adopt_context(&mut self, context: Context, cap: u32) {
        self.shuffle.target_len = context.length.min(cap);
        self.context = Some(context);
    }

    /// Drops the finished context, its derived target size, and the
    /// bookkeeping as one atomic step.
    pub fn reset_context(&mut self) {
        self.context = None;
        self.shuffle.target_len = 0;
        self.shuffle.tracks.clear();
    }
}
