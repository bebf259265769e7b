use std::collections::HashSet;

use rand::{SeedableRng, rngs::StdRng};

use trushuffle::player::{Classification, Gateway, Player, PlayerState, Tick, classify};
use trushuffle::spotify::ApiError;
use trushuffle::types::{
    ContextKind, CreatePlaylistResponse, Device, PlaybackContext, PlaybackState, PlayingItem,
    PlaylistIdentity, UserProfile,
};

const SHUFFLE_HREF: &str = "https://api.spotify.test/v1/playlists/shf";
const SHUFFLE_URI: &str = "spotify:playlist:shf";

/// Every remote call the fake gateway saw, in order.
#[derive(Debug, Clone, PartialEq)]
enum Call {
    PlaybackState,
    ContextLength(String),
    TrackAt(u32),
    CreatePlaylist,
    Unfollow(String),
    PlaylistTracks,
    AddTracks(Vec<String>),
    RemoveTracks(Vec<String>),
    StartPlayback(String, u32),
    SetShuffle(bool),
}

/// In-memory provider double: records calls, serves canned data, never fails.
struct FakeGateway {
    calls: Vec<Call>,
    playback: Option<PlaybackState>,
    context_length: u32,
    /// Track URI served per offset; `None` entries model removed tracks.
    context_tracks: Vec<Option<String>>,
    /// What `playlist_tracks` reports as the remote playlist contents.
    remote_tracks: Vec<String>,
}

impl FakeGateway {
    fn new() -> Self {
        FakeGateway {
            calls: Vec::new(),
            playback: None,
            context_length: 0,
            context_tracks: Vec::new(),
            remote_tracks: Vec::new(),
        }
    }

    /// A gateway whose context holds `len` distinct tracks.
    fn with_context(len: u32) -> Self {
        let mut gateway = Self::new();
        gateway.set_context(len);
        gateway
    }

    fn set_context(&mut self, len: u32) {
        self.context_length = len;
        self.context_tracks = (0..len).map(|i| Some(format!("spotify:track:{}", i))).collect();
    }

    fn calls_of<F: Fn(&Call) -> bool>(&self, pred: F) -> Vec<&Call> {
        self.calls.iter().filter(|c| pred(c)).collect()
    }
}

impl Gateway for FakeGateway {
    async fn playback_state(&mut self) -> Result<Option<PlaybackState>, ApiError> {
        self.calls.push(Call::PlaybackState);
        Ok(self.playback.clone())
    }

    async fn profile(&mut self) -> Result<UserProfile, ApiError> {
        Ok(profile())
    }

    async fn context_length(&mut self, href: &str, _kind: ContextKind) -> Result<u32, ApiError> {
        self.calls.push(Call::ContextLength(href.to_string()));
        Ok(self.context_length)
    }

    async fn track_at(
        &mut self,
        _href: &str,
        _kind: ContextKind,
        _market: &str,
        offset: u32,
    ) -> Result<Option<String>, ApiError> {
        self.calls.push(Call::TrackAt(offset));
        Ok(self
            .context_tracks
            .get(offset as usize)
            .cloned()
            .flatten())
    }

    async fn create_playlist(
        &mut self,
        _user_id: &str,
        _name: String,
    ) -> Result<CreatePlaylistResponse, ApiError> {
        self.calls.push(Call::CreatePlaylist);
        Ok(CreatePlaylistResponse {
            id: "shf".to_string(),
            href: SHUFFLE_HREF.to_string(),
            uri: SHUFFLE_URI.to_string(),
        })
    }

    async fn unfollow_playlist(&mut self, playlist_id: &str) -> Result<(), ApiError> {
        self.calls.push(Call::Unfollow(playlist_id.to_string()));
        Ok(())
    }

    async fn playlist_tracks(&mut self, _href: &str, _market: &str) -> Result<Vec<String>, ApiError> {
        self.calls.push(Call::PlaylistTracks);
        Ok(self.remote_tracks.clone())
    }

    async fn add_tracks(&mut self, _href: &str, uris: Vec<String>) -> Result<(), ApiError> {
        self.calls.push(Call::AddTracks(uris));
        Ok(())
    }

    async fn remove_tracks(&mut self, _href: &str, uris: Vec<String>) -> Result<(), ApiError> {
        self.calls.push(Call::RemoveTracks(uris));
        Ok(())
    }

    async fn start_playback(&mut self, context_uri: &str, position: u32) -> Result<(), ApiError> {
        self.calls
            .push(Call::StartPlayback(context_uri.to_string(), position));
        Ok(())
    }

    async fn set_shuffle(&mut self, state: bool) -> Result<(), ApiError> {
        self.calls.push(Call::SetShuffle(state));
        Ok(())
    }
}

fn profile() -> UserProfile {
    UserProfile {
        id: "listener".to_string(),
        country: "DE".to_string(),
    }
}

fn playing(context: Option<PlaybackContext>, item_uri: &str) -> PlaybackState {
    PlaybackState {
        device: Device {
            is_private_session: false,
        },
        repeat_state: "off".to_string(),
        shuffle_state: true,
        smart_shuffle: false,
        context,
        is_playing: true,
        currently_playing_type: "track".to_string(),
        item: Some(PlayingItem {
            uri: item_uri.to_string(),
        }),
    }
}

fn album_context(name: &str) -> PlaybackContext {
    PlaybackContext {
        kind: "album".to_string(),
        href: format!("https://api.spotify.test/v1/albums/{}", name),
        uri: format!("spotify:album:{}", name),
    }
}

fn playlist_context(name: &str) -> PlaybackContext {
    PlaybackContext {
        kind: "playlist".to_string(),
        href: format!("https://api.spotify.test/v1/playlists/{}", name),
        uri: format!("spotify:playlist:{}", name),
    }
}

fn shuffle_context() -> PlaybackContext {
    PlaybackContext {
        kind: "playlist".to_string(),
        href: SHUFFLE_HREF.to_string(),
        uri: SHUFFLE_URI.to_string(),
    }
}

fn identity() -> PlaylistIdentity {
    PlaylistIdentity {
        href: SHUFFLE_HREF.to_string(),
        uri: SHUFFLE_URI.to_string(),
    }
}

fn rng() -> StdRng {
    StdRng::seed_from_u64(7)
}

/// Builds a player that has adopted the persisted playlist identity.
async fn player_with_identity<'g>(gateway: &'g mut FakeGateway) -> Player<'g, FakeGateway, StdRng> {
    let mut player = Player::new(gateway, rng(), profile(), 20);
    player
        .locate_or_create(Some(identity()), "shuffle".to_string())
        .await
        .expect("adopting persisted identity");
    player.gateway_mut().calls.clear();
    player
}

/// Adopts the given context through a normal tick evaluation.
async fn adopt_context(player: &mut Player<'_, FakeGateway, StdRng>, context: PlaybackContext) {
    let snapshot = playing(Some(context), "spotify:track:current");
    let tick = player
        .evaluate_tick(Some(&snapshot))
        .await
        .expect("context adoption tick");
    assert_eq!(tick, Tick::Applicable);
}

#[tokio::test]
async fn locate_or_create_adopts_and_clears_persisted_playlist() {
    let mut gateway = FakeGateway::new();
    gateway.remote_tracks = vec!["spotify:track:stale1".to_string(), "spotify:track:stale2".to_string()];

    let mut player = Player::new(&mut gateway, rng(), profile(), 20);
    let created = player
        .locate_or_create(Some(identity()), "shuffle".to_string())
        .await
        .expect("locate");

    // nothing new to persist, but the stale remote contents were prefetched
    // and removed in one bulk call
    assert!(created.is_none());
    assert_eq!(player.state().shuffle.uri, SHUFFLE_URI);
    assert_eq!(
        player.gateway().calls,
        vec![
            Call::PlaylistTracks,
            Call::RemoveTracks(vec![
                "spotify:track:stale1".to_string(),
                "spotify:track:stale2".to_string()
            ]),
        ]
    );
}

#[tokio::test]
async fn locate_or_create_creates_and_unfollows_when_no_record_exists() {
    let mut gateway = FakeGateway::new();
    let mut player = Player::new(&mut gateway, rng(), profile(), 20);

    let created = player
        .locate_or_create(None, "shuffle".to_string())
        .await
        .expect("create");

    assert_eq!(created, Some(identity()));
    assert_eq!(player.state().shuffle.href, SHUFFLE_HREF);
    assert_eq!(
        player.gateway().calls,
        vec![Call::CreatePlaylist, Call::Unfollow("shf".to_string())]
    );
}

#[tokio::test]
async fn adopting_a_context_caps_the_target_length() {
    let mut gateway = FakeGateway::with_context(50);
    let mut player = player_with_identity(&mut gateway).await;

    adopt_context(&mut player, playlist_context("mix")).await;

    let context = player.state().context.as_ref().expect("context adopted");
    assert_eq!(context.length, 50);
    assert_eq!(context.uri, "spotify:playlist:mix");
    assert_eq!(player.state().shuffle.target_len, 20);
}

#[tokio::test]
async fn populate_collects_unique_tracks_with_one_bulk_add() {
    let mut gateway = FakeGateway::with_context(50);
    let mut player = player_with_identity(&mut gateway).await;
    adopt_context(&mut player, playlist_context("mix")).await;
    player.gateway_mut().calls.clear();

    player.populate(20).await.expect("populate");

    let adds = player.gateway().calls_of(|c| matches!(c, Call::AddTracks(_)));
    assert_eq!(adds.len(), 1, "exactly one bulk add");
    let Call::AddTracks(added) = adds[0] else {
        unreachable!()
    };
    assert_eq!(added.len(), 20);
    let unique: HashSet<&String> = added.iter().collect();
    assert_eq!(unique.len(), 20, "no duplicates among added tracks");
    assert_eq!(&player.state().shuffle.tracks, added);
}

#[tokio::test]
async fn populate_never_duplicates_existing_bookkeeping() {
    let mut gateway = FakeGateway::with_context(8);
    let mut player = player_with_identity(&mut gateway).await;
    adopt_context(&mut player, album_context("ep")).await;

    player.populate(4).await.expect("first populate");
    let first: Vec<String> = player.state().shuffle.tracks.clone();
    player.populate(4).await.expect("second populate");

    let all = &player.state().shuffle.tracks;
    assert_eq!(all.len(), 8);
    let unique: HashSet<&String> = all.iter().collect();
    assert_eq!(unique.len(), 8);
    assert_eq!(&all[..4], &first[..], "earlier bookkeeping kept in order");
}

#[tokio::test]
async fn populate_reports_exhaustion_instead_of_looping_forever() {
    let mut gateway = FakeGateway::with_context(4);
    // every offset resolves to the same URI, so only one unique track exists
    gateway.context_tracks = vec![Some("spotify:track:only".to_string()); 4];

    let mut player = player_with_identity(&mut gateway).await;
    adopt_context(&mut player, album_context("broken")).await;
    player.gateway_mut().calls.clear();

    let err = player.populate(3).await.expect_err("must give up");
    assert!(matches!(err.api(), ApiError::Logic(_)));
    assert!(err.to_string().contains("couldn't populate shuffle playlist"));

    // nothing was shipped and bookkeeping is untouched
    assert!(player.gateway().calls_of(|c| matches!(c, Call::AddTracks(_))).is_empty());
    assert!(player.state().shuffle.tracks.is_empty());
}

#[tokio::test]
async fn remove_finished_tracks_trims_the_played_prefix() {
    let mut gateway = FakeGateway::with_context(4);
    let mut player = player_with_identity(&mut gateway).await;
    adopt_context(&mut player, album_context("ep")).await;
    player.populate(4).await.expect("populate");

    let tracks = player.state().shuffle.tracks.clone();
    let (before, current) = (tracks[..2].to_vec(), tracks[2].clone());
    player.gateway_mut().calls.clear();

    player
        .remove_finished_tracks(&current)
        .await
        .expect("trim");

    assert_eq!(
        player.gateway().calls,
        vec![Call::RemoveTracks(before)]
    );
    assert_eq!(player.state().shuffle.tracks, tracks[2..].to_vec());
}

#[tokio::test]
async fn remove_finished_tracks_is_a_noop_at_the_head_or_when_absent() {
    let mut gateway = FakeGateway::with_context(4);
    let mut player = player_with_identity(&mut gateway).await;
    adopt_context(&mut player, album_context("ep")).await;
    player.populate(4).await.expect("populate");

    let tracks = player.state().shuffle.tracks.clone();
    player.gateway_mut().calls.clear();

    // currently playing the head
    player
        .remove_finished_tracks(&tracks[0])
        .await
        .expect("head trim");
    // currently playing something we never added
    player
        .remove_finished_tracks("spotify:track:unknown")
        .await
        .expect("absent trim");

    assert!(player.gateway().calls.is_empty());
    assert_eq!(player.state().shuffle.tracks, tracks);
}

#[tokio::test]
async fn fill_at_target_size_makes_no_remote_calls() {
    let mut gateway = FakeGateway::with_context(5);
    let mut player = player_with_identity(&mut gateway).await;
    adopt_context(&mut player, album_context("ep")).await;

    player.fill().await.expect("initial fill");
    assert_eq!(player.state().shuffle.tracks.len(), 5);
    player.gateway_mut().calls.clear();

    player.fill().await.expect("steady-state fill");
    assert!(player.gateway().calls.is_empty());
}

#[tokio::test]
async fn fill_reconciles_after_manual_edits_and_tops_back_up() {
    let mut gateway = FakeGateway::with_context(5);
    let mut player = player_with_identity(&mut gateway).await;
    adopt_context(&mut player, album_context("ep")).await;

    player.fill().await.expect("initial fill");
    assert_eq!(player.state().shuffle.tracks.len(), 5);

    // the user deleted three tracks by hand; the remote now disagrees
    let survivors = player.state().shuffle.tracks[..2].to_vec();
    player.gateway_mut().remote_tracks = survivors.clone();
    player.gateway_mut().calls.clear();

    // keep ticking until the periodic reconciliation kicks in
    let mut reconciled = false;
    for _ in 0..25 {
        player.fill().await.expect("fill");
        if !player.gateway().calls_of(|c| matches!(c, Call::PlaylistTracks)).is_empty() {
            reconciled = true;
            break;
        }
    }

    assert!(reconciled, "reconciliation never triggered");
    assert_eq!(player.state().shuffle.tracks.len(), 5, "topped back up");
    assert_eq!(&player.state().shuffle.tracks[..2], &survivors[..]);
    let adds = player.gateway().calls_of(|c| matches!(c, Call::AddTracks(_)));
    assert_eq!(adds.len(), 1);
    let Call::AddTracks(added) = adds[0] else {
        unreachable!()
    };
    assert_eq!(added.len(), 3);
}

#[tokio::test]
async fn context_change_clears_and_readopts_atomically() {
    let mut gateway = FakeGateway::with_context(10);
    let mut player = player_with_identity(&mut gateway).await;
    adopt_context(&mut player, album_context("first")).await;
    player.fill().await.expect("fill first context");
    let old_tracks = player.state().shuffle.tracks.clone();

    player.gateway_mut().set_context(30);
    player.gateway_mut().calls.clear();

    let snapshot = playing(Some(playlist_context("second")), "spotify:track:current");
    let tick = player.evaluate_tick(Some(&snapshot)).await.expect("tick");
    assert_eq!(tick, Tick::Applicable);

    // old bookkeeping was removed remotely before the atomic reset
    assert_eq!(
        player.gateway().calls,
        vec![
            Call::RemoveTracks(old_tracks),
            Call::ContextLength("https://api.spotify.test/v1/playlists/second".to_string()),
        ]
    );

    // context fields are never observed partially set
    let context = player.state().context.as_ref().expect("new context");
    assert_eq!(context.uri, "spotify:playlist:second");
    assert_eq!(context.length, 30);
    assert_eq!(player.state().shuffle.target_len, 20);
    assert!(player.state().shuffle.tracks.is_empty());
}

#[tokio::test]
async fn own_playlist_is_never_adopted_as_a_context() {
    let mut gateway = FakeGateway::with_context(10);
    let mut player = player_with_identity(&mut gateway).await;
    adopt_context(&mut player, album_context("source")).await;
    player.fill().await.expect("fill");
    let tracks = player.state().shuffle.tracks.clone();
    player.gateway_mut().calls.clear();

    // playback has switched onto the managed playlist itself
    let snapshot = playing(Some(shuffle_context()), &tracks[0]);
    let tick = player.evaluate_tick(Some(&snapshot)).await.expect("tick");

    // shuffle intent is trivially satisfied and the stored context survives
    assert_eq!(tick, Tick::Applicable);
    assert!(player.gateway().calls.is_empty(), "no clear, no adoption");
    let context = player.state().context.as_ref().expect("context kept");
    assert_eq!(context.uri, "spotify:album:source");
    assert_eq!(player.state().shuffle.tracks, tracks);
}

#[tokio::test]
async fn own_playlist_without_a_known_source_context_is_not_applicable() {
    let mut gateway = FakeGateway::with_context(10);
    let mut player = player_with_identity(&mut gateway).await;

    // fresh restart: the managed playlist plays but no context was adopted
    let snapshot = playing(Some(shuffle_context()), "spotify:track:x");
    let tick = player.evaluate_tick(Some(&snapshot)).await.expect("tick");

    assert_eq!(tick, Tick::NotApplicable);
    assert!(player.state().context.is_none());
    assert_eq!(player.state().shuffle.target_len, 0);
}

#[tokio::test]
async fn single_track_contexts_trigger_no_population_or_switching() {
    let mut gateway = FakeGateway::with_context(1);
    gateway.playback = Some(playing(Some(album_context("single")), "spotify:track:0"));

    let mut player = player_with_identity(&mut gateway).await;
    player.gateway_mut().playback =
        Some(playing(Some(album_context("single")), "spotify:track:0"));

    let tick = player.tick().await.expect("tick");

    assert_eq!(tick, Tick::NotApplicable);
    assert!(player.gateway().calls_of(|c| matches!(c, Call::AddTracks(_))).is_empty());
    assert!(
        player
            .gateway()
            .calls_of(|c| matches!(c, Call::StartPlayback(_, _)))
            .is_empty()
    );
}

#[tokio::test]
async fn applicable_tick_switches_playback_and_disables_native_shuffle() {
    let mut gateway = FakeGateway::with_context(10);
    gateway.playback = Some(playing(Some(album_context("source")), "spotify:track:0"));

    let mut player = player_with_identity(&mut gateway).await;
    player.gateway_mut().playback =
        Some(playing(Some(album_context("source")), "spotify:track:0"));

    let tick = player.tick().await.expect("tick");
    assert_eq!(tick, Tick::Applicable);

    let calls = &player.gateway().calls;
    let start = calls
        .iter()
        .position(|c| matches!(c, Call::StartPlayback(_, _)))
        .expect("playback switched");
    assert_eq!(calls[start], Call::StartPlayback(SHUFFLE_URI.to_string(), 0));
    assert_eq!(calls[start + 1], Call::SetShuffle(false));
}

#[tokio::test]
async fn inadmissible_snapshots_do_nothing() {
    let mut gateway = FakeGateway::with_context(10);
    let mut player = player_with_identity(&mut gateway).await;
    adopt_context(&mut player, album_context("source")).await;
    player.gateway_mut().calls.clear();

    let mut paused = playing(Some(album_context("other")), "spotify:track:0");
    paused.is_playing = false;

    let mut private = playing(Some(album_context("other")), "spotify:track:0");
    private.device.is_private_session = true;

    let mut podcast = playing(Some(album_context("other")), "spotify:episode:0");
    podcast.currently_playing_type = "episode".to_string();

    let mut looping = playing(Some(album_context("other")), "spotify:track:0");
    looping.repeat_state = "track".to_string();

    let mut bare = playing(None, "spotify:track:0");
    bare.context = None;

    for snapshot in [&paused, &private, &podcast, &looping, &bare] {
        let tick = player.evaluate_tick(Some(snapshot)).await.expect("tick");
        assert_eq!(tick, Tick::NotApplicable);
    }

    // the stored context survived every inadmissible snapshot, even ones
    // naming a different context
    assert!(player.gateway().calls.is_empty());
    let context = player.state().context.as_ref().expect("context kept");
    assert_eq!(context.uri, "spotify:album:source");
}

#[tokio::test]
async fn missing_snapshot_is_not_applicable() {
    let mut gateway = FakeGateway::with_context(10);
    let mut player = player_with_identity(&mut gateway).await;

    let tick = player.evaluate_tick(None).await.expect("tick");
    assert_eq!(tick, Tick::NotApplicable);
}

#[test]
fn classify_detects_context_changes_but_not_the_own_playlist() {
    let mut state = PlayerState::new(profile());
    state.shuffle.adopt_identity(identity());

    let adopting = playing(Some(album_context("a")), "spotify:track:0");
    state.checks = trushuffle::player::Checks::capture(&adopting);
    assert_eq!(classify(&state, &adopting), Classification::Applicable);

    state.adopt_context(
        trushuffle::player::Context {
            href: "https://api.spotify.test/v1/albums/a".to_string(),
            kind: ContextKind::Album,
            uri: "spotify:album:a".to_string(),
            length: 12,
        },
        20,
    );

    let same = playing(Some(album_context("a")), "spotify:track:0");
    assert_eq!(classify(&state, &same), Classification::Applicable);

    let own = playing(Some(shuffle_context()), "spotify:track:0");
    assert_eq!(classify(&state, &own), Classification::Applicable);

    let other = playing(Some(album_context("b")), "spotify:track:0");
    assert_eq!(classify(&state, &other), Classification::ContextChanged);

    let show = playing(
        Some(PlaybackContext {
            kind: "show".to_string(),
            href: "https://api.spotify.test/v1/shows/s".to_string(),
            uri: "spotify:show:s".to_string(),
        }),
        "spotify:track:0",
    );
    assert_eq!(classify(&state, &show), Classification::NotApplicable);
}
