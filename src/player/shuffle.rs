//! Lifecycle of the managed shuffle playlist: locate-or-create, clear,
//! populate with random unique tracks, trim played-through tracks, and keep
//! local bookkeeping reconciled with the provider's actual contents.

use std::collections::HashSet;

use rand::Rng;

use crate::{
    player::{Gateway, Player, PlayerError},
    spotify::ApiError,
    types::PlaylistIdentity,
};

/// How many fill calls pass between bookkeeping reconciliations, per track of
/// target size. A full playlist of 20 gets re-checked about every 80 ticks.
const RECONCILE_PERIOD_FACTOR: u32 = 4;

/// Cap on random offset draws per requested track in [`Player::populate`].
const SAMPLE_ATTEMPT_FACTOR: u32 = 16;
const SAMPLE_ATTEMPT_FLOOR: u32 = 32;

impl<'g, G: Gateway, R: Rng> Player<'g, G, R> {
    /// Adopts the persisted playlist identity, or creates the playlist if
    /// none was ever persisted.
    ///
    /// An adopted playlist is cleared defensively, since a prior process may
    /// have exited mid-session and left stale tracks behind. A newly created
    /// playlist is immediately unfollowed: Spotify has no real playlist
    /// delete, so the managed playlist lives forever as an unfollowed,
    /// library-invisible playlist owned by the same account. That identity
    /// is what gets persisted and reused across restarts.
    ///
    /// Returns the identity record to persist when a playlist was created,
    /// `None` when the persisted one was adopted. The caller owns the store
    /// I/O.
    pub async fn locate_or_create(
        &mut self,
        persisted: Option<PlaylistIdentity>,
        name: String,
    ) -> Result<Option<PlaylistIdentity>, PlayerError> {
        if let Some(identity) = persisted {
            self.state.shuffle.adopt_identity(identity);
            self.clear()
                .await
                .map_err(PlayerError::op("couldn't clear shuffle playlist"))?;
            return Ok(None);
        }

        let created = self
            .gateway
            .create_playlist(&self.state.user_id, name)
            .await
            .map_err(PlayerError::op("couldn't create shuffle playlist"))?;

        self.gateway
            .unfollow_playlist(&created.id)
            .await
            .map_err(PlayerError::op("couldn't unfollow shuffle playlist"))?;

        self.state.shuffle.adopt_identity(PlaylistIdentity {
            href: created.href,
            uri: created.uri,
        });

        Ok(Some(self.state.shuffle.identity()))
    }

    /// Empties the remote playlist with one bulk removal.
    ///
    /// The URIs to remove come from local bookkeeping when it is non-empty,
    /// otherwise from a prefetch of the remote listing. Bookkeeping itself is
    /// left untouched; callers reset it as part of their own atomic step.
    pub(crate) async fn clear(&mut self) -> Result<(), ApiError> {
        let uris = if !self.state.shuffle.tracks.is_empty() {
            self.state.shuffle.tracks.clone()
        } else {
            self.gateway
                .playlist_tracks(&self.state.shuffle.href, &self.state.user_country)
                .await?
        };

        if uris.is_empty() {
            return Ok(());
        }

        self.gateway
            .remove_tracks(&self.state.shuffle.href, uris)
            .await
    }

    /// Adds `count` random tracks from the active context, none of which
    /// duplicate each other or anything already in bookkeeping.
    ///
    /// Samples one random offset of the context's track listing at a time and
    /// keeps the URI if it is new. One bulk add ships all accepted URIs, and
    /// only after it succeeds are they appended to bookkeeping, in the order
    /// chosen. The number of draws is bounded; a context without enough
    /// distinct reachable tracks surfaces as an error instead of stalling the
    /// loop forever.
    pub async fn populate(&mut self, count: u32) -> Result<(), PlayerError> {
        if count == 0 {
            return Ok(());
        }

        let Some(context) = self.state.context.as_ref() else {
            return Err(PlayerError::new(
                "couldn't populate shuffle playlist",
                ApiError::Logic("no active context to draw tracks from".to_string()),
            ));
        };
        let (href, kind, length) = (context.href.clone(), context.kind, context.length);
        let market = self.state.user_country.clone();

        let mut known: HashSet<String> = self.state.shuffle.tracks.iter().cloned().collect();
        let mut chosen: Vec<String> = Vec::with_capacity(count as usize);
        let max_attempts = count * SAMPLE_ATTEMPT_FACTOR + SAMPLE_ATTEMPT_FLOOR;
        let mut attempts = 0;

        while (chosen.len() as u32) < count {
            if attempts >= max_attempts {
                return Err(PlayerError::new(
                    "couldn't populate shuffle playlist",
                    ApiError::Logic(format!(
                        "gave up collecting {} unique tracks after {} draws; context holds too few distinct tracks",
                        count, attempts
                    )),
                ));
            }
            attempts += 1;

            let offset = self.rng.random_range(0..length);
            let uri = self
                .gateway
                .track_at(&href, kind, &market, offset)
                .await
                .map_err(PlayerError::op("couldn't sample random track"))?;

            if let Some(uri) = uri {
                if known.insert(uri.clone()) {
                    chosen.push(uri);
                }
            }
        }

        self.gateway
            .add_tracks(&self.state.shuffle.href, chosen.clone())
            .await
            .map_err(PlayerError::op("couldn't populate shuffle playlist"))?;

        self.state.shuffle.tracks.extend(chosen);
        Ok(())
    }

    /// Drops every track the user has already played through.
    ///
    /// Scans bookkeeping for the currently playing URI; everything strictly
    /// before it is removed remotely in one bulk call, then bookkeeping is
    /// truncated to start at it. A currently playing track at the head, or
    /// one not in bookkeeping at all, is a no-op.
    pub async fn remove_finished_tracks(&mut self, current_uri: &str) -> Result<(), PlayerError> {
        let Some(index) = self
            .state
            .shuffle
            .tracks
            .iter()
            .position(|uri| uri == current_uri)
        else {
            return Ok(());
        };
        if index == 0 {
            return Ok(());
        }

        let finished: Vec<String> = self.state.shuffle.tracks[..index].to_vec();
        self.gateway
            .remove_tracks(&self.state.shuffle.href, finished)
            .await
            .map_err(PlayerError::op("couldn't remove finished tracks"))?;

        self.state.shuffle.tracks.drain(..index);
        Ok(())
    }

    /// Tops bookkeeping back up to the target size.
    ///
    /// Every `4 x target` calls the remote listing is re-fetched and adopted
    /// when the counts disagree, which is the only way to notice that the
    /// user edited the managed playlist by hand. A playlist already at target
    /// size costs no remote calls.
    pub async fn fill(&mut self) -> Result<(), PlayerError> {
        let target = self.state.shuffle.target_len;
        if target == 0 {
            return Ok(());
        }

        self.fills_since_reconcile += 1;
        if self.fills_since_reconcile >= target * RECONCILE_PERIOD_FACTOR {
            self.fills_since_reconcile = 0;
            let remote = self
                .gateway
                .playlist_tracks(&self.state.shuffle.href, &self.state.user_country)
                .await
                .map_err(PlayerError::op("couldn't reconcile shuffle playlist"))?;
            if remote.len() != self.state.shuffle.tracks.len() {
                self.state.shuffle.tracks = remote;
            }
        }

        let current = self.state.shuffle.tracks.len() as u32;
        if current >= target {
            return Ok(());
        }

        self.populate(target - current).await
    }

    /// Moves playback onto the managed playlist unless it is already there.
    ///
    /// Starts at offset 0 and then disables native shuffle: the playlist must
    /// play in the exact order chosen, since randomness was already applied
    /// at selection time.
    pub async fn switch_playback_if_needed(
        &mut self,
        active_context_uri: &str,
    ) -> Result<(), PlayerError> {
        if active_context_uri == self.state.shuffle.uri {
            return Ok(());
        }

        self.gateway
            .start_playback(&self.state.shuffle.uri, 0)
            .await
            .map_err(PlayerError::op("couldn't switch playback to shuffle playlist"))?;

        self.gateway
            .set_shuffle(false)
            .await
            .map_err(PlayerError::op("couldn't disable native shuffle"))
    }
}
