//! Snapshot classification and context tracking.
//!
//! Keeps the stored context and the playlist target size consistent with what
//! the user is actually listening to, with minimal churn. Context switches
//! are detected before the track count is recomputed, because playback of the
//! managed playlist itself must never be mistaken for a new context (that
//! would clear and recreate it in a loop). Admissibility is checked before
//! context adoption so a bare track played outside any playlist never
//! perturbs a previously active context.

use rand::Rng;

use crate::{
    player::{Gateway, Player, PlayerError, Tick, state::Checks, state::Context, state::PlayerState},
    spotify::ApiError,
    types::{ContextKind, PlaybackState},
};

/// What a playback snapshot means for the engine, as one tagged value
/// instead of a scatter of boolean flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    /// The snapshot fails an admissibility check or carries no context.
    NotApplicable,
    /// A context is stored and the snapshot plays a different one (that is
    /// not the managed playlist): the stored context is finished.
    ContextChanged,
    /// The snapshot is admissible for this tick.
    Applicable,
}

/// Classifies a snapshot against the current state.
///
/// Pure with respect to remote calls; expects the transient check fields to
/// have been captured into `state` already.
pub fn classify(state: &PlayerState, snapshot: &PlaybackState) -> Classification {
    let checks = &state.checks;
    if !checks.is_playing
        || checks.is_private_session
        || checks.currently_playing_type != "track"
        || checks.repeat_state == "track"
    {
        return Classification::NotApplicable;
    }

    let Some(context) = snapshot.context.as_ref() else {
        return Classification::NotApplicable;
    };
    if context.kind == "show" || context.kind == "artist" {
        return Classification::NotApplicable;
    }

    if let Some(stored) = state.context.as_ref() {
        if context.uri != stored.uri && context.uri != state.shuffle.uri {
            return Classification::ContextChanged;
        }
    }

    Classification::Applicable
}

impl<'g, G: Gateway, R: Rng> Player<'g, G, R> {
    /// Evaluates one playback snapshot.
    ///
    /// Copies the transient check fields, clears out a finished context,
    /// adopts a new one (fetching its track count), and decides whether the
    /// caller may proceed to trim/fill/switch. All state transitions of the
    /// context fields happen in here and nowhere else.
    pub async fn evaluate_tick(
        &mut self,
        snapshot: Option<&PlaybackState>,
    ) -> Result<Tick, PlayerError> {
        let Some(snapshot) = snapshot else {
            return Ok(Tick::NotApplicable);
        };

        self.state.checks = Checks::capture(snapshot);

        match classify(&self.state, snapshot) {
            Classification::NotApplicable => return Ok(Tick::NotApplicable),
            Classification::ContextChanged => {
                // the old context is finished: empty the remote playlist
                // first, then drop context fields and bookkeeping as a unit
                self.clear()
                    .await
                    .map_err(PlayerError::op("couldn't clear shuffle playlist"))?;
                self.state.reset_context();
            }
            Classification::Applicable => {}
        }

        let Some(active) = snapshot.context.as_ref() else {
            return Ok(Tick::NotApplicable);
        };

        if self.state.context.is_none() && active.uri != self.state.shuffle.uri {
            let Some(kind) = ContextKind::parse(&active.kind) else {
                return Err(PlayerError::new(
                    "couldn't adopt context",
                    ApiError::Logic(format!("unrecognized context type \"{}\"", active.kind)),
                ));
            };

            let length = self
                .gateway
                .context_length(&active.href, kind)
                .await
                .map_err(PlayerError::op("couldn't determine context length"))?;

            self.state.adopt_context(
                Context {
                    href: active.href.clone(),
                    kind,
                    uri: active.uri.clone(),
                    length,
                },
                self.cap,
            );
        }

        // still no context: the managed playlist is playing but its source
        // context is unknown (fresh restart), so there is nothing to fill from
        let Some(stored) = self.state.context.as_ref() else {
            return Ok(Tick::NotApplicable);
        };

        // a single track cannot be shuffled
        if stored.length == 1 {
            return Ok(Tick::NotApplicable);
        }

        // shuffle intent: trivially satisfied while our own playlist plays,
        // otherwise the user must have native shuffle on and smart shuffle off
        let intent = active.uri == self.state.shuffle.uri
            || (snapshot.shuffle_state && !snapshot.smart_shuffle);
        if !intent {
            return Ok(Tick::NotApplicable);
        }

        Ok(Tick::Applicable)
    }
}
