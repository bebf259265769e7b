//! HTTP endpoints for the local OAuth callback server.
//!
//! Two routes only: [`callback`] completes the PKCE flow by exchanging the
//! authorization code Spotify redirects back with, and [`health`] answers
//! liveness probes while the server is up.

mod callback;
mod health;

pub use callback::callback;
pub use health::health;
