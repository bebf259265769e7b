//! # CLI Module
//!
//! User-facing entry points. [`auth`] runs the OAuth PKCE flow once and
//! persists the token; [`run`] starts the polling daemon that tracks playback
//! and maintains the managed shuffle playlist until interrupted.

mod auth;
mod run;

pub use auth::auth;
pub use run::run;
