//! True-random shuffle daemon for Spotify.
//!
//! Spotify's own shuffle is famously non-uniform. This crate watches the
//! user's playback session and maintains a hidden, automatically managed
//! playlist that is kept topped up with non-repeating random tracks drawn
//! from whatever album or playlist is currently playing, so that skipping
//! or finishing a track always advances into a genuinely random next one.
//!
//! # Modules
//!
//! - `api` - HTTP API endpoints for the local OAuth callback server
//! - `cli` - Command-line entry points (`auth`, `run`)
//! - `config` - Configuration management and environment variables
//! - `management` - Persisted token and playlist-identity records
//! - `player` - The playback-tracking and shuffle-playlist engine
//! - `server` - Local HTTP server for OAuth callbacks
//! - `spotify` - Spotify Web API client implementation
//! - `types` - Data structures and type definitions
//! - `utils` - Utility functions and helpers

pub mod api;
pub mod cli;
pub mod config;
pub mod management;
pub mod player;
pub mod server;
pub mod spotify;
pub mod types;
pub mod utils;

/// A convenient Result type alias for operations that may fail.
///
/// Uses a boxed dynamic error trait object with Send + Sync bounds so it
/// composes across async boundaries.
pub type Res<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// Prints an informational message with a blue bullet point.
#[macro_export]
macro_rules! info {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "o".blue().bold(), std::format_args!($($arg)*));
  })
}

/// Prints a success message with a green checkmark.
#[macro_export]
macro_rules! success {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "✓".green().bold(), std::format_args!($($arg)*));
  })
}

/// Prints an error message with a red exclamation mark and exits the program.
///
/// Only for unrecoverable CLI-level failures; the engine itself always
/// returns `Result` instead.
#[macro_export]
macro_rules! error {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "!".red().bold(), std::format_args!($($arg)*));
    std::process::exit(1);
  })
}

/// Prints a warning message with a yellow exclamation mark.
#[macro_export]
macro_rules! warning {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "!".yellow().bold(), std::format_args!($($arg)*));
  })
}
