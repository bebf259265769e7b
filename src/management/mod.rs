mod auth;
mod playlist;

pub use auth::TokenManager;
pub use playlist::ShufflePlaylistStore;
pub use playlist::StoreError;
