use std::{io::Error, path::PathBuf};

use crate::types::PlaylistIdentity;

#[derive(Debug)]
pub enum StoreError {
    IoError(Error),
    SerdeError(serde_json::Error),
}

impl From<Error> for StoreError {
    fn from(err: Error) -> Self {
        StoreError::IoError(err)
    }
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreError::IoError(e) => write!(f, "io error: {}", e),
            StoreError::SerdeError(e) => write!(f, "serde error: {}", e),
        }
    }
}

/// Durable home of the managed playlist's identity record.
///
/// The record is written exactly once, when the playlist is first created,
/// and read once per startup. Everything else about the playlist lives
/// remotely or in the engine's in-memory bookkeeping.
pub struct ShufflePlaylistStore;

impl ShufflePlaylistStore {
    /// Reads the persisted identity record, `None` if it was never written.
    pub async fn load() -> Result<Option<PlaylistIdentity>, StoreError> {
        let path = Self::record_path();
        let json = match async_fs::read_to_string(&path).await {
            Ok(json) => json,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(StoreError::IoError(e)),
        };

        let identity: PlaylistIdentity =
            serde_json::from_str(&json).map_err(StoreError::SerdeError)?;
        Ok(Some(identity))
    }

    pub async fn persist(identity: &PlaylistIdentity) -> Result<(), StoreError> {
        let path = Self::record_path();
        if let Some(parent) = path.parent() {
            async_fs::create_dir_all(parent)
                .await
                .map_err(StoreError::IoError)?;
        }

        let json = serde_json::to_string_pretty(identity).map_err(StoreError::SerdeError)?;
        async_fs::write(path, json).await.map_err(StoreError::IoError)
    }

    fn record_path() -> PathBuf {
        let mut path = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
        path.push("trushuffle/state/shuffle_playlist.json");
        path
    }
}
