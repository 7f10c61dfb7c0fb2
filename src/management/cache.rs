use std::collections::HashMap;

use tokio::sync::RwLock;

use crate::types::AudioTrack;

/// Resolved audio tracks keyed by Spotify track id.
///
/// Entries are never evicted; the cache lives as long as its resolver.
/// Reads hand out clones, so callers can never mutate a stored entry.
#[derive(Debug, Default)]
pub struct ResolutionCache {
    entries: RwLock<HashMap<String, AudioTrack>>,
}

impl ResolutionCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get(&self, spotify_id: &str) -> Option<AudioTrack> {
        self.entries.read().await.get(spotify_id).cloned()
    }

    /// Stores a track, replacing any previous match for the same id.
    pub async fn insert(&self, spotify_id: String, track: AudioTrack) {
        self.entries.write().await.insert(spotify_id, track);
    }

    pub async fn contains(&self, spotify_id: &str) -> bool {
        self.entries.read().await.contains_key(spotify_id)
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    pub async fn clear(&self) {
        self.entries.write().await.clear();
    }
}
