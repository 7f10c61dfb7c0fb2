use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use tabled::Tabled;

use crate::{
    error::{ResolveError, Result},
    management::Resolver,
};

// Spotify Web API records

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExternalUrls {
    #[serde(default)]
    pub spotify: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimpleArtist {
    pub id: Option<String>,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Track {
    pub id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub artists: Vec<SimpleArtist>,
    #[serde(default)]
    pub duration_ms: u64,
    #[serde(default)]
    pub external_urls: ExternalUrls,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub struct Paging<T> {
    #[serde(default)]
    pub items: Vec<T>,
    pub next: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaylistItem {
    pub track: Option<Track>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Playlist {
    pub id: String,
    pub name: String,
    pub tracks: Paging<PlaylistItem>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Album {
    pub id: String,
    pub name: String,
    pub tracks: Paging<Track>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Artist {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TopTracksResponse {
    pub tracks: Vec<Track>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShowRef {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Episode {
    pub id: String,
    pub name: String,
    pub show: ShowRef,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimplifiedEpisode {
    pub id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub duration_ms: u64,
    #[serde(default)]
    pub external_urls: ExternalUrls,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Show {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub publisher: String,
    pub episodes: Paging<Option<SimplifiedEpisode>>,
}

// Spotify embed page records (`__NEXT_DATA__` payload)

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmbedArtist {
    pub name: String,
    #[serde(default)]
    pub uri: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmbedTrack {
    pub uri: String,
    pub title: String,
    #[serde(default)]
    pub subtitle: String,
    #[serde(default)]
    pub duration: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmbedEntity {
    #[serde(rename = "type")]
    pub kind: String,
    pub uri: String,
    pub name: Option<String>,
    pub title: Option<String>,
    pub subtitle: Option<String>,
    #[serde(default)]
    pub artists: Vec<EmbedArtist>,
    #[serde(default)]
    pub duration: u64,
    #[serde(default)]
    pub track_list: Vec<EmbedTrack>,
    pub related_entity_uri: Option<String>,
}

// Audio node records

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AudioTrackInfo {
    pub identifier: String,
    pub title: String,
    pub author: String,
    /// Duration in milliseconds.
    pub length: u64,
    #[serde(default)]
    pub uri: String,
    #[serde(default)]
    pub is_seekable: bool,
    #[serde(default)]
    pub is_stream: bool,
    #[serde(default)]
    pub position: u64,
    pub source_name: Option<String>,
}

/// A playable track as returned by the audio node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AudioTrack {
    /// Opaque node-specific payload used to start playback.
    #[serde(rename = "track", alias = "encoded")]
    pub encoded: String,
    pub info: AudioTrackInfo,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NodeLoadResult {
    #[serde(default)]
    pub tracks: Vec<AudioTrack>,
}

// Resolver values

/// Kinds of Spotify entities the resolver can load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Track,
    Album,
    Playlist,
    Artist,
    Episode,
    Show,
}

impl EntityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Track => "track",
            EntityKind::Album => "album",
            EntityKind::Playlist => "playlist",
            EntityKind::Artist => "artist",
            EntityKind::Episode => "episode",
            EntityKind::Show => "show",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntityKind {
    type Err = ResolveError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "track" => Ok(EntityKind::Track),
            "album" => Ok(EntityKind::Album),
            "playlist" => Ok(EntityKind::Playlist),
            "artist" => Ok(EntityKind::Artist),
            "episode" => Ok(EntityKind::Episode),
            "show" => Ok(EntityKind::Show),
            other => Err(ResolveError::InvalidUrl(format!(
                "unsupported entity kind '{}'",
                other
            ))),
        }
    }
}

/// Identity and metadata of one Spotify track or episode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpotifyTrackRef {
    pub identifier: String,
    pub title: String,
    pub author_names: Vec<String>,
    pub source_uri: String,
    pub duration_ms: u64,
}

impl SpotifyTrackRef {
    /// Returns `None` for tracks without an id (local files).
    pub fn from_track(track: Track) -> Option<Self> {
        let identifier = track.id?;
        let source_uri = if track.external_urls.spotify.is_empty() {
            format!("https://open.spotify.com/track/{}", identifier)
        } else {
            track.external_urls.spotify
        };

        Some(Self {
            identifier,
            title: track.name,
            author_names: track.artists.into_iter().map(|a| a.name).collect(),
            source_uri,
            duration_ms: track.duration_ms,
        })
    }

    /// Episodes have no artists, the show's publisher stands in as author.
    pub fn from_episode(episode: SimplifiedEpisode, publisher: &str) -> Option<Self> {
        let identifier = episode.id?;
        let source_uri = if episode.external_urls.spotify.is_empty() {
            format!("https://open.spotify.com/episode/{}", identifier)
        } else {
            episode.external_urls.spotify
        };

        Some(Self {
            identifier,
            title: episode.name,
            author_names: vec![publisher.to_string()],
            source_uri,
            duration_ms: episode.duration_ms,
        })
    }

    /// First listed author, used to build search queries.
    pub fn primary_author(&self) -> &str {
        self.author_names.first().map(String::as_str).unwrap_or("")
    }

    /// All authors joined for display.
    pub fn author(&self) -> String {
        self.author_names.join(", ")
    }
}

/// A Spotify track that has not been matched to an audio source yet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnresolvedTrack {
    pub info: SpotifyTrackRef,
}

impl UnresolvedTrack {
    pub fn new(info: SpotifyTrackRef) -> Self {
        Self { info }
    }

    /// Resolves this track against the resolver it came from.
    pub async fn resolve(&self, resolver: &Resolver) -> Result<Option<AudioTrack>> {
        resolver.resolve(self).await
    }
}

/// One entry of a [`LoadResponse`]: either still pending or already matched.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum TrackEntry {
    Unresolved(UnresolvedTrack),
    Resolved(AudioTrack),
}

impl TrackEntry {
    pub fn as_resolved(&self) -> Option<&AudioTrack> {
        match self {
            TrackEntry::Resolved(track) => Some(track),
            TrackEntry::Unresolved(_) => None,
        }
    }

    pub fn as_unresolved(&self) -> Option<&UnresolvedTrack> {
        match self {
            TrackEntry::Unresolved(track) => Some(track),
            TrackEntry::Resolved(_) => None,
        }
    }

    pub fn title(&self) -> &str {
        match self {
            TrackEntry::Unresolved(track) => &track.info.title,
            TrackEntry::Resolved(track) => &track.info.title,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LoadType {
    Track,
    Playlist,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    Common,
    Suspicious,
}

/// Non-fatal annotation attached to an otherwise successful response.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LoadException {
    pub message: String,
    pub severity: Severity,
}

/// What a resolver hands back for one entity request.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadResponse {
    pub load_type: LoadType,
    pub playlist_name: Option<String>,
    pub tracks: Vec<TrackEntry>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exception: Option<LoadException>,
}

#[derive(Tabled)]
pub struct TrackTableRow {
    #[tabled(rename = "#")]
    pub position: usize,
    pub title: String,
    pub author: String,
    pub duration: String,
    pub uri: String,
}
