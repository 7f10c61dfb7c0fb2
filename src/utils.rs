use std::sync::LazyLock;

use regex::Regex;

use crate::{
    error::{ResolveError, Result},
    types::{AudioTrack, EntityKind, SpotifyTrackRef},
};

static SPOTIFY_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^https?://(?:open|play)\.spotify\.com/(?:intl-[a-zA-Z]{2}(?:-[a-zA-Z]{2})?/)?(?:embed/)?(track|album|playlist|artist|episode|show)/([A-Za-z0-9]+)",
    )
    .unwrap()
});

static SPOTIFY_URI: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^spotify:(track|album|playlist|artist|episode|show):([A-Za-z0-9]+)$").unwrap()
});

/// Appended to queries when only auto-generated audio uploads are wanted.
pub const AUDIO_ONLY_FILTER: &str = r#"description:("Auto-generated by YouTube.")"#;

/// Splits a Spotify URL or URI into entity kind and id.
///
/// Accepts `https://open.spotify.com/[intl-xx/]<kind>/<id>[?si=...]` and
/// `spotify:<kind>:<id>`.
pub fn parse_spotify_url(input: &str) -> Result<(EntityKind, String)> {
    let input = input.trim();
    let captures = SPOTIFY_URL
        .captures(input)
        .or_else(|| SPOTIFY_URI.captures(input))
        .ok_or_else(|| ResolveError::InvalidUrl(input.to_string()))?;

    let kind = captures[1].parse::<EntityKind>()?;
    Ok((kind, captures[2].to_string()))
}

/// Builds the free-text search sent to the audio node: `<prefix><author> - <title>`.
pub fn build_search_query(prefix: &str, track: &SpotifyTrackRef, audio_only: bool) -> String {
    let mut query = format!(
        "{prefix}{author} - {title}",
        prefix = prefix,
        author = track.primary_author(),
        title = track.title
    );
    if audio_only {
        query.push(' ');
        query.push_str(AUDIO_ONLY_FILTER);
    }
    query
}

/// Whether another page may be loaded once `loaded` pages are in. A limit of 0 means unlimited.
pub fn may_load_page(loaded: u32, limit: u32) -> bool {
    limit == 0 || loaded < limit
}

/// Replaces the node's title, author and uri with the Spotify ones.
pub fn apply_spotify_metadata(track: &mut AudioTrack, source: &SpotifyTrackRef) {
    track.info.title = source.title.clone();
    track.info.author = source.author();
    track.info.uri = source.source_uri.clone();
}

/// Formats milliseconds as `m:ss`, or `h:mm:ss` past one hour.
pub fn format_duration(ms: u64) -> String {
    let total = ms / 1000;
    let (hours, minutes, seconds) = (total / 3600, (total % 3600) / 60, total % 60);
    if hours > 0 {
        format!("{}:{:02}:{:02}", hours, minutes, seconds)
    } else {
        format!("{}:{:02}", minutes, seconds)
    }
}
