use crate::types::{AudioTrack, LoadException, LoadResponse, LoadType, Severity, TrackEntry};

impl LoadResponse {
    pub fn new(load_type: LoadType, playlist_name: Option<String>, tracks: Vec<TrackEntry>) -> Self {
        Self {
            load_type,
            playlist_name,
            tracks,
            exception: None,
        }
    }

    /// Response for a single-track request.
    pub fn track(tracks: Vec<TrackEntry>) -> Self {
        Self::new(LoadType::Track, None, tracks)
    }

    /// Response for albums, playlists, artist top tracks and shows.
    pub fn playlist(name: Option<String>, tracks: Vec<TrackEntry>) -> Self {
        Self::new(LoadType::Playlist, name, tracks)
    }

    /// Attaches a non-fatal annotation.
    pub fn with_exception(mut self, message: impl Into<String>, severity: Severity) -> Self {
        self.exception = Some(LoadException {
            message: message.into(),
            severity,
        });
        self
    }

    pub fn resolved_tracks(&self) -> impl Iterator<Item = &AudioTrack> {
        self.tracks.iter().filter_map(TrackEntry::as_resolved)
    }
}

/// Describes tracks lost to failed resolution, `None` when nothing was lost.
///
/// Losing every track is flagged as suspicious, partial loss as common.
pub fn partial_loss(resolved: usize, total: usize) -> Option<LoadException> {
    if resolved >= total {
        return None;
    }

    let severity = if resolved == 0 {
        Severity::Suspicious
    } else {
        Severity::Common
    };

    Some(LoadException {
        message: format!(
            "{} of {} tracks could not be resolved",
            total - resolved,
            total
        ),
        severity,
    })
}
