use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::{
    config::ResolverOptions,
    error::{ResolveError, Result},
    spotify::{Cursor, EntityListing, ListingPage, MetadataProvider},
    types::{
        Album, Artist, EntityKind, Episode, Paging, Playlist, PlaylistItem, Show,
        SimplifiedEpisode, SpotifyTrackRef, TopTracksResponse, Track,
    },
};

/// Metadata provider backed by the authenticated Spotify Web API.
///
/// The token is read from [`ResolverOptions::token`]. Refreshing it is the
/// host's job; this provider only fails with
/// [`ResolveError::Unauthenticated`] when it is missing.
pub struct ApiProvider {
    client: Client,
    base_url: String,
    market: String,
    token: Option<String>,
}

impl ApiProvider {
    pub fn new(options: &ResolverOptions) -> Self {
        Self {
            client: Client::new(),
            base_url: options.api_url.trim_end_matches('/').to_string(),
            market: options.market.clone(),
            token: options.token.clone(),
        }
    }

    fn token(&self) -> Result<&str> {
        self.token
            .as_deref()
            .map(|t| t.trim_start_matches("Bearer ").trim())
            .filter(|t| !t.is_empty())
            .ok_or(ResolveError::Unauthenticated)
    }

    /// Issues one authenticated GET and decodes the JSON body.
    ///
    /// No retry: a failed request fails the whole entity load.
    async fn get<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        let token = self.token()?;
        debug!(url = %url, "fetching Spotify Web API resource");

        let response = self
            .client
            .get(url)
            .bearer_auth(token)
            .send()
            .await
            .map_err(ResolveError::Fetch)?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(ResolveError::NotFound(url.to_string()));
        }

        let response = response.error_for_status().map_err(ResolveError::Fetch)?;
        response.json::<T>().await.map_err(|e| {
            if e.is_decode() {
                ResolveError::Malformed(e.to_string())
            } else {
                ResolveError::Fetch(e)
            }
        })
    }

    fn cursor(&self, kind: EntityKind, next: Option<String>, author: Option<&str>) -> Option<Cursor> {
        next.map(|url| Cursor {
            kind,
            url,
            author: author.map(str::to_string),
        })
    }

    async fn fetch_track(&self, id: &str) -> Result<EntityListing> {
        let track: Track = self
            .get(&format!("{base}/tracks/{id}", base = self.base_url, id = id))
            .await?;

        Ok(EntityListing {
            name: None,
            items: SpotifyTrackRef::from_track(track).into_iter().collect(),
            next: None,
        })
    }

    async fn fetch_album(&self, id: &str) -> Result<EntityListing> {
        let album: Album = self
            .get(&format!("{base}/albums/{id}", base = self.base_url, id = id))
            .await?;

        Ok(EntityListing {
            name: Some(album.name),
            items: tracks_to_refs(album.tracks.items),
            next: self.cursor(EntityKind::Album, album.tracks.next, None),
        })
    }

    async fn fetch_playlist(&self, id: &str) -> Result<EntityListing> {
        let playlist: Playlist = self
            .get(&format!("{base}/playlists/{id}", base = self.base_url, id = id))
            .await?;

        Ok(EntityListing {
            name: Some(playlist.name),
            items: playlist_items_to_refs(playlist.tracks.items),
            next: self.cursor(EntityKind::Playlist, playlist.tracks.next, None),
        })
    }

    async fn fetch_artist(&self, id: &str) -> Result<EntityListing> {
        let artist_url = format!("{base}/artists/{id}", base = self.base_url, id = id);
        let top_tracks_url = format!(
            "{base}/artists/{id}/top-tracks?market={market}",
            base = self.base_url,
            id = id,
            market = self.market
        );

        let (artist, top_tracks) = tokio::try_join!(
            self.get::<Artist>(&artist_url),
            self.get::<TopTracksResponse>(&top_tracks_url)
        )?;

        Ok(EntityListing {
            name: Some(artist.name),
            items: tracks_to_refs(top_tracks.tracks),
            next: None,
        })
    }

    async fn fetch_show(&self, id: &str) -> Result<EntityListing> {
        let show: Show = self
            .get(&format!(
                "{base}/shows/{id}?market={market}",
                base = self.base_url,
                id = id,
                market = self.market
            ))
            .await?;

        let author = show_author(&show);
        Ok(EntityListing {
            name: Some(show.name),
            items: episodes_to_refs(show.episodes.items, &author),
            next: self.cursor(EntityKind::Show, show.episodes.next, Some(author.as_str())),
        })
    }
}

#[async_trait]
impl MetadataProvider for ApiProvider {
    async fn fetch_entity(&self, kind: EntityKind, id: &str) -> Result<EntityListing> {
        match kind {
            EntityKind::Track => self.fetch_track(id).await,
            EntityKind::Album => self.fetch_album(id).await,
            EntityKind::Playlist => self.fetch_playlist(id).await,
            EntityKind::Artist => self.fetch_artist(id).await,
            // Episodes are listed through their show.
            EntityKind::Episode => {
                let show_id = self.fetch_episode_show(id).await?;
                self.fetch_show(&show_id).await
            }
            EntityKind::Show => self.fetch_show(id).await,
        }
    }

    async fn fetch_page(&self, cursor: &Cursor) -> Result<ListingPage> {
        match cursor.kind {
            EntityKind::Playlist => {
                let page: Paging<PlaylistItem> = self.get(&cursor.url).await?;
                Ok(ListingPage {
                    items: playlist_items_to_refs(page.items),
                    next: self.cursor(cursor.kind, page.next, None),
                })
            }
            EntityKind::Album => {
                let page: Paging<Track> = self.get(&cursor.url).await?;
                Ok(ListingPage {
                    items: tracks_to_refs(page.items),
                    next: self.cursor(cursor.kind, page.next, None),
                })
            }
            EntityKind::Show => {
                let author = cursor.author.clone().unwrap_or_default();
                let page: Paging<Option<SimplifiedEpisode>> = self.get(&cursor.url).await?;
                Ok(ListingPage {
                    items: episodes_to_refs(page.items, &author),
                    next: self.cursor(cursor.kind, page.next, Some(author.as_str())),
                })
            }
            other => Err(ResolveError::Malformed(format!(
                "{} listings are not paginated",
                other
            ))),
        }
    }

    async fn fetch_episode_show(&self, id: &str) -> Result<String> {
        let episode: Episode = self
            .get(&format!(
                "{base}/episodes/{id}?market={market}",
                base = self.base_url,
                id = id,
                market = self.market
            ))
            .await?;

        debug!(episode = %episode.name, show = %episode.show.name, "episode belongs to show");
        Ok(episode.show.id)
    }
}

fn show_author(show: &Show) -> String {
    if show.publisher.is_empty() {
        show.name.clone()
    } else {
        show.publisher.clone()
    }
}

fn tracks_to_refs(tracks: Vec<Track>) -> Vec<SpotifyTrackRef> {
    tracks
        .into_iter()
        .filter_map(SpotifyTrackRef::from_track)
        .collect()
}

fn playlist_items_to_refs(items: Vec<PlaylistItem>) -> Vec<SpotifyTrackRef> {
    items
        .into_iter()
        .filter_map(|item| item.track)
        .filter_map(SpotifyTrackRef::from_track)
        .collect()
}

fn episodes_to_refs(episodes: Vec<Option<SimplifiedEpisode>>, author: &str) -> Vec<SpotifyTrackRef> {
    episodes
        .into_iter()
        .flatten()
        .filter_map(|episode| SpotifyTrackRef::from_episode(episode, author))
        .collect()
}
