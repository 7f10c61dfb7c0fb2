use std::sync::LazyLock;

use async_trait::async_trait;
use regex::Regex;
use reqwest::{
    Client, StatusCode,
    header::{HeaderMap, HeaderValue, USER_AGENT},
};
use serde_json::Value;
use tracing::{debug, warn};

use crate::{
    config::ResolverOptions,
    error::{ResolveError, Result},
    spotify::{Cursor, EntityListing, ListingPage, MetadataProvider},
    types::{EmbedEntity, EmbedTrack, EntityKind, SpotifyTrackRef},
};

static NEXT_DATA: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?s)<script id="__NEXT_DATA__" type="application/json">(.*?)</script>"#)
        .unwrap()
});

const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/134.0.0.0 Safari/537.36";

/// Metadata provider reading the public embed pages, no credentials needed.
///
/// Embed pages carry the whole listing in one document, so every
/// [`EntityListing`] it returns has no cursor.
pub struct ScrapeProvider {
    client: Client,
    embed_url: String,
}

impl ScrapeProvider {
    pub fn new(options: &ResolverOptions) -> Self {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static(BROWSER_USER_AGENT));

        let client = match Client::builder().default_headers(headers).build() {
            Ok(client) => client,
            Err(e) => {
                warn!(error = %e, "cannot build embed client, falling back to default client without browser User-Agent");
                Client::new()
            }
        };

        Self {
            client,
            embed_url: options.embed_url.trim_end_matches('/').to_string(),
        }
    }

    async fn fetch_embed(&self, kind: EntityKind, id: &str) -> Result<EmbedEntity> {
        let url = format!("{base}/{kind}/{id}", base = self.embed_url, kind = kind, id = id);
        debug!(url = %url, "scraping Spotify embed page");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(ResolveError::Fetch)?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(ResolveError::NotFound(url));
        }

        let html = response
            .error_for_status()
            .map_err(ResolveError::Fetch)?
            .text()
            .await
            .map_err(ResolveError::Fetch)?;

        parse_embed_page(&html)
    }
}

#[async_trait]
impl MetadataProvider for ScrapeProvider {
    async fn fetch_entity(&self, kind: EntityKind, id: &str) -> Result<EntityListing> {
        if kind == EntityKind::Episode {
            let show_id = self.fetch_episode_show(id).await?;
            return self.fetch_entity(EntityKind::Show, &show_id).await;
        }

        let entity = self.fetch_embed(kind, id).await?;

        let listing = match kind {
            EntityKind::Track => EntityListing {
                name: None,
                items: vec![entity_to_ref(kind, id, &entity)],
                next: None,
            },
            _ => EntityListing {
                name: entity.name.clone().or_else(|| entity.title.clone()),
                items: entity.track_list.iter().filter_map(embed_track_to_ref).collect(),
                next: None,
            },
        };

        Ok(listing)
    }

    async fn fetch_page(&self, cursor: &Cursor) -> Result<ListingPage> {
        Err(ResolveError::Malformed(format!(
            "embed listings are not paginated, got cursor {}",
            cursor.url
        )))
    }

    async fn fetch_episode_show(&self, id: &str) -> Result<String> {
        let entity = self.fetch_embed(EntityKind::Episode, id).await?;

        entity
            .related_entity_uri
            .as_deref()
            .and_then(|uri| uri.strip_prefix("spotify:show:"))
            .map(str::to_string)
            .ok_or_else(|| {
                ResolveError::Malformed(format!("episode {} does not reference a show", id))
            })
    }
}

/// Extracts the entity embedded in a Spotify embed page.
pub fn parse_embed_page(html: &str) -> Result<EmbedEntity> {
    let raw = NEXT_DATA
        .captures(html)
        .and_then(|c| c.get(1))
        .ok_or_else(|| ResolveError::Malformed("embed page has no __NEXT_DATA__".to_string()))?;

    let data: Value = serde_json::from_str(raw.as_str())
        .map_err(|e| ResolveError::Malformed(e.to_string()))?;

    let entity = data
        .pointer("/props/pageProps/state/data/entity")
        .cloned()
        .ok_or_else(|| ResolveError::Malformed("embed data has no entity".to_string()))?;

    serde_json::from_value(entity).map_err(|e| ResolveError::Malformed(e.to_string()))
}

fn split_subtitle(subtitle: &str) -> Vec<String> {
    subtitle
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn entity_to_ref(kind: EntityKind, id: &str, entity: &EmbedEntity) -> SpotifyTrackRef {
    let author_names = if entity.artists.is_empty() {
        entity.subtitle.as_deref().map(split_subtitle).unwrap_or_default()
    } else {
        entity.artists.iter().map(|a| a.name.clone()).collect()
    };

    SpotifyTrackRef {
        identifier: id.to_string(),
        title: entity
            .title
            .clone()
            .or_else(|| entity.name.clone())
            .unwrap_or_default(),
        author_names,
        source_uri: format!("https://open.spotify.com/{}/{}", kind, id),
        duration_ms: entity.duration,
    }
}

fn embed_track_to_ref(track: &EmbedTrack) -> Option<SpotifyTrackRef> {
    // spotify:<kind>:<id>
    let mut parts = track.uri.rsplitn(3, ':');
    let id = parts.next().filter(|s| !s.is_empty())?;
    let kind = parts.next()?;

    Some(SpotifyTrackRef {
        identifier: id.to_string(),
        title: track.title.clone(),
        author_names: split_subtitle(&track.subtitle),
        source_uri: format!("https://open.spotify.com/{}/{}", kind, id),
        duration_ms: track.duration,
    })
}
