use futures::future::join_all;
use tracing::{debug, warn};

use crate::{
    config::ResolverOptions,
    error::Result,
    management::{ResolutionCache, response::partial_loss},
    node::{AudioSearch, NodeClient},
    spotify::{self, EntityListing, MetadataProvider},
    types::{
        AudioTrack, EntityKind, LoadException, LoadResponse, SpotifyTrackRef, TrackEntry,
        UnresolvedTrack,
    },
    utils,
};

/// Turns Spotify entities into audio node tracks.
///
/// A resolver is bound to one audio node and owns the cache of matches found
/// through it. All methods take `&self`; resolving a listing runs every
/// search concurrently and shares the cache between them.
pub struct Resolver {
    provider: Box<dyn MetadataProvider>,
    search: Box<dyn AudioSearch>,
    cache: ResolutionCache,
    options: ResolverOptions,
}

impl Resolver {
    /// Builds a resolver with the provider matching `options.fetch_strategy`.
    pub fn new(options: ResolverOptions, node: NodeClient) -> Self {
        let provider = spotify::provider_for(&options);
        Self::with_parts(options, provider, Box::new(node))
    }

    /// Builds a resolver from an explicit provider and search backend.
    pub fn with_parts(
        options: ResolverOptions,
        provider: Box<dyn MetadataProvider>,
        search: Box<dyn AudioSearch>,
    ) -> Self {
        Self {
            provider,
            search,
            cache: ResolutionCache::new(),
            options,
        }
    }

    pub fn options(&self) -> &ResolverOptions {
        &self.options
    }

    pub fn cache(&self) -> &ResolutionCache {
        &self.cache
    }

    /// Parses a Spotify URL or URI and loads the entity it points to.
    pub async fn load(&self, url: &str) -> Result<LoadResponse> {
        let (kind, id) = utils::parse_spotify_url(url)?;
        match kind {
            EntityKind::Track => self.get_track(&id).await,
            EntityKind::Album => self.get_album(&id).await,
            EntityKind::Playlist => self.get_playlist(&id).await,
            EntityKind::Artist => self.get_artist(&id).await,
            EntityKind::Episode => self.get_episode(&id).await,
            EntityKind::Show => self.get_show(&id).await,
        }
    }

    pub async fn get_track(&self, id: &str) -> Result<LoadResponse> {
        let listing = self.provider.fetch_entity(EntityKind::Track, id).await?;
        let (tracks, exception) = self.finish(listing.items).await;

        let mut response = LoadResponse::track(tracks);
        response.exception = exception;
        Ok(response)
    }

    pub async fn get_album(&self, id: &str) -> Result<LoadResponse> {
        self.get_listing(EntityKind::Album, id).await
    }

    pub async fn get_playlist(&self, id: &str) -> Result<LoadResponse> {
        self.get_listing(EntityKind::Playlist, id).await
    }

    /// Loads the artist's top tracks.
    pub async fn get_artist(&self, id: &str) -> Result<LoadResponse> {
        self.get_listing(EntityKind::Artist, id).await
    }

    /// Episodes are not loaded on their own: the whole parent show is returned.
    pub async fn get_episode(&self, id: &str) -> Result<LoadResponse> {
        let show_id = self.provider.fetch_episode_show(id).await?;
        debug!(episode = id, show = %show_id, "loading parent show of episode");
        self.get_show(&show_id).await
    }

    pub async fn get_show(&self, id: &str) -> Result<LoadResponse> {
        self.get_listing(EntityKind::Show, id).await
    }

    /// Matches one track against the audio node, going through the cache.
    ///
    /// Returns `Ok(None)` when the search has no candidate; only transport
    /// failures are errors. A match is cached only when one was found.
    pub async fn resolve(&self, track: &UnresolvedTrack) -> Result<Option<AudioTrack>> {
        let spotify_id = &track.info.identifier;
        if let Some(cached) = self.cache.get(spotify_id).await {
            debug!(spotify_id = %spotify_id, "resolution cache hit");
            return Ok(Some(cached));
        }

        let query = utils::build_search_query(
            &self.options.search_prefix,
            &track.info,
            self.options.audio_only_results,
        );
        debug!(spotify_id = %spotify_id, query = %query, "resolution cache miss");

        let Some(mut candidate) = self.search.search(&query).await?.into_iter().next() else {
            debug!(spotify_id = %spotify_id, "no search result");
            return Ok(None);
        };

        if self.options.use_spotify_metadata {
            utils::apply_spotify_metadata(&mut candidate, &track.info);
        }

        self.cache.insert(spotify_id.clone(), candidate.clone()).await;
        Ok(Some(candidate))
    }

    async fn get_listing(&self, kind: EntityKind, id: &str) -> Result<LoadResponse> {
        let listing = self.provider.fetch_entity(kind, id).await?;
        let (name, items) = self.collect_pages(listing).await?;
        let (tracks, exception) = self.finish(items).await;

        let mut response = LoadResponse::playlist(name, tracks);
        response.exception = exception;
        Ok(response)
    }

    /// Follows cursors until exhausted or the page limit is reached.
    ///
    /// Pages are appended in order; any failing page aborts the whole load.
    async fn collect_pages(
        &self,
        listing: EntityListing,
    ) -> Result<(Option<String>, Vec<SpotifyTrackRef>)> {
        let EntityListing {
            name,
            mut items,
            mut next,
        } = listing;
        let limit = self.options.playlist_load_limit;
        let mut pages = 1;

        while let Some(cursor) = next.take() {
            if !utils::may_load_page(pages, limit) {
                debug!(pages, limit, "page load limit reached");
                break;
            }

            let page = self.provider.fetch_page(&cursor).await?;
            pages += 1;
            debug!(page = pages, items = page.items.len(), "loaded listing page");

            items.extend(page.items);
            next = page.next;
        }

        Ok((name, items))
    }

    async fn finish(&self, items: Vec<SpotifyTrackRef>) -> (Vec<TrackEntry>, Option<LoadException>) {
        let unresolved: Vec<UnresolvedTrack> = items.into_iter().map(UnresolvedTrack::new).collect();

        if !self.options.auto_resolve {
            let entries = unresolved.into_iter().map(TrackEntry::Unresolved).collect();
            return (entries, None);
        }

        let total = unresolved.len();
        let resolved = self.resolve_all(&unresolved).await;
        let exception = partial_loss(resolved.len(), total);

        (resolved.into_iter().map(TrackEntry::Resolved).collect(), exception)
    }

    /// Resolves every track concurrently, keeping order and dropping failures.
    async fn resolve_all(&self, tracks: &[UnresolvedTrack]) -> Vec<AudioTrack> {
        let results = join_all(tracks.iter().map(|track| self.resolve(track))).await;

        results
            .into_iter()
            .zip(tracks)
            .filter_map(|(result, track)| match result {
                Ok(found) => found,
                Err(e) => {
                    warn!(
                        spotify_id = %track.info.identifier,
                        error = %e,
                        "dropping track that failed to resolve"
                    );
                    None
                }
            })
            .collect()
    }
}
