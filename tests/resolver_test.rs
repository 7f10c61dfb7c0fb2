use std::collections::HashMap;
use std::sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
};

use async_trait::async_trait;
use spotresolve::config::{FetchStrategy, NodeOptions, ResolverOptions};
use spotresolve::management::Resolver;
use spotresolve::node::{AudioSearch, NodeClient};
use spotresolve::spotify::{Cursor, EntityListing, ListingPage, MetadataProvider};
use spotresolve::types::{
    AudioTrack, AudioTrackInfo, EntityKind, LoadType, Severity, SpotifyTrackRef, TrackEntry,
    UnresolvedTrack,
};
use spotresolve::{ResolveError, Result};

#[derive(Default)]
struct Calls {
    entity: AtomicUsize,
    page: AtomicUsize,
    search: AtomicUsize,
}

#[derive(Default)]
struct MockProvider {
    calls: Arc<Calls>,
    listings: HashMap<EntityKind, EntityListing>,
    pages: HashMap<String, ListingPage>,
    episode_show: Option<String>,
}

#[async_trait]
impl MetadataProvider for MockProvider {
    async fn fetch_entity(&self, kind: EntityKind, id: &str) -> Result<EntityListing> {
        self.calls.entity.fetch_add(1, Ordering::SeqCst);
        self.listings
            .get(&kind)
            .cloned()
            .ok_or_else(|| ResolveError::NotFound(id.to_string()))
    }

    async fn fetch_page(&self, cursor: &Cursor) -> Result<ListingPage> {
        self.calls.page.fetch_add(1, Ordering::SeqCst);
        self.pages
            .get(&cursor.url)
            .cloned()
            .ok_or_else(|| ResolveError::Malformed(format!("no page at {}", cursor.url)))
    }

    async fn fetch_episode_show(&self, id: &str) -> Result<String> {
        self.episode_show
            .clone()
            .ok_or_else(|| ResolveError::NotFound(id.to_string()))
    }
}

/// Answers queries containing a known title, fails for queries containing "broken".
#[derive(Default)]
struct MockSearch {
    calls: Arc<Calls>,
    results: Vec<(String, AudioTrack)>,
}

#[async_trait]
impl AudioSearch for MockSearch {
    async fn search(&self, query: &str) -> Result<Vec<AudioTrack>> {
        self.calls.search.fetch_add(1, Ordering::SeqCst);
        if query.contains("broken") {
            return Err(ResolveError::Malformed("node unavailable".to_string()));
        }
        Ok(self
            .results
            .iter()
            .filter(|(needle, _)| query.contains(needle.as_str()))
            .map(|(_, track)| track.clone())
            .collect())
    }
}

fn track_ref(id: &str, title: &str, author: &str) -> SpotifyTrackRef {
    SpotifyTrackRef {
        identifier: id.to_string(),
        title: title.to_string(),
        author_names: vec![author.to_string()],
        source_uri: format!("https://open.spotify.com/track/{}", id),
        duration_ms: 180_000,
    }
}

fn audio_track(identifier: &str, title: &str, author: &str) -> AudioTrack {
    AudioTrack {
        encoded: format!("QAAA{}", identifier),
        info: AudioTrackInfo {
            identifier: identifier.to_string(),
            title: title.to_string(),
            author: author.to_string(),
            length: 181_000,
            uri: format!("https://www.youtube.com/watch?v={}", identifier),
            is_seekable: true,
            is_stream: false,
            position: 0,
            source_name: Some("youtube".to_string()),
        },
    }
}

fn cursor(kind: EntityKind, url: &str) -> Cursor {
    Cursor {
        kind,
        url: url.to_string(),
        author: None,
    }
}

/// Playlist spread over three pages: p1 (a, b) -> p2 (c) -> p3 (d).
fn paged_playlist(calls: &Arc<Calls>) -> MockProvider {
    let mut provider = MockProvider {
        calls: Arc::clone(calls),
        ..Default::default()
    };
    provider.listings.insert(
        EntityKind::Playlist,
        EntityListing {
            name: Some("Road Trip".to_string()),
            items: vec![track_ref("a", "Song A", "Artist"), track_ref("b", "Song B", "Artist")],
            next: Some(cursor(EntityKind::Playlist, "p2")),
        },
    );
    provider.pages.insert(
        "p2".to_string(),
        ListingPage {
            items: vec![track_ref("c", "Song C", "Artist")],
            next: Some(cursor(EntityKind::Playlist, "p3")),
        },
    );
    provider.pages.insert(
        "p3".to_string(),
        ListingPage {
            items: vec![track_ref("d", "Song D", "Artist")],
            next: None,
        },
    );
    provider
}

fn resolver(options: ResolverOptions, provider: MockProvider, search: MockSearch) -> Resolver {
    Resolver::with_parts(options, Box::new(provider), Box::new(search))
}

fn ids(entries: &[TrackEntry]) -> Vec<String> {
    entries
        .iter()
        .map(|e| match e {
            TrackEntry::Unresolved(t) => t.info.identifier.clone(),
            TrackEntry::Resolved(t) => t.info.identifier.clone(),
        })
        .collect()
}

#[tokio::test]
async fn test_resolving_twice_searches_once() {
    let calls = Arc::new(Calls::default());
    let search = MockSearch {
        calls: Arc::clone(&calls),
        results: vec![("Song A".to_string(), audio_track("yt-a", "Song A", "Artist"))],
    };
    let resolver = resolver(ResolverOptions::default(), MockProvider::default(), search);
    let track = UnresolvedTrack::new(track_ref("a", "Song A", "Artist"));

    let first = resolver.resolve(&track).await.unwrap().unwrap();
    let second = track.resolve(&resolver).await.unwrap().unwrap();

    assert_eq!(calls.search.load(Ordering::SeqCst), 1);
    assert_eq!(first, second);
    assert!(resolver.cache().contains("a").await);
    assert_eq!(resolver.cache().len().await, 1);

    resolver.cache().clear().await;
    assert!(resolver.cache().is_empty().await);
    track.resolve(&resolver).await.unwrap().unwrap();
    assert_eq!(calls.search.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_cached_tracks_are_independent_copies() {
    let calls = Arc::new(Calls::default());
    let search = MockSearch {
        calls: Arc::clone(&calls),
        results: vec![("Song A".to_string(), audio_track("yt-a", "Song A", "Artist"))],
    };
    let resolver = resolver(ResolverOptions::default(), MockProvider::default(), search);
    let track = UnresolvedTrack::new(track_ref("a", "Song A", "Artist"));

    let mut first = resolver.resolve(&track).await.unwrap().unwrap();
    let second = resolver.resolve(&track).await.unwrap().unwrap();
    assert_eq!(first, second);

    first.info.title = "Mutated".to_string();

    let third = resolver.resolve(&track).await.unwrap().unwrap();
    assert_eq!(second.info.title, "Song A");
    assert_eq!(third.info.title, "Song A");
    assert_eq!(resolver.cache().get("a").await.unwrap().info.title, "Song A");
}

#[tokio::test]
async fn test_page_limit_stops_before_last_page() {
    let calls = Arc::new(Calls::default());
    let options = ResolverOptions {
        playlist_load_limit: 2,
        ..Default::default()
    };
    let resolver = resolver(options, paged_playlist(&calls), MockSearch::default());

    let response = resolver.get_playlist("pl").await.unwrap();

    // first page plus one more
    assert_eq!(calls.entity.load(Ordering::SeqCst), 1);
    assert_eq!(calls.page.load(Ordering::SeqCst), 1);
    assert_eq!(ids(&response.tracks), vec!["a", "b", "c"]);
}

#[tokio::test]
async fn test_unlimited_pages_follow_every_cursor() {
    let calls = Arc::new(Calls::default());
    let resolver = resolver(
        ResolverOptions::default(),
        paged_playlist(&calls),
        MockSearch::default(),
    );

    let response = resolver.get_playlist("pl").await.unwrap();

    assert_eq!(calls.page.load(Ordering::SeqCst), 2);
    assert_eq!(response.load_type, LoadType::Playlist);
    assert_eq!(response.playlist_name.as_deref(), Some("Road Trip"));
    assert_eq!(ids(&response.tracks), vec!["a", "b", "c", "d"]);
    assert!(response.exception.is_none());
}

#[tokio::test]
async fn test_failed_page_aborts_the_load() {
    let calls = Arc::new(Calls::default());
    let mut provider = paged_playlist(&calls);
    provider.pages.remove("p3");
    let resolver = resolver(ResolverOptions::default(), provider, MockSearch::default());

    let err = resolver.get_playlist("pl").await.unwrap_err();

    assert!(err.is_fetch_error());
    assert_eq!(calls.page.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_spotify_metadata_overwrites_match() {
    let calls = Arc::new(Calls::default());
    let search = MockSearch {
        calls: Arc::clone(&calls),
        results: vec![("Foo".to_string(), audio_track("yt-foo", "Foo (Audio)", "Bar - Topic"))],
    };
    let options = ResolverOptions {
        use_spotify_metadata: true,
        ..Default::default()
    };
    let resolver = resolver(options, MockProvider::default(), search);
    let track = UnresolvedTrack::new(track_ref("foo", "Foo", "Bar"));

    let resolved = resolver.resolve(&track).await.unwrap().unwrap();
    let cached = resolver.cache().get("foo").await.unwrap();

    assert_eq!(resolved.info.title, "Foo");
    assert_eq!(cached.info.title, "Foo");
    assert_eq!(cached.info.author, "Bar");
    assert_eq!(cached.info.uri, "https://open.spotify.com/track/foo");
    assert_eq!(cached.info.identifier, "yt-foo");
}

#[tokio::test]
async fn test_no_candidates_is_not_an_error() {
    let calls = Arc::new(Calls::default());
    let search = MockSearch {
        calls: Arc::clone(&calls),
        results: Vec::new(),
    };
    let resolver = resolver(ResolverOptions::default(), MockProvider::default(), search);
    let track = UnresolvedTrack::new(track_ref("x", "Unknown", "Nobody"));

    let result = resolver.resolve(&track).await.unwrap();

    assert!(result.is_none());
    assert!(!resolver.cache().contains("x").await);
    assert!(resolver.cache().is_empty().await);

    // misses are not cached, so the next attempt searches again
    resolver.resolve(&track).await.unwrap();
    assert_eq!(calls.search.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_search_failure_is_an_error() {
    let resolver = resolver(
        ResolverOptions::default(),
        MockProvider::default(),
        MockSearch::default(),
    );
    let track = UnresolvedTrack::new(track_ref("x", "broken", "Nobody"));

    assert!(resolver.resolve(&track).await.is_err());
    assert!(!resolver.cache().contains("x").await);
}

#[tokio::test]
async fn test_get_track_returns_single_unresolved_entry() {
    let calls = Arc::new(Calls::default());
    let mut provider = MockProvider {
        calls: Arc::clone(&calls),
        ..Default::default()
    };
    provider.listings.insert(
        EntityKind::Track,
        EntityListing {
            name: None,
            items: vec![track_ref("t1", "Song", "Artist")],
            next: None,
        },
    );
    let options = ResolverOptions {
        fetch_strategy: FetchStrategy::Scrape,
        ..Default::default()
    };
    let resolver = resolver(options, provider, MockSearch::default());

    let response = resolver.get_track("t1").await.unwrap();

    assert_eq!(response.load_type, LoadType::Track);
    assert_eq!(response.tracks.len(), 1);
    assert!(response.playlist_name.is_none());
    assert_eq!(
        response.tracks[0].as_unresolved().unwrap().info.identifier,
        "t1"
    );
    assert_eq!(calls.search.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_api_strategy_without_token_fails_before_network() {
    let options = ResolverOptions {
        fetch_strategy: FetchStrategy::Api,
        token: None,
        // nothing listens here; reaching the network would yield a fetch error instead
        api_url: "http://127.0.0.1:9".to_string(),
        ..Default::default()
    };
    let node = NodeClient::new(NodeOptions {
        host: "127.0.0.1".to_string(),
        port: 9,
        ..Default::default()
    });
    let resolver = Resolver::new(options, node);

    let err = resolver.get_track("t1").await.unwrap_err();
    assert!(matches!(err, ResolveError::Unauthenticated));
    assert!(err.is_auth_error());

    let err = resolver.get_playlist("pl").await.unwrap_err();
    assert!(matches!(err, ResolveError::Unauthenticated));
}

#[tokio::test]
async fn test_auto_resolve_drops_failures_and_keeps_order() {
    let calls = Arc::new(Calls::default());
    let mut provider = MockProvider {
        calls: Arc::clone(&calls),
        ..Default::default()
    };
    provider.listings.insert(
        EntityKind::Album,
        EntityListing {
            name: Some("Album".to_string()),
            items: vec![
                track_ref("1", "First", "Artist"),
                track_ref("2", "broken", "Artist"),
                track_ref("3", "Missing", "Artist"),
                track_ref("4", "Fourth", "Artist"),
            ],
            next: None,
        },
    );
    let search = MockSearch {
        calls: Arc::clone(&calls),
        results: vec![
            ("First".to_string(), audio_track("yt-1", "First", "Artist")),
            ("Fourth".to_string(), audio_track("yt-4", "Fourth", "Artist")),
        ],
    };
    let options = ResolverOptions {
        auto_resolve: true,
        ..Default::default()
    };
    let resolver = resolver(options, provider, search);

    let response = resolver.get_album("al").await.unwrap();

    assert_eq!(calls.search.load(Ordering::SeqCst), 4);
    assert_eq!(ids(&response.tracks), vec!["yt-1", "yt-4"]);
    let titles: Vec<&str> = response
        .resolved_tracks()
        .map(|t| t.info.title.as_str())
        .collect();
    assert_eq!(titles, vec!["First", "Fourth"]);

    let exception = response.exception.unwrap();
    assert_eq!(exception.severity, Severity::Common);
    assert_eq!(exception.message, "2 of 4 tracks could not be resolved");
    assert_eq!(resolver.cache().len().await, 2);
}

#[tokio::test]
async fn test_episode_loads_parent_show() {
    let calls = Arc::new(Calls::default());
    let mut provider = MockProvider {
        calls: Arc::clone(&calls),
        episode_show: Some("show1".to_string()),
        ..Default::default()
    };
    provider.listings.insert(
        EntityKind::Show,
        EntityListing {
            name: Some("The Podcast".to_string()),
            items: vec![track_ref("e1", "Episode 1", "Host"), track_ref("e2", "Episode 2", "Host")],
            next: None,
        },
    );
    let resolver = resolver(ResolverOptions::default(), provider, MockSearch::default());

    let response = resolver.load("spotify:episode:e2").await.unwrap();

    assert_eq!(response.load_type, LoadType::Playlist);
    assert_eq!(response.playlist_name.as_deref(), Some("The Podcast"));
    assert_eq!(ids(&response.tracks), vec!["e1", "e2"]);
}

#[tokio::test]
async fn test_load_dispatches_and_rejects_unknown_urls() {
    let calls = Arc::new(Calls::default());
    let mut provider = MockProvider {
        calls: Arc::clone(&calls),
        ..Default::default()
    };
    provider.listings.insert(
        EntityKind::Artist,
        EntityListing {
            name: Some("Artist".to_string()),
            items: vec![track_ref("hit", "Hit", "Artist")],
            next: None,
        },
    );
    let resolver = resolver(ResolverOptions::default(), provider, MockSearch::default());

    let response = resolver
        .load("https://open.spotify.com/artist/0OdUWJ0sBjDrqHygGUXeCF")
        .await
        .unwrap();
    assert_eq!(response.playlist_name.as_deref(), Some("Artist"));

    let err = resolver.load("https://example.com/track/1").await.unwrap_err();
    assert!(matches!(err, ResolveError::InvalidUrl(_)));

    let err = resolver.load("spotify:album:missing").await.unwrap_err();
    assert!(matches!(err, ResolveError::NotFound(_)));
    assert_eq!(calls.entity.load(Ordering::SeqCst), 2);
}
